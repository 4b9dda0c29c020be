use chrono::{Local, NaiveDate};
use vault_core::form::EntryForm;
use vault_core::store::EntryStore;
use vault_core::vault::VaultEditor;
use vault_core::Entry;

use crate::cli::EntryFields;
use crate::commands::common::{
    apply_entry_fields, capture_editor_input_with_initial, print_notices, read_piped_stdin,
};
use crate::error::CliError;

pub async fn run_add<S: EntryStore>(store: S, fields: EntryFields) -> Result<(), CliError> {
    let mut fields = fields;
    if fields.content.is_none() {
        fields.content = if fields.editor {
            capture_editor_input_with_initial("")?
        } else {
            read_piped_stdin()?
        };
    }

    let mut editor = VaultEditor::new(store);
    let result = add_entry(&mut editor, &fields, Local::now().date_naive()).await;
    print_notices(&editor.take_notices());
    let entry = result?;
    println!("{}", entry.id);
    Ok(())
}

pub async fn add_entry<S: EntryStore>(
    editor: &mut VaultEditor<S>,
    fields: &EntryFields,
    today: NaiveDate,
) -> Result<Entry, CliError> {
    let mut form = EntryForm::new();
    apply_entry_fields(&mut form, fields, today);
    Ok(editor.save(&mut form).await?)
}
