use chrono::{Local, NaiveDate};
use vault_core::store::EntryStore;
use vault_core::vault::VaultEditor;
use vault_core::{Entry, EntryId};

use crate::cli::EntryFields;
use crate::commands::common::{
    apply_entry_fields, capture_editor_input_with_initial, normalize_entry_identifier,
    print_notices,
};
use crate::error::CliError;

pub async fn run_edit<S: EntryStore>(store: S, id: &str, fields: EntryFields) -> Result<(), CliError> {
    let mut editor = VaultEditor::new(store);
    editor.load().await?;

    let use_editor = fields.editor || !has_field_overrides(&fields);
    let result = edit_entry(&mut editor, id, &fields, Local::now().date_naive(), |body| {
        if use_editor {
            capture_editor_input_with_initial(body)
        } else {
            Ok(None)
        }
    })
    .await;
    print_notices(&editor.take_notices());
    let entry = result?;
    println!("{}", entry.id);
    Ok(())
}

/// Update a loaded entry from flag values, letting `edit_body` replace the body.
pub async fn edit_entry<S, F>(
    editor: &mut VaultEditor<S>,
    id: &str,
    fields: &EntryFields,
    today: NaiveDate,
    edit_body: F,
) -> Result<Entry, CliError>
where
    S: EntryStore,
    F: FnOnce(&str) -> Result<Option<String>, CliError>,
{
    let id = normalize_entry_identifier(id)?;
    let mut form = editor
        .edit_form(&EntryId::new(id.as_str()))
        .ok_or(CliError::EntryNotFound(id))?;
    apply_entry_fields(&mut form, fields, today);

    if fields.content.is_none() {
        if let Some(body) = edit_body(&form.content)? {
            form.content = body;
        }
    }

    Ok(editor.save(&mut form).await?)
}

/// True when any flag other than `--editor` was given
pub fn has_field_overrides(fields: &EntryFields) -> bool {
    fields.title.is_some()
        || fields.date.is_some()
        || fields.excerpt.is_some()
        || fields.tags.is_some()
        || fields.category.is_some()
        || fields.pin
        || fields.unpin
        || fields.content.is_some()
}
