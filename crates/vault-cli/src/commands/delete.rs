use vault_core::store::EntryStore;
use vault_core::vault::VaultEditor;
use vault_core::{Entry, EntryId};

use crate::commands::common::{normalize_entry_identifier, print_notices, prompt_confirmation};
use crate::error::CliError;

pub async fn run_delete<S: EntryStore>(store: S, id: &str, skip_prompt: bool) -> Result<(), CliError> {
    let mut editor = VaultEditor::new(store);
    editor.load().await?;

    let result = delete_entry(&mut editor, id, |entry, question| {
        if skip_prompt {
            return Ok(true);
        }
        prompt_confirmation(&format!("{question} ({})", entry.title))
    })
    .await;
    print_notices(&editor.take_notices());
    let entry = result?;
    println!("{}", entry.id);
    Ok(())
}

/// Request a delete and only perform it once `confirm` agrees.
pub async fn delete_entry<S, F>(
    editor: &mut VaultEditor<S>,
    id: &str,
    confirm: F,
) -> Result<Entry, CliError>
where
    S: EntryStore,
    F: FnOnce(&Entry, &str) -> Result<bool, CliError>,
{
    let id = EntryId::new(normalize_entry_identifier(id)?);
    let entry = editor
        .find(&id)
        .cloned()
        .ok_or_else(|| CliError::EntryNotFound(id.to_string()))?;

    let pending = editor.request_delete(id);
    let question = editor
        .take_notices()
        .pop()
        .map_or_else(|| "Delete this entry?".to_string(), |notice| notice.description);

    if !confirm(&entry, &question)? {
        editor.cancel_delete();
        return Err(CliError::Cancelled);
    }

    editor.confirm_delete(pending).await?;
    Ok(entry)
}
