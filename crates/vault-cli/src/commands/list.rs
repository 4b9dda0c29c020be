use vault_core::store::EntryStore;
use vault_core::vault::VaultViewer;
use vault_core::{Category, Entry};

use crate::commands::common::{entry_to_list_item, format_entry_lines, EntryListItem};
use crate::error::CliError;

pub async fn run_list<S: EntryStore>(
    store: S,
    tag: Option<&str>,
    category: Option<Category>,
    limit: Option<usize>,
    as_json: bool,
) -> Result<(), CliError> {
    let mut entries = list_entries(store, tag, category).await?;
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    print_entries(&entries, as_json)
}

/// Pinned-first entries narrowed by optional tag and category
pub async fn list_entries<S: EntryStore>(
    store: S,
    tag: Option<&str>,
    category: Option<Category>,
) -> Result<Vec<Entry>, CliError> {
    let mut viewer = VaultViewer::new(store);
    viewer.load().await?;

    let tag = tag.map(|tag| tag.trim().to_lowercase());
    Ok(viewer
        .browser()
        .visible()
        .into_iter()
        .filter(|entry| {
            tag.as_ref().map_or(true, |tag| {
                entry
                    .tags
                    .iter()
                    .any(|candidate| candidate.to_lowercase() == *tag)
            })
        })
        .filter(|entry| category.map_or(true, |category| entry.category == category))
        .collect())
}

pub fn print_entries(entries: &[Entry], as_json: bool) -> Result<(), CliError> {
    if as_json {
        let json_items = entries
            .iter()
            .map(entry_to_list_item)
            .collect::<Vec<EntryListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_entry_lines(entries) {
            println!("{line}");
        }
    }
    Ok(())
}
