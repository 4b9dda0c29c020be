use vault_core::store::EntryStore;
use vault_core::vault::VaultViewer;
use vault_core::Entry;

use crate::commands::common::normalize_search_query;
use crate::commands::list::print_entries;
use crate::error::CliError;

pub async fn run_search<S: EntryStore>(
    store: S,
    query: &str,
    limit: Option<usize>,
    as_json: bool,
) -> Result<(), CliError> {
    let mut entries = search_entries(store, query).await?;
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    print_entries(&entries, as_json)
}

pub async fn search_entries<S: EntryStore>(store: S, query: &str) -> Result<Vec<Entry>, CliError> {
    let query = normalize_search_query(query)?;
    let mut viewer = VaultViewer::new(store);
    viewer.load().await?;
    viewer.browser_mut().set_search_term(query);
    Ok(viewer.browser().visible())
}
