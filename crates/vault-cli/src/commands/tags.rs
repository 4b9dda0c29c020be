use vault_core::filter::collect_tags;
use vault_core::store::EntryStore;

use crate::error::CliError;

pub async fn run_tags<S: EntryStore>(store: S, as_json: bool) -> Result<(), CliError> {
    let entries = store.fetch_all().await?;
    let tags = collect_tags(&entries);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
    } else {
        for tag in tags {
            println!("#{tag}");
        }
    }
    Ok(())
}
