use std::path::Path;

use vault_core::export::render_entries_export;
use vault_core::filter::sort_pinned_first;
use vault_core::store::EntryStore;

use crate::cli::ExportFormat;
use crate::error::CliError;

pub async fn run_export<S: EntryStore>(
    store: S,
    format: ExportFormat,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let rendered = export_entries(store, format).await?;

    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}

pub async fn export_entries<S: EntryStore>(store: S, format: ExportFormat) -> Result<String, CliError> {
    let entries = sort_pinned_first(&store.fetch_all().await?);
    tracing::info!("Exporting {} entries", entries.len());
    Ok(render_entries_export(&entries, format.into())?)
}
