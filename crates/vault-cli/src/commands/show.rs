use std::io::{self, IsTerminal};

use vault_core::markdown::{render_markdown, render_terminal, render_terminal_highlighted};
use vault_core::store::EntryStore;
use vault_core::vault::VaultViewer;
use vault_core::{Entry, EntryId};

use crate::commands::common::{format_long_date, normalize_entry_identifier, render_tags};
use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Terminal,
    /// Terminal text with colored code blocks
    ColoredTerminal,
    Html,
    Raw,
}

pub async fn run_show<S: EntryStore>(store: S, id: &str, format: BodyFormat) -> Result<(), CliError> {
    let entry = find_entry(store, id).await?;
    let format = match format {
        BodyFormat::Terminal if io::stdout().is_terminal() => BodyFormat::ColoredTerminal,
        other => other,
    };
    println!("{}", render_entry(&entry, format));
    Ok(())
}

pub async fn find_entry<S: EntryStore>(store: S, id: &str) -> Result<Entry, CliError> {
    let id = normalize_entry_identifier(id)?;
    let mut viewer = VaultViewer::new(store);
    viewer.load().await?;

    let browser = viewer.browser_mut();
    if !browser.select(&EntryId::new(id.as_str())) {
        return Err(CliError::EntryNotFound(id));
    }
    browser
        .selected_entry()
        .cloned()
        .ok_or(CliError::EntryNotFound(id))
}

pub fn render_entry(entry: &Entry, format: BodyFormat) -> String {
    let body = match format {
        BodyFormat::Terminal => render_terminal(&entry.content),
        BodyFormat::ColoredTerminal => render_terminal_highlighted(&entry.content),
        BodyFormat::Html => render_markdown(&entry.content),
        BodyFormat::Raw => entry.content.clone(),
    };

    let mut header = vec![
        format!("{}{}", if entry.pinned { "* " } else { "" }, entry.title),
        format!("{}  [{}]", format_long_date(entry.date), entry.category),
    ];
    let tags = render_tags(&entry.tags);
    if !tags.is_empty() {
        header.push(tags);
    }
    if !entry.excerpt.is_empty() {
        header.push(String::new());
        header.push(entry.excerpt.clone());
    }

    format!("{}\n\n{}", header.join("\n"), body.trim_end())
}
