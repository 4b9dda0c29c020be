//! Entry export as JSON or frontmatter Markdown.

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Category, Entry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Flat record written by both export formats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub category: Category,
    pub pinned: bool,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub content: String,
}

impl From<&Entry> for ExportEntry {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id.to_string(),
            title: entry.title.clone(),
            date: entry.date,
            category: entry.category,
            pinned: entry.pinned,
            tags: entry.tags.clone(),
            excerpt: entry.excerpt.clone(),
            content: entry.content.clone(),
        }
    }
}

pub fn render_json_export(entries: &[Entry]) -> serde_json::Result<String> {
    let items = entries.iter().map(ExportEntry::from).collect::<Vec<_>>();
    serde_json::to_string_pretty(&items)
}

/// One frontmatter block per entry followed by its markdown body.
#[must_use]
pub fn render_markdown_export(entries: &[Entry]) -> String {
    let mut output = String::new();

    for (index, entry) in entries.iter().map(ExportEntry::from).enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let _ = writeln!(output, "---");
        let _ = writeln!(output, "id: {}", yaml_string(&entry.id));
        let _ = writeln!(output, "title: {}", yaml_string(&entry.title));
        let _ = writeln!(output, "date: {}", entry.date.format("%Y-%m-%d"));
        let _ = writeln!(output, "category: {}", entry.category);
        let _ = writeln!(output, "pinned: {}", entry.pinned);
        if entry.tags.is_empty() {
            let _ = writeln!(output, "tags: []");
        } else {
            let _ = writeln!(output, "tags:");
            for tag in &entry.tags {
                let _ = writeln!(output, "  - {}", yaml_string(tag));
            }
        }
        if !entry.excerpt.is_empty() {
            let _ = writeln!(output, "excerpt: {}", yaml_string(&entry.excerpt));
        }
        let _ = writeln!(output, "---");
        let _ = writeln!(output);
        output.push_str(&entry.content);
        output.push('\n');
    }

    output
}

pub fn render_entries_export(entries: &[Entry], format: ExportFormat) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(entries),
        ExportFormat::Markdown => Ok(render_markdown_export(entries)),
    }
}

#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, day: NaiveDate) -> String {
    format!("vault-export-{}.{}", day.format("%Y-%m-%d"), format.extension())
}

/// Double-quoted scalar; JSON string syntax is valid YAML
fn yaml_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}
