use std::env;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use vault_core::config::StoreConfig;
use vault_core::form::EntryForm;
use vault_core::session::{SessionFile, VaultSession};
use vault_core::store::SupabaseStore;
use vault_core::{Entry, Message, Notice};

use crate::cli::EntryFields;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct EntryListItem {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub category: String,
    pub pinned: bool,
    pub excerpt: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageListItem {
    pub id: String,
    pub name: String,
    pub email: String,
    pub preview: String,
    pub created_at: DateTime<Utc>,
}

/// Env settings first, then the selected profile
pub fn resolve_store_config(profile: Option<&str>) -> Result<StoreConfig, CliError> {
    if let Some(config) = StoreConfig::from_env()? {
        return Ok(config);
    }

    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile);
    let store_config = config
        .profile(&profile_name)
        .map(|profile| profile.store_config())
        .transpose()?
        .flatten();
    store_config.ok_or(CliError::StoreNotConfigured)
}

pub fn open_store(profile: Option<&str>) -> Result<SupabaseStore, CliError> {
    let config = resolve_store_config(profile)?;
    let store = SupabaseStore::new(&config)?;
    tracing::debug!("Using record store at {}", store.rest_url());
    Ok(store)
}

/// `VAULT_PIN`, then the selected profile's PIN
pub fn resolve_pin(profile: Option<&str>) -> Result<String, CliError> {
    if let Some(pin) = vault_core::util::normalize_text_option(env::var("VAULT_PIN").ok()) {
        return Ok(pin);
    }
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile);
    config
        .profile(&profile_name)
        .and_then(crate::config_profiles::CliProfile::pin)
        .ok_or(CliError::PinNotConfigured)
}

pub fn require_session() -> Result<VaultSession, CliError> {
    Ok(SessionFile::open_default()?.require()?)
}

pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        if notice.is_failure() {
            eprintln!("{notice}");
        } else {
            println!("{notice}");
        }
    }
}

pub fn entry_to_list_item(entry: &Entry) -> EntryListItem {
    EntryListItem {
        id: entry.id.to_string(),
        title: entry.title.clone(),
        date: entry.date,
        category: entry.category.to_string(),
        pinned: entry.pinned,
        excerpt: entry.excerpt.clone(),
        tags: entry.tags.clone(),
    }
}

pub fn message_to_list_item(message: &Message) -> MessageListItem {
    MessageListItem {
        id: message.id.to_string(),
        name: message.name.clone(),
        email: message.email.clone(),
        preview: message.preview(80),
        created_at: message.created_at,
    }
}

pub fn format_entry_lines(entries: &[Entry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let marker = if entry.pinned { "*" } else { " " };
            let id = entry.id.to_string();
            let title = truncate_chars(&entry.title, 40);
            let tags = render_tags(&entry.tags);
            let line = format!(
                "{marker} {id:<8}  {}  {:<8}  {title:<40}",
                entry.date.format("%Y-%m-%d"),
                entry.category.as_str(),
            );
            if tags.is_empty() {
                line.trim_end().to_string()
            } else {
                format!("{line}  {tags}")
            }
        })
        .collect()
}

pub fn format_message_lines(messages: &[Message], now: DateTime<Utc>) -> Vec<String> {
    messages
        .iter()
        .map(|message| {
            format!(
                "{:<8}  {:<10}  {:<20}  {}",
                message.id.to_string(),
                format_message_time(message.created_at, now),
                truncate_chars(&message.name, 20),
                message.preview(50)
            )
        })
        .collect()
}

/// Clock time today, "Yesterday" within two days, otherwise month and day
pub fn format_message_time(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(created_at);
    if age < chrono::Duration::hours(24) {
        created_at.with_timezone(&Local).format("%H:%M").to_string()
    } else if age < chrono::Duration::hours(48) {
        "Yesterday".to_string()
    } else {
        created_at.with_timezone(&Local).format("%b %-d").to_string()
    }
}

pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub fn render_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut truncated = value
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

/// Copy flag values onto a form; `add` fills a missing date with today
pub fn apply_entry_fields(form: &mut EntryForm, fields: &EntryFields, today: NaiveDate) {
    if let Some(title) = &fields.title {
        form.title.clone_from(title);
    }
    if let Some(date) = &fields.date {
        form.date.clone_from(date);
    } else if form.date.trim().is_empty() {
        form.date = today.format("%Y-%m-%d").to_string();
    }
    if let Some(excerpt) = &fields.excerpt {
        form.excerpt.clone_from(excerpt);
    }
    if let Some(tags) = &fields.tags {
        form.tags.clone_from(tags);
    }
    if let Some(category) = fields.category {
        form.category = category.into();
    }
    if fields.pin {
        form.pinned = true;
    } else if fields.unpin {
        form.pinned = false;
    }
    if let Some(content) = &fields.content {
        form.content.clone_from(content);
    }
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySearchQuery)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_entry_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyEntryId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_message_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyMessageId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

/// Ask a yes/no question on the terminal; anything but y/yes is a no
pub fn prompt_confirmation(question: &str) -> Result<bool, CliError> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn prompt_line(label: &str) -> Result<String, CliError> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let edited = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&edited))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("vault-entry-{}-{now}.md", std::process::id()))
}
