use chrono::{Duration, NaiveDate, TimeZone, Utc};
use clap::Parser;
use vault_core::form::FormError;
use vault_core::inbox::Inbox;
use vault_core::session::{PinGate, SessionFile};
use vault_core::store::MemoryStore;
use vault_core::vault::VaultEditor;
use vault_core::{Category, Entry, EntryDraft, EntryId, Message, MessageId};

use crate::cli::{CategoryArg, Cli, Commands, CompletionShell, EntryFields, ExportFormat};
use crate::commands::add::add_entry;
use crate::commands::auth_cmd::{login, status_line};
use crate::commands::common::{
    apply_entry_fields, default_editor, format_entry_lines, format_long_date,
    format_message_time, is_affirmative, normalize_content, normalize_search_query,
};
use crate::commands::completions::completion_script;
use crate::commands::config::{merge_profile, missing_fields, validate_profile, ProfileInput};
use crate::commands::delete::delete_entry;
use crate::commands::edit::{edit_entry, has_field_overrides};
use crate::commands::export::export_entries;
use crate::commands::inbox::{delete_messages, reply, show_message};
use crate::commands::list::list_entries;
use crate::commands::search::search_entries;
use crate::commands::show::{find_entry, render_entry, BodyFormat};
use crate::config_profiles::CliProfile;
use crate::error::CliError;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn entry(id: &str, title: &str, tags: &[&str], pinned: bool) -> Entry {
    let mut draft = EntryDraft::new(title, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    draft.tags = tags.iter().map(ToString::to_string).collect();
    draft.pinned = pinned;
    draft.excerpt = format!("About {title}");
    Entry::from_draft(EntryId::new(id), draft)
}

fn seeded_entries() -> MemoryStore {
    MemoryStore::with_entries(vec![
        entry("1", "Redux Basics", &["redux", "state"], false),
        entry("2", "Hooks Deep Dive", &["react", "hooks"], true),
        entry("3", "Shell tricks", &["cli"], false),
    ])
}

fn message(id: &str, name: &str) -> Message {
    Message {
        id: MessageId::new(id),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        message: format!("Hi, this is {name}"),
        created_at: Utc::now() - Duration::minutes(5),
    }
}

fn titles(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.title.as_str()).collect()
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn normalize_search_query_rejects_blank() {
    assert!(matches!(
        normalize_search_query("   "),
        Err(CliError::EmptySearchQuery)
    ));
    assert_eq!(normalize_search_query(" redux ").unwrap(), "redux");
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn confirmation_accepts_only_yes() {
    assert!(is_affirmative("y\n"));
    assert!(is_affirmative(" YES "));
    assert!(!is_affirmative(""));
    assert!(!is_affirmative("nope"));
}

#[test]
fn cli_parses_add_flags() {
    let cli = Cli::parse_from([
        "vault", "add", "--title", "Notes", "--tags", "a, b", "--category", "til", "--pin",
    ]);
    let Some(Commands::Add { fields }) = cli.command else {
        panic!("expected add command");
    };
    assert_eq!(fields.title.as_deref(), Some("Notes"));
    assert_eq!(fields.category, Some(CategoryArg::Til));
    assert!(fields.pin);
}

#[test]
fn cli_rejects_pin_with_unpin() {
    assert!(Cli::try_parse_from(["vault", "edit", "1", "--pin", "--unpin"]).is_err());
}

#[test]
fn message_time_formats() {
    let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
    assert_eq!(
        format_message_time(now - Duration::hours(30), now),
        "Yesterday"
    );
    assert_eq!(format_message_time(now - Duration::minutes(5), now).len(), 5);
    assert_ne!(
        format_message_time(now - Duration::days(5), now),
        "Yesterday"
    );
}

#[test]
fn long_date_spells_month() {
    assert_eq!(
        format_long_date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()),
        "March 9, 2024"
    );
}

#[test]
fn entry_lines_mark_pinned_and_tags() {
    let lines = format_entry_lines(&[entry("2", "Hooks Deep Dive", &["react"], true)]);
    assert!(lines[0].starts_with("* 2"));
    assert!(lines[0].ends_with("#react"));
}

#[test]
fn apply_fields_fills_today_when_date_missing() {
    let mut form = vault_core::form::EntryForm::new();
    let fields = EntryFields {
        title: Some("Draft".to_string()),
        category: Some(CategoryArg::Snippet),
        ..EntryFields::default()
    };
    apply_entry_fields(&mut form, &fields, today());
    assert_eq!(form.date, "2024-06-01");
    assert_eq!(form.category, Category::Snippet);
}

#[test]
fn field_override_detection() {
    assert!(!has_field_overrides(&EntryFields::default()));
    assert!(!has_field_overrides(&EntryFields {
        editor: true,
        ..EntryFields::default()
    }));
    assert!(has_field_overrides(&EntryFields {
        unpin: true,
        ..EntryFields::default()
    }));
}

#[tokio::test]
async fn list_is_pinned_first_and_filters_by_tag() {
    let all = list_entries(seeded_entries(), None, None).await.unwrap();
    assert_eq!(
        titles(&all),
        vec!["Hooks Deep Dive", "Redux Basics", "Shell tricks"]
    );

    let tagged = list_entries(seeded_entries(), Some("REDUX"), None)
        .await
        .unwrap();
    assert_eq!(titles(&tagged), vec!["Redux Basics"]);

    let by_category = list_entries(seeded_entries(), None, Some(Category::Journal))
        .await
        .unwrap();
    assert!(by_category.is_empty());
}

#[tokio::test]
async fn search_matches_title_excerpt_and_tags() {
    let found = search_entries(seeded_entries(), "hooks").await.unwrap();
    assert_eq!(titles(&found), vec!["Hooks Deep Dive"]);

    let by_tag = search_entries(seeded_entries(), "cli").await.unwrap();
    assert_eq!(titles(&by_tag), vec!["Shell tricks"]);

    assert!(search_entries(seeded_entries(), " ").await.is_err());
}

#[tokio::test]
async fn show_reports_missing_entry() {
    let error = find_entry(seeded_entries(), "99").await.unwrap_err();
    assert!(matches!(error, CliError::EntryNotFound(id) if id == "99"));
}

#[tokio::test]
async fn show_renders_header_and_body() {
    let mut found = find_entry(seeded_entries(), "2").await.unwrap();
    found.content = "# Title\n\nSee [docs](https://react.dev)".to_string();

    let html = render_entry(&found, BodyFormat::Html);
    assert!(html.starts_with("* Hooks Deep Dive\nJanuary 15, 2024  [note]\n#react #hooks"));
    assert!(html.contains("target=\"_blank\""));

    let raw = render_entry(&found, BodyFormat::Raw);
    assert!(raw.ends_with("See [docs](https://react.dev)"));
}

#[tokio::test]
async fn show_colors_code_only_for_colored_terminal() {
    let mut found = find_entry(seeded_entries(), "2").await.unwrap();
    found.content = "```rust\nlet x = 1;\n```".to_string();

    let colored = render_entry(&found, BodyFormat::ColoredTerminal);
    assert!(colored.contains("\x1b[38;2;"));

    let plain = render_entry(&found, BodyFormat::Terminal);
    assert!(plain.ends_with("```rust\nlet x = 1;\n```"));
}

#[tokio::test]
async fn add_normalizes_tags_and_refetches() {
    let store = MemoryStore::new();
    let mut editor = VaultEditor::new(store.clone());
    let fields = EntryFields {
        title: Some("  Fresh entry ".to_string()),
        tags: Some(" react,  hooks ,ui".to_string()),
        content: Some("Body".to_string()),
        ..EntryFields::default()
    };

    let created = add_entry(&mut editor, &fields, today()).await.unwrap();
    assert_eq!(created.title, "Fresh entry");
    assert_eq!(created.tags, vec!["react", "hooks", "ui"]);
    assert_eq!(created.date, today());
    assert_eq!(editor.entries().len(), 1);
    assert_eq!(editor.take_notices()[0].title, "Entry Added");
}

#[tokio::test]
async fn add_without_title_never_reaches_store() {
    let store = MemoryStore::new();
    let mut editor = VaultEditor::new(store.clone());

    let error = add_entry(&mut editor, &EntryFields::default(), today())
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::Form(FormError::MissingTitle)));
    assert_eq!(store.request_count(), 0);
}

#[tokio::test]
async fn edit_applies_overrides_and_body() {
    let store = seeded_entries();
    let mut editor = VaultEditor::new(store.clone());
    editor.load().await.unwrap();

    let fields = EntryFields {
        unpin: true,
        ..EntryFields::default()
    };
    let updated = edit_entry(&mut editor, "2", &fields, today(), |body| {
        assert_eq!(body, "");
        Ok(Some("Rewritten body".to_string()))
    })
    .await
    .unwrap();

    assert!(!updated.pinned);
    assert_eq!(updated.content, "Rewritten body");
    assert_eq!(updated.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    let stored = store
        .entries_snapshot()
        .into_iter()
        .find(|entry| entry.id.as_str() == "2")
        .unwrap();
    assert_eq!(stored.content, "Rewritten body");
}

#[tokio::test]
async fn rejected_edit_keeps_store_unchanged() {
    let store = seeded_entries();
    let mut editor = VaultEditor::new(store.clone());
    editor.load().await.unwrap();
    let before = store.entries_snapshot();

    store.fail_next("update rejected (500)");
    let fields = EntryFields {
        title: Some("Renamed".to_string()),
        ..EntryFields::default()
    };
    let error = edit_entry(&mut editor, "1", &fields, today(), |_| Ok(None))
        .await
        .unwrap_err();

    assert!(matches!(error, CliError::Core(_)));
    assert_eq!(store.entries_snapshot(), before);
    assert!(editor.take_notices()[0].is_failure());
}

#[tokio::test]
async fn delete_respects_confirmation() {
    let store = seeded_entries();
    let mut editor = VaultEditor::new(store.clone());
    editor.load().await.unwrap();

    let declined = delete_entry(&mut editor, "3", |_, question| {
        assert_eq!(question, "Are you sure you want to delete this entry?");
        Ok(false)
    })
    .await;
    assert!(matches!(declined, Err(CliError::Cancelled)));
    assert_eq!(store.entries_snapshot().len(), 3);

    let deleted = delete_entry(&mut editor, "3", |_, _| Ok(true))
        .await
        .unwrap();
    assert_eq!(deleted.title, "Shell tricks");
    assert_eq!(store.entries_snapshot().len(), 2);
    assert_eq!(editor.entries().len(), 2);
}

#[tokio::test]
async fn delete_unknown_entry_fails_before_prompt() {
    let mut editor = VaultEditor::new(seeded_entries());
    editor.load().await.unwrap();
    let result = delete_entry(&mut editor, "42", |_, _| panic!("should not prompt")).await;
    assert!(matches!(result, Err(CliError::EntryNotFound(_))));
}

#[tokio::test]
async fn export_markdown_is_pinned_first() {
    let rendered = export_entries(seeded_entries(), ExportFormat::Markdown)
        .await
        .unwrap();
    let hooks = rendered.find("Hooks Deep Dive").unwrap();
    let redux = rendered.find("Redux Basics").unwrap();
    assert!(hooks < redux);
    assert!(rendered.contains("pinned: true"));
}

#[tokio::test]
async fn inbox_bulk_delete_removes_messages() {
    let store = MemoryStore::with_messages(vec![
        message("1", "Ada"),
        message("2", "Grace"),
        message("3", "Linus"),
    ]);
    let mut inbox = Inbox::new(store.clone());

    let deleted = delete_messages(&mut inbox, &["1".to_string(), "3".to_string()])
        .await
        .unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(store.messages_snapshot().len(), 1);
    assert!(inbox.selected().is_empty());
}

#[tokio::test]
async fn inbox_bulk_delete_rejects_unknown_ids() {
    let store = MemoryStore::with_messages(vec![message("1", "Ada")]);
    let mut inbox = Inbox::new(store.clone());
    let result = delete_messages(&mut inbox, &["7".to_string()]).await;
    assert!(matches!(result, Err(CliError::MessageNotFound(_))));
    assert_eq!(store.messages_snapshot().len(), 1);
}

#[tokio::test]
async fn inbox_reply_targets_sender() {
    let store = MemoryStore::with_messages(vec![message("1", "Ada")]);
    let mut inbox = Inbox::new(store);

    assert!(matches!(
        reply(&mut inbox, "1", "  ").await,
        Err(CliError::EmptyReply)
    ));
    let sent = reply(&mut inbox, "1", "Thanks!").await.unwrap();
    assert_eq!(sent.to, "ada@example.com");
    assert_eq!(sent.to_name, "Ada");
}

#[tokio::test]
async fn inbox_show_unknown_message() {
    let mut inbox = Inbox::new(MemoryStore::new());
    assert!(matches!(
        show_message(&mut inbox, "5").await,
        Err(CliError::MessageNotFound(_))
    ));
}

#[test]
fn login_persists_session_and_status_reports_it() {
    let dir = tempfile::tempdir().unwrap();
    let file = SessionFile::new(dir.path().join("session.json"));
    let gate = PinGate::new("4321", Duration::hours(2)).unwrap();

    assert!(login(&gate, &file, "0000").is_err());
    assert_eq!(status_line(&file, Utc::now()).unwrap(), "Vault locked");

    let session = login(&gate, &file, "4321").unwrap();
    let status = status_line(&file, session.authenticated_at + Duration::minutes(30)).unwrap();
    assert_eq!(status, "Vault unlocked (1h 30m remaining)");

    assert_eq!(
        status_line(&file, session.expires_at + Duration::seconds(1)).unwrap(),
        "Vault locked"
    );
}

#[test]
fn merge_profile_prefers_explicit_then_env_then_existing() {
    let existing = CliProfile {
        supabase_url: Some("https://old.supabase.co".to_string()),
        supabase_anon_key: Some("old-key".to_string()),
        pin: Some("1111".to_string()),
        ..CliProfile::default()
    };
    let input = ProfileInput {
        supabase_url: Some("https://new.supabase.co".to_string()),
        ..ProfileInput::default()
    };
    let merged = merge_profile(&existing, input, |key| {
        (key == "SUPABASE_ANON_KEY").then(|| "env-key".to_string())
    });

    assert_eq!(merged.supabase_url.as_deref(), Some("https://new.supabase.co"));
    assert_eq!(merged.supabase_anon_key.as_deref(), Some("env-key"));
    assert_eq!(merged.pin.as_deref(), Some("1111"));
    assert!(missing_fields(&merged).is_empty());
}

#[test]
fn validate_profile_requires_http_scheme() {
    let profile = CliProfile {
        supabase_url: Some("project.supabase.co".to_string()),
        ..CliProfile::default()
    };
    assert!(matches!(validate_profile(&profile), Err(CliError::Config(_))));
    assert_eq!(
        missing_fields(&CliProfile::default()),
        vec!["supabase_url", "supabase_anon_key", "pin"]
    );
}

#[test]
fn completions_mention_binary_name() {
    let script = String::from_utf8(completion_script(CompletionShell::Bash)).unwrap();
    assert!(script.contains("vault"));
}
