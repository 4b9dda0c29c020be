use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use vault_core::Category;

#[derive(Parser)]
#[command(name = "vault")]
#[command(about = "Browse and edit the portfolio vault from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// CLI profile name holding record-store settings
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List entries, pinned first
    List {
        /// Only entries carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Only entries in this category
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
        /// Number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search titles, excerpts and tags
    Search {
        /// Search term
        query: String,
        /// Number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one entry with its rendered body
    Show {
        /// Entry ID
        id: String,
        /// Print the rendered HTML instead of terminal text
        #[arg(long, conflicts_with = "raw")]
        html: bool,
        /// Print the markdown source
        #[arg(long)]
        raw: bool,
    },
    /// Create a new entry
    #[command(alias = "new")]
    Add {
        #[command(flatten)]
        fields: EntryFields,
    },
    /// Edit an existing entry
    Edit {
        /// Entry ID
        id: String,
        #[command(flatten)]
        fields: EntryFields,
    },
    /// Delete an entry
    Delete {
        /// Entry ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List every tag in use
    Tags {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Contact-message inbox
    Inbox {
        #[command(subcommand)]
        command: InboxCommands,
    },
    /// Unlock the vault with the configured PIN
    Login {
        /// PIN (read from stdin when omitted)
        #[arg(long, value_name = "PIN")]
        pin: Option<String>,
    },
    /// Show whether the vault is unlocked
    Status,
    /// Lock the vault
    Logout,
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Export entries
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Editable entry fields shared by `add` and `edit`
#[derive(Args, Debug, Default, Clone)]
pub struct EntryFields {
    #[arg(long)]
    pub title: Option<String>,
    /// Date as YYYY-MM-DD (today when adding without one)
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub excerpt: Option<String>,
    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,
    #[arg(long, value_enum)]
    pub category: Option<CategoryArg>,
    /// Pin the entry
    #[arg(long, conflicts_with = "unpin")]
    pub pin: bool,
    /// Unpin the entry
    #[arg(long)]
    pub unpin: bool,
    /// Markdown body (read from piped stdin when omitted)
    #[arg(long)]
    pub content: Option<String>,
    /// Open the markdown body in $VISUAL/$EDITOR
    #[arg(long)]
    pub editor: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CategoryArg {
    Journal,
    Note,
    Til,
    Project,
    Snippet,
}

impl From<CategoryArg> for Category {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Journal => Self::Journal,
            CategoryArg::Note => Self::Note,
            CategoryArg::Til => Self::Til,
            CategoryArg::Project => Self::Project,
            CategoryArg::Snippet => Self::Snippet,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl From<ExportFormat> for vault_core::export::ExportFormat {
    fn from(value: ExportFormat) -> Self {
        match value {
            ExportFormat::Json => Self::Json,
            ExportFormat::Markdown => Self::Markdown,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum InboxCommands {
    /// List messages, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one message
    Show {
        /// Message ID
        id: String,
    },
    /// Delete one message
    Delete {
        /// Message ID
        id: String,
    },
    /// Delete several messages in one request
    BulkDelete {
        /// Message IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Reply to a message
    Reply {
        /// Message ID
        id: String,
        /// Reply text (read from stdin or $EDITOR when omitted)
        text: Vec<String>,
    },
    /// Print new messages as they arrive
    Watch {
        /// Polling interval in seconds
        #[arg(long, default_value = "5")]
        interval: u64,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// Entries table name
        #[arg(long, value_name = "TABLE")]
        entries_table: Option<String>,
        /// Messages table name
        #[arg(long, value_name = "TABLE")]
        messages_table: Option<String>,
        /// Vault PIN
        #[arg(long, value_name = "PIN")]
        pin: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved profile (secrets redacted)
    Show {
        /// Profile name to show
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
}
