use std::io;

use thiserror::Error;
use vault_core::form::{FormError, SubmitError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] vault_core::Error),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Entry ID cannot be empty")]
    EmptyEntryId,
    #[error("Message ID cannot be empty")]
    EmptyMessageId,
    #[error("Reply text cannot be empty")]
    EmptyReply,
    #[error("Entry not found: {0}")]
    EntryNotFound(String),
    #[error("Message not found: {0}")]
    MessageNotFound(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Record store is not configured. Run `vault config init` or set SUPABASE_URL and SUPABASE_ANON_KEY."
    )]
    StoreNotConfigured,
    #[error("Vault PIN is not configured. Run `vault config init --pin <PIN>` or set VAULT_PIN.")]
    PinNotConfigured,
    #[error("Delete cancelled")]
    Cancelled,
}

impl From<SubmitError> for CliError {
    fn from(error: SubmitError) -> Self {
        match error {
            SubmitError::Invalid(error) => Self::Form(error),
            SubmitError::Save(error) => Self::Core(error),
        }
    }
}
