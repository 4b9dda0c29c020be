//! Record-store configuration.
//!
//! The vault talks to a hosted Supabase project. Only public values live
//! here: the project URL, the anon key, and the two table names.

use std::env;

use serde::{Deserialize, Serialize};

use crate::util::{normalize_base_url, normalize_text_option};
use crate::{Error, Result};

pub const DEFAULT_ENTRIES_TABLE: &str = "vault_logs";
pub const DEFAULT_MESSAGES_TABLE: &str = "messages";

const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
const ENV_ENTRIES_TABLE: &str = "VAULT_ENTRIES_TABLE";
const ENV_MESSAGES_TABLE: &str = "VAULT_MESSAGES_TABLE";

/// Connection settings for the hosted record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    #[serde(default = "default_entries_table")]
    pub entries_table: String,
    #[serde(default = "default_messages_table")]
    pub messages_table: String,
}

fn default_entries_table() -> String {
    DEFAULT_ENTRIES_TABLE.to_string()
}

fn default_messages_table() -> String {
    DEFAULT_MESSAGES_TABLE.to_string()
}

impl StoreConfig {
    /// Config with the default table names
    #[must_use]
    pub fn new(supabase_url: impl Into<String>, supabase_anon_key: impl Into<String>) -> Self {
        Self {
            supabase_url: supabase_url.into(),
            supabase_anon_key: supabase_anon_key.into(),
            entries_table: default_entries_table(),
            messages_table: default_messages_table(),
        }
    }

    /// Load store configuration from environment variables.
    ///
    /// Returns `Ok(None)` when neither the URL nor the key is set, and an error
    /// when only one of them is.
    pub fn from_env() -> Result<Option<Self>> {
        parse_config(|key| env::var(key).ok())
    }

    /// Check the URL scheme and that the key and table names are present.
    pub fn validate(&self) -> Result<()> {
        normalize_base_url(&self.supabase_url, "supabase_url").map_err(Error::InvalidInput)?;
        if self.supabase_anon_key.trim().is_empty() {
            return Err(Error::InvalidInput(
                "supabase_anon_key must not be empty".to_string(),
            ));
        }
        if self.entries_table.trim().is_empty() || self.messages_table.trim().is_empty() {
            return Err(Error::InvalidInput(
                "table names must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Combine optional URL/key values, rejecting half-configured pairs.
pub fn resolve_optional_store_config(
    url: Option<String>,
    anon_key: Option<String>,
) -> Result<Option<StoreConfig>> {
    let url = normalize_text_option(url);
    let anon_key = normalize_text_option(anon_key);

    match (url, anon_key) {
        (None, None) => Ok(None),
        (Some(url), Some(anon_key)) => {
            let url = normalize_base_url(&url, "supabase_url").map_err(Error::InvalidInput)?;
            Ok(Some(StoreConfig::new(url, anon_key)))
        }
        (Some(_), None) => Err(Error::NotConfigured(format!(
            "{ENV_SUPABASE_ANON_KEY} is missing"
        ))),
        (None, Some(_)) => Err(Error::NotConfigured(format!("{ENV_SUPABASE_URL} is missing"))),
    }
}

fn parse_config(read: impl Fn(&str) -> Option<String>) -> Result<Option<StoreConfig>> {
    let Some(mut config) = resolve_optional_store_config(
        read(ENV_SUPABASE_URL),
        read(ENV_SUPABASE_ANON_KEY),
    )?
    else {
        return Ok(None);
    };

    if let Some(table) = normalize_text_option(read(ENV_ENTRIES_TABLE)) {
        config.entries_table = table;
    }
    if let Some(table) = normalize_text_option(read(ENV_MESSAGES_TABLE)) {
        config.messages_table = table;
    }
    Ok(Some(config))
}
