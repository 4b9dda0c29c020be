//! Data models for the vault

mod category;
mod entry;
mod message;

pub use category::Category;
pub use entry::{Entry, EntryDraft, EntryId};
pub use message::{Message, MessageId};

use serde::{Deserialize, Deserializer};

/// Record stores hand back either integer or text primary keys.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Text(String),
    Integer(i64),
}

fn deserialize_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawKey::deserialize(deserializer)? {
        RawKey::Text(value) => value,
        RawKey::Integer(value) => value.to_string(),
    })
}
