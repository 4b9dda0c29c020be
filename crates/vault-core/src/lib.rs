//! vault-core - Core library for the portfolio vault
//!
//! This crate contains the entry and message models, the record-store client,
//! and the view/edit/search logic shared by every vault front end.

pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod form;
pub mod inbox;
pub mod markdown;
pub mod models;
pub mod normalize;
pub mod notice;
pub mod realtime;
pub mod session;
pub mod store;
pub mod util;
pub mod vault;

pub use error::{Error, Result};
pub use models::{Category, Entry, EntryDraft, EntryId, Message, MessageId};
pub use notice::{Notice, NoticeVariant};
