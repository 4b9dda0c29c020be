//! Supabase (PostgREST) implementation of the record stores.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{EntryStore, MessageStore};
use crate::config::StoreConfig;
use crate::models::{Entry, EntryDraft, EntryId, Message, MessageId};
use crate::normalize::{normalize_entry, RawEntry};
use crate::util::compact_text;
use crate::{Error, Result};

const REST_PATH: &str = "/rest/v1";

/// PostgREST client for the `entries` and `messages` tables.
#[derive(Clone)]
pub struct SupabaseStore {
    rest_url: String,
    anon_key: String,
    entries_table: String,
    messages_table: String,
    client: Client,
}

impl SupabaseStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let base = config.supabase_url.trim().trim_end_matches('/');
        let rest_url = if base.ends_with(REST_PATH) {
            base.to_string()
        } else {
            format!("{base}{REST_PATH}")
        };

        Ok(Self {
            rest_url,
            anon_key: config.supabase_anon_key.trim().to_string(),
            entries_table: config.entries_table.clone(),
            messages_table: config.messages_table.clone(),
            client: Client::builder().build()?,
        })
    }

    #[must_use]
    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.rest_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorized(request).send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = parse_api_error(status, &body);
        tracing::warn!("Record store request failed: {}", message);
        Err(Error::Api(message))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn write_entry(&self, request: RequestBuilder, context: &str) -> Result<Entry> {
        let rows: Vec<RawEntry> = self
            .send_json(request.header("Prefer", "return=representation"))
            .await?;
        rows.into_iter()
            .next()
            .map(normalize_entry)
            .ok_or_else(|| Error::NotFound(context.to_string()))
    }
}

impl EntryStore for SupabaseStore {
    async fn fetch_all(&self) -> Result<Vec<Entry>> {
        let request = self
            .client
            .get(self.table_url(&self.entries_table))
            .query(&[("select", "*"), ("order", "date.desc")]);
        let rows: Vec<RawEntry> = self.send_json(request).await?;
        tracing::debug!("Fetched {} entries", rows.len());
        Ok(rows.into_iter().map(normalize_entry).collect())
    }

    async fn create(&self, draft: &EntryDraft) -> Result<Entry> {
        let request = self
            .client
            .post(self.table_url(&self.entries_table))
            .json(draft);
        let entry = self.write_entry(request, "created entry").await?;
        tracing::info!("Created entry {}", entry.id);
        Ok(entry)
    }

    async fn update(&self, id: &EntryId, draft: &EntryDraft) -> Result<Entry> {
        let request = self
            .client
            .patch(self.table_url(&self.entries_table))
            .query(&[("id", eq_filter(id.as_str()))])
            .json(draft);
        let entry = self.write_entry(request, id.as_str()).await?;
        tracing::info!("Updated entry {}", entry.id);
        Ok(entry)
    }

    async fn delete(&self, id: &EntryId) -> Result<()> {
        let request = self
            .client
            .delete(self.table_url(&self.entries_table))
            .query(&[("id", eq_filter(id.as_str()))]);
        self.send(request).await?;
        tracing::info!("Deleted entry {}", id);
        Ok(())
    }
}

impl MessageStore for SupabaseStore {
    async fn fetch_all(&self) -> Result<Vec<Message>> {
        let request = self
            .client
            .get(self.table_url(&self.messages_table))
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        self.send_json(request).await
    }

    async fn fetch_since(&self, since: DateTime<Utc>) -> Result<Vec<Message>> {
        let cutoff = format!(
            "gte.{}",
            since.to_rfc3339_opts(SecondsFormat::Micros, true)
        );
        let request = self
            .client
            .get(self.table_url(&self.messages_table))
            .query(&[
                ("select", "*"),
                ("created_at", cutoff.as_str()),
                ("order", "created_at.asc"),
            ]);
        self.send_json(request).await
    }

    async fn delete(&self, id: &MessageId) -> Result<()> {
        let request = self
            .client
            .delete(self.table_url(&self.messages_table))
            .query(&[("id", eq_filter(id.as_str()))]);
        self.send(request).await?;
        tracing::info!("Deleted message {}", id);
        Ok(())
    }

    async fn delete_many(&self, ids: &[MessageId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let request = self
            .client
            .delete(self.table_url(&self.messages_table))
            .query(&[("id", in_filter(ids))]);
        self.send(request).await?;
        tracing::info!("Deleted {} messages", ids.len());
        Ok(())
    }
}

fn eq_filter(value: &str) -> String {
    format!("eq.{value}")
}

fn in_filter(ids: &[MessageId]) -> String {
    let joined = ids
        .iter()
        .map(MessageId::as_str)
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({joined})")
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
    error: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<PostgrestErrorBody>(body) {
        if let Some(message) = payload
            .message
            .or(payload.error)
            .or(payload.details)
            .or(payload.hint)
        {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
