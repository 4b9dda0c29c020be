//! PIN-gated vault session with expiry, persisted as a small JSON file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const SESSION_FILE_NAME: &str = "session.json";

/// How long a verified PIN keeps the vault unlocked
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSession {
    pub authenticated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl VaultSession {
    #[must_use]
    pub fn start(now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            authenticated_at: now,
            expires_at: now + ttl,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Compares a candidate PIN against the configured one
#[derive(Clone)]
pub struct PinGate {
    pin: String,
    ttl: Duration,
}

impl std::fmt::Debug for PinGate {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PinGate")
            .field("pin", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl PinGate {
    pub fn new(pin: impl Into<String>, ttl: Duration) -> Result<Self> {
        let pin = pin.into().trim().to_string();
        if pin.is_empty() {
            return Err(Error::NotConfigured("vault PIN must not be empty".to_string()));
        }
        Ok(Self { pin, ttl })
    }

    pub fn verify(&self, candidate: &str) -> Result<VaultSession> {
        self.verify_at(candidate, Utc::now())
    }

    pub fn verify_at(&self, candidate: &str, now: DateTime<Utc>) -> Result<VaultSession> {
        if !pins_match(self.pin.as_bytes(), candidate.trim().as_bytes()) {
            tracing::warn!("Rejected vault PIN attempt");
            return Err(Error::Session("incorrect PIN".to_string()));
        }
        tracing::info!("Vault unlocked");
        Ok(VaultSession::start(now, self.ttl))
    }
}

/// Length-independent comparison that touches every byte
fn pins_match(expected: &[u8], candidate: &[u8]) -> bool {
    let mut diff = expected.len() ^ candidate.len();
    for (index, byte) in expected.iter().enumerate() {
        let other = candidate.get(index).copied().unwrap_or(0);
        diff |= usize::from(byte ^ other);
    }
    diff == 0
}

pub fn default_session_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("vault").join(SESSION_FILE_NAME))
        .ok_or_else(|| Error::NotConfigured("no config directory for this platform".to_string()))
}

/// On-disk session storage
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Result<Self> {
        default_session_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored session if one exists and has not expired
    pub fn load(&self) -> Result<Option<VaultSession>> {
        self.load_at(Utc::now())
    }

    pub fn load_at(&self, now: DateTime<Utc>) -> Result<Option<VaultSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let session = serde_json::from_str::<VaultSession>(&raw)?;
        if session.is_expired(now) {
            tracing::debug!("Stored vault session expired at {}", session.expires_at);
            return Ok(None);
        }
        Ok(Some(session))
    }

    pub fn save(&self, session: &VaultSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Remove the stored session. Returns false when none existed.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    /// Current session or a session error asking for login
    pub fn require(&self) -> Result<VaultSession> {
        self.load()?.ok_or_else(|| {
            Error::Session("vault is locked; run `vault login` first".to_string())
        })
    }
}
