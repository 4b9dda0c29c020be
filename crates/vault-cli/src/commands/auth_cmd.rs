use chrono::{DateTime, Duration, Utc};
use vault_core::session::{PinGate, SessionFile, VaultSession, DEFAULT_SESSION_TTL_HOURS};

use crate::commands::common::{prompt_line, resolve_pin};
use crate::error::CliError;

pub fn run_login(pin: Option<String>, profile: Option<&str>) -> Result<(), CliError> {
    let gate = PinGate::new(resolve_pin(profile)?, Duration::hours(DEFAULT_SESSION_TTL_HOURS))?;
    let candidate = match pin {
        Some(pin) => pin,
        None => prompt_line("PIN")?,
    };
    let file = SessionFile::open_default()?;
    let session = login(&gate, &file, &candidate)?;
    println!(
        "Vault unlocked until {}",
        session.expires_at.format("%Y-%m-%d %H:%M UTC")
    );
    Ok(())
}

pub fn run_status() -> Result<(), CliError> {
    let file = SessionFile::open_default()?;
    println!("{}", status_line(&file, Utc::now())?);
    Ok(())
}

pub fn run_logout() -> Result<(), CliError> {
    let file = SessionFile::open_default()?;
    if file.clear()? {
        println!("Vault locked");
    } else {
        println!("Vault was not unlocked");
    }
    Ok(())
}

pub fn login(gate: &PinGate, file: &SessionFile, candidate: &str) -> Result<VaultSession, CliError> {
    let session = gate.verify(candidate)?;
    file.save(&session)?;
    Ok(session)
}

pub fn status_line(file: &SessionFile, now: DateTime<Utc>) -> Result<String, CliError> {
    Ok(match file.load_at(now)? {
        Some(session) => {
            let remaining = session.expires_at.signed_duration_since(now);
            format!(
                "Vault unlocked ({}h {}m remaining)",
                remaining.num_hours(),
                remaining.num_minutes() % 60
            )
        }
        None => "Vault locked".to_string(),
    })
}
