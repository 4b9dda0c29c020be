use std::env;

use crate::cli::ConfigCommands;
use crate::config_profiles::{normalize_text_option, CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            supabase_url,
            supabase_anon_key,
            entries_table,
            messages_table,
            pin,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            ProfileInput {
                supabase_url,
                supabase_anon_key,
                entries_table,
                messages_table,
                pin,
            },
            no_activate,
        ),
        ConfigCommands::Show { profile } => run_config_show(profile.as_deref().or(global_profile)),
    }
}

/// Values passed to `config init`; unset fields fall back to env, then the stored profile
#[derive(Debug, Default, Clone)]
pub struct ProfileInput {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub entries_table: Option<String>,
    pub messages_table: Option<String>,
    pub pin: Option<String>,
}

pub fn run_config_init(
    profile_name: Option<&str>,
    input: ProfileInput,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let existing = config.profile(&profile_name).cloned().unwrap_or_default();

    let merged = merge_profile(&existing, input, |key| env::var(key).ok());
    validate_profile(&merged)?;
    *config.profile_mut_or_default(&profile_name) = merged;

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    let profile = config
        .profile(&profile_name)
        .ok_or_else(|| CliError::Config("Failed to persist profile".to_string()))?;
    let missing = missing_fields(profile);
    if missing.is_empty() {
        println!("Profile '{profile_name}' is ready. Run `vault login` to unlock editing.");
    } else {
        println!(
            "Profile '{}' is missing: {}",
            profile_name,
            missing.join(", ")
        );
    }
    Ok(())
}

pub fn run_config_show(profile_name: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let Some(profile) = config.profile(&profile_name) else {
        println!("Profile '{profile_name}' is not configured.");
        return Ok(());
    };

    println!("profile: {profile_name}");
    println!("supabase_url: {}", profile.supabase_url().unwrap_or_default());
    println!(
        "supabase_anon_key: {}",
        redact(profile.supabase_anon_key().as_deref())
    );
    println!(
        "entries_table: {}",
        profile.entries_table.as_deref().unwrap_or(vault_core::config::DEFAULT_ENTRIES_TABLE)
    );
    println!(
        "messages_table: {}",
        profile
            .messages_table
            .as_deref()
            .unwrap_or(vault_core::config::DEFAULT_MESSAGES_TABLE)
    );
    println!("pin: {}", redact(profile.pin().as_deref()));
    Ok(())
}

/// Explicit value, then environment, then what the profile already had
pub fn merge_profile(
    existing: &CliProfile,
    input: ProfileInput,
    read_env: impl Fn(&str) -> Option<String>,
) -> CliProfile {
    let pick = |explicit: Option<String>, env_key: Option<&str>, current: &Option<String>| {
        normalize_text_option(explicit)
            .or_else(|| env_key.and_then(|key| normalize_text_option(read_env(key))))
            .or_else(|| normalize_text_option(current.clone()))
    };

    CliProfile {
        supabase_url: pick(input.supabase_url, Some("SUPABASE_URL"), &existing.supabase_url),
        supabase_anon_key: pick(
            input.supabase_anon_key,
            Some("SUPABASE_ANON_KEY"),
            &existing.supabase_anon_key,
        ),
        entries_table: pick(
            input.entries_table,
            Some("VAULT_ENTRIES_TABLE"),
            &existing.entries_table,
        ),
        messages_table: pick(
            input.messages_table,
            Some("VAULT_MESSAGES_TABLE"),
            &existing.messages_table,
        ),
        pin: pick(input.pin, None, &existing.pin),
    }
}

pub fn validate_profile(profile: &CliProfile) -> Result<(), CliError> {
    if let Some(url) = profile.supabase_url() {
        vault_core::util::normalize_base_url(&url, "supabase_url").map_err(CliError::Config)?;
    }
    Ok(())
}

pub fn missing_fields(profile: &CliProfile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if profile.supabase_url().is_none() {
        missing.push("supabase_url");
    }
    if profile.supabase_anon_key().is_none() {
        missing.push("supabase_anon_key");
    }
    if profile.pin().is_none() {
        missing.push("pin");
    }
    missing
}

fn redact(value: Option<&str>) -> &'static str {
    if value.is_some() {
        "[set]"
    } else {
        "[unset]"
    }
}
