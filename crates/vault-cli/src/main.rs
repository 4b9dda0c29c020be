//! Vault CLI - browse entries and manage the contact inbox from the terminal.

mod cli;
mod commands;
mod config_profiles;
mod error;

#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::{run_login, run_logout, run_status};
use crate::commands::common::{open_store, require_session};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::export::run_export;
use crate::commands::inbox::run_inbox;
use crate::commands::list::run_list;
use crate::commands::search::run_search;
use crate::commands::show::{run_show, BodyFormat};
use crate::commands::tags::run_tags;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vault=info,vault_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Some(Commands::List {
            tag,
            category,
            limit,
            json,
        }) => {
            run_list(
                open_store(profile)?,
                tag.as_deref(),
                category.map(Into::into),
                limit,
                json,
            )
            .await?;
        }
        Some(Commands::Search { query, limit, json }) => {
            run_search(open_store(profile)?, &query, limit, json).await?;
        }
        Some(Commands::Show { id, html, raw }) => {
            let format = if html {
                BodyFormat::Html
            } else if raw {
                BodyFormat::Raw
            } else {
                BodyFormat::Terminal
            };
            run_show(open_store(profile)?, &id, format).await?;
        }
        Some(Commands::Tags { json }) => run_tags(open_store(profile)?, json).await?,
        Some(Commands::Add { fields }) => {
            require_session()?;
            run_add(open_store(profile)?, fields).await?;
        }
        Some(Commands::Edit { id, fields }) => {
            require_session()?;
            run_edit(open_store(profile)?, &id, fields).await?;
        }
        Some(Commands::Delete { id, yes }) => {
            require_session()?;
            run_delete(open_store(profile)?, &id, yes).await?;
        }
        Some(Commands::Inbox { command }) => {
            require_session()?;
            run_inbox(open_store(profile)?, command).await?;
        }
        Some(Commands::Login { pin }) => run_login(pin, profile)?,
        Some(Commands::Status) => run_status()?,
        Some(Commands::Logout) => run_logout()?,
        Some(Commands::Config { command }) => run_config(command, profile)?,
        Some(Commands::Export { format, output }) => {
            run_export(open_store(profile)?, format, output.as_deref()).await?;
        }
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        None => {
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
