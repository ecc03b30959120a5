//! lolpub CLI - publish markdown notes to omg.lol
//!
//! Statuses, weblog entries, pastes and pictures straight from a notes vault.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;
mod terminal;


use clap::Parser;

use crate::cli::{flag_pair, Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::PublishContext;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::paste::run_paste;
use crate::commands::pics::run_pics;
use crate::commands::status::run_status;
use crate::commands::weblog::run_weblog;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        if !error.already_reported() {
            eprintln!("Error: {error}");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["lolpub=info", "lolpub_core=info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Status {
            text,
            mastodon,
            no_mastodon,
        } => {
            let context = PublishContext::load(profile, cli.vault)?;
            run_status(&text, flag_pair(mastodon, no_mastodon), &context).await?;
        }
        Commands::Weblog { file } => {
            let context = PublishContext::load(profile, cli.vault)?;
            run_weblog(&file, &context).await?;
        }
        Commands::Paste { command } => {
            let context = PublishContext::load(profile, cli.vault)?;
            run_paste(command, &context).await?;
        }
        Commands::Pics { command } => {
            let context = PublishContext::load(profile, cli.vault)?;
            run_pics(command, &context).await?;
        }
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
        Commands::Config { command } => run_config(command, profile)?,
        Commands::Auth { command } => run_auth(command, profile)?,
    }

    Ok(())
}
