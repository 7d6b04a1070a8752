//! CLI commands for queuebot using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{get_settings_path, load_settings, write_default_settings, Settings};
use crate::logging::LogOptions;

/// queuebot - a shared first-in-first-out queue for Telegram chats.
#[derive(Parser, Debug)]
#[command(name = "queuebot")]
#[command(version)]
#[command(about = "A Telegram bot that keeps a live queue message", long_about = None)]
pub struct Commands {
    /// Debug logging for every target
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Directory for log files
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Write the log file as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bot
    Run {
        /// Settings file (default: ~/.queuebot/settings.json)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Bot token, overriding the settings file
        #[arg(long, env = "QUEUEBOT_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Write a default settings file
    Setup {
        /// Settings file (default: ~/.queuebot/settings.json)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Bot token to store
        #[arg(long)]
        token: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective settings (token hidden)
    Config {
        /// Settings file (default: ~/.queuebot/settings.json)
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

impl Commands {
    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            log_dir: self.log_dir.clone(),
            verbose: self.verbose,
            json: self.log_json,
        }
    }

    /// Run the command.
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Command::Run { config, token } => cmd_run(config.as_deref(), token.clone()).await,
            Command::Setup {
                config,
                token,
                force,
            } => cmd_setup(config.as_deref(), token.clone(), *force),
            Command::Config { config } => cmd_config(config.as_deref()),
        }
    }
}

fn resolve_settings_path(config: Option<&Path>) -> Result<PathBuf> {
    match config {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(get_settings_path()?),
    }
}

async fn cmd_run(config: Option<&Path>, token: Option<String>) -> Result<()> {
    let mut settings = load_settings(config)?;
    if token.is_some() {
        settings.bot_token = token;
    }
    crate::telegram::run_queue_bot(settings).await?;
    Ok(())
}

fn cmd_setup(config: Option<&Path>, token: Option<String>, force: bool) -> Result<()> {
    let path = resolve_settings_path(config)?;
    write_default_settings(&path, force)?;

    if token.is_some() {
        let mut settings = load_settings(Some(&path))?;
        settings.bot_token = token;
        std::fs::write(&path, serde_json::to_string_pretty(&settings)?)?;
    }

    println!("✓ Wrote settings to {}", path.display());
    println!("Edit admin_roles and display to taste, then run: queuebot run");
    Ok(())
}

fn cmd_config(config: Option<&Path>) -> Result<()> {
    let settings: Settings = load_settings(config)?;
    println!("{}", serde_json::to_string_pretty(&settings.redacted())?);
    Ok(())
}
