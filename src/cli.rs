//! Command-line interface parsing for the users client
//!
//! This module handles parsing of CLI arguments using clap and turning them,
//! together with the settings file and environment, into `Settings`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::Settings;
use crate::error::ConfigError;

/// Settings file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "appsettings.json";

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The user id is not a positive integer
    #[error("Invalid user id: '{0}'. Expected a positive integer")]
    InvalidUserId(String),
}

/// ReqRes users client - fetch users with retry and caching
#[derive(Parser, Debug)]
#[command(name = "reqres-users")]
#[command(about = "Fetch users from the ReqRes API with retry and caching")]
#[command(version)]
pub struct Cli {
    /// Path to an appsettings.json style settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override ApiSettings.BaseUrl
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Override ApiSettings.ApiKey
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// What to fetch
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List every user across all pages
    All,
    /// Show a single user
    User {
        /// User id
        #[arg(value_parser = parse_user_id)]
        id: u32,
    },
    /// List all users, fetch user 2, then list again from cache
    Demo,
}

/// Parses a user id argument.
///
/// # Returns
/// * `Ok(u32)` for a positive integer
/// * `Err(CliError::InvalidUserId)` otherwise
pub fn parse_user_id(s: &str) -> Result<u32, CliError> {
    match s.trim().parse::<u32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CliError::InvalidUserId(s.to_string())),
    }
}

impl Cli {
    /// The subcommand to run; `demo` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Demo)
    }

    /// Default log filter for this invocation
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "reqres_users=debug"
        } else {
            "reqres_users=info"
        }
    }

    /// Builds settings from file, environment and flags, in that order.
    ///
    /// An explicit `--config` must exist; the default path may be absent.
    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        let settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::from_file_or_default(Path::new(DEFAULT_CONFIG_PATH))?,
        };
        Ok(self.apply_overrides(settings.apply_env()))
    }

    /// Applies `--base-url` and `--api-key`
    pub fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if let Some(url) = &self.base_url {
            settings.api_settings.base_url = url.clone();
        }
        if let Some(key) = &self.api_key {
            settings.api_settings.api_key = key.clone();
        }
        settings
    }
}
