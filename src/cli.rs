use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{resolve_token, warn_unknown_types};
use crate::duration::parse_lookback;
use crate::error::ConfigError;
use crate::fetch::FetchRequest;
use crate::source::Account;

#[derive(Parser, Debug, PartialEq, Default)]
#[command(name = "gitfamous")]
#[command(about = "Browse recent public GitHub activity for one or more users")]
pub struct CliArgs {
    /// GitHub username to show. Without one, every user in the config file gets a tab
    pub username: Option<String>,

    /// GitHub API token (falls back to GITHUB_TOKEN, then GITHUB_API_TOKEN)
    #[arg(short = 't', long = "api")]
    pub token: Option<String>,

    /// Maximum number of events to show, 0 for no limit
    #[arg(short, long, default_value_t = 0)]
    pub count: usize,

    /// Only show events newer than this, e.g. 30m, 12h, 2d, 1w
    #[arg(short, long)]
    pub since: Option<String>,

    /// Comma separated event types to keep, e.g. PushEvent,WatchEvent
    #[arg(short, long, value_delimiter = ',')]
    pub filter: Vec<String>,

    /// Log debug output to stderr
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// The request for single-user mode, or `None` when no username was given.
    ///
    /// Unlike config entries, a malformed `--since` here is an error.
    pub fn single_request<F>(&self, env: F) -> Result<Option<FetchRequest>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(login) = self.username.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if login.is_empty() {
            return Err(ConfigError::EmptyUsername { index: 1 });
        }

        let token = resolve_token(self.token.as_deref(), env).ok_or_else(|| {
            ConfigError::MissingCredential {
                login: login.to_string(),
            }
        })?;

        let lookback = match self.since.as_deref() {
            Some(since) => parse_lookback(since)?,
            None => Duration::ZERO,
        };

        let filter: Vec<String> = self
            .filter
            .iter()
            .map(|kind| kind.trim().to_string())
            .filter(|kind| !kind.is_empty())
            .collect();
        warn_unknown_types(&filter);

        Ok(Some(
            FetchRequest::new(Account::new(login, token))
                .with_cap(self.count)
                .with_lookback(lookback)
                .with_allowed_types(filter),
        ))
    }
}
