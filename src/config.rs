use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::duration::parse_lookback;
use crate::error::ConfigError;
use crate::event::is_known_event_type;
use crate::fetch::FetchRequest;
use crate::source::Account;

/// Environment variables consulted, in order, when an account has no token.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GITHUB_API_TOKEN"];

/// Where the YAML config of earlier releases lived. Only named in errors.
pub const LEGACY_CONFIG_PATH: &str = "~/.config/gitfamous/config.yml";

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub users: Vec<UserConfig>,
    #[serde(default)]
    pub default_settings: DefaultSettings,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct UserConfig {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct DefaultSettings {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub since: String,
    #[serde(default)]
    pub filter: Vec<String>,
}

pub fn get_default_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("", "", "gitfamous").ok_or(ConfigError::NoConfigDir)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

impl Config {
    /// Load and validate the config file at `config_path`, or at the default
    /// location when `None`.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(p) => p,
            None => get_default_config_path()?,
        };

        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&contents, &path)?;
        debug!("Loaded {} user(s) from {}", config.users.len(), path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.users.is_empty() {
            return Err(ConfigError::NoAccounts);
        }
        for (i, user) in self.users.iter().enumerate() {
            if user.username.trim().is_empty() {
                return Err(ConfigError::EmptyUsername { index: i + 1 });
            }
        }
        Ok(())
    }

    /// One fetch request per user, in file order, with defaults applied.
    ///
    /// An unparsable `since` leaves that user's lookback unbounded. A user
    /// without any credential fails the whole call.
    pub fn fetch_requests<F>(&self, env: F) -> Result<Vec<FetchRequest>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.validate()?;
        warn_unknown_types(&self.default_settings.filter);

        self.users
            .iter()
            .map(|user| {
                let login = user.username.trim().to_string();
                let token = resolve_token(user.token.as_deref(), &env).ok_or_else(|| {
                    ConfigError::MissingCredential {
                        login: login.clone(),
                    }
                })?;

                let since = user.since.as_deref().unwrap_or(&self.default_settings.since);
                let lookback = lenient_lookback(&login, since);
                let filter = user
                    .filter
                    .clone()
                    .unwrap_or_else(|| self.default_settings.filter.clone());
                if let Some(own) = &user.filter {
                    warn_unknown_types(own);
                }

                Ok(FetchRequest::new(Account::new(login, token))
                    .with_cap(user.count.unwrap_or(self.default_settings.count))
                    .with_lookback(lookback)
                    .with_allowed_types(filter))
            })
            .collect()
    }
}

fn lenient_lookback(login: &str, since: &str) -> Duration {
    if since.trim().is_empty() {
        return Duration::ZERO;
    }
    match parse_lookback(since) {
        Ok(lookback) => lookback,
        Err(err) => {
            warn!("{}: ignoring since setting: {}", login, err);
            Duration::ZERO
        }
    }
}

/// Explicit token first, then [`TOKEN_ENV_VARS`] in order. Blank values are
/// treated as absent.
pub fn resolve_token<F>(explicit: Option<&str>, env: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
        .or_else(|| {
            TOKEN_ENV_VARS
                .iter()
                .filter_map(|name| env(*name))
                .find(|value| !value.trim().is_empty())
        })
}

/// Reads the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Log filter types that are not known GitHub event types. They are still
/// applied as given.
pub fn warn_unknown_types(filter: &[String]) {
    for kind in filter.iter().filter(|k| !is_known_event_type(k)) {
        warn!("Invalid event type in filter: {}", kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const SAMPLE: &str = r#"
[default_settings]
count = 20
since = "1w"
filter = ["PushEvent"]

[[users]]
username = "octocat"
token = "tok-octo"

[[users]]
username = "hubot"
count = 5
since = "bogus"
filter = []
"#;

    #[test]
    fn test_parse_sample() -> Result<()> {
        let config = Config::from_toml(SAMPLE, Path::new("config.toml"))?;
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.default_settings.count, 20);
        assert_eq!(config.users[1].count, Some(5));
        Ok(())
    }

    #[test]
    fn test_fetch_requests_apply_defaults_and_overrides() -> Result<()> {
        let config = Config::from_toml(SAMPLE, Path::new("config.toml"))?;
        let requests = config.fetch_requests(env_of(&[("GITHUB_TOKEN", "tok-env")]))?;

        assert_eq!(requests[0].account, Account::new("octocat", "tok-octo"));
        assert_eq!(requests[0].cap, 20);
        assert_eq!(requests[0].lookback, Duration::from_secs(7 * 86_400));
        assert_eq!(requests[0].allowed_types, vec!["PushEvent".to_string()]);

        assert_eq!(requests[1].account, Account::new("hubot", "tok-env"));
        assert_eq!(requests[1].cap, 5);
        assert_eq!(requests[1].lookback, Duration::ZERO);
        assert!(requests[1].allowed_types.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_credential_is_fatal() -> Result<()> {
        let config = Config::from_toml(SAMPLE, Path::new("config.toml"))?;
        let err = config.fetch_requests(env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { login } if login == "hubot"));
        Ok(())
    }

    #[test]
    fn test_resolve_token_priority() {
        let both = env_of(&[("GITHUB_TOKEN", "first"), ("GITHUB_API_TOKEN", "second")]);
        assert_eq!(resolve_token(Some("explicit"), &both).as_deref(), Some("explicit"));
        assert_eq!(resolve_token(None, &both).as_deref(), Some("first"));
        assert_eq!(resolve_token(Some("  "), &both).as_deref(), Some("first"));

        let fallback = env_of(&[("GITHUB_TOKEN", ""), ("GITHUB_API_TOKEN", "second")]);
        assert_eq!(resolve_token(None, &fallback).as_deref(), Some("second"));
        assert_eq!(resolve_token(None, env_of(&[])), None);
    }

    #[test]
    fn test_no_users_rejected() {
        let err = Config::from_toml("[default_settings]\ncount = 3\n", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NoAccounts));
    }

    #[test]
    fn test_empty_username_rejected() {
        let toml = "[[users]]\nusername = \"a\"\n[[users]]\nusername = \"\"\n";
        let err = Config::from_toml(toml, Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyUsername { index: 2 }));
    }

    #[test]
    fn test_load_missing_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("absent.toml");
        let err = Config::load(Some(path.clone())).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(&path.display().to_string()));
        assert!(message.contains(LEGACY_CONFIG_PATH));
        assert!(matches!(err, ConfigError::NotFound { path: p } if p == path));
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, SAMPLE)?;
        let config = Config::load(Some(path))?;
        assert_eq!(config.users[0].username, "octocat");
        Ok(())
    }

    #[test]
    fn test_serialization_roundtrip() -> Result<()> {
        let config = Config::from_toml(SAMPLE, Path::new("config.toml"))?;
        let text = toml::to_string_pretty(&config)?;
        assert_eq!(Config::from_toml(&text, Path::new("config.toml"))?, config);
        Ok(())
    }

    #[test]
    fn test_get_default_config_path() -> Result<()> {
        let path = get_default_config_path()?;
        assert!(path.ends_with("config.toml"));
        Ok(())
    }
}
