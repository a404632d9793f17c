//! Support for library configuration options

use std::path::PathBuf;

use once_cell::sync::Lazy;
use url::Url;

use crate::error::TodoResult;

/// Environment variable that overrides the server URL
pub const API_URL_VAR: &str = "DAILY_TODOS_API_URL";
/// Environment variable that overrides the session file location
pub const SESSION_FILE_VAR: &str = "DAILY_TODOS_SESSION_FILE";

/// The server URL used when nothing else is configured
pub static DEFAULT_API_URL: Lazy<Url> = Lazy::new(|| Url::parse("http://localhost:8080").unwrap(/* this is a valid URL */));

/// Where the session is stored when nothing else is configured
pub static DEFAULT_SESSION_FILE: Lazy<PathBuf> = Lazy::new(|| PathBuf::from("daily-todos-session.json"));

/// Where to find the server, and where to remember who is logged in
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_url: Url,
    pub session_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.clone(),
            session_file: DEFAULT_SESSION_FILE.clone(),
        }
    }
}

impl Config {
    /// Read the configuration from the environment, falling back to defaults
    pub fn from_env() -> TodoResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> TodoResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(API_URL_VAR).filter(|s| s.trim().is_empty() == false) {
            config.api_url = Url::parse(url.trim())?;
        }
        if let Some(path) = lookup(SESSION_FILE_VAR).filter(|s| s.trim().is_empty() == false) {
            config.session_file = PathBuf::from(path);
        }
        log::debug!("Using server {} and session file {:?}", config.api_url, config.session_file);
        Ok(config)
    }
}
