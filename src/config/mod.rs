//! Runtime configuration for the bot.
//!
//! Everything is read from environment variables with defaults suitable for a
//! local run. The binary loads a `.env` file first, so the same names work
//! there too. The section table itself is static and lives in [`sections`].

pub mod sections;

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub use sections::{SECTIONS, SectionDef};

pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_API_TOKEN";
pub const ENV_TELEGRAM_API_URL: &str = "TELEGRAM_API_URL";
pub const ENV_CACHE_PATH: &str = "QUESTIONS_CACHE_PATH";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_FETCH_MAX_RETRIES: &str = "FETCH_MAX_RETRIES";
pub const ENV_FETCH_BACKOFF_SECS: &str = "FETCH_BACKOFF_SECS";
pub const ENV_FETCH_CONCURRENCY: &str = "FETCH_CONCURRENCY";

const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_CACHE_PATH: &str = "data/questions.json";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FETCH_MAX_RETRIES: u32 = 3;
const DEFAULT_FETCH_BACKOFF_SECS: u64 = 1;
const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Settings for page fetching, shared by the fetcher and the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Whole-request timeout for a single attempt.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Backoff factor: the n-th retry waits `backoff * 2^(n-1)`.
    pub backoff: Duration,
    /// Upper bound on sections fetched at the same time.
    pub concurrency: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_retries: DEFAULT_FETCH_MAX_RETRIES,
            backoff: Duration::from_secs(DEFAULT_FETCH_BACKOFF_SECS),
            concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    telegram_token: Option<String>,
    telegram_api_url: String,
    cache_path: PathBuf,
    fetch: FetchSettings,
}

impl Config {
    /// Load from environment variables, falling back to defaults.
    ///
    /// The Telegram token is optional here; [`Config::telegram_token`]
    /// reports it missing when the bot actually needs it.
    pub fn from_env() -> Result<Self, ConfigError> {
        let telegram_token = env::var(ENV_TELEGRAM_TOKEN)
            .ok()
            .filter(|token| !token.trim().is_empty());
        let telegram_api_url = env::var(ENV_TELEGRAM_API_URL)
            .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let cache_path = env::var(ENV_CACHE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_PATH));

        let concurrency: usize = parse_var(ENV_FETCH_CONCURRENCY, DEFAULT_FETCH_CONCURRENCY)?;
        if concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: ENV_FETCH_CONCURRENCY,
                reason: "must be at least 1".to_string(),
            });
        }

        let fetch = FetchSettings {
            timeout: Duration::from_secs(parse_var(
                ENV_FETCH_TIMEOUT_SECS,
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
            max_retries: parse_var(ENV_FETCH_MAX_RETRIES, DEFAULT_FETCH_MAX_RETRIES)?,
            backoff: Duration::from_secs(parse_var(
                ENV_FETCH_BACKOFF_SECS,
                DEFAULT_FETCH_BACKOFF_SECS,
            )?),
            concurrency,
        };

        Ok(Self {
            telegram_token,
            telegram_api_url,
            cache_path,
            fetch,
        })
    }

    /// Bot API token, required only when actually talking to Telegram.
    pub fn telegram_token(&self) -> Result<&str, ConfigError> {
        self.telegram_token
            .as_deref()
            .ok_or(ConfigError::Missing(ENV_TELEGRAM_TOKEN))
    }

    pub fn telegram_api_url(&self) -> &str {
        &self.telegram_api_url
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn fetch(&self) -> &FetchSettings {
        &self.fetch
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: name,
            reason: format!("cannot parse {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set; put it in the environment or a .env file")]
    Missing(&'static str),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests below mutate the process environment.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [
            ENV_TELEGRAM_TOKEN,
            ENV_TELEGRAM_API_URL,
            ENV_CACHE_PATH,
            ENV_FETCH_TIMEOUT_SECS,
            ENV_FETCH_MAX_RETRIES,
            ENV_FETCH_BACKOFF_SECS,
            ENV_FETCH_CONCURRENCY,
        ] {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn defaults_when_env_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.cache_path(), Path::new(DEFAULT_CACHE_PATH));
        assert_eq!(cfg.telegram_api_url(), DEFAULT_TELEGRAM_API_URL);
        assert_eq!(cfg.fetch(), &FetchSettings::default());
        assert_eq!(
            cfg.telegram_token(),
            Err(ConfigError::Missing(ENV_TELEGRAM_TOKEN))
        );
    }

    #[test]
    fn overrides_when_env_present() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_TELEGRAM_TOKEN, "123:abc");
            env::set_var(ENV_TELEGRAM_API_URL, "http://localhost:8081/");
            env::set_var(ENV_CACHE_PATH, "/tmp/q.json");
            env::set_var(ENV_FETCH_TIMEOUT_SECS, "3");
            env::set_var(ENV_FETCH_MAX_RETRIES, "0");
            env::set_var(ENV_FETCH_CONCURRENCY, "1");
        }
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.telegram_token(), Ok("123:abc"));
        assert_eq!(cfg.telegram_api_url(), "http://localhost:8081");
        assert_eq!(cfg.cache_path(), Path::new("/tmp/q.json"));
        assert_eq!(cfg.fetch().timeout, Duration::from_secs(3));
        assert_eq!(cfg.fetch().max_retries, 0);
        assert_eq!(cfg.fetch().concurrency, 1);
        clear_env();
    }

    #[test]
    fn rejects_unparseable_numbers() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_FETCH_TIMEOUT_SECS, "ten");
        }
        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: ENV_FETCH_TIMEOUT_SECS,
                ..
            }
        ));
        clear_env();
    }

    #[test]
    fn rejects_zero_concurrency() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_FETCH_CONCURRENCY, "0");
        }
        assert!(Config::from_env().is_err());
        clear_env();
    }
}
