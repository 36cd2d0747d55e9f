use std::env;
use std::time::Duration;

use anyhow::Result;

use crate::error::FplError;

pub const DEFAULT_API_BASE: &str = "https://fantasy.premierleague.com/api/";
pub const DEFAULT_LOGIN_URL: &str = "https://users.premierleague.com/accounts/login/";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FETCH_PARALLELISM: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub login_url: String,
    pub timeout: Duration,
    pub fetch_parallelism: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fetch_parallelism: DEFAULT_FETCH_PARALLELISM,
        }
    }
}

impl ClientConfig {
    /// Reads overrides from the process environment. Call [`load_dotenv`]
    /// first if `.env` files should be honoured.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_base = env_string("FPL_API_BASE")
            .map(with_trailing_slash)
            .unwrap_or(defaults.api_base);
        let login_url = env_string("FPL_LOGIN_URL").unwrap_or(defaults.login_url);
        let timeout_secs = env::var("FPL_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);
        let fetch_parallelism = env::var("FPL_FETCH_PARALLELISM")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_FETCH_PARALLELISM)
            .clamp(2, 32);
        Self {
            api_base,
            login_url,
            timeout: Duration::from_secs(timeout_secs),
            fetch_parallelism,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let email = email.into();
        let password = password.into();
        if email.trim().is_empty() || password.is_empty() {
            return Err(FplError::MissingCredentials.into());
        }
        Ok(Self { email, password })
    }

    pub fn from_env() -> Result<Self> {
        let email = env_string("FPL_EMAIL").unwrap_or_default();
        let password = env_string("FPL_PASSWORD").unwrap_or_default();
        Self::new(email, password)
    }
}

/// Loads `.env.local` then `.env`; missing files are ignored.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

fn with_trailing_slash(mut base: String) -> String {
    if !base.ends_with('/') {
        base.push('/');
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_credentials_are_rejected() {
        let err = Credentials::new("", "secret").unwrap_err();
        assert_eq!(
            err.downcast_ref::<FplError>(),
            Some(&FplError::MissingCredentials)
        );
        assert!(Credentials::new("a@b.c", "").is_err());
        assert!(Credentials::new("a@b.c", "pw").is_ok());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("a@b.c", "hunter2").expect("valid");
        let shown = format!("{creds:?}");
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("a@b.c"));
    }

    #[test]
    fn base_gets_trailing_slash() {
        assert_eq!(with_trailing_slash("http://x/api".into()), "http://x/api/");
        assert_eq!(with_trailing_slash("http://x/api/".into()), "http://x/api/");
    }
}
