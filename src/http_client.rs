use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use once_cell::sync::Lazy;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::USER_AGENT;
use serde_json::Value;

use crate::config::{ClientConfig, Credentials};
use crate::error::FplError;

const BROWSER_UA: &str = "Mozilla/5.0";
const AUTH_COOKIE: &str = "pl_profile";
const LOGIN_APP: &str = "plfpl-web";
const LOGIN_REDIRECT: &str = "https://fantasy.premierleague.com/a/login";

/// Anonymous clients, one per timeout.
static SHARED_CLIENTS: Lazy<Mutex<HashMap<Duration, Client>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn shared_client(timeout: Duration) -> Result<Client> {
    let mut clients = SHARED_CLIENTS
        .lock()
        .map_err(|_| anyhow!("shared http client lock poisoned"))?;
    if let Some(client) = clients.get(&timeout) {
        return Ok(client.clone());
    }
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build http client")?;
    clients.insert(timeout, client.clone());
    Ok(client)
}

/// What the client needs from the network: GET a URL, get JSON back.
pub trait Transport: Send + Sync {
    fn get_json(&self, url: &str) -> Result<Value>;

    /// Whether login-gated resources may be requested.
    fn is_authenticated(&self) -> bool;
}

/// reqwest-backed session. Anonymous sessions share one client per timeout;
/// cookie sessions own theirs so login state is never shared.
pub struct HttpSession {
    client: Client,
    jar: Option<Arc<Jar>>,
    config: ClientConfig,
}

impl HttpSession {
    pub fn anonymous(config: ClientConfig) -> Result<Self> {
        let client = shared_client(config.timeout)?;
        Ok(Self {
            client,
            jar: None,
            config,
        })
    }

    pub fn with_cookies(config: ClientConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(config.timeout)
            .cookie_provider(Arc::clone(&jar))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            client,
            jar: Some(jar),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Logs in with the given credentials; the session cookie lands in the jar.
    pub fn login(&self, credentials: &Credentials) -> Result<()> {
        if self.jar.is_none() {
            return Err(FplError::LoginFailed {
                reason: "session has no cookie store".to_string(),
            }
            .into());
        }
        let form = [
            ("login", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
            ("app", LOGIN_APP),
            ("redirect_uri", LOGIN_REDIRECT),
        ];
        let resp = self
            .client
            .post(&self.config.login_url)
            .header(USER_AGENT, BROWSER_UA)
            .form(&form)
            .send()
            .context("login request failed")?;

        let final_url = resp.url().clone();
        check_login_redirect(&final_url)?;
        info!("logged in as {}", credentials.email);
        Ok(())
    }
}

/// The login endpoint redirects with `state=fail&reason=...` on failure.
pub fn check_login_redirect(url: &Url) -> Result<()> {
    let mut state = None;
    let mut reason = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "state" => state = Some(value.into_owned()),
            "reason" => reason = Some(value.into_owned()),
            _ => {}
        }
    }
    if state.as_deref() == Some("fail") {
        return Err(FplError::LoginFailed {
            reason: reason.unwrap_or_else(|| "unknown".to_string()),
        }
        .into());
    }
    Ok(())
}

impl Transport for HttpSession {
    fn get_json(&self, url: &str) -> Result<Value> {
        debug!("GET {url}");
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_UA)
            .send()
            .with_context(|| format!("request failed: {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FplError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }
        let body = resp.text().context("failed reading body")?;
        parse_json_body(&body).with_context(|| format!("invalid json from {url}"))
    }

    fn is_authenticated(&self) -> bool {
        let Some(jar) = self.jar.as_ref() else {
            return false;
        };
        let Ok(api) = Url::parse(&self.config.api_base) else {
            return false;
        };
        jar.cookies(&api)
            .and_then(|header| header.to_str().ok().map(|s| s.contains(AUTH_COOKIE)))
            .unwrap_or(false)
    }
}

/// Empty bodies and a bare `null` decode as `Value::Null`.
pub fn parse_json_body(raw: &str) -> Result<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Value::Null);
    }
    serde_json::from_str(trimmed).context("invalid json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_login_redirect_carries_reason() {
        let url = Url::parse("https://fantasy.premierleague.com/?state=fail&reason=credentials")
            .expect("valid url");
        let err = check_login_redirect(&url).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FplError>(),
            Some(&FplError::LoginFailed {
                reason: "credentials".to_string()
            })
        );
    }

    #[test]
    fn successful_login_redirect_passes() {
        let url = Url::parse("https://fantasy.premierleague.com/a/login?state=success")
            .expect("valid url");
        assert!(check_login_redirect(&url).is_ok());
    }

    #[test]
    fn anonymous_sessions_share_a_client_per_timeout() {
        let short = Duration::from_secs(3);
        let long = Duration::from_secs(97);
        let config = |timeout| ClientConfig {
            timeout,
            ..ClientConfig::default()
        };
        HttpSession::anonymous(config(short)).expect("session");
        HttpSession::anonymous(config(long)).expect("session");
        HttpSession::anonymous(config(short)).expect("session");

        let clients = SHARED_CLIENTS.lock().expect("lock");
        assert!(clients.contains_key(&short));
        assert!(clients.contains_key(&long));
    }

    #[test]
    fn null_body_is_null_value() {
        assert_eq!(parse_json_body("  null ").expect("parses"), Value::Null);
        assert_eq!(parse_json_body("").expect("parses"), Value::Null);
        assert!(parse_json_body("{oops").is_err());
    }
}
