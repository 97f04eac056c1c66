//! Process Configuration
//!
//! Everything the binary reads from the environment (after `.env`).

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use base64::Engine;
use base64::engine::general_purpose;
use identity::IdentityConfig;
use platform::token::TokenSecret;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub identity: IdentityConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            identity: identity_from_env()?,
        })
    }
}

fn identity_from_env() -> anyhow::Result<IdentityConfig> {
    let mut config = match env::var("TOKEN_SECRET") {
        Ok(secret_b64) => {
            let bytes = general_purpose::STANDARD
                .decode(secret_b64.trim())
                .context("TOKEN_SECRET must be base64")?;
            IdentityConfig::with_secret(TokenSecret::new(bytes)?)
        }
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("TOKEN_SECRET not set, using a random development secret");
            IdentityConfig::development()
        }
        Err(_) => bail!("TOKEN_SECRET must be set in production"),
    };

    if let Ok(issuer) = env::var("TOKEN_ISSUER") {
        config.issuer = issuer;
    }
    if let Some(ttl) = secs_from_env("ACCESS_TOKEN_TTL_SECS")? {
        config.access_token_ttl = ttl;
    }
    if let Some(ttl) = secs_from_env("REFRESH_TOKEN_TTL_SECS")? {
        config.refresh_token_ttl = ttl;
    }
    if let Some(timeout) = secs_from_env("REQUEST_TIMEOUT_SECS")? {
        config.request_timeout = (!timeout.is_zero()).then_some(timeout);
    }
    if let Ok(pepper) = env::var("PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }

    config.validate().context("Invalid token lifetimes")?;

    Ok(config)
}

fn secs_from_env(key: &str) -> anyhow::Result<Option<Duration>> {
    match env::var(key) {
        Ok(raw) => {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{key} must be a whole number of seconds"))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}
