//! Process settings loaded from `WARDEN_*` environment variables.

use serde::Deserialize;
use warden_auth::config::AuthConfig;
use warden_db::DbConfig;

const PREFIX: &str = "WARDEN_";

/// Everything the binary needs to wire the services together.
///
/// Only `WARDEN_JWT_SECRET` is required; every other field falls back to
/// the defaults of [`AuthConfig`] and [`DbConfig`].
#[derive(Deserialize)]
pub struct Settings {
    pub jwt_secret: String,
    #[serde(default)]
    pub token_ttl_secs: Option<u64>,
    #[serde(default)]
    pub jwt_issuer: Option<String>,
    #[serde(default)]
    pub pepper: Option<String>,
    #[serde(default)]
    pub min_password_length: Option<usize>,

    #[serde(default)]
    pub db_url: Option<String>,
    #[serde(default)]
    pub db_namespace: Option<String>,
    #[serde(default)]
    pub db_database: Option<String>,
    #[serde(default)]
    pub db_username: Option<String>,
    #[serde(default)]
    pub db_password: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, envy::Error> {
        Self::from_vars(std::env::vars())
    }

    /// Load from an explicit set of variables; only `WARDEN_*` names are
    /// read.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(PREFIX).from_iter(vars)
    }

    pub fn auth_config(&self) -> AuthConfig {
        let defaults = AuthConfig::default();
        AuthConfig {
            jwt_secret: self.jwt_secret.clone(),
            access_token_lifetime_secs: self
                .token_ttl_secs
                .unwrap_or(defaults.access_token_lifetime_secs),
            jwt_issuer: self.jwt_issuer.clone().unwrap_or(defaults.jwt_issuer),
            pepper: self.pepper.clone().filter(|p| !p.is_empty()),
            min_password_length: self
                .min_password_length
                .unwrap_or(defaults.min_password_length),
        }
    }

    pub fn db_config(&self) -> DbConfig {
        let defaults = DbConfig::default();
        DbConfig {
            url: self.db_url.clone().unwrap_or(defaults.url),
            namespace: self.db_namespace.clone().unwrap_or(defaults.namespace),
            database: self.db_database.clone().unwrap_or(defaults.database),
            username: self.db_username.clone().unwrap_or(defaults.username),
            password: self.db_password.clone().unwrap_or(defaults.password),
        }
    }
}
