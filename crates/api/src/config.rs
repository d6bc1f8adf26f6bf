use std::str::FromStr;

use axum::http::HeaderValue;
use critica_core::confirmation::DEFAULT_MAX_AGE_SECS;

use crate::auth::jwt::JwtConfig;

/// Error raised while loading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Read a required, non-empty variable.
pub(crate) fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Read and parse an optional variable, falling back to `default`.
pub(crate) fn parsed_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

/// Secret and lifetime used for confirmation codes.
#[derive(Debug, Clone)]
pub struct ConfirmationConfig {
    pub secret: String,
    pub max_age_secs: i64,
}

/// Account created or promoted to admin at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    pub confirmation: ConfirmationConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                    |
    /// |-----------------------------|----------------------------|
    /// | `HOST`                      | `0.0.0.0`                  |
    /// | `PORT`                      | `3000`                     |
    /// | `CORS_ORIGINS`              | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                       |
    /// | `CONFIRMATION_SECRET`       | value of `JWT_SECRET`      |
    /// | `CONFIRMATION_MAX_AGE_SECS` | `259200` (3 days)          |
    /// | `ADMIN_USERNAME`            | unset                      |
    /// | `ADMIN_EMAIL`               | unset                      |
    ///
    /// See [`JwtConfig::from_lookup`] for the JWT variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ServerConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parsed_or(&lookup, "PORT", 3000u16)?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|_| ConfigError::Invalid {
                    name: "CORS_ORIGINS",
                    value: origin.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request_timeout_secs = parsed_or(&lookup, "REQUEST_TIMEOUT_SECS", 30u64)?;

        let jwt = JwtConfig::from_lookup(&lookup)?;

        let confirmation = ConfirmationConfig {
            secret: lookup("CONFIRMATION_SECRET")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| jwt.secret.clone()),
            max_age_secs: parsed_or(&lookup, "CONFIRMATION_MAX_AGE_SECS", DEFAULT_MAX_AGE_SECS)?,
        };

        let bootstrap_admin = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_EMAIL")) {
            (Some(username), Some(email)) => Some(BootstrapAdmin { username, email }),
            (Some(_), None) => return Err(ConfigError::Missing("ADMIN_EMAIL")),
            (None, Some(_)) => return Err(ConfigError::Missing("ADMIN_USERNAME")),
            (None, None) => None,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            confirmation,
            bootstrap_admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_with_only_jwt_secret() {
        let config = load(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.cors_origins.len(), 1);
        assert_eq!(config.confirmation.secret, "s3cret");
        assert_eq!(config.confirmation.max_age_secs, DEFAULT_MAX_AGE_SECS);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn missing_jwt_secret_is_an_error() {
        assert_matches!(load(&[]), Err(ConfigError::Missing("JWT_SECRET")));
        assert_matches!(
            load(&[("JWT_SECRET", "")]),
            Err(ConfigError::Missing("JWT_SECRET"))
        );
    }

    #[test]
    fn unparsable_port_is_an_error() {
        let err = load(&[("JWT_SECRET", "s"), ("PORT", "eighty")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "PORT", .. });
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = load(&[
            ("JWT_SECRET", "s"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
        ])
        .unwrap();
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn confirmation_secret_can_be_separate() {
        let config = load(&[("JWT_SECRET", "a"), ("CONFIRMATION_SECRET", "b")]).unwrap();
        assert_eq!(config.confirmation.secret, "b");
    }

    #[test]
    fn bootstrap_admin_needs_both_variables() {
        let config = load(&[
            ("JWT_SECRET", "s"),
            ("ADMIN_USERNAME", "root"),
            ("ADMIN_EMAIL", "root@example.com"),
        ])
        .unwrap();
        assert_eq!(
            config.bootstrap_admin,
            Some(BootstrapAdmin {
                username: "root".into(),
                email: "root@example.com".into(),
            })
        );

        let err = load(&[("JWT_SECRET", "s"), ("ADMIN_USERNAME", "root")]).unwrap_err();
        assert_matches!(err, ConfigError::Missing("ADMIN_EMAIL"));
    }
}
