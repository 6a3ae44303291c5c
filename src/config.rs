use std::env;

use crate::errors::AppError;

/// Runtime settings read from the process environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub admin_email: String,
    /// Admin login is disabled when this is `None`.
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::ConfigError("JWT_SECRET must be set".to_owned()))?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| AppError::ConfigError(format!("invalid PORT {raw:?}: {e}")))?,
            None => 8080,
        };

        let token_ttl_hours = match lookup("TOKEN_TTL_HOURS") {
            Some(raw) => raw.parse::<i64>().ok().filter(|h| *h > 0).ok_or_else(|| {
                AppError::ConfigError(format!("invalid TOKEN_TTL_HOURS {raw:?}"))
            })?,
            None => 24,
        };

        Ok(Config {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://parkspot.db".to_owned()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port,
            jwt_secret,
            token_ttl_hours,
            admin_email: lookup("ADMIN_EMAIL")
                .map(|e| e.to_lowercase())
                .unwrap_or_else(|| "admin@parkspot.local".to_owned()),
            admin_password: lookup("ADMIN_PASSWORD").filter(|p| !p.is_empty()),
        })
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = Config::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.database_url, "sqlite://parkspot.db");
        assert_eq!(config.bind_addr(), ("0.0.0.0".to_owned(), 8080));
        assert_eq!(config.token_ttl_hours, 24);
        assert!(config.admin_password.is_none());
    }

    #[test]
    fn missing_secret_is_fatal() {
        assert!(matches!(
            Config::from_lookup(lookup_from(&[])),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn bad_port_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("JWT_SECRET", "x"), ("PORT", "http")]));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
