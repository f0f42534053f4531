use std::env;
use std::fmt;

/// Secret used when `JWT_SECRET` is unset. Only acceptable in development.
pub const DEFAULT_JWT_SECRET: &str = "your_jwt_secret_key";

/// Shortest signing secret accepted outside development.
const MIN_SECRET_LEN: usize = 32;

const DEFAULT_BCRYPT_COST: u32 = 10;

/// Work factors bcrypt accepts.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    Invalid { key: &'static str, value: String },
    /// The signing secret is the built-in default or too short for this environment.
    InsecureSecret,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has an invalid value: {:?}", key, value)
            }
            ConfigError::InsecureSecret => write!(
                f,
                "JWT_SECRET must be set to at least {} characters outside development",
                MIN_SECRET_LEN
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub environment: Environment,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source and validates it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            None | Some("development") | Some("dev") => Environment::Development,
            Some("production") | Some("prod") => Environment::Production,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "APP_ENV",
                    value: other.to_string(),
                })
            }
        };

        let config = Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", &lookup, 5)?,
            server_port: parse_or("SERVER_PORT", &lookup, 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret: lookup("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            environment,
            bcrypt_cost: parse_or("BCRYPT_COST", &lookup, DEFAULT_BCRYPT_COST)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that must never reach a production deployment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !BCRYPT_COST_RANGE.contains(&self.bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: self.bcrypt_cost.to_string(),
            });
        }

        let insecure =
            self.jwt_secret == DEFAULT_JWT_SECRET || self.jwt_secret.len() < MIN_SECRET_LEN;
        match self.environment {
            Environment::Production if insecure => Err(ConfigError::InsecureSecret),
            Environment::Development if insecure => {
                log::warn!("JWT_SECRET is unset or weak; acceptable for development only");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T, F>(key: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("BCRYPT_COST", "12"),
        ]))
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://test"));
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.bcrypt_cost, 12);
    }

    #[test]
    fn test_production_rejects_default_secret() {
        let result = Config::from_lookup(lookup_from(&[("APP_ENV", "production")]));
        assert_eq!(result.unwrap_err(), ConfigError::InsecureSecret);

        let result = Config::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("JWT_SECRET", "short"),
        ]));
        assert_eq!(result.unwrap_err(), ConfigError::InsecureSecret);
    }

    #[test]
    fn test_production_accepts_strong_secret() {
        let secret = "k".repeat(48);
        let config = Config::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("JWT_SECRET", secret.as_str()),
        ]))
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let result = Config::from_lookup(lookup_from(&[("SERVER_PORT", "eighty")]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "SERVER_PORT", .. })
        ));

        let result = Config::from_lookup(lookup_from(&[("BCRYPT_COST", "2")]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "BCRYPT_COST", .. })
        ));

        let result = Config::from_lookup(lookup_from(&[("APP_ENV", "staging")]));
        assert!(matches!(result, Err(ConfigError::Invalid { key: "APP_ENV", .. })));
    }
}
