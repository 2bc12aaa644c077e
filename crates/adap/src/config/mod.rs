//! Environment-driven settings for the evaluation service.
//!
//! Values come from the process environment after an optional `.env` file is
//! merged in. Blank variables count as unset.

use std::env;
use std::fmt;
use std::net::{AddrParseError, IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use chrono::Duration;

/// Signing secret used outside production when `APP_TOKEN_SECRET` is unset.
const DEVELOPMENT_TOKEN_SECRET: &str = "adap-development-secret-do-not-deploy";
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
/// Thirty days.
const MAX_TOKEN_TTL_MINUTES: i64 = 43_200;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    /// Unrecognised labels fall back to development.
    fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = setting("APP_ENV")
            .map(|label| AppEnvironment::from_label(&label))
            .unwrap_or(AppEnvironment::Development);

        Ok(Self {
            environment,
            server: ServerConfig::from_env()?,
            telemetry: TelemetryConfig {
                log_level: setting("APP_LOG_LEVEL")
                    .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            },
            auth: AuthConfig::from_env(environment)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let port = parsed_setting("APP_PORT", DEFAULT_PORT, |value| {
            ConfigError::InvalidPort { value }
        })?;
        Ok(Self {
            host: setting("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    /// `localhost` is accepted as an alias for the IPv4 loopback.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse()
                .map_err(|source| ConfigError::InvalidHost {
                    host: self.host.clone(),
                    source,
                })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is absent.
    pub log_level: String,
}

/// Bearer token signing settings.
#[derive(Clone)]
pub struct AuthConfig {
    pub token_secret: String,
    pub token_ttl_minutes: i64,
}

impl AuthConfig {
    fn from_env(environment: AppEnvironment) -> Result<Self, ConfigError> {
        let token_secret = match setting("APP_TOKEN_SECRET") {
            Some(secret) => secret,
            None if environment.is_production() => return Err(ConfigError::MissingTokenSecret),
            None => DEVELOPMENT_TOKEN_SECRET.to_string(),
        };
        let token_ttl_minutes = parsed_setting(
            "APP_TOKEN_TTL_MINUTES",
            DEFAULT_TOKEN_TTL_MINUTES,
            |value| ConfigError::InvalidTokenTtl { value },
        )?;
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&token_ttl_minutes) {
            return Err(ConfigError::InvalidTokenTtl {
                value: token_ttl_minutes.to_string(),
            });
        }

        Ok(Self {
            token_secret,
            token_ttl_minutes,
        })
    }

    /// Values outside the accepted range are clamped into it.
    pub fn token_ttl(&self) -> Duration {
        Duration::minutes(self.token_ttl_minutes.clamp(1, MAX_TOKEN_TTL_MINUTES))
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT `{value}` is not a port number")]
    InvalidPort { value: String },
    #[error("APP_HOST `{host}` is neither `localhost` nor an IP address")]
    InvalidHost {
        host: String,
        #[source]
        source: AddrParseError,
    },
    #[error("APP_TOKEN_SECRET is required when APP_ENV is production")]
    MissingTokenSecret,
    #[error("APP_TOKEN_TTL_MINUTES `{value}` must be a whole number of minutes between 1 and 43200")]
    InvalidTokenTtl { value: String },
}

fn setting(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed_setting<T: FromStr>(
    key: &str,
    default: T,
    invalid: impl FnOnce(String) -> ConfigError,
) -> Result<T, ConfigError> {
    match setting(key) {
        Some(raw) => raw.parse().map_err(|_| invalid(raw)),
        None => Ok(default),
    }
}
