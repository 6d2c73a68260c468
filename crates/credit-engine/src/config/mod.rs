use std::env;
use std::fmt;
use std::net::{AddrParseError, IpAddr, Ipv4Addr, SocketAddr};

use crate::scoring::utilization::DEFAULT_TARGET_PERCENT;
use crate::scoring::RevokedConsentPolicy;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Deployment stage, read from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Everything the service reads from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Loads `.env` when present, then reads process variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: var("APP_ENV").map_or(AppEnvironment::Development, |value| {
                AppEnvironment::parse(&value)
            }),
            server: ServerConfig::from_env()?,
            telemetry: TelemetryConfig {
                log_level: var("APP_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            },
            engine: EngineConfig::from_env()?,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let port = match var("APP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    /// `localhost` binds to the IPv4 loopback; anything else must be a literal address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse::<IpAddr>()
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
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub log_level: String,
}

/// Scoring defaults applied when a request leaves them out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub revoked_consent: RevokedConsentPolicy,
    pub utilization_target: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            revoked_consent: RevokedConsentPolicy::Include,
            utilization_target: DEFAULT_TARGET_PERCENT,
        }
    }
}

impl EngineConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = var("CREDIT_REVOKED_CONSENT") {
            config.revoked_consent = match value.trim().to_ascii_lowercase().as_str() {
                "include" => RevokedConsentPolicy::Include,
                "exclude" => RevokedConsentPolicy::Exclude,
                _ => return Err(ConfigError::InvalidConsentPolicy(value)),
            };
        }

        if let Some(value) = var("CREDIT_UTILIZATION_TARGET") {
            config.utilization_target = value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|target| (0.0..=100.0).contains(target))
                .ok_or(ConfigError::InvalidUtilizationTarget(value))?;
        }

        Ok(config)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort(String),
    InvalidHost {
        host: String,
        source: AddrParseError,
    },
    InvalidConsentPolicy(String),
    InvalidUtilizationTarget(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort(value) => {
                write!(f, "APP_PORT must be a port number, got '{}'", value)
            }
            ConfigError::InvalidHost { host, .. } => write!(
                f,
                "APP_HOST must be `localhost` or an IP address, got '{}'",
                host
            ),
            ConfigError::InvalidConsentPolicy(value) => write!(
                f,
                "CREDIT_REVOKED_CONSENT must be `include` or `exclude`, got '{}'",
                value
            ),
            ConfigError::InvalidUtilizationTarget(value) => write!(
                f,
                "CREDIT_UTILIZATION_TARGET must be a number between 0 and 100, got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source, .. } => Some(source),
            _ => None,
        }
    }
}
