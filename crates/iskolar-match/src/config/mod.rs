use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub matching: MatchingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format =
            LogFormat::from_str(&env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()));

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            matching: MatchingConfig::load()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Log line rendering for the fmt subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "full" => Self::Pretty,
            _ => Self::Compact,
        }
    }
}

/// Policy knobs for the matching and prediction engine.
///
/// Every field has a documented default so the engine is usable with no
/// environment at all; overrides come from `MATCH_*` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingConfig {
    /// Lower bound applied to every reported approval probability.
    pub probability_floor: f64,
    /// Upper bound applied to every reported approval probability.
    pub probability_ceiling: f64,
    /// Labeled decisions required before a scope may train.
    pub min_training_samples: usize,
    /// Gradient-descent step size.
    pub learning_rate: f64,
    /// Hard cap on gradient-descent iterations.
    pub max_iterations: usize,
    /// L2 regularization strength applied to weights (not the bias).
    pub l2_penalty: f64,
    /// Early-stop threshold on the absolute loss delta between iterations.
    pub convergence_threshold: f64,
    /// Seconds a resolved weight set stays cached per scope.
    pub cache_ttl_seconds: i64,
    /// A global retrain is scheduled every this many recorded decisions.
    pub global_refresh_every: u64,
    /// Income ceiling assumed when a scholarship declares none.
    pub income_fallback_ceiling: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            probability_floor: 0.05,
            probability_ceiling: 0.95,
            min_training_samples: 10,
            learning_rate: 0.1,
            max_iterations: 500,
            l2_penalty: 0.01,
            convergence_threshold: 1e-6,
            cache_ttl_seconds: 600,
            global_refresh_every: 25,
            income_fallback_ceiling: 500_000.0,
        }
    }
}

impl MatchingConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            probability_floor: env_f64("MATCH_PROB_FLOOR", defaults.probability_floor)?,
            probability_ceiling: env_f64("MATCH_PROB_CEILING", defaults.probability_ceiling)?,
            min_training_samples: env_usize("MATCH_MIN_SAMPLES", defaults.min_training_samples)?,
            learning_rate: env_f64("MATCH_LEARNING_RATE", defaults.learning_rate)?,
            max_iterations: env_usize("MATCH_MAX_ITERATIONS", defaults.max_iterations)?,
            l2_penalty: env_f64("MATCH_L2_PENALTY", defaults.l2_penalty)?,
            convergence_threshold: env_f64(
                "MATCH_CONVERGENCE_THRESHOLD",
                defaults.convergence_threshold,
            )?,
            cache_ttl_seconds: env_i64("MATCH_CACHE_TTL_SECONDS", defaults.cache_ttl_seconds)?,
            global_refresh_every: env_u64(
                "MATCH_GLOBAL_REFRESH_EVERY",
                defaults.global_refresh_every,
            )?,
            income_fallback_ceiling: env_f64(
                "MATCH_INCOME_FALLBACK_CEILING",
                defaults.income_fallback_ceiling,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.probability_floor)
            || !(0.0..=1.0).contains(&self.probability_ceiling)
            || self.probability_floor >= self.probability_ceiling
        {
            return Err(ConfigError::InvalidProbabilityWindow {
                floor: self.probability_floor,
                ceiling: self.probability_ceiling,
            });
        }

        if self.global_refresh_every == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "MATCH_GLOBAL_REFRESH_EVERY",
            });
        }

        if self.learning_rate <= 0.0 || !self.learning_rate.is_finite() {
            return Err(ConfigError::InvalidNumber {
                key: "MATCH_LEARNING_RATE",
            });
        }

        if self.income_fallback_ceiling <= 0.0 || !self.income_fallback_ceiling.is_finite() {
            return Err(ConfigError::InvalidNumber {
                key: "MATCH_INCOME_FALLBACK_CEILING",
            });
        }

        Ok(())
    }
}

fn env_f64(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

fn env_usize(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

fn env_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

fn env_i64(key: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
    InvalidProbabilityWindow { floor: f64, ceiling: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a finite number in its documented range")
            }
            ConfigError::InvalidProbabilityWindow { floor, ceiling } => write!(
                f,
                "probability window [{floor}, {ceiling}] must satisfy 0 <= floor < ceiling <= 1"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
