use std::env;

#[derive(Debug, Clone)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_read_per_second: u64,
    pub rate_limit_read_burst: u32,
    pub rate_limit_write_per_second: u64,
    pub rate_limit_write_burst: u32,

    // Caching
    pub cache_ttl_seconds: u64,
    pub cache_max_bytes: u64,

    // Logging
    pub log_format: LogFormat,

    // Application metadata
    pub deployment: Deployment,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://invernaderos.db?mode=rwc".to_string(),
            api_host: "0.0.0.0".to_string(),
            api_port: 3000,
            disable_rate_limiting: false,
            rate_limit_read_per_second: 10,
            rate_limit_read_burst: 60,
            rate_limit_write_per_second: 1,
            rate_limit_write_burst: 20,
            cache_ttl_seconds: 300,
            cache_max_bytes: 16_777_216, // 16MB
            log_format: LogFormat::Text,
            deployment: Deployment::Local,
        }
    }
}

/// Read an environment variable and parse it, keeping `default` when the
/// variable is unset or does not parse.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// Every setting has a default; the database lives in `invernaderos.db`
    /// in the working directory unless `DATABASE_URL` says otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `DATABASE_URL` is not a SQLite URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        if !database_url.starts_with("sqlite:") {
            return Err(ConfigError::Invalid(
                "DATABASE_URL",
                format!("expected a sqlite: URL, got '{database_url}'"),
            ));
        }

        Ok(Self {
            database_url,

            // API settings
            api_host: env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port: env_or("API_PORT", defaults.api_port),

            // Rate limiting
            disable_rate_limiting: env_or("DISABLE_RATE_LIMITING", defaults.disable_rate_limiting),
            rate_limit_read_per_second: env_or(
                "RATE_LIMIT_READ_PER_SECOND",
                defaults.rate_limit_read_per_second,
            ),
            rate_limit_read_burst: env_or("RATE_LIMIT_READ_BURST", defaults.rate_limit_read_burst),
            rate_limit_write_per_second: env_or(
                "RATE_LIMIT_WRITE_PER_SECOND",
                defaults.rate_limit_write_per_second,
            ),
            rate_limit_write_burst: env_or("RATE_LIMIT_WRITE_BURST", defaults.rate_limit_write_burst),

            // Caching
            cache_ttl_seconds: env_or("CACHE_TTL_SECONDS", defaults.cache_ttl_seconds),
            cache_max_bytes: env_or("CACHE_MAX_BYTES", defaults.cache_max_bytes),

            // Logging
            log_format: LogFormat::from_str(
                &env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            ),

            // Application metadata
            deployment: Deployment::from_str(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
