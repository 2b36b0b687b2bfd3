/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, or `*` (default: *)
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 characters)
/// - `JWT_TTL_HOURS`: Token lifetime, 1 to 8760 (default: 24)
/// - `ALLOW_ADMIN_REGISTRATION`: Whether `role: admin` is honored at registration (default: true)
/// - `MAIL_RELAY_URL`: Mail relay endpoint; unset disables assignment emails
/// - `MAIL_RELAY_TOKEN`: Bearer token for the relay
/// - `MAIL_FROM`: Sender address (default: `Task Management System <no-reply@taskdesk.local>`)
/// - `MAIL_TIMEOUT_SECONDS`: Relay request timeout (default: 10)
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
/// - `RUST_LOG`: Log filter (default: taskdesk_api=debug,taskdesk_shared=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use taskdesk_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use taskdesk_shared::db::pool::PoolConfig;
use taskdesk_shared::notify::relay::RelayConfig;
use taskdesk_shared::services::identity::IdentityConfig;

/// Default sender for assignment emails
pub const DEFAULT_MAIL_FROM: &str = "Task Management System <no-reply@taskdesk.local>";

/// Longest accepted token lifetime (one year)
pub const MAX_TTL_HOURS: i64 = 24 * 365;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Mail relay configuration
    pub mail: MailConfig,

    /// Log output format
    pub log_format: LogFormat,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` means any)
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,

    /// Whether a registration may claim the admin role
    pub allow_admin_registration: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Token lifetime in hours
    pub ttl_hours: i64,
}

/// Mail relay configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Relay endpoint; `None` disables assignment emails
    pub relay_url: Option<String>,

    /// Optional bearer token for the relay
    pub relay_token: Option<String>,

    /// Sender address
    pub from: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-field lines
    #[default]
    Pretty,

    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("unknown log format {other:?} (expected pretty or json)"),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup` instead of the process environment
    ///
    /// Empty values count as unset.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use taskdesk_api::config::Config;
    ///
    /// let vars = HashMap::from([
    ///     ("DATABASE_URL", "postgresql://localhost/taskdesk"),
    ///     ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
    /// ]);
    ///
    /// let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
    /// assert_eq!(config.bind_address(), "0.0.0.0:8080");
    /// assert!(config.relay_config().is_none());
    /// ```
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port: u16 = parse_or(var("API_PORT"), "API_PORT", 8080)?;

        let cors_origins = var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        let production = parse_bool(var("PRODUCTION"), "PRODUCTION", false)?;
        let allow_admin_registration =
            parse_bool(var("ALLOW_ADMIN_REGISTRATION"), "ALLOW_ADMIN_REGISTRATION", true)?;

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections: u32 =
            parse_or(var("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", 10)?;

        let jwt_secret = var("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let ttl_hours: i64 = parse_or(var("JWT_TTL_HOURS"), "JWT_TTL_HOURS", 24)?;
        if !(1..=MAX_TTL_HOURS).contains(&ttl_hours) {
            anyhow::bail!("JWT_TTL_HOURS must be between 1 and {MAX_TTL_HOURS}");
        }

        let timeout_seconds: u64 =
            parse_or(var("MAIL_TIMEOUT_SECONDS"), "MAIL_TIMEOUT_SECONDS", 10)?;

        let log_format = var("LOG_FORMAT")
            .map(|v| v.parse::<LogFormat>())
            .transpose()
            .context("invalid LOG_FORMAT")?
            .unwrap_or_default();

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
                allow_admin_registration,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                ttl_hours,
            },
            mail: MailConfig {
                relay_url: var("MAIL_RELAY_URL"),
                relay_token: var("MAIL_RELAY_TOKEN"),
                from: var("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
                timeout_seconds,
            },
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether CORS accepts any origin
    pub fn cors_allows_any(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }

    /// Connection pool settings
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            ..Default::default()
        }
    }

    /// Identity service settings
    pub fn identity_config(&self) -> IdentityConfig {
        IdentityConfig {
            jwt_secret: self.jwt.secret.clone(),
            token_ttl: chrono::Duration::hours(self.jwt.ttl_hours),
            allow_admin_registration: self.api.allow_admin_registration,
        }
    }

    /// Mail relay settings, or `None` when no relay is configured
    pub fn relay_config(&self) -> Option<RelayConfig> {
        let url = self.mail.relay_url.clone()?;

        Some(RelayConfig {
            url,
            token: self.mail.relay_token.clone(),
            from: self.mail.from.clone(),
            timeout: Duration::from_secs(self.mail.timeout_seconds),
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, key: &str, default: bool) -> anyhow::Result<bool> {
    let Some(raw) = value else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => anyhow::bail!("{key} must be true or false, got {raw:?}"),
    }
}
