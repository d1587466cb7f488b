use std::env;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Identity gating configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Only accounts under this email domain may call the service
    pub allowed_email_domain: String,
    /// Role claim value that grants admin rights
    pub admin_role: String,
    /// Shared HMAC key used by the sign-in gateway
    pub identity_secret: String,
    pub identity_max_age_secs: i64,
    /// Accept unsigned identity headers (development only)
    pub allow_unsigned: bool,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub log_level: String,
    pub grpc_port: u16,
    pub http_port: Option<u16>,
    pub environment: String,
}

/// Parse a raw variable value. Unset or blank stays `None`; a value that
/// does not parse is an error naming the variable.
fn parse_value<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Result<Option<T>, String> {
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("Invalid {}: {}", key, value)),
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>, String> {
    parse_value(key, env::var(key).ok())
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = parse_var::<u32>("DATABASE_MAX_CONNECTIONS")?.unwrap_or(10);
        let acquire_timeout_secs = parse_var::<u64>("DATABASE_ACQUIRE_TIMEOUT_SECS")?.unwrap_or(30);
        let idle_timeout_secs = parse_var::<u64>("DATABASE_IDLE_TIMEOUT_SECS")?.unwrap_or(600); // 10 minutes
        let max_lifetime_secs = parse_var::<u64>("DATABASE_MAX_LIFETIME_SECS")?.unwrap_or(1800); // 30 minutes
        let test_before_acquire = parse_var::<bool>("DATABASE_TEST_BEFORE_ACQUIRE")?.unwrap_or(true);

        let config = Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if self.acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/campus_hub".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl AuthConfig {
    /// Create identity config from environment variables.
    ///
    /// `IDENTITY_SECRET` may only be omitted in development, where unsigned
    /// identity headers are accepted.
    pub fn from_env(environment: &str) -> Result<Self, String> {
        let is_development = environment == "development";

        let allowed_email_domain = env::var("ALLOWED_EMAIL_DOMAIN")
            .unwrap_or_else(|_| "viit.ac.in".to_string())
            .trim_start_matches('@')
            .to_lowercase();

        if allowed_email_domain.is_empty() {
            return Err("ALLOWED_EMAIL_DOMAIN must not be empty".to_string());
        }

        let admin_role = env::var("ADMIN_ROLE").unwrap_or_else(|_| "Admin".to_string());

        let identity_secret = match env::var("IDENTITY_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if is_development => String::new(),
            _ => {
                return Err(format!(
                    "IDENTITY_SECRET is required in the {} environment",
                    environment
                ))
            }
        };

        let identity_max_age_secs = parse_var::<i64>("IDENTITY_MAX_AGE_SECS")?.unwrap_or(300);
        if identity_max_age_secs <= 0 {
            return Err("IDENTITY_MAX_AGE_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            allowed_email_domain,
            admin_role,
            identity_secret,
            identity_max_age_secs,
            allow_unsigned: is_development,
        })
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allowed_email_domain: "viit.ac.in".to_string(),
            admin_role: "Admin".to_string(),
            identity_secret: String::new(),
            identity_max_age_secs: 300,
            allow_unsigned: true,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let grpc_port = parse_var::<u16>("GRPC_PORT")?.unwrap_or(50051);
        let http_port = parse_var::<u16>("HTTP_PORT")?;
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        let environment = environment.to_lowercase();
        if !valid_environments.contains(&environment.as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        let auth = AuthConfig::from_env(&environment)?;

        Ok(Self {
            database,
            auth,
            log_level: log_level.to_lowercase(),
            grpc_port,
            http_port,
            environment,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            log_level: "info".to_string(),
            grpc_port: 50051,
            http_port: None,
            environment: "development".to_string(),
        }
    }
}
