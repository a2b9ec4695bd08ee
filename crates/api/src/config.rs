use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings for the coursehub API process.
///
/// Read once in `main` and shared through [`AppState`](crate::state::AppState).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface the listener binds to.
    pub host: String,
    pub port: u16,
    /// Browser origins allowed by the CORS layer, typically the course
    /// catalogue frontend.
    pub cors_origins: Vec<String>,
    /// Upper bound on a single request, enforced by the timeout layer (408).
    pub request_timeout_secs: u64,
    /// Grace period for in-flight enrollments and payments to finish after
    /// SIGINT/SIGTERM before the process exits anyway.
    pub shutdown_timeout_secs: u64,
    /// Signing settings for the student/admin access tokens.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Build the configuration from the process environment.
    ///
    /// | Env Var                 | Default                 | Notes                        |
    /// |-------------------------|-------------------------|------------------------------|
    /// | `HOST`                  | `0.0.0.0`               |                              |
    /// | `PORT`                  | `3000`                  | `u16`                        |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` | comma-separated, blanks skipped |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |                              |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |                              |
    /// | `JWT_SECRET`            | required                | see [`JwtConfig::from_env`]  |
    /// | `JWT_EXPIRY_MINS`       | `10080`                 | see [`JwtConfig::from_env`]  |
    ///
    /// # Panics
    ///
    /// Startup fails fast if a numeric variable does not parse or
    /// `JWT_SECRET` is missing.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.into());
        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.into()),
        );

        Self {
            host,
            port: env_or("PORT", DEFAULT_PORT),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            jwt: JwtConfig::from_env(),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
