use crate::auth::jwt::JwtConfig;

/// Which task store backend the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Durable Postgres store (requires `DATABASE_URL`).
    Postgres,
    /// Ephemeral in-process store with 24-hour retention.
    Memory,
}

/// Server configuration loaded from environment variables.
///
/// All optional fields have defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// External worker webhook endpoint that performs the generation.
    pub worker_webhook_url: String,
    /// Public base URL of this server, used to build the callback URL
    /// handed to the worker.
    pub callback_base_url: String,
    /// Task store backend selection.
    pub store_backend: StoreBackend,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Required | Default                 |
    /// |------------------------|----------|-------------------------|
    /// | `HOST`                 | no       | `0.0.0.0`               |
    /// | `PORT`                 | no       | `3000`                  |
    /// | `CORS_ORIGINS`         | no       | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | no       | `30`                    |
    /// | `WORKER_WEBHOOK_URL`   | **yes**  | --                      |
    /// | `CALLBACK_BASE_URL`    | **yes**  | --                      |
    /// | `TASK_STORE`           | no       | `postgres`              |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or a value fails to parse,
    /// so misconfiguration surfaces at startup rather than mid-request.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let worker_webhook_url = std::env::var("WORKER_WEBHOOK_URL")
            .expect("WORKER_WEBHOOK_URL must be set in the environment");

        let callback_base_url = std::env::var("CALLBACK_BASE_URL")
            .expect("CALLBACK_BASE_URL must be set in the environment");

        let store_backend = match std::env::var("TASK_STORE")
            .unwrap_or_else(|_| "postgres".into())
            .as_str()
        {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => panic!("TASK_STORE must be 'postgres' or 'memory', got '{other}'"),
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            worker_webhook_url,
            callback_base_url,
            store_backend,
            jwt,
        }
    }
}
