use std::path::PathBuf;

/// Daemon configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1` — the daemon serves a local UI).
    pub host: String,
    /// Bind port (default: `4700`).
    pub port: u16,
    /// Directory holding the worker scripts and their venv.
    pub backend_dir: PathBuf,
    /// Credentials file checked by the readiness probe.
    pub env_file: PathBuf,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `127.0.0.1`                |
    /// | `PORT`                 | `4700`                     |
    /// | `BACKEND_DIR`          | `../backend`               |
    /// | `ENV_FILE`             | `.env` (in `BACKEND_DIR`)  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "4700".into())
            .parse()
            .expect("PORT must be a valid u16");

        let backend_dir =
            PathBuf::from(std::env::var("BACKEND_DIR").unwrap_or_else(|_| "../backend".into()));

        // A relative ENV_FILE is anchored to the backend directory, where
        // the worker scripts expect their credentials.
        let env_file = PathBuf::from(std::env::var("ENV_FILE").unwrap_or_else(|_| ".env".into()));
        let env_file = if env_file.is_relative() {
            backend_dir.join(env_file)
        } else {
            env_file
        };

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

        Self {
            host,
            port,
            backend_dir,
            env_file,
            cors_origins,
            request_timeout_secs,
        }
    }
}
