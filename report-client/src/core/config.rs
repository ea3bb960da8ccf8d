use std::path::PathBuf;

/// Client configuration
///
/// Every item can be overridden through environment variables:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ~/.local/share/report-client | local store + logs |
/// | BACKEND_URL | http://localhost:54321 | remote service base URL |
/// | BACKEND_API_KEY | (empty) | remote service API key |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request network timeout |
/// | CONNECTIVITY_CHECK_SECS | 30 | scheduler probe interval |
/// | ENVIRONMENT | development | development \| staging \| production |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the embedded database and log files
    pub work_dir: String,
    /// Remote service base URL
    pub backend_url: String,
    /// Remote service API key (sent on every request)
    pub backend_api_key: String,
    /// Per-request network timeout (milliseconds)
    pub request_timeout_ms: u64,
    /// Connectivity probe interval (seconds)
    pub connectivity_check_secs: u64,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| default_work_dir()),
            backend_url: std::env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:54321".into()),
            backend_api_key: std::env::var("BACKEND_API_KEY").unwrap_or_default(),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30_000),
            connectivity_check_secs: std::env::var("CONNECTIVITY_CHECK_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override work dir and backend URL, keeping everything else from the
    /// environment. Mostly for tests.
    pub fn with_overrides(work_dir: impl Into<String>, backend_url: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.backend_url = backend_url.into();
        config
    }

    /// Directory holding the embedded database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Directory holding rolling log files
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn default_work_dir() -> String {
    std::env::var("HOME")
        .map(|home| format!("{home}/.local/share/report-client"))
        .unwrap_or_else(|_| "./report-client-data".into())
}
