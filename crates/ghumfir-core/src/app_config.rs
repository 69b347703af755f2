use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub popular_path: PathBuf,
    pub user_agent: String,
    pub primary_source_url: String,
    pub fallback_source_url: Option<String>,
    pub primary_timeout_secs: u64,
    pub fallback_timeout_secs: u64,
    pub location_timeout_secs: u64,
    pub location_hard_stop_margin_secs: u64,
    pub result_limit: usize,
    pub closest_anyway_count: usize,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs)
    }

    #[must_use]
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    /// Primary acquisition timeout plus the safety margin.
    #[must_use]
    pub fn location_hard_stop(&self) -> Duration {
        Duration::from_secs(
            self.location_timeout_secs
                .saturating_add(self.location_hard_stop_margin_secs),
        )
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("popular_path", &self.popular_path)
            .field("user_agent", &self.user_agent)
            .field("primary_source_url", &self.primary_source_url)
            .field("fallback_source_url", &self.fallback_source_url)
            .field("primary_timeout_secs", &self.primary_timeout_secs)
            .field("fallback_timeout_secs", &self.fallback_timeout_secs)
            .field("location_timeout_secs", &self.location_timeout_secs)
            .field(
                "location_hard_stop_margin_secs",
                &self.location_hard_stop_margin_secs,
            )
            .field("result_limit", &self.result_limit)
            .field("closest_anyway_count", &self.closest_anyway_count)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .finish()
    }
}
