//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 默认连接超时
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// 默认请求超时
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the server exposes a domain's job history.
///
/// Both routes have existed across server releases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobsRoute {
    /// `/api/user/jobs/{name}`
    #[default]
    UserJobs,
    /// `/api/user/domain/{name}/jobs`
    DomainJobs,
}

impl JobsRoute {
    /// Path of the job history for an already percent-encoded domain name.
    pub fn history_path(self, encoded_name: &str) -> String {
        match self {
            Self::UserJobs => format!("/api/user/jobs/{encoded_name}"),
            Self::DomainJobs => format!("/api/user/domain/{encoded_name}/jobs"),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme, host and optional prefix the `/api/...` paths are appended to.
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    pub jobs_route: JobsRoute,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            jobs_route: JobsRoute::default(),
        }
    }
}
