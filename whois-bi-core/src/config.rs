//! Store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// 任务轮询默认间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// What `get_records` does with an empty response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordsRefreshPolicy {
    /// Keep the stored list; a transient empty response cannot wipe known records.
    #[default]
    KeepOnEmpty,
    /// Always store what the server returned, including an empty list.
    AlwaysReplace,
}

/// How a fetched job history is combined with the stored one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobHistoryPolicy {
    /// The server returns the full history; store it as is.
    #[default]
    Replace,
    /// Merge into the stored history: same id is replaced, new ids appended.
    MergeById,
}

/// Store behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Delay between job fetches while a watched domain has unfinished jobs.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    pub records_policy: RecordsRefreshPolicy,
    pub job_history_policy: JobHistoryPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            records_policy: RecordsRefreshPolicy::default(),
            job_history_policy: JobHistoryPolicy::default(),
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.poll_interval.is_zero() {
            return Err(CoreError::ConfigError(
                "poll_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
