//! 时间戳工具
//!
//! The server sends every timestamp as a string. A timestamp that was never
//! set arrives either as `""` or as Go's zero time (`0001-01-01T00:00:00Z`);
//! both count as unset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Date prefix of Go's zero `time.Time`.
const ZERO_TIME_PREFIX: &str = "0001-01-01";

/// Returns `true` if the timestamp carries no value.
pub fn is_unset(ts: &str) -> bool {
    let ts = ts.trim();
    ts.is_empty() || ts.starts_with(ZERO_TIME_PREFIX)
}

/// Parse an RFC3339 timestamp, `None` when unset or malformed.
pub fn parse(ts: &str) -> Option<DateTime<Utc>> {
    if is_unset(ts) {
        return None;
    }
    DateTime::parse_from_rfc3339(ts.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// 反序列化：`null` 视为空字符串
pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
