//! 日期时间工具
//!
//! Salesforce 的 OAuth token 响应中 `issued_at` 是以字符串表示的 Unix 毫秒时间戳。

use chrono::{DateTime, Utc};

/// 解析字符串形式的 Unix 时间戳（自动判断秒/毫秒）
pub fn parse_epoch_str(value: &str) -> Option<DateTime<Utc>> {
    let ts: i64 = value.trim().parse().ok()?;
    parse_unix_timestamp(ts)
}

/// 解析 Unix 时间戳（> 10^11 视为毫秒）
fn parse_unix_timestamp(ts: i64) -> Option<DateTime<Utc>> {
    if ts > 100_000_000_000 {
        DateTime::from_timestamp_millis(ts)
    } else {
        DateTime::from_timestamp(ts, 0)
    }
}
