use chrono::{TimeZone, Utc};

pub fn current_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn current_seconds() -> i64 {
    Utc::now().timestamp()
}

pub fn millis_to_rfc3339(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
        .to_rfc3339()
}
