use chrono::{DateTime, Local, TimeZone, Utc};

/// Render an exchange epoch-millisecond timestamp in local time.
pub fn format_epoch_ms(epoch_ms: i64) -> Option<String> {
    let utc: DateTime<Utc> = Utc.timestamp_millis_opt(epoch_ms).single()?;
    Some(
        utc.with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
    )
}

pub fn current_human_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M").to_string()
}
