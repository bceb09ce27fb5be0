use chrono::{DateTime, Local, Utc};

/// Format a timestamp the way sellers read it: local time, `dd.mm.yyyy, HH:MM:SS`.
pub fn human_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%d.%m.%Y, %H:%M:%S")
        .to_string()
}
