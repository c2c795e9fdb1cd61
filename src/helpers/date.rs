//! Date helper functions

use chrono::{DateTime, TimeZone, Utc};

/// Label shown when a post has no usable commit date
pub const RECENT: &str = "Recent";

/// Get relative time (like "5h ago")
///
/// Elapsed times of 30 days and more fall back to the absolute date,
/// formatted like "Jan 5, 2024" in the timezone of `date`. Dates in the
/// future count as zero seconds.
pub fn time_ago<Tz: TimeZone>(date: &DateTime<Tz>, now: &DateTime<Utc>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let seconds = now
        .signed_duration_since(date.with_timezone(&Utc))
        .num_seconds()
        .max(0);
    let minutes = seconds / 60;
    let hours = seconds / 3600;
    let days = seconds / 86400;

    if seconds < 60 {
        format!("{}s ago", seconds)
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days < 7 {
        format!("{}d ago", days)
    } else if days < 30 {
        format!("{}w ago", days / 7)
    } else {
        short_date(date)
    }
}

/// Format date like "Jan 5, 2024"
pub fn short_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%b %-d, %Y").to_string()
}
