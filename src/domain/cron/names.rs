//! Name tables used when describing cron fields.

/// Weekday names, indexed from 0 = Sunday.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Month names, indexed from 1 = January.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Weekday name for a day-of-week number, or the number itself when out of range.
pub fn weekday_name(day: u32) -> String {
    usize::try_from(day)
        .ok()
        .and_then(|i| WEEKDAY_NAMES.get(i))
        .map_or_else(|| day.to_string(), |name| (*name).to_string())
}

/// Month name for a month number, or the number itself when out of range.
pub fn month_name(month: u32) -> String {
    usize::try_from(month)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| MONTH_NAMES.get(i))
        .map_or_else(|| month.to_string(), |name| (*name).to_string())
}

/// Spoken name for an hour of the day.
pub fn hour_name(hour: u32) -> String {
    match hour {
        0 => "midnight".to_string(),
        12 => "noon".to_string(),
        h if h < 12 => format!("{h} am"),
        h => format!("{} pm", h - 12),
    }
}
