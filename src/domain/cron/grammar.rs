//! Grammar for a single cron field.
//!
//! Accepted forms, per field:
//! - `*`
//! - a bare integer inside the field's inclusive range
//! - a comma list of bare integers (`1,15,30`)
//! - an inclusive range `a-b` (no ordering check, `5-1` is accepted)
//! - a step `*/n` with a non-zero `n` inside the field's range
//!
//! The day-of-week step is the one place the two schema generations differ:
//! the legacy grammar accepts `*/0` through `*/6`, the uid grammar `*/1`
//! through `*/6`.

use serde::{Deserialize, Serialize};

use crate::domain::models::schedule::SchemaGeneration;

/// Position of a field inside a five-field cron expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl FieldKind {
    /// All five positions in expression order.
    pub const ALL: [Self; 5] = [
        Self::Minute,
        Self::Hour,
        Self::DayOfMonth,
        Self::Month,
        Self::DayOfWeek,
    ];

    /// Inclusive numeric range of the field.
    pub const fn range(self) -> (u32, u32) {
        match self {
            Self::Minute => (0, 59),
            Self::Hour => (0, 23),
            Self::DayOfMonth => (1, 31),
            Self::Month => (1, 12),
            Self::DayOfWeek => (0, 6),
        }
    }

    /// Inclusive range accepted for `n` in `*/n`.
    pub const fn step_range(self, generation: SchemaGeneration) -> (u32, u32) {
        let (min, max) = self.range();
        match (self, generation) {
            (Self::DayOfWeek, SchemaGeneration::Legacy) => (0, max),
            _ => (if min == 0 { 1 } else { min }, max),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::DayOfMonth => "day-of-month",
            Self::Month => "month",
            Self::DayOfWeek => "day-of-week",
        }
    }

    /// Zero-based index of the field in the expression.
    pub const fn index(self) -> usize {
        match self {
            Self::Minute => 0,
            Self::Hour => 1,
            Self::DayOfMonth => 2,
            Self::Month => 3,
            Self::DayOfWeek => 4,
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntactic form of a field that passed the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldForm {
    Any,
    Value(u32),
    List(Vec<u32>),
    Range(u32, u32),
    Step(u32),
}

/// Pure predicate: does `value` satisfy the grammar for `kind`?
pub fn validate_field(value: &str, kind: FieldKind, generation: SchemaGeneration) -> bool {
    parse_field(value, kind, generation).is_some()
}

/// Classify a field, returning `None` when it does not satisfy the grammar.
pub fn parse_field(value: &str, kind: FieldKind, generation: SchemaGeneration) -> Option<FieldForm> {
    if value == "*" {
        return Some(FieldForm::Any);
    }

    if let Some(step) = value.strip_prefix("*/") {
        let (min, max) = kind.step_range(generation);
        return parse_bounded(step, min, max).map(FieldForm::Step);
    }

    let (min, max) = kind.range();

    if value.contains(',') {
        return value
            .split(',')
            .map(|token| parse_bounded(token, min, max))
            .collect::<Option<Vec<_>>>()
            .map(FieldForm::List);
    }

    if let Some((start, end)) = value.split_once('-') {
        let start = parse_bounded(start, min, max)?;
        let end = parse_bounded(end, min, max)?;
        return Some(FieldForm::Range(start, end));
    }

    parse_bounded(value, min, max).map(FieldForm::Value)
}

/// Parse a canonical decimal integer (no sign, no leading zeros) inside `[min, max]`.
fn parse_bounded(token: &str, min: u32, max: u32) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    let value: u32 = token.parse().ok()?;
    (min..=max).contains(&value).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UID: SchemaGeneration = SchemaGeneration::Uid;
    const LEGACY: SchemaGeneration = SchemaGeneration::Legacy;

    #[test]
    fn test_wildcard_always_valid() {
        for kind in FieldKind::ALL {
            assert!(validate_field("*", kind, UID));
            assert!(validate_field("*", kind, LEGACY));
        }
    }

    #[test]
    fn test_bare_integer_bounds() {
        assert!(validate_field("0", FieldKind::Minute, UID));
        assert!(validate_field("59", FieldKind::Minute, UID));
        assert!(!validate_field("60", FieldKind::Minute, UID));
        assert!(validate_field("23", FieldKind::Hour, UID));
        assert!(!validate_field("24", FieldKind::Hour, UID));
        assert!(!validate_field("0", FieldKind::DayOfMonth, UID));
        assert!(validate_field("31", FieldKind::DayOfMonth, UID));
        assert!(!validate_field("13", FieldKind::Month, UID));
        assert!(validate_field("6", FieldKind::DayOfWeek, UID));
        assert!(!validate_field("7", FieldKind::DayOfWeek, UID));
    }

    #[test]
    fn test_rejects_non_canonical_integers() {
        assert!(!validate_field("05", FieldKind::Minute, UID));
        assert!(!validate_field("+5", FieldKind::Minute, UID));
        assert!(!validate_field("-5", FieldKind::Minute, UID));
        assert!(!validate_field("5a", FieldKind::Minute, UID));
        assert!(!validate_field("", FieldKind::Minute, UID));
    }

    #[test]
    fn test_list_requires_every_token() {
        assert!(validate_field("1,15,30", FieldKind::Minute, UID));
        assert!(!validate_field("1,,30", FieldKind::Minute, UID));
        assert!(!validate_field("1,15,", FieldKind::Minute, UID));
        assert!(!validate_field("1,61", FieldKind::Minute, UID));
        assert_eq!(
            parse_field("1,3,5", FieldKind::DayOfWeek, UID),
            Some(FieldForm::List(vec![1, 3, 5]))
        );
    }

    #[test]
    fn test_range_is_not_ordered() {
        assert_eq!(
            parse_field("1-5", FieldKind::DayOfWeek, UID),
            Some(FieldForm::Range(1, 5))
        );
        assert_eq!(
            parse_field("5-1", FieldKind::DayOfWeek, UID),
            Some(FieldForm::Range(5, 1))
        );
        assert!(!validate_field("1-7", FieldKind::DayOfWeek, UID));
        assert!(!validate_field("1-", FieldKind::DayOfWeek, UID));
        assert!(!validate_field("1-2-3", FieldKind::DayOfWeek, UID));
    }

    #[test]
    fn test_step_forbids_zero() {
        assert!(validate_field("*/5", FieldKind::Minute, UID));
        assert!(!validate_field("*/0", FieldKind::Minute, UID));
        assert!(!validate_field("*/0", FieldKind::Minute, LEGACY));
        assert!(!validate_field("*/0", FieldKind::Hour, LEGACY));
        assert!(!validate_field("*/60", FieldKind::Minute, UID));
        assert!(validate_field("*/12", FieldKind::Month, UID));
        assert!(!validate_field("*/", FieldKind::Month, UID));
        assert!(!validate_field("5/5", FieldKind::Minute, UID));
    }

    #[test]
    fn test_day_of_week_step_differs_per_generation() {
        assert!(!validate_field("*/0", FieldKind::DayOfWeek, UID));
        assert!(validate_field("*/0", FieldKind::DayOfWeek, LEGACY));
        assert!(validate_field("*/6", FieldKind::DayOfWeek, UID));
        assert!(!validate_field("*/7", FieldKind::DayOfWeek, LEGACY));
    }
}
