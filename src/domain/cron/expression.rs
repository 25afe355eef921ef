//! Validated cron expression value type.

use std::fmt;

use super::grammar::FieldKind;

/// A cron expression that has passed validation.
///
/// Either the distinguished Unscheduled value (empty on the wire) or exactly
/// five fields, each satisfying its grammar. Only produced by
/// [`CronValidator`](super::validator::CronValidator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CronExpression {
    Unscheduled,
    Scheduled([String; 5]),
}

impl CronExpression {
    pub const fn is_unscheduled(&self) -> bool {
        matches!(self, Self::Unscheduled)
    }

    /// Field text at a position, `None` when unscheduled.
    pub fn field(&self, kind: FieldKind) -> Option<&str> {
        match self {
            Self::Unscheduled => None,
            Self::Scheduled(fields) => Some(fields[kind.index()].as_str()),
        }
    }

    /// All five fields, `None` when unscheduled.
    pub const fn fields(&self) -> Option<&[String; 5]> {
        match self {
            Self::Unscheduled => None,
            Self::Scheduled(fields) => Some(fields),
        }
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unscheduled => Ok(()),
            Self::Scheduled(fields) => f.write_str(&fields.join(" ")),
        }
    }
}
