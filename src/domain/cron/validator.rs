//! Whole-expression validation.

use thiserror::Error;

use super::expression::CronExpression;
use super::grammar::{validate_field, FieldKind};
use super::normalizer::{normalize, FIELD_COUNT};
use crate::domain::models::schedule::SchemaGeneration;

/// Why an expression was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CronError {
    #[error("Cron expression must have 5 fields, found {found}")]
    FieldCount { found: usize },

    #[error("Invalid {field} field '{value}' (allowed {min}-{max}, '*', lists, ranges or '*/n')")]
    InvalidField {
        field: FieldKind,
        value: String,
        min: u32,
        max: u32,
    },
}

/// Validates cron expressions under one schema generation's policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CronValidator {
    generation: SchemaGeneration,
}

impl CronValidator {
    pub const fn new(generation: SchemaGeneration) -> Self {
        Self { generation }
    }

    pub const fn generation(&self) -> SchemaGeneration {
        self.generation
    }

    /// Whether an empty expression is the Unscheduled value rather than an error.
    pub const fn empty_means_unscheduled(&self) -> bool {
        self.generation.empty_means_unscheduled()
    }

    pub fn is_valid(&self, expression: &str) -> bool {
        self.validate(expression).is_ok()
    }

    /// Normalize and validate, returning the parsed expression.
    ///
    /// Fields are checked in order and the first failing one is reported.
    pub fn validate(&self, expression: &str) -> Result<CronExpression, CronError> {
        let normalized = normalize(expression);
        if normalized.is_empty() {
            return if self.empty_means_unscheduled() {
                Ok(CronExpression::Unscheduled)
            } else {
                Err(CronError::FieldCount { found: 0 })
            };
        }

        let fields: Vec<&str> = normalized.split(' ').collect();
        if fields.len() != FIELD_COUNT {
            return Err(CronError::FieldCount { found: fields.len() });
        }

        for (kind, value) in FieldKind::ALL.into_iter().zip(&fields) {
            if !validate_field(value, kind, self.generation) {
                let (min, max) = kind.range();
                return Err(CronError::InvalidField {
                    field: kind,
                    value: (*value).to_string(),
                    min,
                    max,
                });
            }
        }

        Ok(CronExpression::Scheduled(
            FieldKind::ALL.map(|kind| fields[kind.index()].to_string()),
        ))
    }
}

impl Default for CronValidator {
    fn default() -> Self {
        Self::new(SchemaGeneration::Uid)
    }
}

/// Validity under the current (uid) schema generation.
pub fn is_valid_cron(text: &str) -> bool {
    CronValidator::default().is_valid(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_expressions() {
        let validator = CronValidator::default();
        for expr in ["* * * * *", "*/5 * * * *", "0 9 * * 1-5", "30 18 1,15 * 0", "0 0 1 */3 *"] {
            assert!(validator.is_valid(expr), "{expr}");
        }
    }

    #[test]
    fn test_relaxed_input_is_normalized_first() {
        let validator = CronValidator::default();
        assert!(validator.is_valid("  */5 "));
        assert_eq!(
            validator.validate("0   9").unwrap().to_string(),
            "0 9 * * *"
        );
    }

    #[test]
    fn test_empty_depends_on_generation() {
        assert_eq!(
            CronValidator::new(SchemaGeneration::Uid).validate(""),
            Ok(CronExpression::Unscheduled)
        );
        assert_eq!(
            CronValidator::new(SchemaGeneration::Legacy).validate("  "),
            Err(CronError::FieldCount { found: 0 })
        );
    }

    #[test]
    fn test_reports_first_failing_field() {
        let err = CronValidator::default().validate("60 24 * * *").unwrap_err();
        assert_eq!(
            err,
            CronError::InvalidField {
                field: FieldKind::Minute,
                value: "60".to_string(),
                min: 0,
                max: 59,
            }
        );

        let err = CronValidator::default().validate("0 0 * 13 *").unwrap_err();
        assert!(matches!(err, CronError::InvalidField { field: FieldKind::Month, .. }));
    }

    #[test]
    fn test_day_of_week_step_zero_only_legacy() {
        assert!(!CronValidator::new(SchemaGeneration::Uid).is_valid("* * * * */0"));
        assert!(CronValidator::new(SchemaGeneration::Legacy).is_valid("* * * * */0"));
    }

    #[test]
    fn test_is_valid_cron_uses_uid_policy() {
        assert!(is_valid_cron(""));
        assert!(is_valid_cron("0 0 * * *"));
        assert!(!is_valid_cron("0 0 * * 7"));
    }
}
