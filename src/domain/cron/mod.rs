//! Cron expression handling: grammar, normalization, validation and description.
//!
//! Everything in this module is pure. The free functions [`normalize_cron`],
//! [`is_valid_cron`] and [`decode_cron`] use the current (uid) schema
//! generation and are what renderers call directly.

pub mod decoder;
pub mod expression;
pub mod grammar;
pub mod names;
pub mod normalizer;
pub mod validator;

pub use decoder::{decode_cron, CronDecoder, INVALID_EXPRESSION, NOT_SCHEDULED};
pub use expression::CronExpression;
pub use grammar::{validate_field, FieldForm, FieldKind};
pub use normalizer::normalize;
pub use validator::{is_valid_cron, CronError, CronValidator};

/// Normalize operator input. See [`normalize`].
pub fn normalize_cron(text: &str) -> String {
    normalize(text)
}
