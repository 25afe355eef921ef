//! Human-readable descriptions of cron expressions.
//!
//! A handful of common expressions get canned phrasings; everything else is
//! described by composing a time clause, an optional days clause and an
//! optional months clause.

use super::expression::CronExpression;
use super::grammar::{parse_field, FieldForm, FieldKind};
use super::names::{hour_name, month_name, weekday_name};
use super::validator::CronValidator;
use crate::domain::models::schedule::SchemaGeneration;

/// Description of the Unscheduled value.
pub const NOT_SCHEDULED: &str = "not scheduled";

/// Description of an expression that failed validation.
pub const INVALID_EXPRESSION: &str = "invalid expression";

/// Turns cron expressions into sentences. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct CronDecoder {
    validator: CronValidator,
}

impl CronDecoder {
    pub const fn new(generation: SchemaGeneration) -> Self {
        Self {
            validator: CronValidator::new(generation),
        }
    }

    pub fn decode(&self, expression: &str) -> String {
        let Ok(parsed) = self.validator.validate(expression) else {
            return INVALID_EXPRESSION.to_string();
        };
        let CronExpression::Scheduled(fields) = &parsed else {
            return NOT_SCHEDULED.to_string();
        };

        let generation = self.validator.generation();
        let mut forms = Vec::with_capacity(fields.len());
        for kind in FieldKind::ALL {
            match parse_field(&fields[kind.index()], kind, generation) {
                Some(form) => forms.push(form),
                None => return INVALID_EXPRESSION.to_string(),
            }
        }

        let raw: [&str; 5] = [
            fields[0].as_str(),
            fields[1].as_str(),
            fields[2].as_str(),
            fields[3].as_str(),
            fields[4].as_str(),
        ];
        if let Some(canned) = canned_phrase(raw, &forms) {
            return canned;
        }

        compose(&raw, &forms)
    }
}

/// Description under the current (uid) schema generation.
pub fn decode_cron(text: &str) -> String {
    CronDecoder::default().decode(text)
}

fn canned_phrase(raw: [&str; 5], forms: &[FieldForm]) -> Option<String> {
    match raw {
        ["0", "0", "*", "*", "*"] => return Some("runs at midnight every day".to_string()),
        ["0", "9", "*", "*", "1-5"] => return Some("runs at 9am on weekdays".to_string()),
        ["0", "17", "*", "*", "1-5"] => return Some("runs at 5pm on weekdays".to_string()),
        _ => {}
    }

    if let (FieldForm::Step(n), ["*", "*", "*", "*"]) = (&forms[0], &raw[1..]) {
        return Some(format!("runs every {}", plural(*n, "minute")));
    }

    if let ("0", FieldForm::Step(n), ["*", "*", "*"]) = (raw[0], &forms[1], &raw[2..]) {
        return Some(format!("runs every {} on the hour", plural(*n, "hour")));
    }

    match raw {
        ["0", "0", "*", "*", "0"] => Some("runs at midnight on Sundays".to_string()),
        ["0", "0", "1", "*", "*"] => {
            Some("runs at midnight on the first of every month".to_string())
        }
        _ => None,
    }
}

fn compose(raw: &[&str; 5], forms: &[FieldForm]) -> String {
    let mut sentence = format!("runs {}", time_clause(raw, forms));
    if let Some(days) = days_clause(&forms[2], &forms[4]) {
        sentence.push(' ');
        sentence.push_str(&days);
    }
    if let Some(months) = months_clause(&forms[3]) {
        sentence.push(' ');
        sentence.push_str(&months);
    }
    sentence
}

fn time_clause(raw: &[&str; 5], forms: &[FieldForm]) -> String {
    let mut clause = match &forms[0] {
        FieldForm::Any => "every minute".to_string(),
        FieldForm::Step(n) => format!("every {}", plural(*n, "minute")),
        _ => format!("at minute {}", raw[0]),
    };

    match &forms[1] {
        FieldForm::Any => {}
        FieldForm::Step(n) => {
            clause.push_str(&format!(" every {}", plural(*n, "hour")));
        }
        FieldForm::Value(h) => {
            clause.push_str(&format!(" at hour {h} ({})", hour_name(*h)));
        }
        _ => {
            clause.push_str(&format!(" at hour {}", raw[1]));
        }
    }

    clause
}

fn days_clause(day_of_month: &FieldForm, day_of_week: &FieldForm) -> Option<String> {
    let month_days = match day_of_month {
        FieldForm::Any => None,
        FieldForm::Value(d) => Some(format!("on day {d} of the month")),
        FieldForm::List(days) => Some(format!("on days {} of the month", join_numbers(days))),
        FieldForm::Range(a, b) => Some(format!("on days {a} through {b} of the month")),
        FieldForm::Step(n) => Some(format!("every {} of the month", plural(*n, "day"))),
    };

    let week_days = match day_of_week {
        FieldForm::Any => None,
        FieldForm::Step(n) => Some(format!("every {} of the week", plural(*n, "day"))),
        form => describe_named(form, weekday_name).map(|names| format!("on {names}")),
    };

    match (month_days, week_days) {
        (Some(m), Some(w)) => Some(format!("{m} and {w}")),
        (m, w) => m.or(w),
    }
}

fn months_clause(month: &FieldForm) -> Option<String> {
    match month {
        FieldForm::Any => None,
        FieldForm::Step(n) => Some(format!("every {}", plural(*n, "month"))),
        form => describe_named(form, month_name).map(|names| format!("in {names}")),
    }
}

/// Translate a value, list or range through a name table.
fn describe_named(form: &FieldForm, name: fn(u32) -> String) -> Option<String> {
    match form {
        FieldForm::Value(v) => Some(name(*v)),
        FieldForm::List(values) => Some(
            values
                .iter()
                .map(|v| name(*v))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        FieldForm::Range(a, b) => Some(format!("{} through {}", name(*a), name(*b))),
        FieldForm::Any | FieldForm::Step(_) => None,
    }
}

fn join_numbers(values: &[u32]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
