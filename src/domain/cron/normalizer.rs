//! Relaxed-input normalization for cron expressions.

/// Number of fields in a cron expression.
pub const FIELD_COUNT: usize = 5;

/// Normalize operator input into a five-field expression.
///
/// Whitespace runs collapse to single spaces, missing trailing fields are
/// padded with `*` and extra fields are dropped. Blank input stays empty,
/// which is the Unscheduled value. Idempotent.
pub fn normalize(raw: &str) -> String {
    let mut fields: Vec<&str> = raw.split_whitespace().take(FIELD_COUNT).collect();
    if fields.is_empty() {
        return String::new();
    }
    fields.resize(FIELD_COUNT, "*");
    fields.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  0   9\t*  *\n1-5 "), "0 9 * * 1-5");
    }

    #[test]
    fn test_pads_missing_fields() {
        assert_eq!(normalize("*/5"), "*/5 * * * *");
        assert_eq!(normalize("0 0"), "0 0 * * *");
    }

    #[test]
    fn test_truncates_extra_fields() {
        assert_eq!(normalize("0 0 1 1 0 2024 extra"), "0 0 1 1 0");
    }

    #[test]
    fn test_blank_is_unscheduled() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t "), "");
    }

    #[test]
    fn test_idempotent_on_samples() {
        for raw in ["", " ", "*/5", "0  0 * *  *", "1 2 3 4 5 6 7", "a b"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "input: {raw:?}");
        }
    }
}
