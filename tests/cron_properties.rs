use cronpilot::domain::cron::{
    decode_cron, normalize, CronDecoder, CronValidator, FieldKind, INVALID_EXPRESSION,
};
use cronpilot::SchemaGeneration;
use proptest::prelude::*;

/// Any token the grammar accepts for `kind` under the uid rules.
fn valid_field(kind: FieldKind) -> BoxedStrategy<String> {
    let (min, max) = kind.range();
    let (step_min, step_max) = kind.step_range(SchemaGeneration::Uid);
    prop_oneof![
        Just("*".to_string()),
        (min..=max).prop_map(|v| v.to_string()),
        prop::collection::vec(min..=max, 2..5).prop_map(|vs| {
            vs.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
        }),
        (min..=max, min..=max).prop_map(|(a, b)| format!("{a}-{b}")),
        (step_min..=step_max).prop_map(|n| format!("*/{n}")),
    ]
    .boxed()
}

fn valid_expression() -> impl Strategy<Value = Vec<String>> {
    (
        valid_field(FieldKind::Minute),
        valid_field(FieldKind::Hour),
        valid_field(FieldKind::DayOfMonth),
        valid_field(FieldKind::Month),
        valid_field(FieldKind::DayOfWeek),
    )
        .prop_map(|(a, b, c, d, e)| vec![a, b, c, d, e])
}

proptest! {
    /// Property: normalization is idempotent for arbitrary input
    #[test]
    fn prop_normalize_idempotent(raw in "\\PC{0,60}") {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once);
    }

    /// Property: idempotence also holds for cron-shaped input with odd spacing
    #[test]
    fn prop_normalize_idempotent_cron_like(raw in "[ \t\n0-9*/,-]{0,40}") {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(once.is_empty() || once.split(' ').count() == 5);
    }

    /// Property: every field-wise valid tuple is valid under both generations
    #[test]
    fn prop_valid_tuples_accepted(fields in valid_expression()) {
        let expression = fields.join(" ");
        prop_assert!(CronValidator::new(SchemaGeneration::Uid).is_valid(&expression));
        prop_assert!(CronValidator::new(SchemaGeneration::Legacy).is_valid(&expression));
    }

    /// Property: pushing one field past its range makes the expression invalid
    #[test]
    fn prop_out_of_range_field_rejected(fields in valid_expression(), position in 0usize..5) {
        let kind = FieldKind::ALL[position];
        let mut fields = fields;
        fields[position] = (kind.range().1 + 1).to_string();
        let expression = fields.join(" ");
        prop_assert!(!CronValidator::new(SchemaGeneration::Uid).is_valid(&expression));
        prop_assert!(!CronValidator::new(SchemaGeneration::Legacy).is_valid(&expression));
    }

    /// Property: replacing one field with a non-grammar token makes the expression invalid
    #[test]
    fn prop_malformed_field_rejected(
        fields in valid_expression(),
        position in 0usize..5,
        junk in prop_oneof![
            Just("*/".to_string()),
            Just("1,,2".to_string()),
            Just("a".to_string()),
            Just("1-".to_string()),
            Just("01".to_string()),
        ],
    ) {
        let mut fields = fields;
        fields[position] = junk;
        prop_assert!(!CronValidator::default().is_valid(&fields.join(" ")));
    }

    /// Property: decoding is stable under repeated normalization
    #[test]
    fn prop_decode_stable_under_normalization(raw in "[ 0-9*/,-]{0,30}") {
        let once = normalize(&raw);
        prop_assert_eq!(decode_cron(&once), decode_cron(&normalize(&once)));
    }

    /// Property: valid expressions always get a real description
    #[test]
    fn prop_valid_expressions_described(fields in valid_expression()) {
        let expression = fields.join(" ");
        for generation in [SchemaGeneration::Uid, SchemaGeneration::Legacy] {
            let description = CronDecoder::new(generation).decode(&expression);
            prop_assert_ne!(description.as_str(), INVALID_EXPRESSION);
            prop_assert!(description.starts_with("runs "));
        }
    }
}

#[test]
fn test_documented_decodings() {
    assert_eq!(decode_cron("0 0 * * *"), "runs at midnight every day");
    assert_eq!(decode_cron(""), "not scheduled");
    assert_eq!(decode_cron("0 9 * * 1-5"), "runs at 9am on weekdays");
}
