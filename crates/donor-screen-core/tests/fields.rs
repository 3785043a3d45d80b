// crates/donor-screen-core/tests/fields.rs
// ============================================================================
// Module: Field Resolver Tests
// Description: Passthrough and derived-field resolution semantics.
// Purpose: Ensure calendar-aware age and BMI derivation match donor display.
// Dependencies: donor-screen-core, time
// ============================================================================

//! Field resolution tests, including derived-field edge cases.

use std::str::FromStr;

use donor_screen_core::FieldPath;
use donor_screen_core::FieldValue;
use donor_screen_core::Submission;
use donor_screen_core::Timestamp;
use time::Date;
use time::Month;
use time::OffsetDateTime;

fn timestamp_for(date: Date) -> Timestamp {
    let instant = OffsetDateTime::UNIX_EPOCH.replace_date(date);
    Timestamp::from_unix_millis(instant.unix_timestamp() * 1_000)
}

#[test]
fn boolean_fields_pass_through() {
    let submission = Submission {
        has_tattoos_piercings: true,
        ..Submission::default()
    };
    let as_of = Timestamp::from_unix_millis(0);
    assert_eq!(
        FieldPath::HasTattoosPiercings.resolve(&submission, as_of),
        Some(FieldValue::Bool(true))
    );
    assert_eq!(
        FieldPath::HasChronicIllness.resolve(&submission, as_of),
        Some(FieldValue::Bool(false))
    );
}

#[test]
fn age_uses_calendar_subtraction() -> Result<(), Box<dyn std::error::Error>> {
    let submission = Submission {
        birth_date: Some(Date::from_calendar_date(1990, Month::June, 15)?),
        ..Submission::default()
    };

    // Day before the birthday: still 33.
    let before = timestamp_for(Date::from_calendar_date(2024, Month::June, 14)?);
    assert_eq!(
        FieldPath::CalculatedAge.resolve(&submission, before),
        Some(FieldValue::Number(33.0))
    );

    // On the birthday: 34.
    let on = timestamp_for(Date::from_calendar_date(2024, Month::June, 15)?);
    assert_eq!(
        FieldPath::CalculatedAge.resolve(&submission, on),
        Some(FieldValue::Number(34.0))
    );

    // Earlier month entirely.
    let earlier = timestamp_for(Date::from_calendar_date(2024, Month::January, 20)?);
    assert_eq!(
        FieldPath::CalculatedAge.resolve(&submission, earlier),
        Some(FieldValue::Number(33.0))
    );
    Ok(())
}

#[test]
fn age_unresolved_without_birth_date() {
    let submission = Submission::default();
    let as_of = Timestamp::from_unix_millis(0);
    assert_eq!(FieldPath::CalculatedAge.resolve(&submission, as_of), None);
}

#[test]
fn bmi_is_rounded_to_one_decimal() {
    let submission = Submission {
        height_inches: Some(66.0),
        weight_pounds: Some(300.0),
        ..Submission::default()
    };
    let as_of = Timestamp::from_unix_millis(0);
    // (300 * 703) / 66^2 = 48.41... rounds to 48.4.
    assert_eq!(
        FieldPath::CalculatedBmi.resolve(&submission, as_of),
        Some(FieldValue::Number(48.4))
    );
}

#[test]
fn bmi_unresolved_for_missing_or_non_positive_inputs() {
    let as_of = Timestamp::from_unix_millis(0);
    let missing_height = Submission {
        weight_pounds: Some(150.0),
        ..Submission::default()
    };
    assert_eq!(FieldPath::CalculatedBmi.resolve(&missing_height, as_of), None);

    let zero_height = Submission {
        height_inches: Some(0.0),
        weight_pounds: Some(150.0),
        ..Submission::default()
    };
    assert_eq!(FieldPath::CalculatedBmi.resolve(&zero_height, as_of), None);

    let negative_weight = Submission {
        height_inches: Some(66.0),
        weight_pounds: Some(-1.0),
        ..Submission::default()
    };
    assert_eq!(FieldPath::CalculatedBmi.resolve(&negative_weight, as_of), None);
}

#[test]
fn field_paths_round_trip_through_labels() -> Result<(), Box<dyn std::error::Error>> {
    for path in FieldPath::ALL {
        assert_eq!(FieldPath::from_str(path.as_str())?, path);
    }
    assert!(FieldPath::from_str("favorite_color").is_err());
    Ok(())
}
