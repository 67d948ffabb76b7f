//! Integration tests for field conversion and validation

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use xmodels::{ChoiceItem, Context, Field, Native, Value};

fn native(field: &Field, value: impl Into<Value>) -> Native {
    field
        .to_native(Some(&value.into()), &Context::new())
        .unwrap()
        .unwrap()
}

fn round_trip(field: &Field, value: &Native) -> Native {
    let ctx = Context::new();
    let primitive = field.to_primitive(value, &ctx).unwrap();
    field.to_native(Some(&primitive), &ctx).unwrap().unwrap()
}

#[test]
fn test_range_boundaries() {
    let field = Field::integer().min(1).max(10);

    assert!(field.validate(Some(&native(&field, 1))).is_empty());
    assert!(field.validate(Some(&native(&field, 10))).is_empty());
    assert_eq!(field.validate(Some(&native(&field, 0))), vec!["must be >= 1"]);
    assert_eq!(field.validate(Some(&native(&field, 11))), vec!["must be <= 10"]);
}

#[test]
fn test_exclusive_bounds() {
    let field = Field::float().min_exclusive(0.0).max_exclusive(1.0);
    assert!(field.validate(Some(&Native::Float(0.5))).is_empty());
    assert_eq!(field.validate(Some(&Native::Float(0.0))), vec!["must be > 0"]);
    assert_eq!(field.validate(Some(&Native::Float(1.0))), vec!["must be < 1"]);
}

#[test]
fn test_numeric_refinements() {
    let non_negative = Field::non_negative_integer();
    assert!(non_negative.validate(Some(&Native::Int(0))).is_empty());
    assert_eq!(non_negative.validate(Some(&Native::Int(-1))), vec!["must be >= 0"]);

    let positive = Field::positive_integer();
    assert_eq!(positive.validate(Some(&Native::Int(0))), vec!["must be > 0"]);

    let negative = Field::negative_integer();
    assert!(negative.validate(Some(&Native::Int(-3))).is_empty());
    assert_eq!(negative.validate(Some(&Native::Int(0))), vec!["must be < 0"]);

    let float = Field::non_negative_float();
    assert_eq!(float.validate(Some(&Native::Float(-0.5))), vec!["must be >= 0"]);
}

#[test]
fn test_conversion_and_validation_are_distinct() {
    let field = Field::integer().min(0);
    let err = field
        .to_native(Some(&Value::from("ten")), &Context::new())
        .unwrap_err();
    assert_eq!(err.message, "could not convert to integer");

    let value = native(&field, "-4");
    assert_eq!(value, Native::Int(-4));
    assert_eq!(field.validate(Some(&value)), vec!["must be >= 0"]);
}

#[test]
fn test_lexical_refinements() {
    let cases: Vec<(Field, &str, &str, &str)> = vec![
        (Field::token(), "a b", "a  b", "whitespace must be collapsed"),
        (Field::name(), "xs:element", "1st", "not a valid XML name"),
        (Field::ncname(), "element", "xs:element", "not a valid NCName"),
        (Field::language(), "en-US", "english language", "not a valid language identifier"),
        (Field::nmtoken(), "2024-01", "two words", "not a valid NMTOKEN"),
        (Field::email(), "joe@example.com", "joe.example.com", "not a valid e-mail address"),
    ];

    for (field, valid, invalid, message) in cases {
        assert!(field.validate(Some(&Native::from(valid))).is_empty(), "{}", valid);
        assert_eq!(field.validate(Some(&Native::from(invalid))), vec![message]);
    }
}

#[test]
fn test_regex_field_matches_whole_value() {
    let field = Field::regex("[A-Z]{3}");
    assert!(field.validate(Some(&Native::from("ABC"))).is_empty());
    assert_eq!(
        field.validate(Some(&Native::from("ABCD"))),
        vec!["must match pattern '[A-Z]{3}'"]
    );
}

#[test]
fn test_length_facets() {
    let field = Field::text().min_length(2).max_length(4);
    assert!(field.validate(Some(&Native::from("abc"))).is_empty());
    assert_eq!(
        field.validate(Some(&Native::from("a"))),
        vec!["must be at least 2 characters"]
    );
    assert_eq!(
        field.validate(Some(&Native::from("abcde"))),
        vec!["must be at most 4 characters"]
    );
}

#[test]
fn test_choices_on_scalar_fields() {
    let field = Field::integer().choices([1, 2, 3]);
    assert!(field.validate(Some(&Native::Int(2))).is_empty());
    assert_eq!(
        field.validate(Some(&Native::Int(4))),
        vec!["must be one of: 1, 2, 3"]
    );
}

#[test]
fn test_defaults_are_total() {
    let field = Field::text().default("anonymous");
    let value = field.to_native(None, &Context::new()).unwrap();
    assert_eq!(value, Some(Native::from("anonymous")));
    assert!(field.validate(value.as_ref()).is_empty());

    let required = Field::text().required();
    assert_eq!(required.to_native(None, &Context::new()).unwrap(), None);
    assert_eq!(required.validate(None), vec!["required"]);
}

#[test]
fn test_temporal_canonical_asymmetry() {
    let field = Field::date().formats(["%d/%m/%Y", "%Y-%m-%d"]);
    let value = native(&field, "31/01/2024");
    assert_eq!(value, Native::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));

    let primitive = field.to_primitive(&value, &Context::new()).unwrap();
    assert_eq!(primitive, Value::from("2024-01-31"));
    assert_eq!(round_trip(&field, &value), value);
}

#[test]
fn test_datetime_with_offset_is_normalized() {
    let field = Field::datetime();
    let value = native(&field, "2024-05-01T12:30:00+02:00");
    let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();
    assert_eq!(value, Native::DateTime(expected));
}

#[test]
fn test_choice_exclusivity() {
    let field = Field::choice([("flag", Field::boolean()), ("label", Field::text())]);
    let value = native(&field, Value::Seq(vec![Value::from("hello"), Value::from("true")]));

    assert_eq!(
        value,
        Native::Items(vec![
            ChoiceItem::new("label", Native::from("hello")),
            ChoiceItem::new("flag", Native::Bool(true)),
        ])
    );
}

#[test]
fn test_choice_tie_goes_to_first_declared_member() {
    let field = Field::choice([("number", Field::integer()), ("word", Field::text())]);
    let value = native(&field, Value::Seq(vec![Value::from("123")]));
    assert_eq!(value.as_items().unwrap()[0].member, "number");

    let swapped = Field::choice([("word", Field::text()), ("number", Field::integer())]);
    let value = native(&swapped, Value::Seq(vec![Value::from("123")]));
    assert_eq!(value.as_items().unwrap()[0].member, "word");
}

#[test]
fn test_list_round_trip_keeps_order() {
    let field = Field::list(Field::decimal());
    let input = Value::Seq(vec![Value::from("3.10"), Value::from("1"), Value::from("2.5")]);
    let value = native(&field, input.clone());
    assert_eq!(field.to_primitive(&value, &Context::new()).unwrap(), input);
}

#[test]
fn test_special_floats_round_trip() {
    let field = Field::float();
    for (value, text) in [(f64::NAN, "NaN"), (f64::INFINITY, "INF"), (f64::NEG_INFINITY, "-INF")] {
        let native = Native::Float(value);
        assert!(field.validate(Some(&native)).is_empty());
        assert_eq!(field.to_primitive(&native, &Context::new()).unwrap(), Value::from(text));
        assert_eq!(round_trip(&field, &native), native);
    }
}

#[test]
fn test_unstripped_text_is_not_valid_on_stripping_fields() {
    let field = Field::text();
    let native = Native::from(" a ");
    assert_eq!(
        field.validate(Some(&native)),
        vec!["surrounding whitespace must be stripped"]
    );
    assert_eq!(round_trip(&Field::text().no_strip(), &native), native);
}

proptest! {
    #[test]
    fn prop_integer_round_trip(v in any::<i64>()) {
        let field = Field::integer();
        prop_assert_eq!(round_trip(&field, &Native::Int(v)), Native::Int(v));
    }

    #[test]
    fn prop_boolean_round_trip(v in any::<bool>()) {
        let field = Field::boolean();
        prop_assert_eq!(round_trip(&field, &Native::Bool(v)), Native::Bool(v));
    }

    #[test]
    fn prop_float_round_trip(
        v in prop_oneof![
            Just(f64::NAN),
            Just(f64::INFINITY),
            Just(f64::NEG_INFINITY),
            -1.0e12f64..1.0e12f64,
        ]
    ) {
        let field = Field::float();
        prop_assert_eq!(round_trip(&field, &Native::Float(v)), Native::Float(v));
    }

    #[test]
    fn prop_decimal_round_trip(mantissa in any::<i64>(), scale in 0u32..10) {
        let field = Field::decimal();
        let value = Native::Decimal(Decimal::new(mantissa, scale));
        prop_assert_eq!(round_trip(&field, &value), value);
    }

    #[test]
    fn prop_text_round_trip(s in "[a-zA-Z0-9]([a-zA-Z0-9 ]{0,20}[a-zA-Z0-9])?") {
        let field = Field::text();
        let value = Native::Text(s);
        prop_assert_eq!(round_trip(&field, &value), value.clone());
    }

    #[test]
    fn prop_date_round_trip(year in 1900i32..2100, month in 1u32..=12, day in 1u32..=28) {
        let field = Field::date();
        let value = Native::Date(NaiveDate::from_ymd_opt(year, month, day).unwrap());
        prop_assert_eq!(round_trip(&field, &value), value.clone());
    }

    #[test]
    fn prop_datetime_round_trip(day in 1u32..=28, hour in 0u32..24, minute in 0u32..60, second in 0u32..60) {
        let field = Field::datetime();
        let value = Native::DateTime(
            NaiveDate::from_ymd_opt(2024, 2, day)
                .unwrap()
                .and_hms_opt(hour, minute, second)
                .unwrap(),
        );
        prop_assert_eq!(round_trip(&field, &value), value.clone());
    }

    #[test]
    fn prop_base64_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let field = Field::base64();
        let value = Native::Bytes(bytes);
        prop_assert_eq!(round_trip(&field, &value), value.clone());
    }
}
