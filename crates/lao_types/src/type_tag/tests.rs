use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_known_codes_round_trip() {
    for tag in TypeTag::ALL {
        assert_eq!(TypeTag::from_code(tag.code()), tag);
    }
}

#[test]
fn test_unknown_codes_normalize_to_none() {
    assert_eq!(TypeTag::from_code(9), TypeTag::None);
    assert_eq!(TypeTag::from_code(-2), TypeTag::None);
    assert_eq!(TypeTag::from_code(i32::MAX), TypeTag::None);
    assert_eq!(TypeTag::from(42), TypeTag::None);
}

#[test]
fn test_equality_against_raw_codes() {
    assert!(TypeTag::Number == 3);
    assert!(4 == TypeTag::String);
    assert!(TypeTag::Table != 6);
    assert!(-1 == TypeTag::None);
}

#[test]
fn test_names() {
    let names: Vec<&str> = TypeTag::ALL.iter().map(|tag| tag.name()).collect();
    assert_eq!(
        names,
        vec![
            "none",
            "nil",
            "boolean",
            "lightuserdata",
            "number",
            "string",
            "table",
            "function",
            "userdata",
            "thread",
        ]
    );
}

#[test]
fn test_display_matches_name() {
    assert_eq!(TypeTag::Function.to_string(), "function");
    assert_eq!(TypeTag::default().to_string(), "none");
}

#[test]
fn test_type_name_of_raw_codes() {
    assert_eq!(type_name(3), "number");
    assert_eq!(type_name(-1), "none");
    assert_eq!(type_name(9), "unknown");
    assert_eq!(type_name(-7), "unknown");
}

mod proptest_codes {
    use super::super::TypeTag;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn from_code_is_total(code in any::<i32>()) {
            let tag = TypeTag::from_code(code);
            prop_assert!(tag == code || tag == TypeTag::None);
        }
    }
}
