//! Validation pipeline for inbound arguments
//!
//! Every check here is synchronous and side-effect free. A failure is
//! returned before the dispatcher touches the store, so a malformed request
//! never crosses the boundary.
//!
//! ## Precedence
//!
//! For contact records the order is fixed:
//!
//! 1. the argument must be an object with at least one recognized field
//! 2. each present field is type-checked in [`ContactField::ALL`] order
//! 3. the birthday format is checked last
//!
//! so `{ "firstName": 1, "birthday": "bad" }` always reports `firstName`.

use serde_json::{Map, Value};

use crate::error::{Error, NON_EMPTY_OBJECT, Result};
use crate::schema::{Contact, ContactField, DeleteTarget, FieldKind};

/// Message raised when the birthday string does not match `YYYY-MM-DD`
pub const BIRTHDAY_FORMAT: &str = "birthday must use YYYY-MM-DD format";

/// Validate a create/update argument and convert it to a [`Contact`]
///
/// Unrecognized keys are ignored, but they do not count towards the
/// non-empty requirement.
pub fn validate_contact_record(input: &Value) -> Result<Contact> {
    let record = non_empty_record(input)?;

    for field in ContactField::ALL {
        if let Some(value) = record.get(field.as_str()) {
            check_field_type(field, value)?;
        }
    }

    if let Some(Value::String(birthday)) = record.get(ContactField::Birthday.as_str())
        && !is_valid_birthday(birthday)
    {
        return Err(Error::invalid_format(BIRTHDAY_FORMAT));
    }

    Ok(serde_json::from_value(Value::Object(record.clone()))?)
}

/// Validate a name lookup argument
///
/// The empty string is accepted; what it matches is up to the store.
pub fn validate_name_query(name: &Value) -> Result<&str> {
    name.as_str()
        .ok_or_else(|| Error::invalid_argument(must_be_string("name")))
}

/// Validate a delete argument
///
/// Accepts the legacy plain-name form or an object carrying `identifier`
/// and/or `name`. When both are present the identifier wins.
pub fn validate_delete_target(input: &Value) -> Result<DeleteTarget> {
    if let Value::String(name) = input {
        return Ok(DeleteTarget::Name(name.clone()));
    }

    let Value::Object(record) = input else {
        return Err(Error::invalid_argument(NON_EMPTY_OBJECT));
    };

    let identifier = optional_string(record, "identifier")?;
    let name = optional_string(record, "name")?;

    match (identifier, name) {
        (Some(identifier), _) => Ok(DeleteTarget::Identifier(identifier.to_string())),
        (None, Some(name)) => Ok(DeleteTarget::Name(name.to_string())),
        (None, None) => Err(Error::invalid_argument(NON_EMPTY_OBJECT)),
    }
}

/// Check a birthday against `YYYY-MM-DD`
///
/// Month must be `01`-`12` and day `01`-`31`. There is no cross-check
/// between the two, so `2021-02-30` passes.
pub fn is_valid_birthday(birthday: &str) -> bool {
    let bytes = birthday.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    if !digits(0..4) || !digits(5..7) || !digits(8..10) {
        return false;
    }

    let two = |at: usize| (bytes[at] - b'0') * 10 + (bytes[at + 1] - b'0');
    let month = two(5);
    let day = two(8);

    (1..=12).contains(&month) && (1..=31).contains(&day)
}

fn non_empty_record(input: &Value) -> Result<&Map<String, Value>> {
    match input {
        Value::Object(record)
            if ContactField::ALL
                .iter()
                .any(|field| record.contains_key(field.as_str())) =>
        {
            Ok(record)
        }
        _ => Err(Error::invalid_argument(NON_EMPTY_OBJECT)),
    }
}

fn check_field_type(field: ContactField, value: &Value) -> Result<()> {
    let ok = match field.kind() {
        FieldKind::Text | FieldKind::Birthday => value.is_string(),
        FieldKind::Sequence => value.is_array(),
        FieldKind::Opaque => true,
    };

    if ok {
        return Ok(());
    }

    let message = match field.kind() {
        FieldKind::Sequence => format!("{} must be an array", field),
        _ => must_be_string(field.as_str()),
    };
    Err(Error::invalid_argument(message))
}

fn optional_string<'a>(record: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match record.get(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(Error::invalid_argument(must_be_string(key))),
    }
}

fn must_be_string(field: &str) -> String {
    format!("{} must be a string", field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn message(result: Result<impl std::fmt::Debug>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn rejects_non_objects_and_empty_records() {
        for input in [json!(1), json!(null), json!("x"), json!([]), json!({})] {
            assert_eq!(message(validate_contact_record(&input)), NON_EMPTY_OBJECT);
        }
    }

    #[test]
    fn unknown_keys_do_not_make_a_record_non_empty() {
        let err = validate_contact_record(&json!({ "favoriteColor": "green" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.to_string(), NON_EMPTY_OBJECT);
    }

    #[test]
    fn names_the_offending_text_field() {
        for field in ["firstName", "lastName", "nickname", "note", "identifier"] {
            let input = json!({ field: 1 });
            assert_eq!(
                message(validate_contact_record(&input)),
                format!("{} must be a string", field)
            );
        }
    }

    #[test]
    fn null_counts_as_present() {
        assert_eq!(
            message(validate_contact_record(&json!({ "lastName": null }))),
            "lastName must be a string"
        );
    }

    #[test]
    fn names_the_offending_sequence_field() {
        for field in ["phoneNumbers", "emailAddresses", "postalAddresses", "socialProfiles"] {
            let input = json!({ field: "+1234567890" });
            assert_eq!(
                message(validate_contact_record(&input)),
                format!("{} must be an array", field)
            );
        }
    }

    #[test]
    fn birthday_type_error_precedes_format_error() {
        let err = validate_contact_record(&json!({ "birthday": 1 })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.to_string(), "birthday must be a string");

        let err = validate_contact_record(&json!({ "birthday": "01-01-1970" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert_eq!(err.to_string(), BIRTHDAY_FORMAT);
    }

    #[test]
    fn type_errors_win_over_birthday_format() {
        let input = json!({ "birthday": "1970", "emailAddresses": "a@b.c" });
        assert_eq!(
            message(validate_contact_record(&input)),
            "emailAddresses must be an array"
        );
    }

    #[test]
    fn first_field_in_declared_order_is_reported() {
        let input = json!({ "phoneNumbers": 1, "nickname": 2, "firstName": 3 });
        assert_eq!(
            message(validate_contact_record(&input)),
            "firstName must be a string"
        );
    }

    #[test]
    fn accepts_a_complete_record() {
        let contact = validate_contact_record(&json!({
            "firstName": "William",
            "lastName": "Grapeseed",
            "nickname": "Billy",
            "birthday": "1990-09-09",
            "phoneNumbers": ["+1234567890"],
            "emailAddresses": ["billy@grapeseed.com"],
            "contactImage": 42,
            "ignored": true
        }))
        .unwrap();

        assert_eq!(contact.first_name.as_deref(), Some("William"));
        assert_eq!(contact.birthday.as_deref(), Some("1990-09-09"));
        assert_eq!(contact.phone_numbers, Some(vec![json!("+1234567890")]));
        assert_eq!(contact.contact_image, Some(json!(42)));
    }

    #[test]
    fn birthday_pattern_is_lenient_about_calendars() {
        assert!(is_valid_birthday("1990-09-09"));
        assert!(is_valid_birthday("2021-02-30"));
        assert!(is_valid_birthday("0000-12-31"));
        assert!(!is_valid_birthday("1990-13-01"));
        assert!(!is_valid_birthday("1990-00-10"));
        assert!(!is_valid_birthday("1990-01-32"));
        assert!(!is_valid_birthday("1990-01-00"));
        assert!(!is_valid_birthday("1990-1-01"));
        assert!(!is_valid_birthday("1990/01/01"));
        assert!(!is_valid_birthday("1990-01-01T00"));
        assert!(!is_valid_birthday("１990-01-01"));
    }

    #[test]
    fn name_query_must_be_a_string() {
        assert_eq!(message(validate_name_query(&json!(12345))), "name must be a string");
        assert_eq!(validate_name_query(&json!("")).unwrap(), "");
        assert_eq!(validate_name_query(&json!("Jim Bob")).unwrap(), "Jim Bob");
    }

    #[test]
    fn delete_target_forms() {
        assert_eq!(
            validate_delete_target(&json!("William Grapeseed")).unwrap(),
            DeleteTarget::Name("William Grapeseed".into())
        );
        assert_eq!(
            validate_delete_target(&json!({ "name": "William Grapeseed" })).unwrap(),
            DeleteTarget::Name("William Grapeseed".into())
        );
        assert_eq!(
            validate_delete_target(&json!({ "identifier": "abc", "name": "William" })).unwrap(),
            DeleteTarget::Identifier("abc".into())
        );
    }

    #[test]
    fn delete_target_field_types() {
        assert_eq!(
            message(validate_delete_target(&json!({ "name": 12345 }))),
            "name must be a string"
        );
        assert_eq!(
            message(validate_delete_target(&json!({ "identifier": 12345 }))),
            "identifier must be a string"
        );
        assert_eq!(message(validate_delete_target(&json!({}))), NON_EMPTY_OBJECT);
        assert_eq!(message(validate_delete_target(&json!(7))), NON_EMPTY_OBJECT);
    }
}
