//! Extra-property projection
//!
//! Reads only fetch the default fields unless the caller names optional
//! ones in an `extraProperties` list. This module is the allow-list filter
//! for that list; it never rewrites it.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::OptionalProperty;

/// Validate an `extraProperties` argument
///
/// - `None` (argument omitted) resolves to an empty list
/// - anything but an array, `null` included, is rejected
/// - every element must name a member of [`OptionalProperty::ALL`]
///
/// Order and duplicates are preserved; the store decides how to fetch.
pub fn resolve_extra_properties(list: Option<&Value>) -> Result<Vec<OptionalProperty>> {
    let Some(list) = list else {
        return Ok(Vec::new());
    };

    let Value::Array(items) = list else {
        return Err(Error::invalid_argument("extraProperties must be an array"));
    };

    items
        .iter()
        .map(|item| {
            item.as_str()
                .and_then(|name| name.parse::<OptionalProperty>().ok())
                .ok_or_else(not_a_member)
        })
        .collect()
}

fn not_a_member() -> Error {
    Error::invalid_argument(format!(
        "properties in extraProperties must be one of {}",
        OptionalProperty::allowed_names()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOT_A_MEMBER: &str = "properties in extraProperties must be one of jobTitle, \
        departmentName, organizationName, middleName, note, contactImage, \
        contactThumbnailImage, instantMessageAddresses, socialProfiles, urlAddresses";

    #[test]
    fn omitted_list_is_empty() {
        assert!(resolve_extra_properties(None).unwrap().is_empty());
    }

    #[test]
    fn non_arrays_are_rejected() {
        for input in [json!("tsk-bad-array"), json!(12345), json!(null), json!({})] {
            assert_eq!(
                resolve_extra_properties(Some(&input)).unwrap_err().to_string(),
                "extraProperties must be an array"
            );
        }
    }

    #[test]
    fn unknown_members_list_the_full_set() {
        for input in [json!(["bad-property"]), json!(["note", 3]), json!(["firstName"])] {
            assert_eq!(
                resolve_extra_properties(Some(&input)).unwrap_err().to_string(),
                NOT_A_MEMBER
            );
        }
    }

    #[test]
    fn passes_members_through_unchanged() {
        let input = json!(["urlAddresses", "note", "note"]);
        assert_eq!(
            resolve_extra_properties(Some(&input)).unwrap(),
            vec![
                OptionalProperty::UrlAddresses,
                OptionalProperty::Note,
                OptionalProperty::Note,
            ]
        );
    }
}
