//! Canonical contact record shape
//!
//! [`Contact`] is a sparse record: a field is present exactly when it is
//! `Some`. [`ContactField`] enumerates every recognized field in the fixed
//! order the validation pipeline walks them, and [`OptionalProperty`] is the
//! allow-list of fields that reads only return when asked for.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A contact record as exchanged with the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Store-assigned opaque handle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_numbers: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_addresses: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_addresses: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_addresses: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instant_message_addresses: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_profiles: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_image: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_thumbnail_image: Option<Value>,
}

impl Contact {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first name
    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Set the last name
    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Set the nickname
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// `true` when no field is present
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Given name components joined by single spaces, skipping absent ones
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Keep the default fields plus the requested optional ones
    ///
    /// Everything else is cleared, so a read never returns an expensive
    /// field the caller did not opt into.
    pub fn project(&self, extra: &[OptionalProperty]) -> Contact {
        let mut projected = self.clone();

        for field in ContactField::ALL {
            let kept = DEFAULT_FIELDS.contains(&field)
                || extra.iter().any(|property| property.field() == field);
            if !kept {
                projected.clear(field);
            }
        }

        projected
    }

    /// Remove one field
    pub fn clear(&mut self, field: ContactField) {
        match field {
            ContactField::Identifier => self.identifier = None,
            ContactField::FirstName => self.first_name = None,
            ContactField::MiddleName => self.middle_name = None,
            ContactField::LastName => self.last_name = None,
            ContactField::Nickname => self.nickname = None,
            ContactField::JobTitle => self.job_title = None,
            ContactField::DepartmentName => self.department_name = None,
            ContactField::OrganizationName => self.organization_name = None,
            ContactField::Note => self.note = None,
            ContactField::Birthday => self.birthday = None,
            ContactField::PhoneNumbers => self.phone_numbers = None,
            ContactField::EmailAddresses => self.email_addresses = None,
            ContactField::PostalAddresses => self.postal_addresses = None,
            ContactField::UrlAddresses => self.url_addresses = None,
            ContactField::InstantMessageAddresses => self.instant_message_addresses = None,
            ContactField::SocialProfiles => self.social_profiles = None,
            ContactField::ContactImage => self.contact_image = None,
            ContactField::ContactThumbnailImage => self.contact_thumbnail_image = None,
        }
    }

    /// Overwrite every field present in `changes`, leaving the rest
    pub fn merge(&mut self, changes: Contact) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if changes.$field.is_some() { self.$field = changes.$field; })*
            };
        }

        take!(
            first_name,
            middle_name,
            last_name,
            nickname,
            job_title,
            department_name,
            organization_name,
            note,
            birthday,
            phone_numbers,
            email_addresses,
            postal_addresses,
            url_addresses,
            instant_message_addresses,
            social_profiles,
            contact_image,
            contact_thumbnail_image,
        );
    }
}

/// How a recognized field is type-checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Must be a string
    Text,
    /// Must be an array; entries are opaque
    Sequence,
    /// Must be a string, then must match `YYYY-MM-DD`
    Birthday,
    /// Never validated
    Opaque,
}

/// Every field a contact argument may carry, in validation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    Identifier,
    FirstName,
    MiddleName,
    LastName,
    Nickname,
    JobTitle,
    DepartmentName,
    OrganizationName,
    Note,
    Birthday,
    PhoneNumbers,
    EmailAddresses,
    PostalAddresses,
    UrlAddresses,
    InstantMessageAddresses,
    SocialProfiles,
    ContactImage,
    ContactThumbnailImage,
}

impl ContactField {
    /// Declared order; validation errors follow it
    pub const ALL: [ContactField; 18] = [
        ContactField::Identifier,
        ContactField::FirstName,
        ContactField::MiddleName,
        ContactField::LastName,
        ContactField::Nickname,
        ContactField::JobTitle,
        ContactField::DepartmentName,
        ContactField::OrganizationName,
        ContactField::Note,
        ContactField::Birthday,
        ContactField::PhoneNumbers,
        ContactField::EmailAddresses,
        ContactField::PostalAddresses,
        ContactField::UrlAddresses,
        ContactField::InstantMessageAddresses,
        ContactField::SocialProfiles,
        ContactField::ContactImage,
        ContactField::ContactThumbnailImage,
    ];

    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactField::Identifier => "identifier",
            ContactField::FirstName => "firstName",
            ContactField::MiddleName => "middleName",
            ContactField::LastName => "lastName",
            ContactField::Nickname => "nickname",
            ContactField::JobTitle => "jobTitle",
            ContactField::DepartmentName => "departmentName",
            ContactField::OrganizationName => "organizationName",
            ContactField::Note => "note",
            ContactField::Birthday => "birthday",
            ContactField::PhoneNumbers => "phoneNumbers",
            ContactField::EmailAddresses => "emailAddresses",
            ContactField::PostalAddresses => "postalAddresses",
            ContactField::UrlAddresses => "urlAddresses",
            ContactField::InstantMessageAddresses => "instantMessageAddresses",
            ContactField::SocialProfiles => "socialProfiles",
            ContactField::ContactImage => "contactImage",
            ContactField::ContactThumbnailImage => "contactThumbnailImage",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            ContactField::Birthday => FieldKind::Birthday,
            ContactField::PhoneNumbers
            | ContactField::EmailAddresses
            | ContactField::PostalAddresses
            | ContactField::UrlAddresses
            | ContactField::InstantMessageAddresses
            | ContactField::SocialProfiles => FieldKind::Sequence,
            ContactField::ContactImage | ContactField::ContactThumbnailImage => FieldKind::Opaque,
            _ => FieldKind::Text,
        }
    }

    /// Look a field up by wire name
    pub fn from_name(name: &str) -> Option<ContactField> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields that reads skip unless explicitly requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionalProperty {
    JobTitle,
    DepartmentName,
    OrganizationName,
    MiddleName,
    Note,
    ContactImage,
    ContactThumbnailImage,
    InstantMessageAddresses,
    SocialProfiles,
    UrlAddresses,
}

impl OptionalProperty {
    /// The full set, in the order it is reported to callers
    pub const ALL: [OptionalProperty; 10] = [
        OptionalProperty::JobTitle,
        OptionalProperty::DepartmentName,
        OptionalProperty::OrganizationName,
        OptionalProperty::MiddleName,
        OptionalProperty::Note,
        OptionalProperty::ContactImage,
        OptionalProperty::ContactThumbnailImage,
        OptionalProperty::InstantMessageAddresses,
        OptionalProperty::SocialProfiles,
        OptionalProperty::UrlAddresses,
    ];

    pub fn as_str(&self) -> &'static str {
        self.field().as_str()
    }

    /// The contact field this property unlocks
    pub fn field(&self) -> ContactField {
        match self {
            OptionalProperty::JobTitle => ContactField::JobTitle,
            OptionalProperty::DepartmentName => ContactField::DepartmentName,
            OptionalProperty::OrganizationName => ContactField::OrganizationName,
            OptionalProperty::MiddleName => ContactField::MiddleName,
            OptionalProperty::Note => ContactField::Note,
            OptionalProperty::ContactImage => ContactField::ContactImage,
            OptionalProperty::ContactThumbnailImage => ContactField::ContactThumbnailImage,
            OptionalProperty::InstantMessageAddresses => ContactField::InstantMessageAddresses,
            OptionalProperty::SocialProfiles => ContactField::SocialProfiles,
            OptionalProperty::UrlAddresses => ContactField::UrlAddresses,
        }
    }

    /// Comma-joined names of the whole set
    pub fn allowed_names() -> String {
        Self::ALL
            .iter()
            .map(OptionalProperty::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for OptionalProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionalProperty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|property| property.as_str() == s)
            .ok_or(())
    }
}

/// Fields every read returns when the store has them
pub const DEFAULT_FIELDS: [ContactField; 8] = [
    ContactField::Identifier,
    ContactField::FirstName,
    ContactField::LastName,
    ContactField::Nickname,
    ContactField::Birthday,
    ContactField::PhoneNumbers,
    ContactField::EmailAddresses,
    ContactField::PostalAddresses,
];

/// Authorization state of the host contact store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthStatus {
    #[serde(rename = "Not Determined")]
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
}

impl AuthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStatus::NotDetermined => "Not Determined",
            AuthStatus::Restricted => "Restricted",
            AuthStatus::Denied => "Denied",
            AuthStatus::Authorized => "Authorized",
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "notdetermined" => Ok(AuthStatus::NotDetermined),
            "restricted" => Ok(AuthStatus::Restricted),
            "denied" => Ok(AuthStatus::Denied),
            "authorized" => Ok(AuthStatus::Authorized),
            _ => Err(crate::Error::config(format!(
                "Unknown authorization status: {}",
                s
            ))),
        }
    }
}

/// Success indicator returned by `create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreateOutcome {
    /// Plain boolean acknowledgement
    Saved(bool),
    /// The store reported the identifier of the new record
    Created { identifier: String },
}

impl CreateOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            CreateOutcome::Saved(saved) => *saved,
            CreateOutcome::Created { .. } => true,
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        match self {
            CreateOutcome::Saved(_) => None,
            CreateOutcome::Created { identifier } => Some(identifier),
        }
    }
}

/// Record a delete call resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Identifier(String),
    Name(String),
}

impl fmt::Display for DeleteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteTarget::Identifier(id) => write!(f, "identifier {}", id),
            DeleteTarget::Name(name) => write!(f, "name '{}'", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn allowed_names_match_reported_order() {
        assert_eq!(
            OptionalProperty::allowed_names(),
            "jobTitle, departmentName, organizationName, middleName, note, contactImage, \
             contactThumbnailImage, instantMessageAddresses, socialProfiles, urlAddresses"
        );
    }

    #[test]
    fn optional_property_parses_wire_names_only() {
        assert_eq!("note".parse::<OptionalProperty>(), Ok(OptionalProperty::Note));
        assert!("Note".parse::<OptionalProperty>().is_err());
        assert!("firstName".parse::<OptionalProperty>().is_err());
    }

    #[test]
    fn contact_serializes_sparse_camel_case() {
        let contact = Contact::new()
            .with_first_name("William")
            .with_last_name("Grapeseed");

        assert_eq!(
            serde_json::to_value(&contact).unwrap(),
            json!({ "firstName": "William", "lastName": "Grapeseed" })
        );
    }

    #[test]
    fn project_drops_unrequested_optional_fields() {
        let contact = Contact {
            first_name: Some("Ada".into()),
            job_title: Some("Engineer".into()),
            note: Some("met at conference".into()),
            phone_numbers: Some(vec![json!("+1234567890")]),
            ..Contact::default()
        };

        let projected = contact.project(&[OptionalProperty::Note]);

        assert_eq!(projected.first_name.as_deref(), Some("Ada"));
        assert_eq!(projected.note.as_deref(), Some("met at conference"));
        assert_eq!(projected.job_title, None);
        assert!(projected.phone_numbers.is_some());
    }

    fn every_field_set() -> Contact {
        let mut record = serde_json::Map::new();
        for field in ContactField::ALL {
            let value = match field.kind() {
                FieldKind::Sequence => json!(["entry"]),
                FieldKind::Birthday => json!("1990-09-09"),
                _ => json!("value"),
            };
            record.insert(field.as_str().to_string(), value);
        }
        serde_json::from_value(Value::Object(record)).unwrap()
    }

    fn present_fields(contact: &Contact) -> Vec<String> {
        let value = serde_json::to_value(contact).unwrap();
        let mut names: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    fn sorted_names(fields: impl IntoIterator<Item = ContactField>) -> Vec<String> {
        let mut names: Vec<String> = fields.into_iter().map(|f| f.as_str().to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn project_without_extras_keeps_exactly_the_default_fields() {
        let projected = every_field_set().project(&[]);
        assert_eq!(present_fields(&projected), sorted_names(DEFAULT_FIELDS));
    }

    #[test]
    fn project_with_every_extra_keeps_the_whole_record() {
        let projected = every_field_set().project(&OptionalProperty::ALL);
        assert_eq!(present_fields(&projected), sorted_names(ContactField::ALL));
    }

    #[test]
    fn project_adds_each_requested_property_alone() {
        for property in OptionalProperty::ALL {
            let projected = every_field_set().project(&[property]);
            let expected = sorted_names(DEFAULT_FIELDS.into_iter().chain([property.field()]));
            assert_eq!(present_fields(&projected), expected, "{}", property);
        }
    }

    #[test]
    fn merge_overwrites_present_fields_only() {
        let mut stored = Contact::new()
            .with_first_name("William")
            .with_nickname("Billy");
        stored.identifier = Some("memory-1".into());

        stored.merge(Contact::new().with_nickname("Will"));

        assert_eq!(stored.first_name.as_deref(), Some("William"));
        assert_eq!(stored.nickname.as_deref(), Some("Will"));
        assert_eq!(stored.identifier.as_deref(), Some("memory-1"));
    }

    #[test]
    fn full_name_skips_missing_parts() {
        let contact = Contact::new()
            .with_first_name("William")
            .with_last_name("Grapeseed");
        assert_eq!(contact.full_name(), "William Grapeseed");
        assert_eq!(Contact::new().full_name(), "");
    }

    #[test]
    fn every_field_round_trips_by_name() {
        for field in ContactField::ALL {
            assert_eq!(ContactField::from_name(field.as_str()), Some(field));
        }
    }

    #[test]
    fn default_and_optional_fields_partition_the_record() {
        let optional: Vec<ContactField> = OptionalProperty::ALL
            .iter()
            .map(OptionalProperty::field)
            .collect();

        for field in ContactField::ALL {
            assert_ne!(
                DEFAULT_FIELDS.contains(&field),
                optional.contains(&field),
                "{} must be either default or optional",
                field
            );
        }
    }

    #[test]
    fn auth_status_parses_loosely() {
        assert_eq!("not-determined".parse::<AuthStatus>().unwrap(), AuthStatus::NotDetermined);
        assert_eq!("Authorized".parse::<AuthStatus>().unwrap(), AuthStatus::Authorized);
        assert!("maybe".parse::<AuthStatus>().is_err());
    }
}
