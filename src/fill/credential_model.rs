use serde::{Deserialize, Serialize};

use crate::fill::trust::UriMatchStrategy;

// ============================================================================
// Credential record
// ============================================================================

/// One stored item, already decrypted by the caller. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// User-defined fields matched by name before any type-specific pass
    #[serde(default)]
    pub fields: Vec<CustomField>,
    #[serde(flatten)]
    pub kind: CredentialKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CredentialKind {
    Login(LoginData),
    Card(CardData),
    Identity(IdentityData),
    SecureNote,
}

impl CredentialKind {
    pub fn name(&self) -> &'static str {
        match self {
            CredentialKind::Login(_) => "login",
            CredentialKind::Card(_) => "card",
            CredentialKind::Identity(_) => "identity",
            CredentialKind::SecureNote => "secureNote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoginData {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Opaque secret handed to the one-time-code provider
    #[serde(default)]
    pub totp: Option<String>,
    #[serde(default)]
    pub uris: Vec<LoginUri>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginUri {
    pub uri: String,
    /// Falls back to the caller's default strategy when absent
    #[serde(rename = "match", default)]
    pub match_strategy: Option<UriMatchStrategy>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardData {
    pub cardholder_name: Option<String>,
    pub number: Option<String>,
    /// Unpadded, one-based month ("1" for January)
    pub exp_month: Option<String>,
    /// Two or four digits
    pub exp_year: Option<String>,
    pub code: Option<String>,
    pub brand: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityData {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub ssn: Option<String>,
    pub username: Option<String>,
    pub passport_number: Option<String>,
    pub license_number: Option<String>,
}

impl IdentityData {
    /// First, middle and last name joined by single spaces, skipping gaps.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .filter_map(|part| part.as_deref().filter(|p| !p.is_empty()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ============================================================================
// Custom fields
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    #[serde(default)]
    pub name: Option<String>,
    /// `None` is distinct from an empty string and from boolean false
    #[serde(default)]
    pub value: Option<String>,
    #[serde(rename = "type", default)]
    pub field_type: CustomFieldType,
    #[serde(rename = "linkedId", default)]
    pub linked_id: Option<LinkedId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomFieldType {
    #[default]
    Text,
    Hidden,
    Boolean,
    Linked,
}

/// Credential property a linked custom field points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkedId {
    Username,
    Password,

    CardholderName,
    ExpMonth,
    ExpYear,
    Code,
    Brand,
    Number,

    Title,
    MiddleName,
    Address1,
    Address2,
    Address3,
    City,
    State,
    PostalCode,
    Country,
    Company,
    Email,
    Phone,
    Ssn,
    IdentityUsername,
    PassportNumber,
    LicenseNumber,
    FirstName,
    LastName,
    FullName,
}

impl Credential {
    /// Value of the property `linked` points at. `None` when the property
    /// belongs to another credential type or is unset.
    pub fn linked_value(&self, linked: LinkedId) -> Option<String> {
        match &self.kind {
            CredentialKind::Login(login) => match linked {
                LinkedId::Username => login.username.clone(),
                LinkedId::Password => login.password.clone(),
                _ => None,
            },
            CredentialKind::Card(card) => match linked {
                LinkedId::CardholderName => card.cardholder_name.clone(),
                LinkedId::ExpMonth => card.exp_month.clone(),
                LinkedId::ExpYear => card.exp_year.clone(),
                LinkedId::Code => card.code.clone(),
                LinkedId::Brand => card.brand.clone(),
                LinkedId::Number => card.number.clone(),
                _ => None,
            },
            CredentialKind::Identity(identity) => match linked {
                LinkedId::Title => identity.title.clone(),
                LinkedId::MiddleName => identity.middle_name.clone(),
                LinkedId::Address1 => identity.address1.clone(),
                LinkedId::Address2 => identity.address2.clone(),
                LinkedId::Address3 => identity.address3.clone(),
                LinkedId::City => identity.city.clone(),
                LinkedId::State => identity.state.clone(),
                LinkedId::PostalCode => identity.postal_code.clone(),
                LinkedId::Country => identity.country.clone(),
                LinkedId::Company => identity.company.clone(),
                LinkedId::Email => identity.email.clone(),
                LinkedId::Phone => identity.phone.clone(),
                LinkedId::Ssn => identity.ssn.clone(),
                LinkedId::IdentityUsername => identity.username.clone(),
                LinkedId::PassportNumber => identity.passport_number.clone(),
                LinkedId::LicenseNumber => identity.license_number.clone(),
                LinkedId::FirstName => identity.first_name.clone(),
                LinkedId::LastName => identity.last_name.clone(),
                LinkedId::FullName => Some(identity.full_name()),
                _ => None,
            },
            CredentialKind::SecureNote => None,
        }
    }

    pub fn login(&self) -> Option<&LoginData> {
        match &self.kind {
            CredentialKind::Login(login) => Some(login),
            _ => None,
        }
    }
}
