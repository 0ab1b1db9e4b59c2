use std::collections::HashSet;

use tracing::debug;

use crate::collect::snapshot_model::{FieldDescriptor, PageSnapshot};
use crate::fill::credential_model::IdentityData;
use crate::fill::generator::ScriptBuilder;
use crate::fill::iso::{country_code, state_code};
use crate::fill::keywords::{
    ADDRESS1_FIELD_NAMES, ADDRESS2_FIELD_NAMES, ADDRESS3_FIELD_NAMES, ADDRESS_FIELD_NAME_VALUES,
    ADDRESS_FIELD_NAMES, CITY_FIELD_NAMES, COMPANY_FIELD_NAMES, COUNTRY_FIELD_NAMES,
    EMAIL_FIELD_NAMES, EXCLUDED_AUTOFILL_TYPES, EXCLUDED_IDENTITY_AUTOCOMPLETE_TYPES,
    FIRST_NAME_FIELD_NAMES, FULL_NAME_FIELD_NAME_VALUES, FULL_NAME_FIELD_NAMES,
    IDENTITY_ATTRIBUTES, LAST_NAME_FIELD_NAMES, MIDDLE_NAME_FIELD_NAMES, PHONE_FIELD_NAMES,
    POSTAL_CODE_FIELD_NAMES, STATE_FIELD_NAMES, TITLE_FIELD_NAMES, USER_NAME_FIELD_NAMES,
};
use crate::fill::matching::{is_excluded_field_type, is_field_match};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityRole {
    Title,
    FullName,
    FirstName,
    MiddleName,
    LastName,
    Email,
    Address1,
    Address2,
    Address3,
    Address,
    PostalCode,
    City,
    State,
    Country,
    Phone,
    Username,
    Company,
}

impl IdentityRole {
    /// Roles in the order they are tried against each field.
    pub const ALL: [IdentityRole; 17] = [
        IdentityRole::Title,
        IdentityRole::FullName,
        IdentityRole::FirstName,
        IdentityRole::MiddleName,
        IdentityRole::LastName,
        IdentityRole::Email,
        IdentityRole::Address1,
        IdentityRole::Address2,
        IdentityRole::Address3,
        IdentityRole::Address,
        IdentityRole::PostalCode,
        IdentityRole::City,
        IdentityRole::State,
        IdentityRole::Country,
        IdentityRole::Phone,
        IdentityRole::Username,
        IdentityRole::Company,
    ];

    /// Full name and street address are matched one keyword at a time so a
    /// bare `name` or `address` still matches exactly. Other roles match the
    /// joined keyword string.
    fn matches(self, keywords: &[String], joined: &str) -> bool {
        match self {
            IdentityRole::Title => is_field_match(joined, TITLE_FIELD_NAMES, None),
            IdentityRole::FullName => keywords.iter().any(|k| {
                is_field_match(k, FULL_NAME_FIELD_NAMES, Some(FULL_NAME_FIELD_NAME_VALUES))
            }),
            IdentityRole::FirstName => is_field_match(joined, FIRST_NAME_FIELD_NAMES, None),
            IdentityRole::MiddleName => is_field_match(joined, MIDDLE_NAME_FIELD_NAMES, None),
            IdentityRole::LastName => is_field_match(joined, LAST_NAME_FIELD_NAMES, None),
            IdentityRole::Email => is_field_match(joined, EMAIL_FIELD_NAMES, None),
            IdentityRole::Address1 => is_field_match(joined, ADDRESS1_FIELD_NAMES, None),
            IdentityRole::Address2 => is_field_match(joined, ADDRESS2_FIELD_NAMES, None),
            IdentityRole::Address3 => is_field_match(joined, ADDRESS3_FIELD_NAMES, None),
            IdentityRole::Address => keywords
                .iter()
                .any(|k| is_field_match(k, ADDRESS_FIELD_NAMES, Some(ADDRESS_FIELD_NAME_VALUES))),
            IdentityRole::PostalCode => is_field_match(joined, POSTAL_CODE_FIELD_NAMES, None),
            IdentityRole::City => is_field_match(joined, CITY_FIELD_NAMES, None),
            IdentityRole::State => is_field_match(joined, STATE_FIELD_NAMES, None),
            IdentityRole::Country => is_field_match(joined, COUNTRY_FIELD_NAMES, None),
            IdentityRole::Phone => is_field_match(joined, PHONE_FIELD_NAMES, None),
            IdentityRole::Username => is_field_match(joined, USER_NAME_FIELD_NAMES, None),
            IdentityRole::Company => is_field_match(joined, COMPANY_FIELD_NAMES, None),
        }
    }

    /// Value this role fills from `identity`, if any.
    fn value(self, identity: &IdentityData) -> Option<String> {
        let value = match self {
            IdentityRole::Title => identity.title.clone(),
            IdentityRole::FullName => Some(identity.full_name()),
            IdentityRole::FirstName => identity.first_name.clone(),
            IdentityRole::MiddleName => identity.middle_name.clone(),
            IdentityRole::LastName => identity.last_name.clone(),
            IdentityRole::Email => identity.email.clone(),
            IdentityRole::Address1 => identity.address1.clone(),
            IdentityRole::Address2 => identity.address2.clone(),
            IdentityRole::Address3 => identity.address3.clone(),
            IdentityRole::Address => street_address(identity),
            IdentityRole::PostalCode => identity.postal_code.clone(),
            IdentityRole::City => identity.city.clone(),
            IdentityRole::State => identity
                .state
                .as_deref()
                .and_then(|s| region_value(s, state_code)),
            IdentityRole::Country => identity
                .country
                .as_deref()
                .and_then(|c| region_value(c, country_code)),
            IdentityRole::Phone => identity.phone.clone(),
            IdentityRole::Username => identity.username.clone(),
            IdentityRole::Company => identity.company.clone(),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// Address line 1 with lines 2 and 3 appended after commas. Nothing when
/// line 1 is empty.
fn street_address(identity: &IdentityData) -> Option<String> {
    let first = identity.address1.as_deref().filter(|a| !a.is_empty())?;
    let mut address = first.to_string();
    for line in [&identity.address2, &identity.address3] {
        if let Some(line) = line.as_deref().filter(|l| !l.is_empty()) {
            address.push_str(", ");
            address.push_str(line);
        }
    }
    Some(address)
}

/// Two-letter codes pass through; longer names are looked up.
fn region_value(name: &str, lookup: fn(&str) -> Option<&'static str>) -> Option<String> {
    if name.chars().count() <= 2 {
        return Some(name.to_string());
    }
    lookup(name).map(str::to_string)
}

/// Lowercased attribute values of `field`, deduplicated, in attribute order.
pub fn identity_keywords(field: &FieldDescriptor) -> Vec<String> {
    let mut seen = HashSet::new();
    IDENTITY_ATTRIBUTES
        .iter()
        .filter_map(|attr| field.attribute(*attr))
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

fn is_identity_candidate(field: &FieldDescriptor) -> bool {
    if is_excluded_field_type(field, &["password"]) || is_excluded_field_type(field, EXCLUDED_AUTOFILL_TYPES) {
        return false;
    }
    let autocomplete = field.auto_complete_type.as_deref().unwrap_or_default();
    if EXCLUDED_IDENTITY_AUTOCOMPLETE_TYPES.contains(&autocomplete) {
        return false;
    }
    field.viewable
}

pub(crate) fn generate_identity(builder: &mut ScriptBuilder, snapshot: &PageSnapshot, identity: &IdentityData) {
    let mut roles_filled: HashSet<IdentityRole> = HashSet::new();

    for field in &snapshot.fields {
        if !is_identity_candidate(field) || builder.filled.contains(&field.opid) {
            continue;
        }
        let keywords = identity_keywords(field);
        if keywords.is_empty() {
            continue;
        }
        let joined = keywords.join(",");

        let Some(role) = IdentityRole::ALL
            .into_iter()
            .find(|role| !roles_filled.contains(role) && role.matches(&keywords, &joined))
        else {
            continue;
        };

        if builder.fill_with_value(field, role.value(identity).as_deref()) {
            debug!(opid = %field.opid, ?role, "identity field filled");
            roles_filled.insert(role);
        }
    }
}
