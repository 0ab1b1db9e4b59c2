use tracing::debug;

use crate::collect::snapshot_model::{FieldDescriptor, PageSnapshot};
use crate::fill::credential_model::CardData;
use crate::fill::expiry::{
    current_century, field_attrs_contain, inferred_combined_expiry, legacy_combined_expiry, tail,
};
use crate::fill::generator::ScriptBuilder;
use crate::fill::keywords::{
    CARD_ATTRIBUTES, CARD_BRAND_FIELD_NAMES, CARD_EXPIRY_FIELD_NAME_VALUES, CARD_EXPIRY_FIELD_NAMES,
    CARD_HOLDER_FIELD_NAME_VALUES, CARD_HOLDER_FIELD_NAMES, CARD_NUMBER_FIELD_NAME_VALUES,
    CARD_NUMBER_FIELD_NAMES, CVV_FIELD_NAMES, EXCLUDED_AUTOFILL_TYPES, EXPIRY_MONTH_FIELD_NAMES,
    EXPIRY_YEAR_FIELD_NAMES,
};
use crate::fill::matching::{is_excluded_field_type, is_field_match};
use crate::fill::script_model::GenerateOptions;

// ============================================================================
// Field roles
// ============================================================================

/// The page field chosen for each card value. At most one field per role.
#[derive(Debug, Default)]
pub struct CardFields<'a> {
    pub cardholder_name: Option<&'a FieldDescriptor>,
    pub number: Option<&'a FieldDescriptor>,
    pub exp: Option<&'a FieldDescriptor>,
    pub exp_month: Option<&'a FieldDescriptor>,
    pub exp_year: Option<&'a FieldDescriptor>,
    pub code: Option<&'a FieldDescriptor>,
    pub brand: Option<&'a FieldDescriptor>,
}

impl<'a> CardFields<'a> {
    /// Give `field` the first still-unassigned role its attribute `value`
    /// names. Returns whether a role was taken.
    fn assign(&mut self, field: &'a FieldDescriptor, value: &str) -> bool {
        let slot = if self.cardholder_name.is_none()
            && is_field_match(value, CARD_HOLDER_FIELD_NAMES, Some(CARD_HOLDER_FIELD_NAME_VALUES))
        {
            &mut self.cardholder_name
        } else if self.number.is_none()
            && is_field_match(value, CARD_NUMBER_FIELD_NAMES, Some(CARD_NUMBER_FIELD_NAME_VALUES))
        {
            &mut self.number
        } else if self.exp.is_none()
            && is_field_match(value, CARD_EXPIRY_FIELD_NAMES, Some(CARD_EXPIRY_FIELD_NAME_VALUES))
        {
            &mut self.exp
        } else if self.exp_month.is_none() && is_field_match(value, EXPIRY_MONTH_FIELD_NAMES, None) {
            &mut self.exp_month
        } else if self.exp_year.is_none() && is_field_match(value, EXPIRY_YEAR_FIELD_NAMES, None) {
            &mut self.exp_year
        } else if self.code.is_none() && is_field_match(value, CVV_FIELD_NAMES, None) {
            &mut self.code
        } else if self.brand.is_none() && is_field_match(value, CARD_BRAND_FIELD_NAMES, None) {
            &mut self.brand
        } else {
            return false;
        };
        *slot = Some(field);
        true
    }
}

/// Classify the snapshot's viewable fields into card roles. Each field is
/// examined attribute by attribute and takes the first role it matches.
pub fn classify_card_fields(snapshot: &PageSnapshot) -> CardFields<'_> {
    let mut roles = CardFields::default();
    for field in &snapshot.fields {
        if is_excluded_field_type(field, EXCLUDED_AUTOFILL_TYPES) || !field.viewable {
            continue;
        }
        for attr in CARD_ATTRIBUTES {
            let Some(value) = field.attribute(*attr).filter(|v| !v.is_empty()) else {
                continue;
            };
            if roles.assign(field, value) {
                break;
            }
        }
    }
    roles
}

// ============================================================================
// Value shaping
// ============================================================================

/// Month value for `field`. Twelve- and thirteen-option selects are filled by
/// position; text fields are padded when they ask for `MM`.
fn month_value(field: &FieldDescriptor, month: &str) -> Option<String> {
    let month = month.trim();
    if let Some(info) = field.select_info.as_ref().filter(|i| !i.options.is_empty()) {
        let number: usize = month.parse().ok()?;
        let index = match info.options.len() {
            12 => number.checked_sub(1)?,
            13 => {
                let placeholder_last = info.options[0].0.as_deref().is_some_and(|t| !t.is_empty())
                    && info.options[12].0.as_deref().is_none_or(str::is_empty);
                if placeholder_last { number.checked_sub(1)? } else { number }
            }
            _ => return Some(month.to_string()),
        };
        return info.options.get(index).map(|o| o.1.clone());
    }

    if (field_attrs_contain(field, "mm") || field.max_length == Some(2)) && month.chars().count() == 1 {
        return Some(format!("0{}", month));
    }
    Some(month.to_string())
}

/// Year value for `field`. Selects take the option naming the year; text
/// fields are widened or truncated to what they ask for.
fn year_value(field: &FieldDescriptor, year: &str) -> Option<String> {
    let year = year.trim();
    if let Some(info) = field.select_info.as_ref().filter(|i| !i.options.is_empty()) {
        let short = (year.chars().count() == 4).then(|| tail(year, 2));
        return info
            .options
            .iter()
            .find(|option| {
                let text = option.0.as_deref().unwrap_or_default();
                let raw = option.1.as_str();
                if text == year || raw == year {
                    return true;
                }
                if raw.len() == 2 && short.as_deref() == Some(raw) {
                    return true;
                }
                // "Year: 2027" style options
                raw.split_once(':')
                    .map(|(_, rest)| rest.trim())
                    .is_some_and(|rest| !rest.is_empty() && rest == year)
            })
            .map(|option| option.1.clone());
    }

    let width = year.chars().count();
    if field_attrs_contain(field, "yyyy") || field.max_length == Some(4) {
        if width == 2 {
            return Some(format!("{}{}", current_century(), year));
        }
    } else if (field_attrs_contain(field, "yy") || field.max_length == Some(2)) && width == 4 {
        return Some(tail(year, 2));
    }
    Some(year.to_string())
}

// ============================================================================
// Card sub-generator
// ============================================================================

pub(crate) fn generate_card(
    builder: &mut ScriptBuilder,
    snapshot: &PageSnapshot,
    card: &CardData,
    options: &GenerateOptions,
) {
    let roles = classify_card_fields(snapshot);
    debug!(?roles, "card fields classified");

    if let Some(field) = roles.cardholder_name {
        builder.fill_with_value(field, card.cardholder_name.as_deref());
    }
    if let Some(field) = roles.number {
        builder.fill_with_value(field, card.number.as_deref());
    }
    if let Some(field) = roles.code {
        builder.fill_with_value(field, card.code.as_deref());
    }
    if let Some(field) = roles.brand {
        builder.fill_with_value(field, card.brand.as_deref());
    }

    let month = card.exp_month.as_deref().map(str::trim).filter(|m| !m.is_empty());
    let year = card.exp_year.as_deref().map(str::trim).filter(|y| !y.is_empty());

    if let (Some(field), Some(month)) = (roles.exp_month, month) {
        if !builder.filled.contains(&field.opid) {
            if let Some(value) = month_value(field, month) {
                builder.fill_field(field, &value);
            }
        }
    }

    if let (Some(field), Some(year)) = (roles.exp_year, year) {
        if !builder.filled.contains(&field.opid) {
            if let Some(value) = year_value(field, year) {
                builder.fill_field(field, &value);
            }
        }
    }

    if let (Some(field), Some(month), Some(year)) = (roles.exp, month, year) {
        let value = if options.legacy_combined_expiry {
            legacy_combined_expiry(month, year, field)
        } else {
            inferred_combined_expiry(month, year, field)
        };
        builder.fill_with_value(field, Some(&value));
    }
}
