use regex::RegexBuilder;
use tracing::warn;

use crate::collect::snapshot_model::{FieldAttribute, FieldDescriptor};
use crate::fill::keywords::{FIELD_IGNORE_LIST, PASSWORD_FIELD_EXCLUDE_LIST, SEARCH_FIELD_NAMES};

// ============================================================================
// Keyword comparison
// ============================================================================

/// Attributes compared by the fuzzy matcher, in order.
const FUZZY_ATTRIBUTES: &[FieldAttribute] = &[
    FieldAttribute::HtmlId,
    FieldAttribute::HtmlName,
    FieldAttribute::LabelTag,
    FieldAttribute::Placeholder,
    FieldAttribute::LabelLeft,
    FieldAttribute::LabelTop,
    FieldAttribute::LabelAria,
    FieldAttribute::DataSetValues,
];

/// `(attribute, prefix)` pairs tried by [`find_matching_field_index`].
/// A prefix restricts a `prefix=value` name to that attribute.
const EXACT_ATTRIBUTES: &[(FieldAttribute, &str)] = &[
    (FieldAttribute::HtmlId, "id"),
    (FieldAttribute::HtmlName, "name"),
    (FieldAttribute::LabelLeft, "label"),
    (FieldAttribute::LabelRight, "label"),
    (FieldAttribute::LabelTag, "label"),
    (FieldAttribute::LabelAria, "label"),
    (FieldAttribute::Placeholder, "placeholder"),
];

pub fn has_value(value: Option<&str>) -> bool {
    value.map(|v| !v.is_empty()).unwrap_or(false)
}

/// Lowercase and keep ASCII letters and digits only.
pub fn normalize_keyword(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Exact keyword match against `options`. Options listed in
/// `contains_options` (or all of them when it is `None`) also match as a
/// substring of the value.
pub fn is_field_match(value: &str, options: &[&str], contains_options: Option<&[&str]>) -> bool {
    let value = normalize_keyword(value);
    options.iter().any(|option| {
        let check_contains = contains_options.map(|c| c.contains(option)).unwrap_or(true);
        let option = option.to_lowercase().replace('-', "");
        value == option || (check_contains && value.contains(&option))
    })
}

fn fuzzy_match(options: &[&str], value: &str) -> bool {
    if options.is_empty() || value.is_empty() {
        return false;
    }
    let value = strip_line_breaks(value).trim().to_lowercase();
    options.iter().any(|option| value.contains(option))
}

/// True when any fuzzy attribute contains one of `names`.
pub fn field_is_fuzzy_match(field: &FieldDescriptor, names: &[&str]) -> bool {
    FUZZY_ATTRIBUTES.iter().any(|attr| {
        field
            .attribute(*attr)
            .filter(|v| !v.is_empty())
            .map(|v| fuzzy_match(names, v))
            .unwrap_or(false)
    })
}

fn strip_line_breaks(value: &str) -> String {
    value.replace(['\r', '\n'], "")
}

/// Compare one attribute value with a name. Names may be `regex=<pattern>`
/// (case-insensitive) or `csv=<a,b,c>`; otherwise the lowercased value must
/// equal the name.
pub fn field_property_is_match(value: Option<&str>, name: &str) -> bool {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return false;
    };
    let value = strip_line_breaks(value.trim());

    if let Some(pattern) = name.strip_prefix("regex=") {
        return match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => regex.is_match(&value),
            Err(e) => {
                warn!(pattern, error = %e, "invalid field name pattern");
                false
            }
        };
    }

    if let Some(list) = name.strip_prefix("csv=") {
        let value = value.to_lowercase();
        return list.split(',').any(|v| v.trim().to_lowercase() == value);
    }

    value.to_lowercase() == name
}

/// Index of the first name that matches one of the field's id, name,
/// labels or placeholder.
pub fn find_matching_field_index(field: &FieldDescriptor, names: &[&str]) -> Option<usize> {
    names.iter().position(|name| {
        if name.contains('=') {
            let prefixed = EXACT_ATTRIBUTES.iter().any(|(attr, prefix)| {
                name.strip_prefix(prefix)
                    .and_then(|rest| rest.strip_prefix('='))
                    .map(|rest| field_property_is_match(field.attribute(*attr), rest))
                    .unwrap_or(false)
            });
            if prefixed {
                return true;
            }
        }
        EXACT_ATTRIBUTES
            .iter()
            .any(|(attr, _)| field_property_is_match(field.attribute(*attr), name))
    })
}

// ============================================================================
// Field exclusion
// ============================================================================

/// Split on non-letters and on lower-to-upper case transitions.
fn attribute_keywords(value: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    for c in value.chars() {
        if !c.is_ascii_alphabetic() {
            words.push(std::mem::take(&mut current));
            previous_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && previous_lower {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = c.is_ascii_lowercase();
        current.push(c.to_ascii_lowercase());
    }
    words.push(current);
    words
}

/// Type, name, id or placeholder carry a search keyword.
pub fn is_search_field(field: &FieldDescriptor) -> bool {
    [
        field.field_type.as_deref(),
        field.html_name.as_deref(),
        field.html_id.as_deref(),
        field.placeholder.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|v| !v.is_empty())
    .any(|value| {
        attribute_keywords(value)
            .iter()
            .any(|word| SEARCH_FIELD_NAMES.contains(&word.as_str()))
    })
}

/// Custom-display spans, the listed input types and search boxes.
pub fn is_excluded_field_type(field: &FieldDescriptor, excluded_types: &[&str]) -> bool {
    if field.is_span() {
        return true;
    }
    if field
        .field_type
        .as_deref()
        .map(|t| excluded_types.contains(&t))
        .unwrap_or(false)
    {
        return true;
    }
    is_search_field(field)
}

fn clean_for_exclusion(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .collect()
}

/// Mentions "password" but none of the hint/captcha style exclusions.
pub fn value_is_like_password(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    let cleaned = clean_for_exclusion(value);
    if !cleaned.contains("password") {
        return false;
    }
    !PASSWORD_FIELD_EXCLUDE_LIST.iter().any(|i| cleaned.contains(i))
}

/// Id, name or placeholder mention captcha, forgot-password and the like.
pub fn field_has_disqualifying_attribute_value(field: &FieldDescriptor) -> bool {
    [
        field.html_id.as_deref(),
        field.html_name.as_deref(),
        field.placeholder.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(clean_for_exclusion)
    .filter(|v| !v.is_empty())
    .any(|cleaned| FIELD_IGNORE_LIST.iter().any(|i| cleaned.contains(i)))
}

