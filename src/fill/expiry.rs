use chrono::Datelike;
use regex::RegexBuilder;

use crate::collect::snapshot_model::FieldDescriptor;
use crate::fill::keywords::{
    CARD_ATTRIBUTES_EXTENDED, CARD_EXPIRY_DATE_DELIMITERS, CARD_EXPIRY_DATE_FORMATS,
    ExpiryDateFormat, MONTH_ABBR, YEAR_ABBR_LONG, YEAR_ABBR_SHORT,
};

// ============================================================================
// Shared helpers
// ============================================================================

/// First two digits of the current year.
pub fn current_century() -> String {
    format!("{:02}", chrono::Utc::now().year() / 100)
}

/// Digits of a stored year, widened to four digits when only two are given.
pub fn normalize_expiry_year(year: &str) -> String {
    let digits: String = year.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        1 => format!("{}0{}", current_century(), digits),
        2 => format!("{}{}", current_century(), digits),
        _ => digits,
    }
}

/// Zero-padded two-digit month.
pub fn padded_month(month: &str) -> String {
    let month = month.trim();
    if month.chars().count() >= 2 {
        month.chars().rev().take(2).collect::<Vec<_>>().into_iter().rev().collect()
    } else {
        format!("0{}", month)
    }
}

pub(crate) fn tail(value: &str, n: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    chars[chars.len().saturating_sub(n)..].iter().collect()
}

/// True when any card attribute, lowercased and without spaces, contains
/// `needle`.
pub fn field_attrs_contain(field: &FieldDescriptor, needle: &str) -> bool {
    CARD_ATTRIBUTES_EXTENDED.iter().any(|attr| {
        field
            .attribute(*attr)
            .filter(|v| !v.is_empty())
            .map(|v| v.replace(' ', "").to_lowercase().contains(needle))
            .unwrap_or(false)
    })
}

// ============================================================================
// Format inference
// ============================================================================

/// The first month/year placeholder run found in the field's attributes,
/// e.g. `"mm/yy"`, with the locale tokens it was written in.
pub fn expected_expiry_format(field: &FieldDescriptor) -> Option<(String, ExpiryDateFormat)> {
    let delimiters: String = CARD_EXPIRY_DATE_DELIMITERS
        .iter()
        .map(|d| regex::escape(d))
        .collect();

    for format in CARD_EXPIRY_DATE_FORMATS {
        let ExpiryDateFormat { month, month_short, year, year_short } = *format;
        let pattern = format!(
            "(({m}|{ms})[{d}]?({y}|{ys}))|(({y}|{ys})[{d}]?({m}|{ms}))",
            m = month,
            ms = month_short,
            y = year,
            ys = year_short,
            d = delimiters,
        );
        let Ok(regex) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
            continue;
        };

        for attr in CARD_ATTRIBUTES_EXTENDED {
            let Some(value) = field.attribute(*attr) else {
                continue;
            };
            if let Some(found) = regex.find(&value.to_lowercase()) {
                return Some((found.as_str().to_string(), *format));
            }
        }
    }
    None
}

/// Combined expiry shaped after the format hinted by the field. Without a
/// hint the value is `YYYY-MM`.
pub fn inferred_combined_expiry(month: &str, year: &str, field: &FieldDescriptor) -> String {
    let mut pad_month = true;
    let mut full_year = true;
    let mut delimiter = "-".to_string();
    let mut year_first = true;

    if let Some((format, tokens)) = expected_expiry_format(field) {
        delimiter = format
            .chars()
            .find(|c| CARD_EXPIRY_DATE_DELIMITERS.iter().any(|d| d.starts_with(*c)))
            .map(String::from)
            .unwrap_or_default();

        if format.starts_with(&format!("{}{}", tokens.month, delimiter)) {
            pad_month = true;
            year_first = false;
        } else if format.starts_with(&format!("{}{}", tokens.month_short, delimiter)) {
            pad_month = false;
            year_first = false;
        } else {
            year_first = true;
            pad_month = format.contains(tokens.month);
        }
        full_year = format.contains(tokens.year);
    }

    let month = if pad_month {
        padded_month(month)
    } else {
        month.trim().trim_start_matches('0').to_string()
    };
    let year = tail(&format!("{}{}", current_century(), year.trim()), if full_year { 4 } else { 2 });

    if year_first {
        format!("{}{}{}", year, delimiter, month)
    } else {
        format!("{}{}{}", month, delimiter, year)
    }
}

// ============================================================================
// Literal-token matching
// ============================================================================

/// Combined expiry chosen by looking for literal tokens such as `mm/yyyy`
/// or `yymm` in the field's attributes. Falls back to `YYYY-MM`.
pub fn legacy_combined_expiry(month: &str, year: &str, field: &FieldDescriptor) -> String {
    let full_month = padded_month(month);
    let year = year.trim();
    let (full_year, part_year) = match year.chars().count() {
        2 => (normalize_expiry_year(year), Some(year.to_string())),
        4 => (year.to_string(), Some(tail(year, 2))),
        _ => (year.to_string(), None),
    };

    for ((m, long), short) in MONTH_ABBR.iter().zip(YEAR_ABBR_LONG).zip(YEAR_ABBR_SHORT) {
        // (token, value) in priority order; `None` values need a two-digit year.
        let candidates: [(String, Option<String>); 12] = [
            (format!("{m}/{long}"), Some(format!("{full_month}/{full_year}"))),
            (format!("{m}/{short}"), part_year.as_ref().map(|p| format!("{full_month}/{p}"))),
            (format!("{long}/{m}"), Some(format!("{full_year}/{full_month}"))),
            (format!("{short}/{m}"), part_year.as_ref().map(|p| format!("{p}/{full_month}"))),
            (format!("{m}-{long}"), Some(format!("{full_month}-{full_year}"))),
            (format!("{m}-{short}"), part_year.as_ref().map(|p| format!("{full_month}-{p}"))),
            (format!("{long}-{m}"), Some(format!("{full_year}-{full_month}"))),
            (format!("{short}-{m}"), part_year.as_ref().map(|p| format!("{p}-{full_month}"))),
            (format!("{long}{m}"), Some(format!("{full_year}{full_month}"))),
            (format!("{short}{m}"), part_year.as_ref().map(|p| format!("{p}{full_month}"))),
            (format!("{m}{long}"), Some(format!("{full_month}{full_year}"))),
            (format!("{m}{short}"), part_year.as_ref().map(|p| format!("{full_month}{p}"))),
        ];

        for (token, value) in candidates {
            if let Some(value) = value {
                if field_attrs_contain(field, &token) {
                    return value;
                }
            }
        }
    }

    format!("{}-{}", full_year, full_month)
}
