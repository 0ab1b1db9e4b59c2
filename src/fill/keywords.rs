//! Keyword tables used to classify fields. Entries are matched against
//! lowercased attribute text; see `matching` for the comparison rules.

use crate::collect::snapshot_model::FieldAttribute;

// ============================================================================
// Login
// ============================================================================

pub const USERNAME_FIELD_NAMES: &[&str] = &[
    // English
    "username",
    "user name",
    "email",
    "email address",
    "e-mail",
    "e-mail address",
    "userid",
    "user id",
    "customer id",
    "login id",
    "login",
    // German
    "benutzername",
    "benutzer name",
    "email adresse",
    "e-mail adresse",
    "benutzerid",
    "benutzer id",
];

pub const TOTP_FIELD_NAMES: &[&str] = &[
    "totp",
    "2fa",
    "mfa",
    "totpcode",
    "2facode",
    "approvals_code",
    "mfacode",
    "otc-code",
    "onetimecode",
    "otp-code",
    "otpcode",
    "onetimepassword",
    "security_code",
    "second-factor",
    "twofactor",
    "twofa",
    "twofactorcode",
    "verificationcode",
    "verification code",
];

pub const AMBIGUOUS_TOTP_FIELD_NAMES: &[&str] = &["code", "pin", "otc", "otp"];

pub const SEARCH_FIELD_NAMES: &[&str] = &["search", "query", "find", "go"];

pub const FIELD_IGNORE_LIST: &[&str] = &["captcha", "findanything", "forgot"];

pub const PASSWORD_FIELD_EXCLUDE_LIST: &[&str] =
    &["hint", "captcha", "findanything", "forgot", "onetimepassword"];

pub const EXCLUDED_AUTOFILL_LOGIN_TYPES: &[&str] =
    &["hidden", "file", "button", "image", "reset", "search"];

pub const EXCLUDED_AUTOFILL_TYPES: &[&str] = &[
    "radio", "checkbox", "hidden", "file", "button", "image", "reset", "search",
];

pub const EXCLUDED_IDENTITY_AUTOCOMPLETE_TYPES: &[&str] = &["current-password", "new-password"];

pub const ONE_TIME_CODE_AUTOCOMPLETE: &str = "one-time-code";

pub fn totp_field_names() -> Vec<&'static str> {
    TOTP_FIELD_NAMES
        .iter()
        .chain(AMBIGUOUS_TOTP_FIELD_NAMES)
        .copied()
        .collect()
}

// ============================================================================
// Payment card
// ============================================================================

/// Attributes searched, in order, when classifying card fields.
pub const CARD_ATTRIBUTES: &[FieldAttribute] = &[
    FieldAttribute::AutoCompleteType,
    FieldAttribute::DataStripe,
    FieldAttribute::HtmlName,
    FieldAttribute::HtmlId,
    FieldAttribute::Title,
    FieldAttribute::LabelTag,
    FieldAttribute::Placeholder,
    FieldAttribute::LabelLeft,
    FieldAttribute::LabelTop,
];

/// Card attributes plus the right-hand label; used for format hints.
pub const CARD_ATTRIBUTES_EXTENDED: &[FieldAttribute] = &[
    FieldAttribute::AutoCompleteType,
    FieldAttribute::DataStripe,
    FieldAttribute::HtmlName,
    FieldAttribute::HtmlId,
    FieldAttribute::Title,
    FieldAttribute::LabelTag,
    FieldAttribute::Placeholder,
    FieldAttribute::LabelLeft,
    FieldAttribute::LabelTop,
    FieldAttribute::LabelRight,
];

pub const CARD_HOLDER_FIELD_NAMES: &[&str] = &[
    "accountholdername",
    "cc-name",
    "card-name",
    "cardholder-name",
    "cardholder",
    "name",
    "nom",
];

pub const CARD_HOLDER_FIELD_NAME_VALUES: &[&str] =
    &["cc-name", "card-name", "cardholder-name", "cardholder", "tbName"];

pub const CARD_NUMBER_FIELD_NAMES: &[&str] = &[
    "cc-number",
    "cc-num",
    "card-number",
    "card-num",
    "number",
    "cc",
    "cc-no",
    "card-no",
    "credit-card",
    "numero-carte",
    "carte",
    "carte-credit",
    "num-carte",
    "cb-num",
    "card-pan",
];

pub const CARD_NUMBER_FIELD_NAME_VALUES: &[&str] = &[
    "cc-number",
    "cc-num",
    "card-number",
    "card-num",
    "cc-no",
    "card-no",
    "numero-carte",
    "num-carte",
    "cb-num",
    "card-pan",
];

pub const CARD_EXPIRY_FIELD_NAMES: &[&str] = &[
    "cc-exp",
    "card-exp",
    "cc-expiration",
    "card-expiration",
    "cc-ex",
    "card-ex",
    "card-expire",
    "card-expiry",
    "validite",
    "expiration",
    "expiry",
    "mm-yy",
    "mm-yyyy",
    "yy-mm",
    "yyyy-mm",
    "expiration-date",
    "payment-cc-date",
    "expiry-date",
    "valid-thru",
];

pub const CARD_EXPIRY_FIELD_NAME_VALUES: &[&str] = &[
    "mm-yy",
    "mm-yyyy",
    "yy-mm",
    "yyyy-mm",
    "expiration-date",
    "payment-cc-date",
    "expiry-date",
    "valid-thru",
];

pub const EXPIRY_MONTH_FIELD_NAMES: &[&str] = &[
    "exp-month",
    "cc-exp-month",
    "cc-month",
    "card-month",
    "cc-mo",
    "card-mo",
    "exp-mo",
    "card-exp-mo",
    "cc-exp-mo",
    "card-expiration-month",
    "expiration-month",
    "cc-mm",
    "cc-m",
    "card-mm",
    "card-m",
    "card-exp-mm",
    "cc-exp-mm",
    "exp-mm",
    "exp-m",
    "expire-month",
    "expire-mo",
    "expiry-month",
    "expiry-mo",
    "card-expire-month",
    "card-expire-mo",
    "card-expiry-month",
    "card-expiry-mo",
    "mois-validite",
    "mois-expiration",
    "m-validite",
    "m-expiration",
    "expiry-date-field-month",
    "expiration-date-month",
    "expiration-date-mm",
    "exp-mon",
    "validity-mo",
    "exp-date-mo",
    "cb-date-mois",
    "date-m",
];

pub const EXPIRY_YEAR_FIELD_NAMES: &[&str] = &[
    "exp-year",
    "cc-exp-year",
    "cc-year",
    "card-year",
    "cc-yr",
    "card-yr",
    "exp-yr",
    "card-exp-yr",
    "cc-exp-yr",
    "card-expiration-year",
    "expiration-year",
    "cc-yy",
    "cc-y",
    "card-yy",
    "card-y",
    "card-exp-yy",
    "cc-exp-yy",
    "exp-yy",
    "exp-y",
    "cc-yyyy",
    "card-yyyy",
    "card-exp-yyyy",
    "cc-exp-yyyy",
    "expire-year",
    "expire-yr",
    "expiry-year",
    "expiry-yr",
    "card-expire-year",
    "card-expire-yr",
    "card-expiry-year",
    "card-expiry-yr",
    "an-validite",
    "an-expiration",
    "annee-validite",
    "annee-expiration",
    "expiry-date-field-year",
    "expiration-date-year",
    "cb-date-ann",
    "expiration-date-yy",
    "expiration-date-yyyy",
    "validity-year",
    "exp-date-year",
    "date-y",
];

pub const CVV_FIELD_NAMES: &[&str] = &[
    "cvv",
    "cvc",
    "cvv2",
    "cc-csc",
    "cc-cvv",
    "card-csc",
    "card-cvv",
    "cvd",
    "cid",
    "cvc2",
    "cnv",
    "cvn2",
    "cc-code",
    "card-code",
    "code-securite",
    "security-code",
    "crypto",
    "card-verif",
    "verification-code",
    "csc",
    "ccv",
];

pub const CARD_BRAND_FIELD_NAMES: &[&str] = &["cc-type", "card-type", "card-brand", "cc-brand", "cb-type"];

/// Literal month tokens tried by the legacy combined-expiry algorithm,
/// paired by position with the year tokens below.
pub const MONTH_ABBR: &[&str] = &["mm", "mo"];
pub const YEAR_ABBR_SHORT: &[&str] = &["yy", "yr"];
pub const YEAR_ABBR_LONG: &[&str] = &["yyyy", "yyyy"];

/// Month/year placeholder tokens of one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryDateFormat {
    pub month: &'static str,
    pub month_short: &'static str,
    pub year: &'static str,
    pub year_short: &'static str,
}

pub const CARD_EXPIRY_DATE_FORMATS: &[ExpiryDateFormat] = &[
    // English
    ExpiryDateFormat { month: "mm", month_short: "m", year: "yyyy", year_short: "yy" },
    // Dutch
    ExpiryDateFormat { month: "mm", month_short: "m", year: "jjjj", year_short: "jj" },
    // French, Spanish, Portuguese
    ExpiryDateFormat { month: "mm", month_short: "m", year: "aaaa", year_short: "aa" },
    // Danish, Norwegian, Swedish
    ExpiryDateFormat { month: "mm", month_short: "m", year: "åååå", year_short: "åå" },
    // Russian
    ExpiryDateFormat { month: "мм", month_short: "м", year: "гггг", year_short: "гг" },
];

pub const CARD_EXPIRY_DATE_DELIMITERS: &[&str] = &["/", "-", ".", " "];

// ============================================================================
// Identity
// ============================================================================

/// Attributes folded into an identity field's keyword set.
pub const IDENTITY_ATTRIBUTES: &[FieldAttribute] = &[
    FieldAttribute::AutoCompleteType,
    FieldAttribute::DataStripe,
    FieldAttribute::HtmlName,
    FieldAttribute::HtmlId,
    FieldAttribute::LabelTag,
    FieldAttribute::Placeholder,
    FieldAttribute::LabelLeft,
    FieldAttribute::LabelTop,
];

pub const TITLE_FIELD_NAMES: &[&str] = &["honorific-prefix", "prefix", "title"];

pub const FULL_NAME_FIELD_NAMES: &[&str] = &["name", "full-name", "your-name"];
pub const FULL_NAME_FIELD_NAME_VALUES: &[&str] = &["full-name", "your-name"];

pub const FIRST_NAME_FIELD_NAMES: &[&str] = &[
    "f-name",
    "first-name",
    "given-name",
    "first-n",
    "vorname",
];

pub const MIDDLE_NAME_FIELD_NAMES: &[&str] = &[
    "m-name",
    "middle-name",
    "additional-name",
    "middle-initial",
    "middle-n",
    "middle-i",
];

pub const LAST_NAME_FIELD_NAMES: &[&str] = &[
    "l-name",
    "last-name",
    "s-name",
    "surname",
    "family-name",
    "family-n",
    "last-n",
    "nachname",
    "familienname",
];

pub const EMAIL_FIELD_NAMES: &[&str] = &["e-mail", "email", "email-address"];

pub const ADDRESS_FIELD_NAMES: &[&str] = &[
    "address",
    "street-address",
    "addr",
    "street",
    "mailing-addr",
    "billing-addr",
    "mail-addr",
    "bill-addr",
    "strasse",
    "adresse",
];

pub const ADDRESS_FIELD_NAME_VALUES: &[&str] =
    &["mailing-addr", "billing-addr", "mail-addr", "bill-addr"];

pub const ADDRESS1_FIELD_NAMES: &[&str] = &[
    "address1",
    "address-1",
    "address-line-1",
    "addr1",
    "addr-1",
    "street-address-1",
];

pub const ADDRESS2_FIELD_NAMES: &[&str] = &[
    "address2",
    "address-2",
    "address-line-2",
    "addr2",
    "addr-2",
    "street-address-2",
    "address-ext",
    "adresszusatz",
];

pub const ADDRESS3_FIELD_NAMES: &[&str] = &[
    "address3",
    "address-3",
    "address-line-3",
    "addr3",
    "addr-3",
    "street-address-3",
];

pub const POSTAL_CODE_FIELD_NAMES: &[&str] = &[
    "postal",
    "zip",
    "zip2",
    "zip-code",
    "postal-code",
    "post-code",
    "address-zip",
    "address-postal",
    "address-code",
    "address-postal-code",
    "address-zip-code",
    "plz",
    "postleitzahl",
];

pub const CITY_FIELD_NAMES: &[&str] = &[
    "city",
    "town",
    "address-level-2",
    "address-city",
    "address-town",
    "ort",
    "stadt",
    "wohnort",
];

pub const STATE_FIELD_NAMES: &[&str] = &[
    "state",
    "province",
    "provence",
    "address-level-1",
    "address-state",
    "address-province",
    "bundesland",
];

pub const COUNTRY_FIELD_NAMES: &[&str] = &[
    "country",
    "country-code",
    "country-name",
    "address-country",
    "address-country-name",
    "address-country-code",
    "land",
];

pub const PHONE_FIELD_NAMES: &[&str] = &[
    "phone",
    "mobile",
    "mobile-phone",
    "tel",
    "telephone",
    "phone-number",
    "telefon",
    "telefonnummer",
    "mobil",
    "handynummer",
];

pub const USER_NAME_FIELD_NAMES: &[&str] = &["user-name", "user-id", "screen-name"];

pub const COMPANY_FIELD_NAMES: &[&str] = &[
    "company",
    "company-name",
    "organization",
    "organization-name",
    "firma",
];
