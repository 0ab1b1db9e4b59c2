mod common;

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;

use common::utils::{field, named_field};
use page_autofill::collect::snapshot_model::FieldDescriptor;
use page_autofill::fill::credential_model::{LoginData, LoginUri};
use page_autofill::fill::keywords::{CARD_HOLDER_FIELD_NAMES, CARD_HOLDER_FIELD_NAME_VALUES, USERNAME_FIELD_NAMES};
use page_autofill::fill::matching::{
    field_has_disqualifying_attribute_value, field_is_fuzzy_match, field_property_is_match,
    find_matching_field_index, is_excluded_field_type, is_field_match, is_search_field,
    normalize_keyword, value_is_like_password,
};
use page_autofill::fill::totp::{FixedCode, NoTotp, TotpProvider};
use page_autofill::fill::trust::{
    DomainResolver, LoginUriMatcher, StaticDomainResolver, UriMatchStrategy, UriMatcher, domain_of,
    host_of, in_untrusted_iframe,
};

fn saved(uri: &str, strategy: Option<UriMatchStrategy>) -> LoginData {
    LoginData {
        uris: vec![LoginUri {
            uri: uri.to_string(),
            match_strategy: strategy,
        }],
        ..LoginData::default()
    }
}

fn domains(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|d| d.to_string()).collect()
}

// ============================================================================
// Keyword comparison
// ============================================================================

#[test]
fn test_normalize_keyword_keeps_ascii_alphanumerics() {
    assert_eq!(normalize_keyword("  Card-Holder Name! "), "cardholdername");
    assert_eq!(normalize_keyword("E-Mail_2"), "email2");
}

#[test]
fn test_is_field_match_exact_and_contains() {
    assert!(is_field_match("Cardholder Name", CARD_HOLDER_FIELD_NAMES, Some(CARD_HOLDER_FIELD_NAME_VALUES)));
    assert!(
        is_field_match("billing_cardholder_input", CARD_HOLDER_FIELD_NAMES, Some(CARD_HOLDER_FIELD_NAME_VALUES)),
        "listed value matches as substring"
    );
    assert!(
        !is_field_match("company_name", CARD_HOLDER_FIELD_NAMES, Some(CARD_HOLDER_FIELD_NAME_VALUES)),
        "'name' must match exactly"
    );
    assert!(is_field_match("x-ccv-y", &["ccv"], None), "no list: every option matches as substring");
}

#[test]
fn test_field_property_is_match_forms() {
    assert!(field_property_is_match(Some("Email"), "email"));
    assert!(!field_property_is_match(Some("email2"), "email"));
    assert!(field_property_is_match(Some("ACCT-42"), "regex=^acct-\\d+$"));
    assert!(field_property_is_match(Some("Tier"), "csv=plan, tier"));
    assert!(!field_property_is_match(Some("x"), "regex=(["), "invalid pattern never matches");
    assert!(!field_property_is_match(None, "email"));
    assert!(!field_property_is_match(Some(""), "csv="));
}

#[test]
fn test_find_matching_field_index_prefers_first_name() {
    let mut field = named_field(0, "text", "login_email");
    field.placeholder = Some("Your email".to_string());

    assert_eq!(find_matching_field_index(&field, &["nope", "login_email"]), Some(1));
    assert_eq!(find_matching_field_index(&field, &["placeholder=your email"]), Some(0));
    assert_eq!(find_matching_field_index(&field, &["id=your email"]), None, "prefix limits the attribute");
    assert_eq!(find_matching_field_index(&field, USERNAME_FIELD_NAMES), None);
}

#[test]
fn test_fuzzy_match_reads_labels_and_dataset() {
    let mut field = field(0, "text");
    field.label_aria = Some("Enter your\nLogin".to_string());
    assert!(field_is_fuzzy_match(&field, USERNAME_FIELD_NAMES));

    let mut data = field_with_dataset("testid: otp-input, ");
    assert!(field_is_fuzzy_match(&data, &["otp"]));
    data.data_set_values = None;
    assert!(!field_is_fuzzy_match(&data, &["otp"]));
}

fn field_with_dataset(values: &str) -> FieldDescriptor {
    let mut f = field(0, "text");
    f.data_set_values = Some(values.to_string());
    f
}

// ============================================================================
// Exclusions
// ============================================================================

#[test]
fn test_search_fields_split_camel_case() {
    assert!(is_search_field(&named_field(0, "text", "siteSearch")));
    assert!(is_search_field(&field(0, "search")));
    assert!(is_search_field(&named_field(0, "text", "q-query")));
    assert!(!is_search_field(&named_field(0, "text", "researcher")), "word must stand alone");
}

#[test]
fn test_excluded_types_and_spans() {
    assert!(is_excluded_field_type(&field(0, "checkbox"), &["checkbox"]));
    assert!(!is_excluded_field_type(&field(0, "text"), &["checkbox"]));

    let mut span = field(0, "text");
    span.tag_name = "span".to_string();
    assert!(is_excluded_field_type(&span, &[]));
}

#[test]
fn test_password_likeness_and_disqualifiers() {
    assert!(value_is_like_password(Some("User Password")));
    assert!(!value_is_like_password(Some("password_hint")));
    assert!(!value_is_like_password(Some("one-time-password")));
    assert!(!value_is_like_password(None));

    assert!(field_has_disqualifying_attribute_value(&named_field(0, "text", "forgot-password")));
    assert!(field_has_disqualifying_attribute_value(&named_field(0, "text", "g_captcha")));
    assert!(!field_has_disqualifying_attribute_value(&named_field(0, "text", "username")));
}

// ============================================================================
// Domains and trust
// ============================================================================

#[test]
fn test_domain_and_host_extraction() {
    assert_eq!(domain_of("https://shop.example.co.uk/cart").as_deref(), Some("example.co.uk"));
    assert_eq!(domain_of("https://a.b.example.com").as_deref(), Some("example.com"));
    assert_eq!(domain_of("example.org/login").as_deref(), Some("example.org"));
    assert_eq!(domain_of("http://localhost:3000").as_deref(), Some("localhost"));
    assert_eq!(domain_of("http://192.168.1.10/admin").as_deref(), Some("192.168.1.10"));
    assert_eq!(domain_of("https://evil.github.io/").as_deref(), Some("evil.github.io"));
    assert_eq!(domain_of("https://shop.example.co.kr").as_deref(), Some("example.co.kr"));

    assert_eq!(host_of("https://Accounts.Example.com:8443/x").as_deref(), Some("accounts.example.com:8443"));
    assert_eq!(host_of("https://example.com/").as_deref(), Some("example.com"));
}

#[test]
fn test_static_resolver_includes_own_domain() {
    let resolver = StaticDomainResolver::new(vec![vec!["example.com".to_string(), "example.org".to_string()]]);

    assert_eq!(
        resolver.equivalent_domains("https://login.example.org/embed"),
        domains(&["example.com", "example.org"])
    );
    assert_eq!(resolver.equivalent_domains("https://other.net"), domains(&["other.net"]));
}

#[test]
fn test_uri_match_strategies() {
    let matcher = LoginUriMatcher;
    let url = "https://accounts.example.com/login?next=/";
    let eq = domains(&["example.com"]);
    let check = |uri: &str, strategy: UriMatchStrategy| {
        matcher.matches(&saved(uri, Some(strategy)), url, &eq, UriMatchStrategy::Domain)
    };

    assert!(check("https://www.example.com", UriMatchStrategy::Domain));
    assert!(!check("https://www.example.net", UriMatchStrategy::Domain));
    assert!(check("https://accounts.example.com/other", UriMatchStrategy::Host));
    assert!(!check("https://accounts.example.com:8443", UriMatchStrategy::Host));
    assert!(check("https://accounts.example.com/log", UriMatchStrategy::StartsWith));
    assert!(!check("https://accounts.example.com/login", UriMatchStrategy::Exact));
    assert!(check("^https://accounts\\.EXAMPLE\\.com/", UriMatchStrategy::RegularExpression));
    assert!(!check("([", UriMatchStrategy::RegularExpression));
    assert!(!check(url, UriMatchStrategy::Never));
}

#[test]
fn test_default_strategy_applies_when_uri_has_none() {
    let matcher = LoginUriMatcher;
    let login = saved("https://accounts.example.com", None);
    let url = "https://static.example.com/frame";
    let eq = domains(&["example.com"]);

    assert!(matcher.matches(&login, url, &eq, UriMatchStrategy::Domain));
    assert!(!matcher.matches(&login, url, &eq, UriMatchStrategy::Host));
}

#[test]
fn test_in_untrusted_iframe() {
    let login = saved("https://accounts.example.com", None);
    let resolver = StaticDomainResolver::default();
    let tab = "https://accounts.example.com/login";
    let check = |page: &str| {
        in_untrusted_iframe(page, tab, &login, UriMatchStrategy::Domain, &resolver, &LoginUriMatcher)
    };

    assert!(!check(tab), "top frame");
    assert!(!check("https://cdn.example.com/frame"));
    assert!(check("https://ads.example.net/frame"));
}

#[test]
fn test_sibling_sites_on_shared_host_are_untrusted() {
    let login = saved("https://victim.github.io", None);
    let resolver = StaticDomainResolver::default();
    let tab = "https://victim.github.io/login";
    let check = |page: &str| {
        in_untrusted_iframe(page, tab, &login, UriMatchStrategy::Domain, &resolver, &LoginUriMatcher)
    };

    assert!(check("https://evil.github.io/frame"));
    assert!(!check("https://assets.victim.github.io/frame"));
}

// ============================================================================
// One-time codes
// ============================================================================

#[test]
fn test_totp_providers() {
    assert_eq!(NoTotp.code("secret"), None);
    assert_eq!(FixedCode("004211".into()).code("anything").as_deref(), Some("004211"));
}
