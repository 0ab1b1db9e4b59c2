use std::collections::BTreeMap;
use std::path::PathBuf;

use page_autofill::collect::collector::{CollectorConfig, PageCollector};
use page_autofill::collect::scheduler::ManualClock;
use page_autofill::collect::snapshot_model::{FieldDescriptor, FormDescriptor, PageSnapshot};
use page_autofill::dom::dom_model::Document;
use page_autofill::dom::query::TreeWalkerQuery;
use page_autofill::dom::visibility::StyleVisibility;
use page_autofill::fill::credential_model::{
    CardData, Credential, CredentialKind, IdentityData, LoginData, LoginUri,
};
use page_autofill::fill::script_model::GenerateOptions;

pub const PAGE_URL: &str = "https://accounts.example.com/login";

// ============================================================================
// Documents and collectors
// ============================================================================

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn document(value: serde_json::Value) -> Document {
    Document::from_json_value(value).expect("valid document fixture")
}

/// Collector on virtual time starting at t=0.
pub fn manual_collector(clock: &ManualClock) -> PageCollector {
    PageCollector::new(
        CollectorConfig::default(),
        Box::new(StyleVisibility),
        Box::new(TreeWalkerQuery::new()),
        Box::new(clock.clone()),
    )
}

// ============================================================================
// Hand-built snapshots
// ============================================================================

/// Viewable `<input>` at position `index` with the given type.
pub fn field(index: usize, field_type: &str) -> FieldDescriptor {
    FieldDescriptor {
        opid: format!("__{}", index),
        element_number: index,
        max_length: Some(999),
        viewable: true,
        tag_name: "input".to_string(),
        field_type: Some(field_type.to_string()),
        value: Some(String::new()),
        ..FieldDescriptor::default()
    }
}

pub fn named_field(index: usize, field_type: &str, name: &str) -> FieldDescriptor {
    FieldDescriptor {
        html_name: Some(name.to_string()),
        html_id: Some(name.to_string()),
        ..field(index, field_type)
    }
}

pub fn in_form(mut field: FieldDescriptor, form: &str) -> FieldDescriptor {
    field.form = Some(form.to_string());
    field
}

pub fn snapshot(fields: Vec<FieldDescriptor>, forms: &[&str]) -> PageSnapshot {
    let forms: BTreeMap<String, FormDescriptor> = forms
        .iter()
        .map(|opid| {
            (
                opid.to_string(),
                FormDescriptor {
                    opid: opid.to_string(),
                    html_action: PAGE_URL.to_string(),
                    ..FormDescriptor::default()
                },
            )
        })
        .collect();
    PageSnapshot {
        title: "Sign in".to_string(),
        url: PAGE_URL.to_string(),
        document_url: PAGE_URL.to_string(),
        forms,
        fields,
        collected_timestamp: 0,
    }
}

pub fn options() -> GenerateOptions {
    GenerateOptions {
        tab_url: PAGE_URL.to_string(),
        ..GenerateOptions::default()
    }
}

// ============================================================================
// Credentials
// ============================================================================

pub fn login(username: &str, password: &str) -> Credential {
    Credential {
        id: "login-1".to_string(),
        name: "Example".to_string(),
        fields: vec![],
        kind: CredentialKind::Login(LoginData {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            totp: None,
            uris: vec![LoginUri {
                uri: "https://accounts.example.com".to_string(),
                match_strategy: None,
            }],
        }),
    }
}

pub fn card(month: &str, year: &str) -> Credential {
    Credential {
        id: "card-1".to_string(),
        name: "Visa".to_string(),
        fields: vec![],
        kind: CredentialKind::Card(CardData {
            cardholder_name: Some("Ada Lovelace".to_string()),
            number: Some("4111111111111111".to_string()),
            exp_month: Some(month.to_string()),
            exp_year: Some(year.to_string()),
            code: Some("123".to_string()),
            brand: Some("Visa".to_string()),
        }),
    }
}

pub fn identity(data: IdentityData) -> Credential {
    Credential {
        id: "identity-1".to_string(),
        name: "Home".to_string(),
        fields: vec![],
        kind: CredentialKind::Identity(data),
    }
}
