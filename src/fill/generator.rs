use std::collections::HashSet;

use tracing::{debug, info};

use crate::collect::snapshot_model::{FieldDescriptor, PageSnapshot};
use crate::fill::card::generate_card;
use crate::fill::credential_model::{Credential, CredentialKind, CustomField, CustomFieldType};
use crate::fill::identity::generate_identity;
use crate::fill::login::generate_login;
use crate::fill::matching::{find_matching_field_index, is_search_field};
use crate::fill::script_model::{FillAction, FillScript, GenerateOptions};
use crate::fill::totp::{NoTotp, TotpProvider};
use crate::fill::trust::{DomainResolver, LoginUriMatcher, StaticDomainResolver, UriMatcher};

// ============================================================================
// Filled-fields set
// ============================================================================

/// Fields already given a value during one generation pass, in fill order.
#[derive(Debug, Default)]
pub struct FilledFields {
    order: Vec<FieldDescriptor>,
    opids: HashSet<String>,
}

impl FilledFields {
    pub fn contains(&self, opid: &str) -> bool {
        self.opids.contains(opid)
    }

    /// Returns false if the field was already recorded.
    pub fn insert(&mut self, field: &FieldDescriptor) -> bool {
        if !self.opids.insert(field.opid.clone()) {
            return false;
        }
        self.order.push(field.clone());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.order.iter()
    }
}

// ============================================================================
// Script builder
// ============================================================================

/// Accumulating script plus the filled-fields set of one `generate` call.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    pub script: FillScript,
    pub filled: FilledFields,
}

impl ScriptBuilder {
    /// Append the actions that set `value` on `field`. Values are clipped to
    /// the field's maximum length; spans only get the value step.
    pub fn fill_by_opid(&mut self, field: &FieldDescriptor, value: &str) {
        let value = match field.max_length {
            Some(max) if value.chars().count() > max => value.chars().take(max).collect(),
            _ => value.to_string(),
        };
        if !field.is_span() {
            self.script.script.push(FillAction::ClickOnOpid(field.opid.clone()));
            self.script.script.push(FillAction::FocusByOpid(field.opid.clone()));
        }
        self.script.script.push(FillAction::FillByOpid(field.opid.clone(), value));
    }

    /// Record `field` as filled and emit its actions.
    pub fn fill_field(&mut self, field: &FieldDescriptor, value: &str) {
        self.filled.insert(field);
        self.fill_by_opid(field, value);
    }

    /// Fill with a credential value when it is present. A single-choice
    /// select only fills if one of its options equals the value, and then
    /// receives that option's raw value. Returns whether a fill happened.
    pub fn fill_with_value(&mut self, field: &FieldDescriptor, value: Option<&str>) -> bool {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return false;
        };
        if self.filled.contains(&field.opid) {
            return false;
        }

        let value = if field.is_type("select-one") {
            let Some(info) = field.select_info.as_ref() else {
                self.fill_field(field, value);
                return true;
            };
            let wanted = value.to_lowercase();
            let matched = info.options.iter().find(|option| {
                option.0.as_deref().map(|t| t.to_lowercase() == wanted).unwrap_or(false)
                    || (!option.1.is_empty() && option.1.to_lowercase() == wanted)
            });
            match matched {
                Some(option) => option.1.clone(),
                None => return false,
            }
        } else {
            value.to_string()
        };

        self.fill_field(field, &value);
        true
    }

    /// Focus the last viewable filled field, preferring the last password.
    pub fn set_focus(&mut self) {
        let mut last_field = None;
        let mut last_password = None;
        for field in self.filled.iter().filter(|f| f.viewable) {
            last_field = Some(field.opid.clone());
            if field.is_type("password") {
                last_password = Some(field.opid.clone());
            }
        }
        if let Some(opid) = last_password.or(last_field) {
            self.script.script.push(FillAction::FocusByOpid(opid));
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

pub struct FillScriptGenerator {
    pub(crate) totp: Box<dyn TotpProvider>,
    pub(crate) domains: Box<dyn DomainResolver>,
    pub(crate) uri_matcher: Box<dyn UriMatcher>,
}

impl Default for FillScriptGenerator {
    fn default() -> Self {
        Self::new(
            Box::new(NoTotp),
            Box::new(StaticDomainResolver::default()),
            Box::new(LoginUriMatcher),
        )
    }
}

impl FillScriptGenerator {
    pub fn new(
        totp: Box<dyn TotpProvider>,
        domains: Box<dyn DomainResolver>,
        uri_matcher: Box<dyn UriMatcher>,
    ) -> Self {
        Self {
            totp,
            domains,
            uri_matcher,
        }
    }

    pub fn with_totp(mut self, totp: Box<dyn TotpProvider>) -> Self {
        self.totp = totp;
        self
    }

    pub fn with_domains(mut self, domains: Box<dyn DomainResolver>) -> Self {
        self.domains = domains;
        self
    }

    pub fn totp(&self) -> &dyn TotpProvider {
        self.totp.as_ref()
    }

    /// Build the fill script for one frame. `None` when either input is
    /// missing, the snapshot has no fields, or the credential type has no
    /// fill support.
    pub fn generate(
        &self,
        snapshot: Option<&PageSnapshot>,
        credential: Option<&Credential>,
        options: &GenerateOptions,
    ) -> Option<FillScript> {
        let (snapshot, credential) = (snapshot?, credential?);
        if snapshot.fields.is_empty() {
            debug!(url = %snapshot.url, "no fields to fill");
            return None;
        }
        if matches!(credential.kind, CredentialKind::SecureNote) {
            return None;
        }

        let mut builder = ScriptBuilder::default();
        fill_custom_fields(&mut builder, snapshot, credential);

        match &credential.kind {
            CredentialKind::Login(login) => generate_login(self, &mut builder, snapshot, login, options),
            CredentialKind::Card(card) => generate_card(&mut builder, snapshot, card, options),
            CredentialKind::Identity(identity) => generate_identity(&mut builder, snapshot, identity),
            CredentialKind::SecureNote => return None,
        }

        info!(
            kind = credential.kind.name(),
            actions = builder.script.script.len(),
            filled = builder.filled.len(),
            untrusted = builder.script.untrusted_iframe,
            "fill script generated"
        );
        Some(builder.script)
    }
}

/// Fill fields whose id, name, label or placeholder equals a custom field's
/// name. Runs before the type-specific pass, which then skips these fields.
fn fill_custom_fields(builder: &mut ScriptBuilder, snapshot: &PageSnapshot, credential: &Credential) {
    let named: Vec<(String, &CustomField)> = credential
        .fields
        .iter()
        .filter_map(|f| {
            f.name
                .as_deref()
                .filter(|n| !n.is_empty())
                .map(|n| (n.to_lowercase(), f))
        })
        .collect();
    if named.is_empty() {
        return;
    }
    let names: Vec<&str> = named.iter().map(|(n, _)| n.as_str()).collect();

    for field in &snapshot.fields {
        if builder.filled.contains(&field.opid) {
            continue;
        }
        if !field.viewable && !field.is_span() {
            continue;
        }
        if is_search_field(field) {
            continue;
        }

        let Some(index) = find_matching_field_index(field, &names) else {
            continue;
        };
        let custom = named[index].1;
        let value = match custom.field_type {
            CustomFieldType::Linked => custom.linked_id.and_then(|id| credential.linked_value(id)),
            CustomFieldType::Boolean => Some(custom.value.clone().unwrap_or_else(|| "false".to_string())),
            CustomFieldType::Text | CustomFieldType::Hidden => custom.value.clone(),
        };

        debug!(opid = %field.opid, name = %named[index].0, "custom field matched");
        builder.fill_field(field, value.as_deref().unwrap_or_default());
    }
}
