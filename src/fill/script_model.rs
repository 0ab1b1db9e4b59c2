use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::fill::trust::UriMatchStrategy;

// ============================================================================
// Fill script
// ============================================================================

/// One replayable step. Serializes as the positional array the page-side
/// replayer reads, e.g. `["fill_by_opid", "__3", "secret"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillAction {
    ClickOnOpid(String),
    FocusByOpid(String),
    FillByOpid(String, String),
}

impl FillAction {
    pub fn opid(&self) -> &str {
        match self {
            FillAction::ClickOnOpid(opid)
            | FillAction::FocusByOpid(opid)
            | FillAction::FillByOpid(opid, _) => opid,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FillAction::ClickOnOpid(_) => "click_on_opid",
            FillAction::FocusByOpid(_) => "focus_by_opid",
            FillAction::FillByOpid(_, _) => "fill_by_opid",
        }
    }
}

impl Serialize for FillAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if matches!(self, FillAction::FillByOpid(_, _)) { 3 } else { 2 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(self.name())?;
        seq.serialize_element(self.opid())?;
        if let FillAction::FillByOpid(_, value) = self {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ScriptProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_between_operations: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FillScript {
    pub script: Vec<FillAction>,
    pub properties: ScriptProperties,
    /// Saved URIs of a login, minus those set to never match
    #[serde(rename = "savedUrls")]
    pub saved_urls: Vec<String>,
    #[serde(rename = "untrustedIframe")]
    pub untrusted_iframe: bool,
    /// Form opids to submit after filling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autosubmit: Option<Vec<String>>,
}

impl FillScript {
    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    /// `(opid, value)` of every fill step, in order.
    pub fn fills(&self) -> Vec<(&str, &str)> {
        self.script
            .iter()
            .filter_map(|action| match action {
                FillAction::FillByOpid(opid, value) => Some((opid.as_str(), value.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn value_for(&self, opid: &str) -> Option<&str> {
        self.fills()
            .into_iter()
            .find(|(o, _)| *o == opid)
            .map(|(_, v)| v)
    }
}

// ============================================================================
// Generation options
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Do not fill a lone username field on pages without passwords
    pub skip_username_only_fill: bool,
    /// Only password fields without a current value
    pub only_empty_fields: bool,
    /// Never fall back to hidden or read-only fields
    pub only_visible_fields: bool,
    /// Accept fields marked `autocomplete="new-password"`
    pub fill_new_password: bool,
    pub allow_totp_autofill: bool,
    pub auto_submit_login: bool,
    /// Address of the top-level tab
    pub tab_url: String,
    /// Address of the frame the snapshot came from; the snapshot URL when unset
    pub page_url: Option<String>,
    pub default_uri_match: UriMatchStrategy,
    /// Literal-token combined expiry instead of format inference
    pub legacy_combined_expiry: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            skip_username_only_fill: false,
            only_empty_fields: false,
            only_visible_fields: false,
            fill_new_password: false,
            allow_totp_autofill: false,
            auto_submit_login: false,
            tab_url: String::new(),
            page_url: None,
            default_uri_match: UriMatchStrategy::Domain,
            legacy_combined_expiry: false,
        }
    }
}
