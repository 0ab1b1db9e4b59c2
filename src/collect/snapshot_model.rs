use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Field and form descriptors
// ============================================================================

/// `[normalized text, raw value]` pair of a select option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption(pub Option<String>, pub String);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectInfo {
    pub options: Vec<SelectOption>,
}

/// Metadata of one fillable element. Keys serialize under the names the
/// replaying content script expects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub opid: String,
    #[serde(rename = "elementNumber")]
    pub element_number: usize,
    #[serde(rename = "maxLength")]
    pub max_length: Option<usize>,
    pub viewable: bool,
    #[serde(rename = "htmlID")]
    pub html_id: Option<String>,
    #[serde(rename = "htmlName")]
    pub html_name: Option<String>,
    #[serde(rename = "htmlClass")]
    pub html_class: Option<String>,
    pub tabindex: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "tagName")]
    pub tag_name: String,
    #[serde(rename = "dataSetValues")]
    pub data_set_values: Option<String>,

    #[serde(rename = "label-tag")]
    pub label_tag: Option<String>,
    #[serde(rename = "label-data")]
    pub label_data: Option<String>,
    #[serde(rename = "label-aria")]
    pub label_aria: Option<String>,
    #[serde(rename = "label-top")]
    pub label_top: Option<String>,
    #[serde(rename = "label-right")]
    pub label_right: Option<String>,
    #[serde(rename = "label-left")]
    pub label_left: Option<String>,
    pub placeholder: Option<String>,

    pub rel: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub value: Option<String>,
    pub checked: bool,
    #[serde(rename = "autoCompleteType")]
    pub auto_complete_type: Option<String>,
    pub disabled: bool,
    pub readonly: bool,
    #[serde(rename = "selectInfo")]
    pub select_info: Option<SelectInfo>,
    pub form: Option<String>,
    #[serde(rename = "aria-hidden")]
    pub aria_hidden: bool,
    #[serde(rename = "aria-disabled")]
    pub aria_disabled: bool,
    #[serde(rename = "aria-haspopup")]
    pub aria_haspopup: bool,
    #[serde(rename = "data-stripe")]
    pub data_stripe: Option<String>,
}

/// Named text attributes of a descriptor, used by keyword tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldAttribute {
    HtmlId,
    HtmlName,
    HtmlClass,
    Title,
    LabelTag,
    LabelData,
    LabelAria,
    LabelTop,
    LabelRight,
    LabelLeft,
    Placeholder,
    Type,
    AutoCompleteType,
    DataStripe,
    DataSetValues,
}

impl FieldDescriptor {
    pub fn attribute(&self, attr: FieldAttribute) -> Option<&str> {
        let value = match attr {
            FieldAttribute::HtmlId => &self.html_id,
            FieldAttribute::HtmlName => &self.html_name,
            FieldAttribute::HtmlClass => &self.html_class,
            FieldAttribute::Title => &self.title,
            FieldAttribute::LabelTag => &self.label_tag,
            FieldAttribute::LabelData => &self.label_data,
            FieldAttribute::LabelAria => &self.label_aria,
            FieldAttribute::LabelTop => &self.label_top,
            FieldAttribute::LabelRight => &self.label_right,
            FieldAttribute::LabelLeft => &self.label_left,
            FieldAttribute::Placeholder => &self.placeholder,
            FieldAttribute::Type => &self.field_type,
            FieldAttribute::AutoCompleteType => &self.auto_complete_type,
            FieldAttribute::DataStripe => &self.data_stripe,
            FieldAttribute::DataSetValues => &self.data_set_values,
        };
        value.as_deref()
    }

    pub fn is_type(&self, field_type: &str) -> bool {
        self.field_type.as_deref() == Some(field_type)
    }

    pub fn is_span(&self) -> bool {
        self.tag_name == "span"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormDescriptor {
    pub opid: String,
    #[serde(rename = "htmlAction")]
    pub html_action: String,
    #[serde(rename = "htmlName")]
    pub html_name: Option<String>,
    #[serde(rename = "htmlClass")]
    pub html_class: Option<String>,
    #[serde(rename = "htmlID")]
    pub html_id: Option<String>,
    #[serde(rename = "htmlMethod")]
    pub html_method: Option<String>,
}

// ============================================================================
// Page snapshot
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub title: String,
    pub url: String,
    #[serde(rename = "documentUrl")]
    pub document_url: String,
    pub forms: BTreeMap<String, FormDescriptor>,
    pub fields: Vec<FieldDescriptor>,
    #[serde(rename = "collectedTimestamp")]
    pub collected_timestamp: u64,
}

impl PageSnapshot {
    pub fn field(&self, opid: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.opid == opid)
    }

    /// SHA-1 over forms and fields, ignoring the collection timestamp.
    pub fn fingerprint(&self) -> String {
        use sha1::{Digest, Sha1};

        let mut hasher = Sha1::new();
        hasher.update(self.url.as_bytes());
        if let Ok(forms) = serde_json::to_vec(&self.forms) {
            hasher.update(&forms);
        }
        if let Ok(fields) = serde_json::to_vec(&self.fields) {
            hasher.update(&fields);
        }
        format!("{:x}", hasher.finalize())
    }
}
