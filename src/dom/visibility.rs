use tracing::debug;

use crate::dom::dom_model::{Document, NodeId};
use crate::dom::error::VisibilityError;

// ============================================================================
// VisibilityOracle trait
// ============================================================================

/// Decides whether an element is perceivable by the user right now.
pub trait VisibilityOracle {
    fn is_viewable(&self, doc: &Document, node: NodeId) -> Result<bool, VisibilityError>;
}

/// Measurement failures count as "not viewable" for this round.
pub fn viewable_or_hidden(oracle: &dyn VisibilityOracle, doc: &Document, node: NodeId) -> bool {
    match oracle.is_viewable(doc, node) {
        Ok(viewable) => viewable,
        Err(e) => {
            debug!(node = node.0, error = %e, "visibility check failed, treating as hidden");
            false
        }
    }
}

// ============================================================================
// Style and geometry based oracle
// ============================================================================

/// Reads the `hidden` attribute, inline style, layout box and viewport of the
/// in-memory document. Elements without a layout box are assumed to have one.
#[derive(Debug, Clone, Default)]
pub struct StyleVisibility;

impl VisibilityOracle for StyleVisibility {
    fn is_viewable(&self, doc: &Document, node: NodeId) -> Result<bool, VisibilityError> {
        if !doc.is_element(node) || !doc.is_connected(node) {
            return Err(VisibilityError::Detached(node));
        }

        let mut current = Some(node);
        while let Some(el) = current {
            if is_hidden_by_attributes(doc, el) {
                return Ok(false);
            }
            current = doc.parent_element(el);
        }

        if doc.has_attribute(node, "data-occluded") {
            return Ok(false);
        }

        match doc.rect(node) {
            Some(rect) if rect.is_empty() => Ok(false),
            Some(rect) => Ok(rect.intersects(&doc.viewport())),
            None => Ok(true),
        }
    }
}

fn is_hidden_by_attributes(doc: &Document, node: NodeId) -> bool {
    if doc.has_attribute(node, "hidden") {
        return true;
    }

    let Some(style) = doc.attribute(node, "style") else {
        return false;
    };

    inline_style(style).any(|(prop, value)| match prop.as_str() {
        "display" => value == "none",
        "visibility" => value == "hidden" || value == "collapse",
        "opacity" => value.parse::<f64>().map(|o| o <= 0.0).unwrap_or(false),
        _ => false,
    })
}

/// `prop: value` pairs of an inline style attribute, lowercased.
pub fn inline_style(style: &str) -> impl Iterator<Item = (String, String)> + '_ {
    style.split(';').filter_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        let value = value.trim().trim_end_matches("!important").trim();
        Some((prop.trim().to_ascii_lowercase(), value.to_ascii_lowercase()))
    })
}
