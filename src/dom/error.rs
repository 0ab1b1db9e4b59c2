use thiserror::Error;

use crate::dom::dom_model::NodeId;

#[derive(Debug, Error)]
pub enum DomError {
    /// Node id does not belong to this document
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// Operation needs an element but got a text or root node
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// Appending would make a node its own ancestor
    #[error("cannot append {child:?} under its descendant {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// Fixture JSON could not be parsed
    #[error("document fixture parse error ({context}): {source}")]
    FixtureParse {
        context: String,
        source: serde_json::Error,
    },

    /// Fixture file could not be read
    #[error("failed to read document fixture '{path}': {source}")]
    FixtureRead {
        path: String,
        source: std::io::Error,
    },
}

/// Layout measurement failures. Callers recover these to "not viewable".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VisibilityError {
    #[error("element {0:?} is detached from the document")]
    Detached(NodeId),

    #[error("element {0:?} has no layout")]
    NoLayout(NodeId),
}

pub type Result<T> = std::result::Result<T, DomError>;
