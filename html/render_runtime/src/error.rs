use thiserror::Error;

use crate::reconcile::NodePath;

/// Structural precondition violations raised while building a virtual tree.
///
/// Unresolvable references are not errors; they degrade to text leaves.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{widget}: {field} must be an object, got {found}")]
    NotAnObject {
        widget: &'static str,
        field: &'static str,
        found: &'static str,
    },

    #[error("{widget}: malformed {field}: {source}")]
    Malformed {
        widget: &'static str,
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("render nesting exceeded {limit} levels at `{item}`")]
    TooDeep { limit: usize, item: String },
}

#[derive(Debug, Error)]
pub enum DomError {
    #[error("node {0} is not an element")]
    NotAnElement(String),

    #[error("node {0} is not a text node")]
    NotAText(String),

    #[error("node {0} does not exist")]
    StaleNode(String),

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: String, child: String },
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("no vnode produced for render target `{0}`")]
    NoVNode(String),

    #[error("a reconciliation pass is already running for render target `{0}`")]
    PassInFlight(String),

    #[error("patch path {path:?} does not resolve to a node")]
    BadPath { path: NodePath },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Dom(#[from] DomError),
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
