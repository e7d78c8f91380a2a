// error.rs — Error types for reduction and shader-job handling

use std::path::PathBuf;

use crate::id::NodeId;
use crate::registry::ElementType;

/// Errors raised while applying a reduction opportunity.
///
/// None of these are recoverable inside a single `apply`; retrying with a
/// different opportunity is up to the driver.
#[derive(Debug, thiserror::Error)]
pub enum ReduceError {
    /// The node is not part of the tree that was indexed.
    #[error("node {0} not found in the indexed tree")]
    NodeNotFound(NodeId),

    /// The node occupies a declaration or statement slot, not an expression slot.
    #[error("node {0} is not held in an expression slot")]
    NotAnExpression(NodeId),

    /// Only finite int and float literals can be promoted.
    #[error("literal {literal} at node {node} is neither an integer nor a finite float")]
    UnsupportedLiteral { node: NodeId, literal: String },

    #[error("uniform '{0}' is not registered")]
    UnknownUniform(String),

    #[error("uniform '{name}' has a malformed argument list")]
    MalformedUniform { name: String },

    #[error("uniform '{name}' cannot hold non-finite value {value}")]
    NonFiniteValue { name: String, value: f32 },

    #[error("uniform '{name}' holds {expected} values, got {found}")]
    ElementTypeMismatch {
        name: String,
        expected: ElementType,
        found: ElementType,
    },
}

/// Errors raised while loading or writing a shader job.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: malformed pipeline metadata: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{}: {}", .path.display(), .errors.join("; "))]
    Parse { path: PathBuf, errors: Vec<String> },

    #[error("{}: no shader stages found next to the metadata file", .path.display())]
    MissingShaders { path: PathBuf },

    #[error(transparent)]
    Reduce(#[from] ReduceError),
}
