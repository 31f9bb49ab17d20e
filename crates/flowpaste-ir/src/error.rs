//! Error types for the conversion engine.

use thiserror::Error;

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can surface from a conversion run.
///
/// Malformed pieces of CSS or markup never show up here; they are skipped or
/// relocated into the embed node. Everything below is either a caller mistake
/// or an internal-consistency fault.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Markup was empty or whitespace only.
    #[error("markup input is empty")]
    EmptyInput,

    /// A node lists a child identifier that does not resolve.
    #[error("node {parent} references missing child {child}")]
    DanglingChild { parent: String, child: String },

    /// A node lists a style identifier that does not resolve.
    #[error("node {node} references missing style {style}")]
    DanglingStyle { node: String, style: String },

    /// Two nodes or two styles share an identifier or name.
    #[error("duplicate identifier: {0}")]
    DuplicateId(String),

    /// The document root is not the first node.
    #[error("root node must be the first node in the payload")]
    RootNotFirst,

    /// Serialization to JSON failed.
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The serialized document violates the embedded JSON schema.
    #[error("document failed schema validation:\n{0}")]
    Schema(String),
}
