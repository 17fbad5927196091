//! Error types for GPML conversion.
//!
//! Every fatal condition on the load or save path is normalized into one
//! [`ConversionError`] before it crosses the crate boundary; no
//! dialect-specific error type leaks to callers. Cosmetic problems
//! (unparseable colors, unknown enumerated names) are logged and substituted
//! with safe defaults instead of surfacing here.

use std::io;

use thiserror::Error;

use gpml_core::model::ModelError;

/// The error type for reading and writing GPML documents.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The input is not well-formed XML.
    #[error("malformed document: {0}")]
    Malformed(#[from] roxmltree::Error),

    /// Reading the input or writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document's root element is not `Pathway`.
    #[error("expected root element `Pathway`, found `{found}`")]
    WrongRootElement { found: String },

    /// The root namespace matches no known dialect. The namespace string is
    /// reported so users can tell the file is newer than this library.
    #[error("unrecognized GPML namespace `{namespace}`; the document may have been written by a newer version")]
    UnrecognizedNamespace { namespace: String },

    /// The document failed strict schema validation.
    #[error("schema validation failed at `{element}`: {reason}")]
    SchemaValidation { element: String, reason: String },

    /// A required attribute is absent. A data error: the dispatcher skips
    /// the offending element and continues when possible.
    #[error("missing required attribute `{element}@{attribute}`")]
    MissingRequiredAttribute { element: String, attribute: String },

    /// A lookup against the schema table used a key the table does not
    /// contain. A programmer error, never expected against a shipped table.
    #[error("unknown attribute `{element}@{attribute}` in schema table")]
    UnknownAttribute { element: String, attribute: String },

    /// Two elements in the same document claim the same identifier.
    #[error("duplicate graph id `{id}` in document")]
    DuplicateGraphId { id: String },

    /// Any other model-level failure while populating the pathway.
    #[error("model error: {0}")]
    Model(ModelError),
}

impl From<ModelError> for ConversionError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::DuplicateGraphId { id } => ConversionError::DuplicateGraphId { id },
            other => ConversionError::Model(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_graph_id_is_flattened() {
        let err: ConversionError = ModelError::DuplicateGraphId {
            id: "n1".to_owned(),
        }
        .into();
        assert!(matches!(err, ConversionError::DuplicateGraphId { id } if id == "n1"));
    }

    #[test]
    fn test_messages_carry_context() {
        let err = ConversionError::UnrecognizedNamespace {
            namespace: "http://example.org/GPML/2099".to_owned(),
        };
        assert!(err.to_string().contains("http://example.org/GPML/2099"));

        let err = ConversionError::MissingRequiredAttribute {
            element: "DataNode.Graphics".to_owned(),
            attribute: "CenterX".to_owned(),
        };
        assert!(err.to_string().contains("DataNode.Graphics@CenterX"));
    }
}
