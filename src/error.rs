//! Error types for the PDF object model

use thiserror::Error;
use crate::pdf::ObjectRef;

/// Main error type for object model operations
#[derive(Error, Debug)]
pub enum ObjectModelError {
    /// Malformed object literal
    #[error("Parse error at offset {offset}: {message}")]
    Parse {
        offset: usize,
        message: String,
    },

    /// Input ended inside a construct
    #[error("Unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),

    /// More tokens followed a complete object literal
    #[error("Unexpected data after object at offset {offset}")]
    TrailingData {
        offset: usize,
    },

    /// Operation is not supported by this model
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Array element insertion outside the allowed rows
    #[error("Cannot insert element at row {row} (array length {len})")]
    CannotInsertElement {
        row: usize,
        len: usize,
    },

    /// Dictionary key insertion not allowed
    #[error("Cannot insert key: {0}")]
    CannotInsertKey(String),

    /// Invalid argument passed by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Index does not address an editable item
    #[error("Invalid model index")]
    InvalidIndex,

    /// Raw edit carried no bytes
    #[error("Empty edit")]
    EmptyEdit,

    /// Document does not have the structure the model needs
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Object not found
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectRef),

    /// Invalid object type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        expected: &'static str,
        found: &'static str,
    },

    /// UTF-8 encoding error
    #[error("UTF-8 encoding error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),

    /// Integer parsing error
    #[error("Integer parsing error: {0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    /// Float parsing error
    #[error("Float parsing error: {0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),
}

/// Result type for object model operations
pub type ModelResult<T> = Result<T, ObjectModelError>;

impl ObjectModelError {
    /// Create a new parse error
    pub fn parse(offset: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: msg.into(),
        }
    }

    /// Create a new invalid document error
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Create a new unsupported operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedOperation(msg.into())
    }

    /// Check if error comes from reading an object literal
    pub fn is_parse_error(&self) -> bool {
        matches!(self,
            Self::Parse { .. } |
            Self::UnexpectedEof(_) |
            Self::TrailingData { .. } |
            Self::Utf8Error(_) |
            Self::ParseIntError(_) |
            Self::ParseFloatError(_)
        )
    }

    /// Check if error is a caller precondition violation
    pub fn is_usage_error(&self) -> bool {
        matches!(self,
            Self::UnsupportedOperation(_) |
            Self::CannotInsertElement { .. } |
            Self::CannotInsertKey(_) |
            Self::InvalidArgument(_) |
            Self::InvalidIndex |
            Self::EmptyEdit
        )
    }

    /// Check if error is related to document structure
    pub fn is_document_error(&self) -> bool {
        matches!(self,
            Self::InvalidDocument(_) |
            Self::ObjectNotFound(_) |
            Self::InvalidObjectType { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ObjectModelError::parse(4, "bad token");
        assert!(matches!(err, ObjectModelError::Parse { offset: 4, .. }));

        let err = ObjectModelError::invalid_document("no catalog");
        assert!(matches!(err, ObjectModelError::InvalidDocument(_)));

        let err = ObjectModelError::unsupported("insert_row");
        assert!(matches!(err, ObjectModelError::UnsupportedOperation(_)));
    }

    #[test]
    fn test_error_categorization() {
        let parse_err = ObjectModelError::TrailingData { offset: 3 };
        assert!(parse_err.is_parse_error());
        assert!(!parse_err.is_usage_error());

        let usage_err = ObjectModelError::CannotInsertElement { row: 0, len: 3 };
        assert!(usage_err.is_usage_error());
        assert!(!usage_err.is_document_error());

        let doc_err = ObjectModelError::ObjectNotFound(ObjectRef::new(5, 0));
        assert!(doc_err.is_document_error());
        assert!(!doc_err.is_parse_error());
    }

    #[test]
    fn test_error_display() {
        let err = ObjectModelError::CannotInsertElement { row: 4, len: 3 };
        assert_eq!(err.to_string(), "Cannot insert element at row 4 (array length 3)");

        let err = ObjectModelError::ObjectNotFound(ObjectRef::new(12, 1));
        assert_eq!(err.to_string(), "Object not found: 12 1 R");

        let err = ObjectModelError::InvalidObjectType {
            expected: "Dictionary",
            found: "Array",
        };
        assert_eq!(
            err.to_string(),
            "Invalid object type: expected Dictionary, found Array"
        );
    }

    #[test]
    fn test_error_conversion() {
        let int_err = "abc".parse::<i64>().unwrap_err();
        let model_err: ObjectModelError = int_err.into();
        assert!(matches!(model_err, ObjectModelError::ParseIntError(_)));
        assert!(model_err.is_parse_error());
    }
}
