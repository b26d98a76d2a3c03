//! Error types for the SecurePDF tools library

use std::path::PathBuf;
use thiserror::Error;

use crate::queue::DocumentId;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the SecurePDF tools library
#[derive(Error, Debug)]
pub enum Error {
    /// A page range token could not be parsed
    #[error("Invalid page range '{token}' (entry {})", .position + 1)]
    MalformedRangeToken {
        /// The offending token, trimmed
        token: String,
        /// 0-based index of the token in the comma-separated list
        position: usize,
    },

    /// Not enough documents to run the operation
    #[error("At least {required} PDF files are required, found {found}")]
    InsufficientInputs { required: usize, found: usize },

    /// Every requested range fell outside the document
    #[error("No valid pages selected")]
    NoValidPages,

    /// The PDF library could not read the file
    #[error("Could not read {name}: {reason}. It may be encrypted or corrupted.")]
    UnreadableDocument { name: String, reason: String },

    /// A non-PDF file was offered
    #[error("Unsupported file type: {name} (PDF files only)")]
    UnsupportedFileType { name: String },

    /// No queue entry with this id
    #[error("Unknown document: {0}")]
    UnknownDocument(DocumentId),

    /// Queue index outside the current length
    #[error("Index {index} out of bounds for queue of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A run of the same tool has not completed yet
    #[error("Another operation is already in progress")]
    OperationInProgress,

    /// The run was reset, or its inputs changed, before it completed
    #[error("The operation was cancelled")]
    RunCancelled,

    /// The tool has no source document yet
    #[error("No PDF loaded")]
    NoDocumentLoaded,

    /// Protect was requested with a blank password
    #[error("Password must not be empty")]
    EmptyPassword,

    /// Encryption setup or encryption itself failed
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_token_message_is_one_based() {
        let err = Error::MalformedRangeToken {
            token: "x".to_string(),
            position: 1,
        };
        assert_eq!(err.to_string(), "Invalid page range 'x' (entry 2)");
    }

    #[test]
    fn test_insufficient_inputs_message() {
        let err = Error::InsufficientInputs { required: 2, found: 1 };
        assert!(err.to_string().contains("At least 2"));
    }
}
