//! PDF library adapters

pub mod assemble;
pub mod metadata;
pub mod protect;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used items
pub use assemble::{assemble_unit, PagePool};
pub use metadata::{count_pages, document_metadata, extract_metadata, load_document, PdfMetadata};
pub use protect::{
    password_strength, protect_document, EncryptionParams, PasswordStrength, PermissionSet,
};
