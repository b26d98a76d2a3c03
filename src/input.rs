//! File intake
//!
//! Only PDFs get past this boundary. Dropped files are filtered (with a
//! warning per rejected file); picked files are rejected with an error.

use std::path::Path;

use crate::error::{Error, Result};

/// MIME type accepted by every tool
pub const PDF_MIME: &str = "application/pdf";

/// A file handed to a tool, before it is parsed
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    /// Declared content type, if the source provides one
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, mime: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.map(str::to_string),
            bytes,
        }
    }

    /// Read a file from disk; the content type is left undeclared
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            mime: None,
            bytes,
        })
    }

    /// Whether the file is declared (or, lacking a declaration, named) as a PDF
    pub fn is_pdf(&self) -> bool {
        match &self.mime {
            Some(mime) => mime.eq_ignore_ascii_case(PDF_MIME),
            None => self.name.to_ascii_lowercase().ends_with(".pdf"),
        }
    }
}

/// Result of filtering a drop
#[derive(Debug, Default)]
pub struct DropOutcome {
    pub accepted: Vec<InputFile>,
    /// Names of files that were not PDFs
    pub rejected: Vec<String>,
}

/// Split dropped files into PDFs and everything else
pub fn filter_dropped(files: Vec<InputFile>) -> DropOutcome {
    let mut outcome = DropOutcome::default();
    for file in files {
        if file.is_pdf() {
            outcome.accepted.push(file);
        } else {
            log::warn!("Ignoring non-PDF file: {}", file.name);
            outcome.rejected.push(file.name);
        }
    }
    outcome
}

/// Picker path: a non-PDF file is an error
pub fn check_selected(file: &InputFile) -> Result<()> {
    if file.is_pdf() {
        Ok(())
    } else {
        Err(Error::UnsupportedFileType {
            name: file.name.clone(),
        })
    }
}
