//! Finished output documents and their file names

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Name of the single merge output
pub const MERGED_FILE_NAME: &str = "merged.pdf";

/// One finished PDF, ready to be downloaded or written out
#[derive(Clone, PartialEq, Eq)]
pub struct OutputBlob {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl OutputBlob {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Write the blob into `dir` under its own name
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

// Keep the bytes out of debug output
impl fmt::Debug for OutputBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputBlob")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Name for one split output given its 1-based page numbers
///
/// A single page gives `split-page-4.pdf`, several give
/// `split-pages-3-5.pdf` from the first and last page.
pub fn split_file_name(page_numbers: &[u32]) -> String {
    match (page_numbers.first(), page_numbers.last()) {
        (Some(first), Some(last)) if first != last => {
            format!("split-pages-{}-{}.pdf", first, last)
        }
        (Some(first), _) => format!("split-page-{}.pdf", first),
        _ => "split.pdf".to_string(),
    }
}

/// Name for the protected copy of `original`
pub fn protected_file_name(original: &str) -> String {
    format!("protected-{}", original)
}

/// Human readable file size
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * 1024;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    }
}
