//! PDF loading and metadata extraction

use std::path::Path;

use lopdf::{Document, Object};

use crate::document::SourceDocument;
use crate::error::{Error, Result};
use crate::queue::DocumentId;

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages reachable through the page tree
    pub page_count: usize,
    /// The `Count` entry of the root Pages dictionary, if readable
    ///
    /// Some producers write a wrong value here, so it is reported
    /// separately and never used for assembly.
    pub declared_page_count: Option<usize>,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Parse `bytes` into a [`SourceDocument`]
///
/// Anything the PDF library refuses, encrypted files and files without
/// pages all come back as [`Error::UnreadableDocument`].
pub fn load_document(id: DocumentId, name: &str, bytes: &[u8]) -> Result<SourceDocument> {
    let unreadable = |reason: String| Error::UnreadableDocument {
        name: name.to_string(),
        reason,
    };

    let doc = Document::load_mem(bytes).map_err(|e| unreadable(e.to_string()))?;

    if doc.is_encrypted() {
        return Err(unreadable("document is password protected".to_string()));
    }

    let page_count = doc.get_pages().len();
    if page_count == 0 {
        return Err(unreadable("document has no pages".to_string()));
    }

    log::debug!("Loaded {} ({} pages, {} bytes)", name, page_count, bytes.len());
    Ok(SourceDocument::new(
        id,
        name.to_string(),
        bytes.len(),
        page_count,
        doc,
    ))
}

/// Read the Count field from the root Pages dictionary
fn count_pages_from_catalog(doc: &Document) -> Option<usize> {
    let pages = doc.catalog().ok()?.get(b"Pages").ok()?;
    let pages_dict = match pages {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    match pages_dict.get(b"Count").ok()? {
        Object::Integer(n) if *n >= 0 => Some(*n as usize),
        _ => None,
    }
}

/// Look up a text entry in the document Info dictionary
fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    let bytes = info.get(key).ok()?.as_str().ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Extract metadata from an already parsed document
pub fn document_metadata(doc: &Document) -> PdfMetadata {
    PdfMetadata {
        page_count: doc.get_pages().len(),
        declared_page_count: count_pages_from_catalog(doc),
        title: info_string(doc, b"Title"),
        author: info_string(doc, b"Author"),
    }
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let metadata = document_metadata(&doc);

    if metadata.page_count == 0 {
        return Err(Error::UnreadableDocument {
            name: path.display().to_string(),
            reason: "document has no pages".to_string(),
        });
    }

    Ok(metadata)
}

/// Count the number of pages in a PDF held in memory
pub fn count_pages(bytes: &[u8]) -> Result<usize> {
    let doc = Document::load_mem(bytes)?;
    Ok(doc.get_pages().len())
}
