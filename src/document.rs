//! Loaded source documents

use std::sync::Arc;

use lopdf::Document;

use crate::queue::DocumentId;

/// Anything the assembly planner can take pages from
pub trait PageSource {
    fn id(&self) -> DocumentId;
    fn page_count(&self) -> usize;
}

impl<T: PageSource + ?Sized> PageSource for &T {
    fn id(&self) -> DocumentId {
        (**self).id()
    }

    fn page_count(&self) -> usize {
        (**self).page_count()
    }
}

impl<T: PageSource + ?Sized> PageSource for Arc<T> {
    fn id(&self) -> DocumentId {
        (**self).id()
    }

    fn page_count(&self) -> usize {
        (**self).page_count()
    }
}

/// A PDF that has been parsed and is ready to contribute pages
///
/// Immutable once loaded. The parsed document is only handed to the PDF
/// library when pages are copied out of it.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    id: DocumentId,
    name: String,
    size: usize,
    page_count: usize,
    document: Document,
}

impl SourceDocument {
    pub(crate) fn new(
        id: DocumentId,
        name: String,
        size: usize,
        page_count: usize,
        document: Document,
    ) -> Self {
        Self {
            id,
            name,
            size,
            page_count,
            document,
        }
    }

    /// File name the document was loaded from
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the original file in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// The parsed document
    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl PageSource for SourceDocument {
    fn id(&self) -> DocumentId {
        self.id
    }

    fn page_count(&self) -> usize {
        self.page_count
    }
}
