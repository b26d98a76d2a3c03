//! Page assembly planning
//!
//! A plan lists, for every output document, which page of which source goes
//! where. Merge and split both reduce to a plan; the PDF library then copies
//! the listed pages in order.

use crate::document::PageSource;
use crate::error::{Error, Result};
use crate::queue::DocumentId;
use crate::range::PageRangeGroup;

/// Minimum number of documents for a merge
pub const MIN_MERGE_INPUTS: usize = 2;

/// One page of one source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRef {
    pub document: DocumentId,
    /// 0-based page index
    pub index: usize,
}

/// Page sequence of a single output document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyUnit {
    pub pages: Vec<PageRef>,
}

impl AssemblyUnit {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Distinct source documents in first-use order
    pub fn documents(&self) -> Vec<DocumentId> {
        let mut seen = Vec::new();
        for page in &self.pages {
            if !seen.contains(&page.document) {
                seen.push(page.document);
            }
        }
        seen
    }
}

/// Ordered output documents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyPlan {
    pub units: Vec<AssemblyUnit>,
}

impl AssemblyPlan {
    /// Total number of pages across all units
    pub fn page_total(&self) -> usize {
        self.units.iter().map(AssemblyUnit::len).sum()
    }
}

/// Plan a merge: every page of every document, in queue order
///
/// The output has exactly one unit. Pages follow the order of `documents`
/// first and each document's own page order second.
pub fn plan_merge<P: PageSource>(documents: &[P]) -> Result<AssemblyPlan> {
    if documents.len() < MIN_MERGE_INPUTS {
        return Err(Error::InsufficientInputs {
            required: MIN_MERGE_INPUTS,
            found: documents.len(),
        });
    }

    let pages = documents
        .iter()
        .flat_map(|doc| {
            let id = doc.id();
            (0..doc.page_count()).map(move |index| PageRef { document: id, index })
        })
        .collect();

    let plan = AssemblyPlan {
        units: vec![AssemblyUnit { pages }],
    };
    log::debug!(
        "Merge plan: {} documents, {} pages",
        documents.len(),
        plan.page_total()
    );
    Ok(plan)
}

/// Plan a split: one unit per range group, pages in group order
///
/// Groups left empty by range filtering keep their slot as an empty unit so
/// that units line up with the requested groups. At least one group must
/// contain a page.
pub fn plan_split<P: PageSource>(document: &P, groups: &[PageRangeGroup]) -> Result<AssemblyPlan> {
    let page_count = document.page_count();
    let id = document.id();

    let units: Vec<AssemblyUnit> = groups
        .iter()
        .map(|group| AssemblyUnit {
            pages: group
                .indices
                .iter()
                .copied()
                .filter(|&index| index < page_count)
                .map(|index| PageRef { document: id, index })
                .collect(),
        })
        .collect();

    if units.iter().all(AssemblyUnit::is_empty) {
        return Err(Error::NoValidPages);
    }

    log::debug!(
        "Split plan: {} groups, {} pages",
        units.len(),
        units.iter().map(AssemblyUnit::len).sum::<usize>()
    );
    Ok(AssemblyPlan { units })
}
