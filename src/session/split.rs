//! Split tool: one output PDF per page range

use std::sync::Arc;

use crate::document::{PageSource, SourceDocument};
use crate::error::{Error, Result};
use crate::input::{check_selected, InputFile};
use crate::output::{split_file_name, OutputBlob};
use crate::pdf::{load_document, PagePool};
use crate::plan::{plan_split, AssemblyPlan};
use crate::queue::IdGenerator;
use crate::range::parse_ranges;

use super::{RunOutcome, RunTicket, ToolState, ToolStatus};

/// Range text before any document is loaded
const DEFAULT_RANGES: &str = "1";

/// Owns the document being split and the range text
#[derive(Debug)]
pub struct SplitTool {
    ids: IdGenerator,
    source: Option<Arc<SourceDocument>>,
    ranges: String,
    state: ToolState,
}

impl Default for SplitTool {
    fn default() -> Self {
        Self {
            ids: IdGenerator::new(),
            source: None,
            ranges: DEFAULT_RANGES.to_string(),
            state: ToolState::default(),
        }
    }
}

impl SplitTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<&SourceDocument> {
        self.source.as_deref()
    }

    pub fn ranges(&self) -> &str {
        &self.ranges
    }

    pub fn status(&self) -> &ToolStatus {
        self.state.status()
    }

    pub fn outputs(&self) -> &[OutputBlob] {
        self.state.outputs()
    }

    /// Load the document to split
    ///
    /// The range text is preset to the whole document, e.g. `"1-12"`.
    pub fn load(&mut self, file: InputFile) -> Result<()> {
        self.state.check_slot()?;

        let loaded = check_selected(&file)
            .and_then(|_| load_document(self.ids.next_id(), &file.name, &file.bytes));

        match loaded {
            Ok(doc) => {
                self.ranges = format!("1-{}", doc.page_count());
                self.source = Some(Arc::new(doc));
                self.state.reset();
                self.state.set_status(ToolStatus::Ready);
                Ok(())
            }
            Err(e) => {
                self.source = None;
                Err(self.state.fail(e))
            }
        }
    }

    /// Replace the range text
    pub fn set_ranges(&mut self, ranges: impl Into<String>) {
        self.ranges = ranges.into();
    }

    /// Drop the document, the ranges and any output, cancelling a run in
    /// flight
    pub fn reset(&mut self) {
        self.source = None;
        self.ranges = DEFAULT_RANGES.to_string();
        self.state.reset();
    }

    /// Parse the ranges, plan the split and take the in-flight slot
    pub fn prepare(&mut self) -> Result<SplitJob> {
        self.state.check_slot()?;

        let source = match &self.source {
            Some(source) => Arc::clone(source),
            None => return Err(self.state.fail(Error::NoDocumentLoaded)),
        };

        let planned = parse_ranges(&self.ranges, source.page_count())
            .and_then(|groups| plan_split(&source, &groups));

        match planned {
            Ok(plan) => {
                let ticket = self.state.begin()?;
                Ok(SplitJob {
                    ticket,
                    plan,
                    source,
                })
            }
            Err(e) => Err(self.state.fail(e)),
        }
    }

    /// Store the result of a job from [`SplitTool::prepare`]
    pub fn complete(&mut self, outcome: RunOutcome) -> Result<&[OutputBlob]> {
        self.state.finish(outcome)
    }

    /// Prepare, run and complete in one call
    pub fn split(&mut self) -> Result<&[OutputBlob]> {
        let job = self.prepare()?;
        let outcome = job.run();
        self.complete(outcome)
    }
}

/// A planned split that owns its source document
#[derive(Debug)]
pub struct SplitJob {
    ticket: RunTicket,
    plan: AssemblyPlan,
    source: Arc<SourceDocument>,
}

impl SplitJob {
    pub fn plan(&self) -> &AssemblyPlan {
        &self.plan
    }

    /// Build one PDF per non-empty unit
    pub fn run(self) -> RunOutcome {
        let result = self.build();
        RunOutcome::new(self.ticket, result)
    }

    fn build(&self) -> Result<Vec<OutputBlob>> {
        let pool = PagePool::new(&[self.source.as_ref()])?;
        let mut outputs = Vec::new();

        for unit in self.plan.units.iter().filter(|unit| !unit.is_empty()) {
            let bytes = pool.assemble(unit)?;
            let page_numbers: Vec<u32> = unit.pages.iter().map(|p| p.index as u32 + 1).collect();
            outputs.push(OutputBlob::new(split_file_name(&page_numbers), bytes));
        }

        log::info!(
            "Split {} into {} files",
            self.source.name(),
            outputs.len()
        );
        Ok(outputs)
    }
}
