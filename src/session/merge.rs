//! Merge tool: combine every page of the queued PDFs into one

use std::sync::Arc;

use crate::document::SourceDocument;
use crate::error::{Error, Result};
use crate::input::{check_selected, filter_dropped, InputFile};
use crate::output::{OutputBlob, MERGED_FILE_NAME};
use crate::pdf::{load_document, PagePool};
use crate::plan::{plan_merge, AssemblyPlan, MIN_MERGE_INPUTS};
use crate::queue::{DocumentId, DragReorder, FileQueue};

use super::{RunOutcome, RunTicket, ToolState, ToolStatus};

/// What happened to a batch of added files
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddReport {
    /// Ids of the queued files, in queue order
    pub added: Vec<DocumentId>,
    /// Files skipped because they were not PDFs
    pub rejected: Vec<String>,
}

/// Owns the merge queue and the merged output
#[derive(Debug, Default)]
pub struct MergeTool {
    queue: FileQueue<Arc<SourceDocument>>,
    state: ToolState,
}

impl MergeTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self) -> &FileQueue<Arc<SourceDocument>> {
        &self.queue
    }

    pub fn status(&self) -> &ToolStatus {
        self.state.status()
    }

    pub fn outputs(&self) -> &[OutputBlob] {
        self.state.outputs()
    }

    /// Add files from a drop; non-PDFs are skipped and reported
    ///
    /// Every accepted file must load, otherwise nothing is added.
    pub fn add_dropped(&mut self, files: Vec<InputFile>) -> Result<AddReport> {
        let outcome = filter_dropped(files);
        let added = self.load_all(outcome.accepted)?;
        Ok(AddReport {
            added,
            rejected: outcome.rejected,
        })
    }

    /// Add files from a file picker; any non-PDF fails the whole batch
    pub fn add_selected(&mut self, files: Vec<InputFile>) -> Result<AddReport> {
        if let Err(e) = files.iter().try_for_each(check_selected) {
            return Err(self.state.fail(e));
        }
        let added = self.load_all(files)?;
        Ok(AddReport {
            added,
            rejected: Vec::new(),
        })
    }

    fn load_all(&mut self, files: Vec<InputFile>) -> Result<Vec<DocumentId>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let added = match self.queue.try_extend_with(files, |id, file| {
            load_document(id, &file.name, &file.bytes).map(Arc::new)
        }) {
            Ok(added) => added,
            Err(e) => return Err(self.state.fail(e)),
        };
        log::info!("Queued {} files ({} total)", added.len(), self.queue.len());
        self.state.invalidate();
        Ok(added)
    }

    /// Remove a queued file
    pub fn remove(&mut self, id: DocumentId) -> Result<()> {
        self.queue.remove(id).ok_or(Error::UnknownDocument(id))?;
        self.state.invalidate();
        Ok(())
    }

    /// Move the file at `from` to position `to`
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        self.queue.move_item(from, to)?;
        if from != to {
            self.state.invalidate();
        }
        Ok(())
    }

    /// Start a drag-to-reorder gesture on the queue
    ///
    /// Outputs are only released once the gesture actually moves an entry.
    pub fn drag(&mut self) -> MergeDrag<'_> {
        MergeDrag {
            drag: self.queue.drag(),
            state: &mut self.state,
        }
    }

    /// Clear the queue and any output, cancelling a run in flight
    pub fn reset(&mut self) {
        self.queue.clear();
        self.state.reset();
    }

    /// Whether a merge can start right now
    pub fn can_merge(&self) -> bool {
        self.queue.len() >= MIN_MERGE_INPUTS && !self.state.is_processing()
    }

    /// Plan the merge and take the in-flight slot
    pub fn prepare(&mut self) -> Result<MergeJob> {
        self.state.check_slot()?;

        let sources: Vec<Arc<SourceDocument>> =
            self.queue.iter().map(|(_, doc)| Arc::clone(doc)).collect();

        match plan_merge(&sources) {
            Ok(plan) => {
                let ticket = self.state.begin()?;
                Ok(MergeJob {
                    ticket,
                    plan,
                    sources,
                })
            }
            Err(e) => Err(self.state.fail(e)),
        }
    }

    /// Store the result of a job from [`MergeTool::prepare`]
    pub fn complete(&mut self, outcome: RunOutcome) -> Result<&[OutputBlob]> {
        self.state.finish(outcome)
    }

    /// Prepare, run and complete in one call
    pub fn merge(&mut self) -> Result<&[OutputBlob]> {
        let job = self.prepare()?;
        let outcome = job.run();
        self.complete(outcome)
    }
}

/// A drag gesture on the merge queue
///
/// Wraps [`DragReorder`] so that finished outputs are released only when an
/// entry really moves.
pub struct MergeDrag<'a> {
    drag: DragReorder<'a, Arc<SourceDocument>>,
    state: &'a mut ToolState,
}

impl MergeDrag<'_> {
    /// Begin dragging the entry at `index`
    pub fn start(&mut self, index: usize) -> Result<()> {
        self.drag.start(index)
    }

    /// The dragged entry hovers over `index`; `true` when the queue changed
    pub fn enter(&mut self, index: usize) -> Result<bool> {
        let moved = self.drag.enter(index)?;
        if moved {
            self.state.invalidate();
        }
        Ok(moved)
    }

    pub fn current(&self) -> Option<usize> {
        self.drag.current()
    }

    pub fn finish(self) {
        self.drag.finish();
    }
}

/// A planned merge that owns everything it needs
#[derive(Debug)]
pub struct MergeJob {
    ticket: RunTicket,
    plan: AssemblyPlan,
    sources: Vec<Arc<SourceDocument>>,
}

impl MergeJob {
    pub fn plan(&self) -> &AssemblyPlan {
        &self.plan
    }

    /// Copy the pages and save the merged document
    pub fn run(self) -> RunOutcome {
        let result = self.build();
        RunOutcome::new(self.ticket, result)
    }

    fn build(&self) -> Result<Vec<OutputBlob>> {
        let sources: Vec<&SourceDocument> = self.sources.iter().map(Arc::as_ref).collect();
        let pool = PagePool::new(&sources)?;

        let mut outputs = Vec::with_capacity(self.plan.units.len());
        for unit in &self.plan.units {
            outputs.push(OutputBlob::new(MERGED_FILE_NAME, pool.assemble(unit)?));
        }
        log::info!(
            "Merged {} files into {} pages",
            self.sources.len(),
            self.plan.page_total()
        );
        Ok(outputs)
    }
}
