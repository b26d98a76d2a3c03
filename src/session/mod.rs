//! Tool orchestration
//!
//! Each tool owns its inputs, its status and the outputs of its last run.
//! Callers drive it through a few commands; nothing here knows about
//! rendering or event loops.
//!
//! A run has three phases so the PDF work can happen away from the caller's
//! event loop: `prepare()` validates input, builds the plan and takes the
//! tool's single in-flight slot; the returned job's `run()` does the PDF
//! work; `complete()` stores the result and frees the slot. While a job is
//! outstanding, another `prepare()` fails with
//! [`Error::OperationInProgress`](crate::Error::OperationInProgress).
//!
//! `reset()` cancels an outstanding run and frees the slot, so a job that
//! was dropped or lost never locks the tool. Every run carries a
//! [`RunTicket`]; `complete()` ignores outcomes whose ticket no longer
//! matches the tool's current run.

pub mod merge;
pub mod protect;
pub mod split;

pub use merge::{AddReport, MergeDrag, MergeJob, MergeTool};
pub use protect::{ProtectJob, ProtectTool};
pub use split::{SplitJob, SplitTool};

use crate::error::{Error, Result};
use crate::output::OutputBlob;

/// Where a tool stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToolStatus {
    #[default]
    Idle,
    /// A source document is loaded and the tool can run
    Ready,
    Processing,
    Done,
    /// The last run or load failed; holds the user-facing message
    Error(String),
}

/// Identifies one run of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket(u64);

/// Result of a job, tagged with the run it belongs to
#[derive(Debug)]
pub struct RunOutcome {
    ticket: RunTicket,
    result: Result<Vec<OutputBlob>>,
}

impl RunOutcome {
    pub(crate) fn new(ticket: RunTicket, result: Result<Vec<OutputBlob>>) -> Self {
        Self { ticket, result }
    }

    pub fn ticket(&self) -> RunTicket {
        self.ticket
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// The job's outputs, bypassing the tool
    pub fn into_result(self) -> Result<Vec<OutputBlob>> {
        self.result
    }
}

/// Status, outputs and in-flight slot shared by every tool
#[derive(Debug, Default)]
pub struct ToolState {
    status: ToolStatus,
    outputs: Vec<OutputBlob>,
    // Ticket of the most recent run
    generation: u64,
    // Inputs were edited while a run was in flight
    inputs_changed: bool,
}

impl ToolState {
    pub fn status(&self) -> &ToolStatus {
        &self.status
    }

    /// Outputs of the last successful run
    pub fn outputs(&self) -> &[OutputBlob] {
        &self.outputs
    }

    pub fn is_processing(&self) -> bool {
        self.status == ToolStatus::Processing
    }

    /// Fail if a run is already in flight
    pub(crate) fn check_slot(&self) -> Result<()> {
        if self.is_processing() {
            Err(Error::OperationInProgress)
        } else {
            Ok(())
        }
    }

    /// Take the in-flight slot; previous outputs are released
    pub(crate) fn begin(&mut self) -> Result<RunTicket> {
        self.check_slot()?;
        self.release();
        self.generation += 1;
        self.inputs_changed = false;
        self.status = ToolStatus::Processing;
        Ok(RunTicket(self.generation))
    }

    /// Store the outcome of a run and free the slot
    ///
    /// Outcomes of cancelled runs, and of runs whose inputs were edited
    /// meanwhile, are dropped with [`Error::RunCancelled`].
    pub(crate) fn finish(&mut self, outcome: RunOutcome) -> Result<&[OutputBlob]> {
        if !self.is_processing() || outcome.ticket != RunTicket(self.generation) {
            log::debug!("Ignoring outcome of cancelled run {}", outcome.ticket.0);
            return Err(Error::RunCancelled);
        }
        if self.inputs_changed {
            log::info!("Inputs changed during the run; discarding its outputs");
            self.reset();
            return Err(Error::RunCancelled);
        }

        match outcome.result {
            Ok(outputs) => {
                self.outputs = outputs;
                self.status = ToolStatus::Done;
                Ok(&self.outputs)
            }
            Err(e) => Err(self.record_error(e)),
        }
    }

    /// Record `error` as the tool's status and hand it back
    ///
    /// A run in flight keeps its `Processing` status; the error is only
    /// returned.
    pub(crate) fn fail(&mut self, error: Error) -> Error {
        if self.is_processing() {
            return error;
        }
        self.record_error(error)
    }

    fn record_error(&mut self, error: Error) -> Error {
        log::warn!("Operation failed: {}", error);
        self.release();
        self.status = ToolStatus::Error(error.to_string());
        error
    }

    pub(crate) fn set_status(&mut self, status: ToolStatus) {
        self.status = status;
    }

    /// Inputs changed: back to idle with no outputs
    ///
    /// A run in flight is marked so that its outcome is discarded.
    pub(crate) fn invalidate(&mut self) {
        if self.is_processing() {
            self.inputs_changed = true;
        } else {
            self.reset();
        }
    }

    /// Back to idle with no outputs, cancelling any run in flight
    pub(crate) fn reset(&mut self) {
        if self.is_processing() {
            log::info!("Cancelled run {}", self.generation);
        }
        self.release();
        self.inputs_changed = false;
        self.status = ToolStatus::Idle;
    }

    fn release(&mut self) {
        if !self.outputs.is_empty() {
            log::debug!("Releasing {} previous outputs", self.outputs.len());
        }
        self.outputs = Vec::new();
    }
}
