//! Protect tool: save a password-protected copy of one PDF

use std::fmt;
use std::sync::Arc;

use crate::document::SourceDocument;
use crate::error::{Error, Result};
use crate::input::{check_selected, InputFile};
use crate::output::{protected_file_name, OutputBlob};
use crate::pdf::{
    load_document, password_strength, protect_document, EncryptionParams, PasswordStrength,
};
use crate::queue::IdGenerator;

use super::{RunOutcome, RunTicket, ToolState, ToolStatus};

/// Owns the document to protect and the chosen password
#[derive(Default)]
pub struct ProtectTool {
    ids: IdGenerator,
    source: Option<Arc<SourceDocument>>,
    password: String,
    owner_password: Option<String>,
    state: ToolState,
}

// Passwords stay out of debug output
impl fmt::Debug for ProtectTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtectTool")
            .field("source", &self.source.as_ref().map(|s| s.name()))
            .field("strength", &self.strength())
            .field("state", &self.state)
            .finish()
    }
}

impl ProtectTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<&SourceDocument> {
        self.source.as_deref()
    }

    pub fn status(&self) -> &ToolStatus {
        self.state.status()
    }

    pub fn outputs(&self) -> &[OutputBlob] {
        self.state.outputs()
    }

    /// Load the document to protect
    pub fn load(&mut self, file: InputFile) -> Result<()> {
        self.state.check_slot()?;

        let loaded = check_selected(&file)
            .and_then(|_| load_document(self.ids.next_id(), &file.name, &file.bytes));

        match loaded {
            Ok(doc) => {
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

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Use a specific owner password instead of the derived one
    pub fn set_owner_password(&mut self, owner_password: Option<String>) {
        self.owner_password = owner_password;
    }

    /// Strength of the current password
    pub fn strength(&self) -> PasswordStrength {
        password_strength(&self.password)
    }

    /// Whether a run can start right now
    pub fn can_protect(&self) -> bool {
        self.source.is_some() && !self.password.trim().is_empty() && !self.state.is_processing()
    }

    /// Drop the document, the passwords and any output, cancelling a run
    /// in flight
    pub fn reset(&mut self) {
        self.source = None;
        self.password.clear();
        self.owner_password = None;
        self.state.reset();
    }

    /// Assemble the encryption parameters and take the in-flight slot
    pub fn prepare(&mut self) -> Result<ProtectJob> {
        self.state.check_slot()?;

        let source = match &self.source {
            Some(source) => Arc::clone(source),
            None => return Err(self.state.fail(Error::NoDocumentLoaded)),
        };

        match EncryptionParams::with_owner(&self.password, self.owner_password.as_deref()) {
            Ok(params) => {
                let ticket = self.state.begin()?;
                Ok(ProtectJob {
                    ticket,
                    source,
                    params,
                })
            }
            Err(e) => Err(self.state.fail(e)),
        }
    }

    /// Store the result of a job from [`ProtectTool::prepare`]
    pub fn complete(&mut self, outcome: RunOutcome) -> Result<&[OutputBlob]> {
        self.state.finish(outcome)
    }

    /// Prepare, run and complete in one call
    pub fn protect(&mut self) -> Result<&[OutputBlob]> {
        let job = self.prepare()?;
        let outcome = job.run();
        self.complete(outcome)
    }
}

/// A pending encryption of one document
#[derive(Debug)]
pub struct ProtectJob {
    ticket: RunTicket,
    source: Arc<SourceDocument>,
    params: EncryptionParams,
}

impl ProtectJob {
    pub fn params(&self) -> &EncryptionParams {
        &self.params
    }

    pub fn run(self) -> RunOutcome {
        let result = protect_document(&self.source, &self.params).map(|bytes| {
            vec![OutputBlob::new(
                protected_file_name(self.source.name()),
                bytes,
            )]
        });
        RunOutcome::new(self.ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PDF_MIME;
    use crate::pdf::test_support::sample_pdf;
    use lopdf::Document;

    fn loaded() -> ProtectTool {
        let mut tool = ProtectTool::new();
        tool.load(InputFile::new("original.pdf", Some(PDF_MIME), sample_pdf(2, "O")))
            .unwrap();
        tool
    }

    #[test]
    fn test_protect_names_output() {
        let mut tool = loaded();
        tool.set_password("s3cret!");
        let outputs = tool.protect().unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].name, "protected-original.pdf");
        assert!(outputs[0].bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_blank_password_rejected() {
        let mut tool = loaded();
        assert!(!tool.can_protect());
        assert!(matches!(tool.protect(), Err(Error::EmptyPassword)));
        assert!(matches!(tool.status(), ToolStatus::Error(_)));
    }

    #[test]
    fn test_owner_password_override() {
        let mut tool = loaded();
        tool.set_password("user");
        tool.set_owner_password(Some("boss".to_string()));
        let job = tool.prepare().unwrap();
        assert_eq!(job.params().owner_password, "boss");
        tool.complete(job.run()).unwrap();
    }

    #[test]
    fn test_protected_output_opens_with_passwords() {
        let mut tool = loaded();
        tool.set_password("s3cret!");
        let outputs = tool.protect().unwrap();

        let doc = Document::load_mem(&outputs[0].bytes).unwrap();
        assert!(doc.is_encrypted());
        assert!(doc.authenticate_user_password("s3cret!").is_ok());
        assert!(doc.authenticate_owner_password("s3cret!_owner").is_ok());
        assert!(doc.authenticate_user_password("wrong").is_err());
    }

    #[test]
    fn test_reset_cancels_lost_run() {
        let mut tool = loaded();
        tool.set_password("abc123");
        drop(tool.prepare().unwrap());
        assert!(!tool.can_protect());

        tool.reset();
        assert_eq!(tool.status(), &ToolStatus::Idle);
        tool.load(InputFile::new("again.pdf", Some(PDF_MIME), sample_pdf(1, "G")))
            .unwrap();
        tool.set_password("abc123");
        assert_eq!(tool.protect().unwrap()[0].name, "protected-again.pdf");
    }

    #[test]
    fn test_debug_hides_password() {
        let mut tool = loaded();
        tool.set_password("topsecret");
        assert!(!format!("{:?}", tool).contains("topsecret"));
    }

    #[test]
    fn test_reset_clears_password() {
        let mut tool = loaded();
        tool.set_password("abc");
        tool.reset();
        assert_eq!(tool.strength(), PasswordStrength::None);
        assert!(tool.source().is_none());
    }

    #[test]
    fn test_load_rejects_non_pdf() {
        let mut tool = ProtectTool::new();
        let result = tool.load(InputFile::new("a.txt", Some("text/plain"), vec![]));
        assert!(matches!(result, Err(Error::UnsupportedFileType { .. })));
    }
}
