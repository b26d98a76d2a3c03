//! SecurePDF Tools Library
//!
//! Local PDF merging, splitting and password protection.
//! This library provides functionality to:
//! - Parse page range lists such as `"1-3, 5, 8-10"`
//! - Plan which pages of which documents go into each output
//! - Keep a user-ordered queue of documents to merge
//! - Copy the planned pages into new PDFs and encrypt PDFs (via lopdf)
//! - Drive each tool through a small command interface with a single
//!   in-flight slot
//!
//! # Example
//!
//! ```no_run
//! use securepdf_tools::input::InputFile;
//! use securepdf_tools::session::SplitTool;
//! use std::path::Path;
//!
//! let mut tool = SplitTool::new();
//! tool.load(InputFile::read(Path::new("report.pdf"))?)?;
//! tool.set_ranges("1-3, 5");
//!
//! for output in tool.split()? {
//!     output.write_to_dir(Path::new("."))?;
//! }
//! # Ok::<(), securepdf_tools::Error>(())
//! ```

pub mod document;
pub mod error;
pub mod input;
pub mod output;
pub mod pdf;
pub mod plan;
pub mod queue;
pub mod range;
pub mod session;

// Re-export commonly used items
pub use document::{PageSource, SourceDocument};
pub use error::{Error, Result};
pub use plan::{plan_merge, plan_split, AssemblyPlan, AssemblyUnit, PageRef};
pub use queue::{DocumentId, FileQueue};
pub use range::{parse_ranges, PageRangeGroup};
