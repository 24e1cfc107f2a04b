//! ProMan Protocol - Marker-delimited development protocol documents
//!
//! A development protocol is markdown embedded in an issue or pull request
//! body. Named fields live between marker pairs such as
//! `<!-- start-tasklist -->` and `<!-- end-tasklist -->`; everything outside
//! the markers is left untouched by every mutation.

mod checkbox;
mod document;
pub mod markers;
pub mod tasklist;

pub use checkbox::toggle_checkbox;
pub use document::{ProtocolDocument, PR_LIST, PR_TITLE, REFERENCES, STATUS, TASKLIST, TIMELINE};
pub use markers::{MarkerPair, Span};
pub use tasklist::{TaskEntry, TaskSummary};
