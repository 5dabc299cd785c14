//! Host editor integration for calsync.
//!
//! The note-taking host is consumed through the [`HostEditor`] capability
//! trait: get the currently open page, list registered template blocks,
//! append a block under a page, and show a user-facing message. Core logic
//! never talks to a concrete host; adapters implement the trait at the
//! boundary. [`LogseqHost`] adapts Logseq's local HTTP API.

pub mod editor;
pub mod logseq;

pub use editor::{BoxFuture, HostEditor, HostError, HostResult, Page, Severity};
pub use logseq::LogseqHost;
