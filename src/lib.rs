//! WCAG 2.1 text-contrast audit over a design document's layer tree.
//!
//! [`scanner::scan`] walks a [`document::DocumentProvider`], resolves each
//! text layer's font and effective background, and classifies the contrast
//! ratio. [`focus::focus_node`] brings a reported layer into view and
//! [`messaging::PluginSession`] drives both from UI messages.

#[cfg(feature = "node")]
pub mod bindings;
pub mod document;
pub mod engine;
pub mod error;
pub mod focus;
pub mod logging;
pub mod math;
pub mod messaging;
pub mod scanner;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use document::{DocumentProvider, DocumentSnapshot, NodeId};
pub use error::{AuditError, AuditResult, ProviderError};
pub use scanner::{scan, ScanScope};
pub use types::{IssueType, ScanOptions, ScanResult, TextLayerRecord, WcagLevel};
