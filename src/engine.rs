use futures::executor::block_on;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::document::DocumentSnapshot;
use crate::error::AuditResult;
use crate::scanner::{scan, ScanScope};
use crate::types::{ScanOptions, ScanResult};

/// One exported document to audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput {
    pub path: String,
    /// Snapshot JSON.
    pub content: String,
}

/// Outcome for one input. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ScanResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Parse and scan a single snapshot.
pub fn scan_snapshot(content: &str, options: &ScanOptions) -> AuditResult<ScanResult> {
    let snapshot = DocumentSnapshot::from_json(content)?;
    block_on(scan(&snapshot, ScanScope::Auto, options, None))
}

/// Audit several exported documents in parallel.
///
/// Each document gets its own snapshot and its own sequential scan; nothing
/// is shared across documents. Reports come back in input order.
pub fn scan_documents(inputs: &[DocumentInput], options: &ScanOptions) -> Vec<DocumentReport> {
    inputs
        .par_iter()
        .map(|input| match scan_snapshot(&input.content, options) {
            Ok(result) => DocumentReport {
                path: input.path.clone(),
                result: Some(result),
                error: None,
            },
            Err(e) => {
                warn!(path = %input.path, error = %e, "document audit failed");
                DocumentReport {
                    path: input.path.clone(),
                    result: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect()
}
