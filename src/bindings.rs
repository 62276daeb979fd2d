//! Node-API surface. Everything crosses the boundary as JSON strings or
//! plain objects.

use napi::{Error, Result, Status};
use napi_derive::napi;

use crate::engine::{self, DocumentInput};
use crate::error::AuditError;
use crate::math::checker;
use crate::math::color_parse::parse_css_color;
use crate::math::composite::contrast_with_alpha;
use crate::types::ScanOptions;

/// One exported document, as passed from JS.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub path: String,
    pub content: String,
}

fn to_napi(e: AuditError) -> Error {
    Error::new(Status::InvalidArg, e.to_string())
}

fn options_from(options_json: Option<String>) -> Result<ScanOptions> {
    match options_json {
        Some(raw) => ScanOptions::from_json(&raw).map_err(to_napi),
        None => Ok(ScanOptions::default()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::new(Status::GenericFailure, e.to_string()))
}

#[napi]
pub fn health_check() -> String {
    "text-contrast-audit ok".to_string()
}

/// Scan one snapshot; returns the ScanResult as JSON.
#[napi]
pub fn scan_document(snapshot_json: String, options_json: Option<String>) -> Result<String> {
    crate::logging::init();
    let options = options_from(options_json)?;
    let result = engine::scan_snapshot(&snapshot_json, &options).map_err(to_napi)?;
    to_json(&result)
}

/// Scan many snapshots in parallel; returns the reports array as JSON.
#[napi]
pub fn scan_documents(files: Vec<DocumentFile>, options_json: Option<String>) -> Result<String> {
    crate::logging::init();
    let options = options_from(options_json)?;
    let inputs: Vec<DocumentInput> = files
        .into_iter()
        .map(|f| DocumentInput {
            path: f.path,
            content: f.content,
        })
        .collect();
    to_json(&engine::scan_documents(&inputs, &options))
}

/// Contrast ratio of two CSS colors. A translucent foreground is composited
/// over the background first.
#[napi]
pub fn contrast_ratio(foreground: String, background: String) -> Result<f64> {
    let fg = parse_css_color(&foreground).map_err(to_napi)?;
    let bg = parse_css_color(&background).map_err(to_napi)?;
    Ok(contrast_with_alpha(fg, bg))
}

#[napi]
pub fn format_ratio(ratio: f64) -> String {
    checker::format_ratio(ratio)
}
