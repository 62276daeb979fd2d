use serde::{Deserialize, Serialize};

use crate::document::{LineHeight, NodeId};
use crate::error::{AuditError, AuditResult};

/// RGBA color with every channel normalized to 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Same color with its alpha multiplied by `opacity`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        Self {
            a: self.a * opacity,
            ..self
        }
    }
}

/// Resolved typography of one text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontInfo {
    pub family: String,
    pub style: String,
    /// Device-independent pixels.
    pub size: f64,
    /// 100-900.
    pub weight: u16,
    pub line_height: LineHeight,
    /// Pixels, already converted from percentages.
    pub letter_spacing: f64,
    /// The runtime could not load this family/style pairing.
    pub is_missing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WcagLevel {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "AA-Large")]
    AaLarge,
    #[serde(rename = "FAIL")]
    Fail,
}

impl WcagLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            WcagLevel::Aaa => "AAA",
            WcagLevel::Aa => "AA",
            WcagLevel::AaLarge => "AA-Large",
            WcagLevel::Fail => "FAIL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    #[default]
    None,
    ContrastFail,
    MissingFont,
    NoBackground,
}

impl IssueType {
    pub fn is_error(&self) -> bool {
        matches!(self, IssueType::ContrastFail)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, IssueType::MissingFont | IssueType::NoBackground)
    }
}

/// One audited text layer. Built once per qualifying text node per scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayerRecord {
    pub id: NodeId,
    pub name: String,
    /// Whitespace-collapsed, at most 50 characters.
    pub text: String,
    pub full_text: String,
    pub font: FontInfo,
    pub text_color: Rgba,
    pub background_color: Option<Rgba>,
    pub text_hex: String,
    pub background_hex: Option<String>,
    /// Rounded to two decimals.
    pub contrast_ratio: f64,
    pub wcag_level: WcagLevel,
    pub is_large_text: bool,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub parent_name: String,
    pub has_issue: bool,
    pub issue_type: IssueType,
}

/// Output of one scan invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub text_layers: Vec<TextLayerRecord>,
    pub total_scanned: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub pass_count: usize,
    pub scan_duration_ms: u64,
    /// Scan start, milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub timed_out: bool,
}

impl ScanResult {
    /// Assemble a result, partitioning the records by issue type.
    pub fn from_records(
        text_layers: Vec<TextLayerRecord>,
        timestamp: u64,
        scan_duration_ms: u64,
        timed_out: bool,
    ) -> Self {
        let mut error_count = 0;
        let mut warning_count = 0;
        let mut pass_count = 0;
        for layer in &text_layers {
            if layer.issue_type.is_error() {
                error_count += 1;
            } else if layer.issue_type.is_warning() {
                warning_count += 1;
            } else {
                pass_count += 1;
            }
        }

        Self {
            total_scanned: text_layers.len(),
            text_layers,
            error_count,
            warning_count,
            pass_count,
            scan_duration_ms,
            timestamp,
            timed_out,
        }
    }
}

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Options sent by the UI with a scan request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanOptions {
    /// Informational only; classification always uses the fixed WCAG thresholds.
    pub min_contrast_ratio: f64,
    /// Reserved.
    pub check_large_text: bool,
    pub include_hidden_layers: bool,
    pub timeout_ms: Option<u64>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            min_contrast_ratio: 4.5,
            check_large_text: true,
            include_hidden_layers: false,
            timeout_ms: Some(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ScanOptions {
    /// Parse options JSON as sent by the UI. Missing fields take their defaults.
    pub fn from_json(raw: &str) -> AuditResult<Self> {
        let options: ScanOptions =
            serde_json::from_str(raw).map_err(|e| AuditError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> AuditResult<()> {
        if !(1.0..=21.0).contains(&self.min_contrast_ratio) {
            return Err(AuditError::InvalidOptions(format!(
                "minContrastRatio must be between 1 and 21, got {}",
                self.min_contrast_ratio
            )));
        }
        Ok(())
    }

    pub fn effective_timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
    }
}
