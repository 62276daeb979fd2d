pub mod background;
pub mod clock;
pub mod font;
pub mod progress;

use tracing::{debug, info, warn};

use crate::document::{DocumentProvider, Node, NodeId};
use crate::error::{AuditResult, ProviderError};
use crate::math::checker::{is_large_text, level, passes_aa, round_ratio};
use crate::math::composite::contrast_with_alpha;
use crate::math::hex::to_hex;
use crate::types::{IssueType, Rgba, ScanOptions, ScanResult, TextLayerRecord};
use background::resolve_background;
use clock::{Clock, SystemClock};
use font::resolve_font;
use progress::ProgressThrottle;

/// Longest display text kept on a record, in characters.
pub const DISPLAY_TEXT_MAX: usize = 50;

/// Text with no resolvable fill is drawn black.
pub const DEFAULT_TEXT_COLOR: Rgba = Rgba::BLACK;
/// Contrast is computed against white when no background can be resolved.
pub const DEFAULT_BACKGROUND: Rgba = Rgba::WHITE;

/// Which part of the document to scan.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScanScope {
    /// The current selection if it is non-empty, otherwise the current page.
    #[default]
    Auto,
    /// Every top-level child of the current page.
    CurrentPage,
    /// These subtree roots, in order.
    Nodes(Vec<NodeId>),
}

/// Collapse whitespace runs and cap the length for display.
pub fn display_text(characters: &str) -> String {
    let collapsed = characters.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= DISPLAY_TEXT_MAX {
        return collapsed;
    }
    let mut truncated: String = collapsed.chars().take(DISPLAY_TEXT_MAX - 3).collect();
    truncated.push_str("...");
    truncated
}

/// Depth-first scan state for one invocation.
///
/// Visits nodes strictly one at a time in pre-order, so record order and
/// progress cadence are reproducible for a given document.
struct ScanOrchestrator<'a, 'p, P: DocumentProvider + ?Sized> {
    provider: &'a P,
    options: &'a ScanOptions,
    clock: &'a dyn Clock,
    progress: ProgressThrottle<'p>,
    records: Vec<TextLayerRecord>,
}

impl<P: DocumentProvider + ?Sized> ScanOrchestrator<'_, '_, P> {
    async fn visit_root(&mut self, root: &NodeId) {
        let mut stack = vec![root.clone()];

        while let Some(id) = stack.pop() {
            let Some(node) = self.provider.node(&id) else {
                warn!(node = %id, "node disappeared during scan");
                continue;
            };

            if !node.visible && !self.options.include_hidden_layers {
                continue;
            }

            if node.is_text() {
                if let Some(record) = self.inspect_text(&node).await {
                    self.records.push(record);
                    let now = self.clock.now_ms();
                    self.progress.tick(self.records.len(), now);
                }
            }

            stack.extend(node.children.iter().rev().cloned());
        }
    }

    async fn inspect_text(&self, node: &Node) -> Option<TextLayerRecord> {
        let text = node.text.as_ref()?;
        if text.characters.trim().is_empty() {
            debug!(node = %node.id, "skipping empty text layer");
            return None;
        }

        let font = resolve_font(self.provider, &node.id, text).await;
        let text_color = node.solid_fill().unwrap_or(DEFAULT_TEXT_COLOR);
        let background = resolve_background(self.provider, node);

        let (compare_against, background_issue) = match background {
            Some(bg) => (bg, IssueType::None),
            None => (DEFAULT_BACKGROUND, IssueType::NoBackground),
        };

        let ratio = contrast_with_alpha(text_color, compare_against);
        let is_large = is_large_text(font.size, font.weight);
        let wcag_level = level(ratio, is_large);

        let issue_type = if font.is_missing {
            IssueType::MissingFont
        } else if !passes_aa(ratio, is_large) {
            IssueType::ContrastFail
        } else {
            background_issue
        };

        let parent_name = node
            .parent
            .as_ref()
            .and_then(|p| self.provider.node(p))
            .map(|p| p.name)
            .unwrap_or_default();
        let bounds = node.bounds.unwrap_or_default();

        Some(TextLayerRecord {
            id: node.id.clone(),
            name: node.name.clone(),
            text: display_text(&text.characters),
            full_text: text.characters.clone(),
            font,
            text_color,
            background_color: background,
            text_hex: to_hex(text_color),
            background_hex: background.map(to_hex),
            contrast_ratio: round_ratio(ratio),
            wcag_level,
            is_large_text: is_large,
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            parent_name,
            has_issue: issue_type != IssueType::None,
            issue_type,
        })
    }
}

async fn resolve_roots<P: DocumentProvider + ?Sized>(
    provider: &P,
    scope: ScanScope,
) -> AuditResult<Vec<NodeId>> {
    let selection = match scope {
        ScanScope::Nodes(nodes) => return Ok(nodes),
        ScanScope::Auto => provider.selection(),
        ScanScope::CurrentPage => Vec::new(),
    };
    if !selection.is_empty() {
        return Ok(selection);
    }

    let page_id = provider.current_page();
    provider.load_page(&page_id).await?;
    let page = provider
        .node(&page_id)
        .ok_or_else(|| ProviderError::UnknownPage(page_id.to_string()))?;
    Ok(page.children)
}

/// Scan with the system clock.
pub async fn scan<P: DocumentProvider + ?Sized>(
    provider: &P,
    scope: ScanScope,
    options: &ScanOptions,
    progress: Option<&mut dyn FnMut(usize)>,
) -> AuditResult<ScanResult> {
    let clock = SystemClock::new();
    scan_with_clock(provider, scope, options, progress, &clock).await
}

/// Scan the given scope and assemble a [`ScanResult`].
///
/// The timeout is checked after each top-level root; a root that has started
/// is always finished, and no further root starts once the timeout has
/// passed. A scan whose last root overruns is still flagged `timed_out`.
/// Records gathered before the timeout are kept.
pub async fn scan_with_clock<P: DocumentProvider + ?Sized>(
    provider: &P,
    scope: ScanScope,
    options: &ScanOptions,
    progress: Option<&mut dyn FnMut(usize)>,
    clock: &dyn Clock,
) -> AuditResult<ScanResult> {
    let start = clock.now_ms();
    let roots = resolve_roots(provider, scope).await?;
    let timeout_ms = options.effective_timeout_ms();
    info!(roots = roots.len(), timeout_ms, "scan started");

    let mut orchestrator = ScanOrchestrator {
        provider,
        options,
        clock,
        progress: ProgressThrottle::new(progress, start),
        records: Vec::new(),
    };

    let mut timed_out = false;
    for (index, root) in roots.iter().enumerate() {
        orchestrator.visit_root(root).await;

        let elapsed = clock.now_ms().saturating_sub(start);
        if elapsed > timeout_ms {
            warn!(
                elapsed_ms = elapsed,
                visited_roots = index + 1,
                total_roots = roots.len(),
                "scan timed out, returning partial results"
            );
            timed_out = true;
            break;
        }
    }

    let ScanOrchestrator {
        mut progress,
        records,
        ..
    } = orchestrator;
    progress.finish(records.len());

    let duration = clock.now_ms().saturating_sub(start);
    let result = ScanResult::from_records(records, start, duration, timed_out);
    info!(
        total = result.total_scanned,
        errors = result.error_count,
        warnings = result.warning_count,
        passed = result.pass_count,
        duration_ms = result.scan_duration_ms,
        timed_out = result.timed_out,
        "scan finished"
    );
    Ok(result)
}
