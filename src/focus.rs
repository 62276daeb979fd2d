//! Bring a node into view: switch to its page, center the viewport on it
//! and select it.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::document::{DocumentProvider, Node, NodeId, NodeKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FocusError {
    #[error("Layer not found. It may have been deleted.")]
    NotFound(String),

    #[error("Layer '{0}' cannot be focused.")]
    NotFocusable(String),

    #[error("Layer '{0}' has no bounds to focus on.")]
    NoBounds(String),

    #[error("Could not focus layer: {0}")]
    Unexpected(String),
}

impl FocusError {
    /// Stable code sent to the UI alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            FocusError::NotFound(_) => "NODE_NOT_FOUND",
            FocusError::NotFocusable(_) => "NODE_NOT_FOCUSABLE",
            FocusError::NoBounds(_) => "NODE_NO_BOUNDS",
            FocusError::Unexpected(_) => "FOCUS_FAILED",
        }
    }
}

/// Boundary form of a focus attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Result<(), FocusError>> for FocusOutcome {
    fn from(result: Result<(), FocusError>) -> Self {
        match result {
            Ok(()) => FocusOutcome {
                success: true,
                message: None,
            },
            Err(e) => FocusOutcome {
                success: false,
                message: Some(e.to_string()),
            },
        }
    }
}

fn containing_page<P: DocumentProvider + ?Sized>(
    provider: &P,
    node: &Node,
) -> Result<NodeId, FocusError> {
    let mut next = node.parent.clone();
    while let Some(id) = next {
        let ancestor = provider
            .node(&id)
            .ok_or_else(|| FocusError::Unexpected(format!("ancestor '{id}' is missing")))?;
        match ancestor.kind {
            NodeKind::Page => return Ok(ancestor.id),
            NodeKind::Document => break,
            _ => next = ancestor.parent,
        }
    }
    Err(FocusError::Unexpected(format!(
        "layer '{}' is not on any page",
        node.id
    )))
}

/// Focus the node with the given id.
///
/// Lookup goes through [`DocumentProvider::node_by_id`], so nodes on pages
/// other than the current one are found. The page is loaded and switched to
/// before the viewport moves.
pub async fn focus_node<P: DocumentProvider + ?Sized>(
    provider: &mut P,
    node_id: &str,
) -> Result<(), FocusError> {
    let node = provider
        .node_by_id(node_id)
        .await
        .ok_or_else(|| FocusError::NotFound(node_id.to_string()))?;

    if !node.kind.has_visual_bounds() {
        return Err(FocusError::NotFocusable(node.name));
    }
    if node.bounds.map_or(true, |b| b.is_degenerate()) {
        return Err(FocusError::NoBounds(node.name));
    }

    let page = containing_page(&*provider, &node)?;
    if page != provider.current_page() {
        debug!(node = %node.id, page = %page, "switching page to focus node");
        provider
            .load_page(&page)
            .await
            .map_err(|e| FocusError::Unexpected(e.to_string()))?;
        provider
            .set_current_page(&page)
            .map_err(|e| FocusError::Unexpected(e.to_string()))?;
    }

    let target = vec![node.id];
    provider.scroll_and_zoom_into_view(&target);
    provider.set_selection(target);
    info!(node = node_id, "focused node");
    Ok(())
}

/// [`focus_node`] reduced to its boundary outcome.
pub async fn focus<P: DocumentProvider + ?Sized>(provider: &mut P, node_id: &str) -> FocusOutcome {
    let result = focus_node(provider, node_id).await;
    if let Err(e) = &result {
        warn!(node = node_id, code = e.code(), error = %e, "focus failed");
    }
    result.into()
}
