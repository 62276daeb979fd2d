use tracing::debug;

use crate::document::geometry::bounds_overlap;
use crate::document::{first_visible_solid, DocumentProvider, Node, NodeId, NodeKind, Rect};
use crate::types::Rgba;

/// Find the color a text node is rendered against.
///
/// Walks up from the immediate parent. At each level the ancestor's own
/// first visible solid fill wins; otherwise the siblings painted behind the
/// path (nearest first) that overlap the text's bounds are tried. Once the
/// page is reached its background is used. Lookup failures at any level
/// yield None rather than an error.
pub fn resolve_background<P: DocumentProvider + ?Sized>(provider: &P, text: &Node) -> Option<Rgba> {
    let text_bounds = text.bounds.as_ref();
    let mut child = text.id.clone();
    let mut next = text.parent.clone();

    while let Some(ancestor_id) = next {
        let Some(ancestor) = provider.node(&ancestor_id) else {
            debug!(node = %text.id, ancestor = %ancestor_id, "ancestor lookup failed");
            return None;
        };

        if ancestor.kind.is_root() {
            return page_background(&ancestor);
        }

        if let Some(color) = ancestor.solid_fill() {
            return Some(color);
        }

        if let Some(color) = occluding_sibling_fill(provider, &ancestor, &child, text_bounds) {
            return Some(color);
        }

        child = ancestor.id;
        next = ancestor.parent;
    }

    debug!(node = %text.id, "node is detached from any page");
    None
}

fn page_background(root: &Node) -> Option<Rgba> {
    match root.kind {
        NodeKind::Page => first_visible_solid(&root.backgrounds),
        _ => None,
    }
}

/// First visible sibling below `child` in paint order whose bounds overlap
/// `target` and that has a visible solid fill.
fn occluding_sibling_fill<P: DocumentProvider + ?Sized>(
    provider: &P,
    parent: &Node,
    child: &NodeId,
    target: Option<&Rect>,
) -> Option<Rgba> {
    let index = parent.children.iter().position(|id| id == child)?;

    parent.children[..index].iter().rev().find_map(|sibling_id| {
        let sibling = provider.node(sibling_id)?;
        if !sibling.visible || !bounds_overlap(sibling.bounds.as_ref(), target) {
            return None;
        }
        sibling.solid_fill()
    })
}
