//! JSON builders for snapshot fixtures.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::document::{DocumentProvider, DocumentSnapshot, FontName, Node, NodeId, TextStyle};
use crate::error::ProviderError;

fn bounding_box([x, y, width, height]: [f64; 4]) -> Value {
    json!({"x": x, "y": y, "width": width, "height": height})
}

fn solid(hex: &str) -> Value {
    json!([{"type": "SOLID", "color": hex}])
}

pub fn frame(id: &str, fill: Option<&str>, bounds: [f64; 4], children: Vec<Value>) -> Value {
    let mut node = json!({
        "id": id,
        "name": format!("Frame {id}"),
        "type": "FRAME",
        "absoluteBoundingBox": bounding_box(bounds),
        "children": children,
    });
    if let Some(hex) = fill {
        node["fills"] = solid(hex);
    }
    node
}

pub fn rect(id: &str, fill: &str, bounds: [f64; 4]) -> Value {
    json!({
        "id": id,
        "name": format!("Rect {id}"),
        "type": "RECTANGLE",
        "fills": solid(fill),
        "absoluteBoundingBox": bounding_box(bounds),
    })
}

/// Inter text node with no bounds.
pub fn text_node(id: &str, characters: &str, color: &str, size: f64, style: &str) -> Value {
    json!({
        "id": id,
        "name": id,
        "type": "TEXT",
        "characters": characters,
        "fills": solid(color),
        "fontName": {"family": "Inter", "style": style},
        "fontSize": size,
    })
}

pub fn text_at(id: &str, characters: &str, color: &str, bounds: [f64; 4]) -> Value {
    let mut node = text_node(id, characters, color, 16.0, "Regular");
    node["absoluteBoundingBox"] = bounding_box(bounds);
    node
}

/// Snapshot wrapper that fails on demand: hides some nodes from `node()` and
/// makes every text style lookup error.
pub struct FaultyProvider {
    pub inner: DocumentSnapshot,
    pub hidden: HashSet<NodeId>,
    pub failing_styles: bool,
}

impl FaultyProvider {
    pub fn new(doc: Value) -> Self {
        Self {
            inner: DocumentSnapshot::from_value(doc).unwrap(),
            hidden: HashSet::new(),
            failing_styles: false,
        }
    }

    pub fn hide(mut self, id: &str) -> Self {
        self.hidden.insert(NodeId::from(id));
        self
    }

    pub fn failing_styles(mut self) -> Self {
        self.failing_styles = true;
        self
    }
}

#[async_trait]
impl DocumentProvider for FaultyProvider {
    fn node(&self, id: &NodeId) -> Option<Node> {
        if self.hidden.contains(id) {
            return None;
        }
        self.inner.node(id)
    }

    fn current_page(&self) -> NodeId {
        self.inner.current_page()
    }

    fn selection(&self) -> Vec<NodeId> {
        self.inner.selection()
    }

    async fn text_style(&self, style_id: &str) -> Result<Option<TextStyle>, ProviderError> {
        if self.failing_styles {
            return Err(ProviderError::StyleLookup {
                style_id: style_id.to_string(),
                reason: "style library unavailable".to_string(),
            });
        }
        self.inner.text_style(style_id).await
    }

    async fn load_font(&self, font: &FontName) -> Result<(), ProviderError> {
        self.inner.load_font(font).await
    }

    async fn node_by_id(&self, id: &str) -> Option<Node> {
        self.node(&NodeId::from(id))
    }

    fn set_current_page(&mut self, page: &NodeId) -> Result<(), ProviderError> {
        self.inner.set_current_page(page)
    }

    fn set_selection(&mut self, nodes: Vec<NodeId>) {
        self.inner.set_selection(nodes)
    }

    fn scroll_and_zoom_into_view(&mut self, nodes: &[NodeId]) {
        self.inner.scroll_and_zoom_into_view(nodes)
    }
}
