use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{
    DocumentProvider, FontName, LetterSpacing, LineHeight, Mixed, Node, NodeId, NodeKind, Paint,
    Rect, TextProps, TextStyle,
};
use crate::error::{AuditError, AuditResult, ProviderError};

/// Id of the synthetic document root that parents every page.
pub const DOCUMENT_ID: &str = "0:0";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default)]
    current_page: Option<NodeId>,
    #[serde(default)]
    selection: Vec<NodeId>,
    pages: Vec<RawPage>,
    #[serde(default)]
    text_styles: Vec<TextStyle>,
    #[serde(default)]
    available_fonts: Option<Vec<FontName>>,
}

#[derive(Deserialize)]
struct RawPage {
    id: NodeId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    backgrounds: Vec<Paint>,
    #[serde(default)]
    children: Vec<RawNode>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    id: NodeId,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: NodeKind,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    fills: Mixed<Vec<Paint>>,
    #[serde(default)]
    absolute_bounding_box: Option<Rect>,
    #[serde(default)]
    children: Vec<RawNode>,
    #[serde(default)]
    characters: Option<String>,
    #[serde(default)]
    font_name: Mixed<FontName>,
    #[serde(default)]
    font_size: Mixed<f64>,
    #[serde(default)]
    line_height: Mixed<LineHeight>,
    #[serde(default)]
    letter_spacing: Mixed<LetterSpacing>,
    #[serde(default)]
    text_style_id: Mixed<String>,
    #[serde(default)]
    font_runs: Vec<FontName>,
}

/// In-memory document built from a JSON export. Implements every provider
/// capability, so it can stand in for the live host.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    nodes: HashMap<NodeId, Node>,
    pages: Vec<NodeId>,
    current_page: NodeId,
    selection: Vec<NodeId>,
    text_styles: HashMap<String, TextStyle>,
    /// None: every font loads.
    available_fonts: Option<HashSet<FontName>>,
    viewport: Vec<NodeId>,
}

impl DocumentSnapshot {
    pub fn from_json(raw: &str) -> AuditResult<Self> {
        let doc: RawDocument = serde_json::from_str(raw)?;
        Self::build(doc)
    }

    pub fn from_value(value: serde_json::Value) -> AuditResult<Self> {
        let doc: RawDocument = serde_json::from_value(value)?;
        Self::build(doc)
    }

    fn build(doc: RawDocument) -> AuditResult<Self> {
        if doc.pages.is_empty() {
            return Err(AuditError::invalid_snapshot("document has no pages"));
        }

        let document_id = NodeId::new(DOCUMENT_ID);
        let mut nodes = HashMap::new();
        let mut pages = Vec::with_capacity(doc.pages.len());

        for page in doc.pages {
            let page_id = page.id.clone();
            let mut children = Vec::with_capacity(page.children.len());
            for child in page.children {
                children.push(insert_node(&mut nodes, child, &page_id)?);
            }
            let node = Node {
                id: page_id.clone(),
                name: page.name,
                kind: NodeKind::Page,
                visible: true,
                parent: Some(document_id.clone()),
                children,
                fills: Mixed::Absent,
                backgrounds: page.backgrounds,
                bounds: None,
                text: None,
            };
            if nodes.insert(page_id.clone(), node).is_some() {
                return Err(duplicate(&page_id));
            }
            pages.push(page_id);
        }

        let root = Node {
            id: document_id.clone(),
            name: "Document".to_string(),
            kind: NodeKind::Document,
            visible: true,
            parent: None,
            children: pages.clone(),
            fills: Mixed::Absent,
            backgrounds: Vec::new(),
            bounds: None,
            text: None,
        };
        if nodes.insert(document_id.clone(), root).is_some() {
            return Err(duplicate(&document_id));
        }

        let current_page = match doc.current_page {
            Some(id) if pages.contains(&id) => id,
            Some(id) => {
                return Err(AuditError::invalid_snapshot(format!(
                    "currentPage '{id}' is not a page"
                )))
            }
            None => pages[0].clone(),
        };

        if let Some(missing) = doc.selection.iter().find(|id| !nodes.contains_key(*id)) {
            return Err(AuditError::invalid_snapshot(format!(
                "selection references unknown node '{missing}'"
            )));
        }

        let text_styles = doc
            .text_styles
            .into_iter()
            .map(|style| (style.id.clone(), style))
            .collect();

        debug!(nodes = nodes.len(), pages = pages.len(), "document snapshot loaded");

        Ok(Self {
            nodes,
            pages,
            current_page,
            selection: doc.selection,
            text_styles,
            available_fonts: doc.available_fonts.map(|fonts| fonts.into_iter().collect()),
            viewport: Vec::new(),
        })
    }

    pub fn pages(&self) -> &[NodeId] {
        &self.pages
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes most recently scrolled into view.
    pub fn viewport_target(&self) -> &[NodeId] {
        &self.viewport
    }
}

fn duplicate(id: &NodeId) -> AuditError {
    AuditError::invalid_snapshot(format!("duplicate node id '{id}'"))
}

fn insert_node(
    nodes: &mut HashMap<NodeId, Node>,
    raw: RawNode,
    parent: &NodeId,
) -> AuditResult<NodeId> {
    let id = raw.id.clone();
    let mut children = Vec::with_capacity(raw.children.len());
    for child in raw.children {
        children.push(insert_node(nodes, child, &id)?);
    }

    let text = (raw.kind == NodeKind::Text).then(|| TextProps {
        characters: raw.characters.unwrap_or_default(),
        font_name: raw.font_name,
        font_size: raw.font_size,
        line_height: raw.line_height,
        letter_spacing: raw.letter_spacing,
        text_style_id: raw.text_style_id,
        font_runs: raw.font_runs,
    });

    let node = Node {
        id: id.clone(),
        name: raw.name,
        kind: raw.kind,
        visible: raw.visible,
        parent: Some(parent.clone()),
        children,
        fills: raw.fills,
        backgrounds: Vec::new(),
        bounds: raw.absolute_bounding_box,
        text,
    };

    if nodes.insert(id.clone(), node).is_some() {
        return Err(duplicate(&id));
    }
    Ok(id)
}

#[async_trait]
impl DocumentProvider for DocumentSnapshot {
    fn node(&self, id: &NodeId) -> Option<Node> {
        self.nodes.get(id).cloned()
    }

    fn current_page(&self) -> NodeId {
        self.current_page.clone()
    }

    fn selection(&self) -> Vec<NodeId> {
        self.selection.clone()
    }

    async fn text_style(&self, style_id: &str) -> Result<Option<TextStyle>, ProviderError> {
        Ok(self.text_styles.get(style_id).cloned())
    }

    async fn load_font(&self, font: &FontName) -> Result<(), ProviderError> {
        match &self.available_fonts {
            Some(fonts) if !fonts.contains(font) => Err(ProviderError::FontUnavailable {
                family: font.family.clone(),
                style: font.style.clone(),
            }),
            _ => Ok(()),
        }
    }

    async fn node_by_id(&self, id: &str) -> Option<Node> {
        self.nodes.get(&NodeId::from(id)).cloned()
    }

    fn set_current_page(&mut self, page: &NodeId) -> Result<(), ProviderError> {
        if !self.pages.contains(page) {
            return Err(ProviderError::UnknownPage(page.to_string()));
        }
        self.current_page = page.clone();
        Ok(())
    }

    fn set_selection(&mut self, nodes: Vec<NodeId>) {
        self.selection = nodes;
    }

    fn scroll_and_zoom_into_view(&mut self, nodes: &[NodeId]) {
        self.viewport = nodes.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    fn two_page_document() -> serde_json::Value {
        json!({
            "pages": [
                {
                    "id": "1:1",
                    "name": "Cover",
                    "children": [
                        {
                            "id": "2:1",
                            "name": "Card",
                            "type": "FRAME",
                            "fills": [{"type": "SOLID", "color": "#ffffff"}],
                            "absoluteBoundingBox": {"x": 0, "y": 0, "width": 200, "height": 100},
                            "children": [
                                {
                                    "id": "2:2",
                                    "name": "Title",
                                    "type": "TEXT",
                                    "characters": "Hello",
                                    "fontName": "mixed",
                                    "fontSize": 16,
                                    "fontRuns": [{"family": "Inter", "style": "Bold"}]
                                }
                            ]
                        }
                    ]
                },
                {"id": "1:2", "name": "Second"}
            ],
            "textStyles": [
                {"id": "S:1", "name": "Body", "fontName": {"family": "Inter", "style": "Regular"}, "fontSize": 14}
            ],
            "availableFonts": [{"family": "Inter", "style": "Regular"}]
        })
    }

    #[test]
    fn builds_parent_links_and_pages() {
        let doc = DocumentSnapshot::from_value(two_page_document()).unwrap();
        assert_eq!(doc.pages(), &[NodeId::from("1:1"), NodeId::from("1:2")]);
        assert_eq!(doc.current_page(), NodeId::from("1:1"));
        // document root + 2 pages + frame + text
        assert_eq!(doc.node_count(), 5);

        let text = doc.node(&NodeId::from("2:2")).unwrap();
        assert_eq!(text.parent, Some(NodeId::from("2:1")));
        let frame = doc.node(&NodeId::from("2:1")).unwrap();
        assert_eq!(frame.parent, Some(NodeId::from("1:1")));
        let page = doc.node(&NodeId::from("1:1")).unwrap();
        assert_eq!(page.parent, Some(NodeId::from(DOCUMENT_ID)));
        assert_eq!(page.kind, NodeKind::Page);
    }

    #[test]
    fn text_properties_are_captured() {
        let doc = DocumentSnapshot::from_value(two_page_document()).unwrap();
        let text = doc.node(&NodeId::from("2:2")).unwrap();
        let props = text.text.unwrap();
        assert_eq!(props.characters, "Hello");
        assert!(props.font_name.is_mixed());
        assert_eq!(props.font_size, Mixed::Uniform(16.0));
        assert_eq!(
            props.first_character_font(),
            Some(&FontName::new("Inter", "Bold"))
        );
    }

    #[test]
    fn non_text_nodes_have_no_text_props() {
        let doc = DocumentSnapshot::from_value(two_page_document()).unwrap();
        assert!(doc.node(&NodeId::from("2:1")).unwrap().text.is_none());
    }

    #[test]
    fn font_loading_respects_available_fonts() {
        let doc = DocumentSnapshot::from_value(two_page_document()).unwrap();
        assert!(block_on(doc.load_font(&FontName::new("Inter", "Regular"))).is_ok());
        let err = block_on(doc.load_font(&FontName::new("Comic Sans", "Regular"))).unwrap_err();
        assert!(matches!(err, ProviderError::FontUnavailable { .. }));
    }

    #[test]
    fn every_font_loads_without_font_list() {
        let doc = DocumentSnapshot::from_value(json!({"pages": [{"id": "1:1"}]})).unwrap();
        assert!(block_on(doc.load_font(&FontName::new("Anything", "Regular"))).is_ok());
    }

    #[test]
    fn style_lookup() {
        let doc = DocumentSnapshot::from_value(two_page_document()).unwrap();
        let style = block_on(doc.text_style("S:1")).unwrap().unwrap();
        assert_eq!(style.font_size, 14.0);
        assert!(block_on(doc.text_style("S:missing")).unwrap().is_none());
    }

    #[test]
    fn page_switching() {
        let mut doc = DocumentSnapshot::from_value(two_page_document()).unwrap();
        doc.set_current_page(&NodeId::from("1:2")).unwrap();
        assert_eq!(doc.current_page(), NodeId::from("1:2"));
        assert!(doc.set_current_page(&NodeId::from("2:1")).is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = DocumentSnapshot::from_value(json!({
            "pages": [{"id": "1:1", "children": [
                {"id": "3:1", "type": "FRAME"},
                {"id": "3:1", "type": "RECTANGLE"}
            ]}]
        }))
        .unwrap_err();
        assert!(matches!(err, AuditError::InvalidSnapshot(_)));
    }

    #[test]
    fn rejects_empty_document() {
        let err = DocumentSnapshot::from_value(json!({"pages": []})).unwrap_err();
        assert!(matches!(err, AuditError::InvalidSnapshot(_)));
    }

    #[test]
    fn rejects_unknown_selection() {
        let err = DocumentSnapshot::from_value(json!({
            "pages": [{"id": "1:1"}],
            "selection": ["9:9"]
        }))
        .unwrap_err();
        assert!(matches!(err, AuditError::InvalidSnapshot(_)));
    }

    #[test]
    fn rejects_current_page_that_is_not_a_page() {
        let err = DocumentSnapshot::from_value(json!({
            "pages": [{"id": "1:1", "children": [{"id": "3:1", "type": "FRAME"}]}],
            "currentPage": "3:1"
        }))
        .unwrap_err();
        assert!(matches!(err, AuditError::InvalidSnapshot(_)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            DocumentSnapshot::from_json("{"),
            Err(AuditError::Json(_))
        ));
    }
}
