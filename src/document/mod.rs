//! The document model the engine reads, and the provider capabilities it
//! needs from the host.
//!
//! The host owns the live node tree. The engine only reads node properties
//! and calls a handful of capabilities: style lookup, font loading, async
//! node lookup, page switching, selection and viewport control.

pub mod geometry;
pub mod mixed;
pub mod snapshot;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ProviderError;
use crate::math::color_parse::parse_css_color;
use crate::types::Rgba;

pub use geometry::Rect;
pub use mixed::Mixed;
pub use snapshot::DocumentSnapshot;

/// Opaque node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Document,
    Page,
    Frame,
    Group,
    Section,
    Component,
    ComponentSet,
    Instance,
    Rectangle,
    Ellipse,
    Polygon,
    Star,
    Vector,
    Line,
    BooleanOperation,
    Text,
    Slice,
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// Document and page roots have no bounds on the canvas.
    pub fn has_visual_bounds(&self) -> bool {
        !matches!(self, NodeKind::Document | NodeKind::Page)
    }

    pub fn is_root(&self) -> bool {
        matches!(self, NodeKind::Document | NodeKind::Page)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaintKind {
    Solid,
    GradientLinear,
    GradientRadial,
    GradientAngular,
    GradientDiamond,
    Image,
    Video,
    #[serde(other)]
    Other,
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

/// Accepts `{r,g,b,a?}` channels or any CSS color string.
fn deserialize_color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Rgba>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ColorValue {
        Channels(Rgba),
        Css(String),
    }

    match Option::<ColorValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(ColorValue::Channels(c)) => Ok(Some(c)),
        Some(ColorValue::Css(s)) => parse_css_color(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// One entry of a fill or background list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    #[serde(rename = "type")]
    pub kind: PaintKind,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub color: Option<Rgba>,
}

impl Paint {
    pub fn solid(color: Rgba) -> Self {
        Self {
            kind: PaintKind::Solid,
            visible: true,
            opacity: 1.0,
            color: Some(color),
        }
    }

    /// The paint's color with its opacity folded into alpha, if this is a
    /// visible solid paint.
    pub fn visible_solid_color(&self) -> Option<Rgba> {
        if !self.visible || self.kind != PaintKind::Solid {
            return None;
        }
        self.color.map(|c| c.with_opacity(self.opacity))
    }
}

/// First visible solid paint in declaration order.
pub fn first_visible_solid(paints: &[Paint]) -> Option<Rgba> {
    paints.iter().find_map(Paint::visible_solid_color)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl FontName {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: style.into(),
        }
    }
}

impl fmt::Display for FontName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.style)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineHeight {
    #[default]
    Auto,
    Pixels {
        value: f64,
    },
    Percent {
        value: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpacingUnit {
    Pixels,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LetterSpacing {
    pub unit: SpacingUnit,
    pub value: f64,
}

impl LetterSpacing {
    pub fn pixels(value: f64) -> Self {
        Self {
            unit: SpacingUnit::Pixels,
            value,
        }
    }

    /// Percentages are relative to the font size.
    pub fn to_pixels(&self, font_size: f64) -> f64 {
        match self.unit {
            SpacingUnit::Pixels => self.value,
            SpacingUnit::Percent => self.value / 100.0 * font_size,
        }
    }
}

impl Default for LetterSpacing {
    fn default() -> Self {
        Self::pixels(0.0)
    }
}

/// A named text style shared across text layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub font_name: FontName,
    pub font_size: f64,
    #[serde(default)]
    pub line_height: LineHeight,
    #[serde(default)]
    pub letter_spacing: LetterSpacing,
}

/// Text-specific properties of a text node. Every typographic property may be
/// mixed across the node's characters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextProps {
    pub characters: String,
    pub font_name: Mixed<FontName>,
    pub font_size: Mixed<f64>,
    pub line_height: Mixed<LineHeight>,
    pub letter_spacing: Mixed<LetterSpacing>,
    pub text_style_id: Mixed<String>,
    /// Fonts of the styled runs, in character order.
    pub font_runs: Vec<FontName>,
}

impl TextProps {
    /// Font of the first character, when the host exposes styled runs.
    pub fn first_character_font(&self) -> Option<&FontName> {
        self.font_runs.first()
    }
}

/// A read-only view of one node's properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub visible: bool,
    pub parent: Option<NodeId>,
    /// Back-to-front paint order.
    pub children: Vec<NodeId>,
    pub fills: Mixed<Vec<Paint>>,
    /// Page background paints. Empty for every other kind.
    pub backgrounds: Vec<Paint>,
    pub bounds: Option<Rect>,
    pub text: Option<TextProps>,
}

impl Node {
    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    pub fn has_fills(&self) -> bool {
        matches!(self.fills, Mixed::Uniform(_))
    }

    /// The fill list, unless absent or mixed.
    pub fn fills(&self) -> Option<&[Paint]> {
        self.fills.uniform().map(Vec::as_slice)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// First visible solid fill of this node.
    pub fn solid_fill(&self) -> Option<Rgba> {
        self.fills().and_then(first_visible_solid)
    }
}

/// Capabilities the engine needs from the host document.
///
/// Reads are synchronous. Style resolution, font loading, page loading and
/// lookup by id may suspend. Implementations are never called concurrently
/// by the engine.
#[async_trait]
pub trait DocumentProvider: Send + Sync {
    /// Current properties of a node, or None if it does not exist.
    fn node(&self, id: &NodeId) -> Option<Node>;

    fn current_page(&self) -> NodeId;

    fn selection(&self) -> Vec<NodeId>;

    /// Resolve a text style reference. `Ok(None)` when the style does not exist.
    async fn text_style(&self, style_id: &str) -> Result<Option<TextStyle>, ProviderError>;

    /// Try to load a font; an error means the runtime cannot render it.
    async fn load_font(&self, font: &FontName) -> Result<(), ProviderError>;

    /// Look a node up by id, including nodes on pages that are not loaded.
    async fn node_by_id(&self, id: &str) -> Option<Node>;

    /// Make sure a page's content is available before switching to it.
    async fn load_page(&self, _page: &NodeId) -> Result<(), ProviderError> {
        Ok(())
    }

    fn set_current_page(&mut self, page: &NodeId) -> Result<(), ProviderError>;

    fn set_selection(&mut self, nodes: Vec<NodeId>);

    /// Center and zoom the viewport on the given nodes.
    fn scroll_and_zoom_into_view(&mut self, nodes: &[NodeId]);
}
