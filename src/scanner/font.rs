use tracing::{debug, warn};

use crate::document::{DocumentProvider, FontName, Mixed, NodeId, TextProps, TextStyle};
use crate::math::checker::weight_from_name;
use crate::types::FontInfo;

pub const DEFAULT_FAMILY: &str = "Inter";
pub const DEFAULT_STYLE: &str = "Regular";
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

fn default_font() -> FontName {
    FontName::new(DEFAULT_FAMILY, DEFAULT_STYLE)
}

async fn lookup_style<P: DocumentProvider + ?Sized>(
    provider: &P,
    node_id: &NodeId,
    text: &TextProps,
) -> Option<TextStyle> {
    let style_id = text.text_style_id.uniform().filter(|id| !id.is_empty())?;
    match provider.text_style(style_id).await {
        Ok(Some(style)) => Some(style),
        Ok(None) => {
            debug!(node = %node_id, style = %style_id, "text style not found, using node font");
            None
        }
        Err(e) => {
            warn!(node = %node_id, error = %e, "text style lookup failed, using node font");
            None
        }
    }
}

/// Resolve the typography of a text node.
///
/// A referenced text style supplies family and style; the node's own size,
/// line height and letter spacing win over the style's whenever they are
/// uniform. Font availability is probed through the provider and recorded in
/// `is_missing`; failure never aborts.
pub async fn resolve_font<P: DocumentProvider + ?Sized>(
    provider: &P,
    node_id: &NodeId,
    text: &TextProps,
) -> FontInfo {
    let style = lookup_style(provider, node_id, text).await;

    let font_name = match (&style, &text.font_name) {
        (Some(style), _) => style.font_name.clone(),
        (None, Mixed::Uniform(font)) => font.clone(),
        (None, Mixed::Mixed) => text
            .first_character_font()
            .cloned()
            .unwrap_or_else(default_font),
        (None, Mixed::Absent) => default_font(),
    };

    let size = text
        .font_size
        .uniform()
        .copied()
        .filter(|s| s.is_finite() && *s > 0.0)
        .or_else(|| style.as_ref().map(|s| s.font_size))
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_FONT_SIZE);

    let line_height = text
        .line_height
        .uniform()
        .copied()
        .or_else(|| style.as_ref().map(|s| s.line_height))
        .unwrap_or_default();

    let letter_spacing = text
        .letter_spacing
        .uniform()
        .copied()
        .or_else(|| style.as_ref().map(|s| s.letter_spacing))
        .unwrap_or_default()
        .to_pixels(size);

    let is_missing = match provider.load_font(&font_name).await {
        Ok(()) => false,
        Err(e) => {
            debug!(node = %node_id, font = %font_name, error = %e, "font unavailable");
            true
        }
    };

    FontInfo {
        weight: weight_from_name(&font_name.style),
        family: font_name.family,
        style: font_name.style,
        size,
        line_height,
        letter_spacing,
        is_missing,
    }
}
