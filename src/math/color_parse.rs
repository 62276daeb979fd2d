use csscolorparser::Color;

use crate::error::{AuditError, AuditResult};
use crate::types::Rgba;

/// Convert any CSS color value to normalized RGBA.
/// Handles: hex, rgb(), hsl(), hwb(), oklch, named colors.
/// Errors for: transparent-like keywords (inherit, currentColor, ...) and unrecognized input.
pub fn parse_css_color(value: &str) -> AuditResult<Rgba> {
    let trimmed = value.trim();

    match trimmed.to_lowercase().as_str() {
        "inherit" | "currentcolor" | "initial" | "unset" | "" => {
            return Err(AuditError::InvalidColor(trimmed.to_string()));
        }
        _ => {}
    }

    // Direct hex passthrough keeps full precision of the channel bytes.
    if trimmed.starts_with('#') {
        return super::hex::parse_hex(trimmed)
            .ok_or_else(|| AuditError::InvalidColor(trimmed.to_string()));
    }

    // Use csscolorparser for everything else (rgb, hsl, oklch, named, etc.)
    match trimmed.parse::<Color>() {
        Ok(color) => {
            let [r, g, b, a] = color.to_rgba8();
            Ok(Rgba::new(
                r as f64 / 255.0,
                g as f64 / 255.0,
                b as f64 / 255.0,
                a as f64 / 255.0,
            ))
        }
        Err(_) => Err(AuditError::InvalidColor(trimmed.to_string())),
    }
}
