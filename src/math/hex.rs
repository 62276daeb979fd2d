use super::wcag::clamp;
use crate::types::Rgba;

/// Format a color as 6 lowercase hex digits (no `#`). Alpha is ignored.
/// Each channel is rounded to the nearest integer in 0-255.
pub fn to_hex(color: Rgba) -> String {
    let channel = |v: f64| (clamp(v) * 255.0).round() as u8;
    format!(
        "{:02x}{:02x}{:02x}",
        channel(color.r),
        channel(color.g),
        channel(color.b)
    )
}

/// Parse a 3, 4, 6 or 8 digit hex string (leading `#` optional).
/// Returns None on malformed input.
pub fn parse_hex(hex: &str) -> Option<Rgba> {
    let raw = hex.trim();
    let raw = raw.strip_prefix('#').unwrap_or(raw);
    if !raw.is_ascii() {
        return None;
    }

    let expanded: String = match raw.len() {
        3 | 4 => raw.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => raw.to_string(),
        _ => return None,
    };

    let byte = |i: usize| -> Option<f64> {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .ok()
            .map(|v| v as f64 / 255.0)
    };

    let a = if expanded.len() == 8 { byte(6)? } else { 1.0 };
    Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, a))
}
