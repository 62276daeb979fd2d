use super::wcag::{clamp, contrast_ratio};
use crate::types::Rgba;

/// Foreground alpha at or above this is treated as fully opaque.
const OPAQUE_THRESHOLD: f64 = 0.999;

/// Alpha-composite a foreground color over a background color.
/// formula per channel: result = fg * alpha + bg * (1 - alpha)
///
/// Only the foreground alpha is used; the background is assumed opaque.
pub fn composite_over_opaque(fg: Rgba, bg: Rgba) -> Rgba {
    let alpha = clamp(fg.a);
    let blend = |f: f64, b: f64| clamp(f) * alpha + clamp(b) * (1.0 - alpha);

    Rgba::rgb(blend(fg.r, bg.r), blend(fg.g, bg.g), blend(fg.b, bg.b))
}

/// Contrast of a possibly translucent foreground against a background.
///
/// A translucent foreground is composited over the background first and the
/// composite is compared with the background as given. The background's own
/// alpha is not resolved here.
pub fn contrast_with_alpha(fg: Rgba, bg: Rgba) -> f64 {
    if fg.a >= OPAQUE_THRESHOLD {
        return contrast_ratio(fg, bg);
    }
    contrast_ratio(composite_over_opaque(fg, bg), bg)
}
