use crate::types::WcagLevel;

pub const AA_NORMAL: f64 = 4.5;
pub const AA_LARGE: f64 = 3.0;
pub const AAA_NORMAL: f64 = 7.0;
pub const AAA_LARGE: f64 = 4.5;

/// Bold text (weight >= 700) at or above this pixel size is large.
pub const LARGE_BOLD_PX: f64 = 18.67;
/// Any text at or above this pixel size is large.
pub const LARGE_PX: f64 = 24.0;

pub const BOLD_WEIGHT: u16 = 700;
pub const DEFAULT_WEIGHT: u16 = 400;

/// Weight keywords in match order. The first keyword contained in the
/// normalized style string wins.
const WEIGHT_KEYWORDS: &[(&str, u16)] = &[
    ("black", 900),
    ("heavy", 900),
    ("extrabold", 800),
    ("ultrabold", 800),
    ("bold", 700),
    ("semibold", 600),
    ("demibold", 600),
    ("medium", 500),
    ("regular", 400),
    ("normal", 400),
    ("light", 300),
    ("extralight", 200),
    ("ultralight", 200),
    ("thin", 100),
    ("hairline", 100),
];

/// Map a weight given as a font style ("Bold Italic", "extra-light") or a
/// number ("600") to the 100-900 scale.
///
/// Names are lowercased with spaces, hyphens and underscores dropped, then
/// matched by substring against [`WEIGHT_KEYWORDS`]. Unrecognized names map
/// to 400.
pub fn weight_from_name(name: &str) -> u16 {
    let trimmed = name.trim();
    if let Ok(n) = trimmed.parse::<u16>() {
        return n.clamp(100, 900);
    }

    let key: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect();

    WEIGHT_KEYWORDS
        .iter()
        .find(|(keyword, _)| key.contains(keyword))
        .map(|(_, weight)| *weight)
        .unwrap_or(DEFAULT_WEIGHT)
}

/// WCAG large-text rule. Boundaries are inclusive.
pub fn is_large_text(size_px: f64, weight: u16) -> bool {
    if weight >= BOLD_WEIGHT {
        size_px >= LARGE_BOLD_PX
    } else {
        size_px >= LARGE_PX
    }
}

/// Large-text rule for a weight given by name.
pub fn is_large_text_named(size_px: f64, weight: &str) -> bool {
    is_large_text(size_px, weight_from_name(weight))
}

pub fn passes_aa(ratio: f64, is_large: bool) -> bool {
    ratio >= if is_large { AA_LARGE } else { AA_NORMAL }
}

pub fn passes_aaa(ratio: f64, is_large: bool) -> bool {
    ratio >= if is_large { AAA_LARGE } else { AAA_NORMAL }
}

/// Highest WCAG level the ratio reaches.
pub fn level(ratio: f64, is_large: bool) -> WcagLevel {
    if is_large {
        if ratio >= AAA_LARGE {
            WcagLevel::Aaa
        } else if ratio >= AA_LARGE {
            WcagLevel::AaLarge
        } else {
            WcagLevel::Fail
        }
    } else if ratio >= AAA_NORMAL {
        WcagLevel::Aaa
    } else if ratio >= AA_NORMAL {
        WcagLevel::Aa
    } else {
        WcagLevel::Fail
    }
}

/// Round to two decimals, halves away from zero.
pub fn round_ratio(ratio: f64) -> f64 {
    (ratio * 100.0).round() / 100.0
}

/// Format as "X.XX:1".
pub fn format_ratio(ratio: f64) -> String {
    format!("{:.2}:1", round_ratio(ratio))
}
