//! Pure color math: WCAG luminance/contrast, compositing, hex and CSS color
//! conversion, and the WCAG level classifier.

pub mod checker;
pub mod color_parse;
pub mod composite;
pub mod hex;
pub mod wcag;
