//! Best-effort category inference from a token's name and value

use token_types::Category;

use crate::normalize;
use crate::source::{classify, ValueClass};

const TYPOGRAPHY_HINTS: &[&str] = &["font", "weight", "line", "letter", "text-size", "leading", "tracking"];
const TIMING_HINTS: &[&str] = &["duration", "timing", "delay", "transition", "easing"];
const ANIMATION_HINTS: &[&str] = &["animation", "keyframe", "spin", "pulse", "bounce"];

/// Guess the category of a token.
///
/// Order: color grammar, then dimension grammar refined by name hints, then
/// shadow/timing/animation substrings, else `Custom`. Names that follow no
/// convention can be misclassified; callers treat a disagreement as a warning.
pub fn infer_type(name: &str, value: &str) -> Category {
    let name = name.to_ascii_lowercase();
    let value = normalize::clean(value).to_ascii_lowercase();
    let has_hint = |hints: &[&str]| hints.iter().any(|h| name.contains(h));

    match classify(&value) {
        ValueClass::Color => return Category::Color,
        ValueClass::Dimension => {
            return if has_hint(TYPOGRAPHY_HINTS) {
                Category::Typography
            } else if name.contains("radius") || name.contains("rounded") {
                Category::Border
            } else {
                Category::Spacing
            };
        }
        ValueClass::Shadow => return Category::Shadow,
        ValueClass::Duration => return Category::Timing,
        ValueClass::Other => {}
    }

    if value.contains("shadow") || name.contains("shadow") || name.contains("elevation") {
        Category::Shadow
    } else if value.contains("cubic-bezier") || value.starts_with("ease") || has_hint(TIMING_HINTS) {
        Category::Timing
    } else if value.contains("infinite") || has_hint(ANIMATION_HINTS) {
        Category::Animation
    } else if name.contains("font") || name.contains("family") {
        Category::Typography
    } else {
        Category::Custom
    }
}
