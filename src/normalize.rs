//! Value normalization
//!
//! Every extracted literal goes through [`normalize`] before it is stored or
//! compared, so `#abc`, `#AABBCC` and `rgb(170, 187, 204)` all compare equal.

use std::sync::LazyLock;

use regex::Regex;

static HEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap()
});

static RGB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^rgba?\(\s*([^)]*)\)$").unwrap());

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// A literal value prepared for cross-format comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedValue {
    /// Canonical `#RRGGBB` / `#RRGGBBAA`
    Color(String),
    /// Gradients and `transparent`: no single value to diff
    Excluded(String),
    /// Any other literal, whitespace-collapsed
    Other(String),
}

impl NormalizedValue {
    /// String stored in the format maps
    pub fn as_str(&self) -> &str {
        match self {
            NormalizedValue::Color(s) | NormalizedValue::Excluded(s) | NormalizedValue::Other(s) => s,
        }
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self, NormalizedValue::Excluded(_))
    }

    pub fn is_color(&self) -> bool {
        matches!(self, NormalizedValue::Color(_))
    }

    /// Two values agree when either side is excluded or the strings match
    pub fn agrees_with(&self, other: &NormalizedValue) -> bool {
        self.is_excluded() || other.is_excluded() || self.as_str() == other.as_str()
    }
}

/// Normalize a raw literal as written in any of the token formats
pub fn normalize(raw: &str) -> NormalizedValue {
    let value = clean(raw);

    if is_excluded_color(&value) {
        return NormalizedValue::Excluded(value);
    }
    if let Some(hex) = normalize_hex(&value) {
        return NormalizedValue::Color(hex);
    }
    if let Some(hex) = rgb_to_hex(&value) {
        return NormalizedValue::Color(hex);
    }
    NormalizedValue::Other(value)
}

/// Strip quotes, `!important`, a trailing semicolon and redundant whitespace
pub fn clean(raw: &str) -> String {
    let mut value = raw.trim().trim_end_matches(';').trim();
    value = strip_quotes(value);
    let value = value.trim_end_matches("!important").trim();
    let collapsed = WS_RE.replace_all(value, " ");
    collapsed.replace(", ", ",").replace(" ,", ",")
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\'', '`'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Gradients and `transparent` are never compared as colors
pub fn is_excluded_color(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    lower == "transparent" || lower.contains("gradient(")
}

/// Expand a hex color to uppercase 6 digits (8 when it carries alpha)
pub fn normalize_hex(value: &str) -> Option<String> {
    let caps = HEX_RE.captures(value.trim())?;
    let digits = caps.get(1)?.as_str().to_ascii_uppercase();
    let mut expanded = match digits.len() {
        3 | 4 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
        _ => digits,
    };
    // opaque alpha is the same color as no alpha
    if expanded.len() == 8 && expanded.ends_with("FF") {
        expanded.truncate(6);
    }
    Some(format!("#{}", expanded))
}

/// Convert `rgb()` / `rgba()` (comma or space syntax) to hex
pub fn rgb_to_hex(value: &str) -> Option<String> {
    let caps = RGB_RE.captures(value.trim())?;
    let body = caps.get(1)?.as_str();

    let parts: Vec<&str> = body
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(&parts[..3]) {
        *slot = parse_channel(part)?;
    }

    let alpha = match parts.get(3) {
        Some(a) => parse_alpha(a)?,
        None => 1.0,
    };

    let mut hex = format!("#{:02X}{:02X}{:02X}", channels[0], channels[1], channels[2]);
    let alpha = (alpha * 255.0).round() as u8;
    if alpha < u8::MAX {
        hex.push_str(&format!("{:02X}", alpha));
    }
    Some(hex)
}

fn parse_channel(part: &str) -> Option<u8> {
    if let Some(pct) = part.strip_suffix('%') {
        let v: f64 = pct.parse().ok()?;
        if !(0.0..=100.0).contains(&v) {
            return None;
        }
        return Some((v * 2.55).round() as u8);
    }
    let v: f64 = part.parse().ok()?;
    if !(0.0..=255.0).contains(&v) {
        return None;
    }
    Some(v.round() as u8)
}

fn parse_alpha(part: &str) -> Option<f64> {
    let v: f64 = match part.strip_suffix('%') {
        Some(pct) => pct.parse::<f64>().ok()? / 100.0,
        None => part.parse().ok()?,
    };
    (0.0..=1.0).contains(&v).then_some(v)
}

/// `camelCase` / `snake_case` / `PascalCase` key to kebab-case
pub fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower_or_digit = false;
    for c in key.trim().chars() {
        if c == '_' || c == ' ' {
            if !out.ends_with('-') && !out.is_empty() {
                out.push('-');
            }
            prev_lower_or_digit = false;
        } else if c.is_ascii_uppercase() {
            if prev_lower_or_digit && !out.ends_with('-') {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower_or_digit = false;
        } else {
            out.push(c);
            prev_lower_or_digit = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_and_long_hex_agree() {
        assert_eq!(normalize("#ABC"), NormalizedValue::Color("#AABBCC".to_string()));
        assert_eq!(normalize("#aabbcc"), NormalizedValue::Color("#AABBCC".to_string()));
        assert_eq!(normalize("'#7b00ff'"), NormalizedValue::Color("#7B00FF".to_string()));
        assert_eq!(normalize_hex("#abcd").as_deref(), Some("#AABBCCDD"));
        assert_eq!(normalize_hex("#abcde"), None);
    }

    #[test]
    fn test_rgb_to_hex() {
        assert_eq!(rgb_to_hex("rgb(123, 45, 67)").as_deref(), Some("#7B2D43"));
        assert_eq!(rgb_to_hex("rgba(123,45,67,1)").as_deref(), Some("#7B2D43"));
        assert_eq!(rgb_to_hex("rgb(123 45 67 / 50%)").as_deref(), Some("#7B2D4380"));
        assert_eq!(rgb_to_hex("rgb(300, 0, 0)"), None);
        assert_eq!(rgb_to_hex("rgb(1, 2)"), None);
        assert_eq!(normalize("rgb(123, 45, 67)"), normalize("#7b2d43"));
    }

    #[test]
    fn test_opaque_alpha_is_dropped() {
        assert_eq!(normalize_hex("#7B00FFFF").as_deref(), Some("#7B00FF"));
        assert_eq!(normalize_hex("#abcf").as_deref(), Some("#AABBCC"));
        assert_eq!(normalize_hex("#7B00FF80").as_deref(), Some("#7B00FF80"));
        assert_eq!(rgb_to_hex("rgba(123, 0, 255, 0.999)").as_deref(), Some("#7B00FF"));
        assert_eq!(normalize("#7B00FFFF"), normalize("rgba(123, 0, 255, 1)"));
        assert_eq!(normalize("#7b00ffff"), normalize("#7B00FF"));
    }

    #[test]
    fn test_gradients_and_transparent_are_excluded() {
        assert!(normalize("linear-gradient(90deg, #fff, #000)").is_excluded());
        assert!(normalize("transparent").is_excluded());
        let excluded = normalize("radial-gradient(circle, red, blue)");
        assert!(excluded.agrees_with(&normalize("#123456")));
    }

    #[test]
    fn test_other_values_are_cleaned() {
        assert_eq!(
            normalize("  0 4px  6px rgba(0, 0, 0, 0.1) !important; "),
            NormalizedValue::Other("0 4px 6px rgba(0,0,0,0.1)".to_string())
        );
        assert_eq!(normalize("\"16px\"").as_str(), "16px");
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("brandPurple"), "brand-purple");
        assert_eq!(kebab_case("fontSize"), "font-size");
        assert_eq!(kebab_case("border_radius"), "border-radius");
        assert_eq!(kebab_case("gray50"), "gray50");
        assert_eq!(kebab_case("already-kebab"), "already-kebab");
        assert_eq!(kebab_case("DEFAULT"), "default");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255) {
            let first = normalize(&format!("rgb({}, {}, {})", r, g, b));
            let second = normalize(first.as_str());
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.as_str(), format!("#{:02X}{:02X}{:02X}", r, g, b));
        }

        #[test]
        fn prop_short_hex_expands(s in "[0-9a-fA-F]{3}") {
            let short = normalize_hex(&format!("#{}", s)).unwrap();
            let long: String = s.chars().flat_map(|c| [c, c]).collect();
            prop_assert_eq!(short, normalize_hex(&format!("#{}", long)).unwrap());
        }
    }
}
