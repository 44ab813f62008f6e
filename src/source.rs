//! Token source model
//!
//! Helpers shared by the parsers, the resolver and the registry: CSS variable
//! naming, reference detection and value classification.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use token_types::{TokenDefinition, ValueKind};

use crate::normalize::{self, kebab_case};

static BRACE_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\s*([A-Za-z0-9_][A-Za-z0-9_.\-]*)\s*\}$").unwrap());

static BRACE_REF_ANY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*([A-Za-z0-9_][A-Za-z0-9_.\-]*)\s*\}").unwrap());

static VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\(\s*(--[A-Za-z0-9_\-]+)\s*(?:,[^)]*)?\)").unwrap());

static DIMENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d*\.?\d+(px|rem|em|%|vh|vw|ch|pt)?(\s+-?\d*\.?\d+(px|rem|em|%|vh|vw|ch|pt)?)*$")
        .unwrap()
});

static SHADOW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(inset\s+)?-?\d+(\.\d+)?(px)?\s+-?\d+(\.\d+)?(px)?(\s+-?\d+(\.\d+)?(px)?){0,2}\s+\S+")
        .unwrap()
});

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d*\.?\d+m?s$").unwrap());

/// Grammar class of a literal token value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueClass {
    Color,
    Dimension,
    Shadow,
    Duration,
    Other,
}

/// Classify a literal by the value grammar it matches
pub fn classify(value: &str) -> ValueClass {
    let cleaned = normalize::clean(value);
    let normalized = normalize::normalize(&cleaned);
    if normalized.is_color() || is_named_color_literal(&cleaned) {
        ValueClass::Color
    } else if DURATION_RE.is_match(&cleaned) {
        ValueClass::Duration
    } else if DIMENSION_RE.is_match(&cleaned) {
        ValueClass::Dimension
    } else if SHADOW_RE.is_match(&cleaned) {
        ValueClass::Shadow
    } else {
        ValueClass::Other
    }
}

fn is_named_color_literal(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower == "transparent"
        || lower.starts_with("hsl(")
        || lower.starts_with("hsla(")
        || lower.contains("gradient(")
}

/// `--<prefix>-<path with dots as dashes>`
pub fn css_variable_name(path: &str, prefix: &str) -> String {
    let body = flat_key(path);
    if prefix.is_empty() {
        format!("--{}", body)
    } else {
        format!("--{}-{}", prefix, body)
    }
}

/// Join key shared by all formats: the dotted path with dots as dashes
pub fn flat_key(path: &str) -> String {
    path.replace('.', "-")
}

/// Path segment for an object/mapping key: kebab-case, no dots
pub fn path_segment(key: &str) -> String {
    kebab_case(key).replace('.', "_")
}

/// Normalize each dotted segment to kebab-case
pub fn normalize_path(path: &str) -> String {
    path.split('.')
        .filter(|s| !s.is_empty())
        .map(kebab_case)
        .collect::<Vec<_>>()
        .join(".")
}

/// Target path of a `{dotted.path}` reference, if the whole value is one
pub fn brace_reference(value: &str) -> Option<String> {
    BRACE_REF_RE
        .captures(value.trim())
        .and_then(|c| c.get(1))
        .map(|m| normalize_path(m.as_str()))
}

/// Variable name of a `var(--x)` usage, if the whole value is one
pub fn sole_var_usage(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let caps = VAR_RE.captures(trimmed)?;
    let whole = caps.get(0)?;
    (whole.start() == 0 && whole.end() == trimmed.len()).then(|| caps[1].to_string())
}

/// Every `var(--x)` variable name used inside a value
pub fn var_usages(value: &str) -> Vec<String> {
    VAR_RE
        .captures_iter(value)
        .map(|c| c[1].to_string())
        .collect()
}

/// Every `{dotted.path}` reference inside a value
pub fn brace_references(value: &str) -> Vec<String> {
    BRACE_REF_ANY_RE
        .captures_iter(value)
        .map(|c| normalize_path(&c[1]))
        .collect()
}

/// Rewrite `{from}` brace references to `{to}`, leaving other braces alone
pub fn rewrite_brace_references(value: &str, from: &str, to: &str) -> String {
    BRACE_REF_ANY_RE
        .replace_all(value, |caps: &regex::Captures<'_>| {
            if normalize_path(&caps[1]) == from {
                format!("{{{}}}", to)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Byte offsets of whole-word occurrences of a CSS variable name.
/// `--a` does not match inside `--a-light` or `--ba`.
fn var_occurrences(text: &str, var: &str) -> Vec<usize> {
    if var.is_empty() {
        return Vec::new();
    }
    text.match_indices(var)
        .filter(|(start, _)| {
            let before = text[..*start].chars().next_back();
            let after = text[start + var.len()..].chars().next();
            !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
        })
        .map(|(start, _)| start)
        .collect()
}

pub fn contains_var(text: &str, var: &str) -> bool {
    !var_occurrences(text, var).is_empty()
}

/// Replace whole-word occurrences of `from` with `to`
pub fn replace_var(text: &str, from: &str, to: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for start in var_occurrences(text, from) {
        out.push_str(&text[last..start]);
        out.push_str(to);
        last = start + from.len();
    }
    out.push_str(&text[last..]);
    out
}

/// Lookup from CSS variable name to token path
#[derive(Debug, Clone, Default)]
pub struct CssVarIndex {
    by_var: HashMap<String, String>,
}

impl CssVarIndex {
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a TokenDefinition>) -> Self {
        let by_var = tokens
            .into_iter()
            .map(|t| (t.css_variable_name.clone(), t.path.clone()))
            .collect();
        Self { by_var }
    }

    pub fn path_for(&self, var_name: &str) -> Option<&str> {
        self.by_var.get(var_name).map(String::as_str)
    }
}

/// Value kind and referenced paths of a raw value.
///
/// Unknown CSS variables are kept verbatim (`--x`) in the reference list so
/// the resolver reports them as dangling.
pub fn analyze_value(raw: &str, index: &CssVarIndex) -> (ValueKind, Vec<String>) {
    let map_var = |var: &str| {
        index
            .path_for(var)
            .map(str::to_string)
            .unwrap_or_else(|| var.to_string())
    };

    if let Some(target) = brace_reference(raw) {
        return (ValueKind::Reference, vec![target]);
    }
    if let Some(var) = sole_var_usage(raw) {
        return (ValueKind::Reference, vec![map_var(&var)]);
    }

    let mut seen = HashSet::new();
    let references = brace_references(raw)
        .into_iter()
        .chain(var_usages(raw).iter().map(|v| map_var(v)))
        .filter(|r| seen.insert(r.clone()))
        .collect();
    (ValueKind::Literal, references)
}

/// The parsed token source of truth
#[derive(Debug, Clone, Default)]
pub struct SourceDocument {
    pub file: PathBuf,
    /// False when the file was missing
    pub present: bool,
    pub version: Option<String>,
    /// Tokens in document order
    pub tokens: Vec<TokenDefinition>,
}

impl SourceDocument {
    /// Literal entries: path → raw literal
    pub fn literal_map(&self) -> BTreeMap<String, String> {
        self.tokens
            .iter()
            .filter(|t| !t.is_reference())
            .map(|t| (t.path.clone(), t.raw_value.clone()))
            .collect()
    }

    /// Reference entries: path → target path
    pub fn reference_map(&self) -> BTreeMap<String, String> {
        self.tokens
            .iter()
            .filter(|t| t.is_reference())
            .filter_map(|t| t.references.first().map(|r| (t.path.clone(), r.clone())))
            .collect()
    }

    pub fn get(&self, path: &str) -> Option<&TokenDefinition> {
        self.tokens.iter().find(|t| t.path == path)
    }

    pub fn css_index(&self) -> CssVarIndex {
        CssVarIndex::from_tokens(&self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use token_types::Category;

    #[test]
    fn test_css_variable_name() {
        assert_eq!(
            css_variable_name("colors.brand.purple", "ds"),
            "--ds-colors-brand-purple"
        );
        assert_eq!(
            css_variable_name("colors.cosmic-purple", ""),
            "--colors-cosmic-purple"
        );
    }

    #[test]
    fn test_brace_reference() {
        assert_eq!(
            brace_reference("{colors.brand.purple}").as_deref(),
            Some("colors.brand.purple")
        );
        assert_eq!(
            brace_reference(" { colors.brandPurple } ").as_deref(),
            Some("colors.brand-purple")
        );
        assert_eq!(brace_reference("{{colors.brand}}"), None);
        assert_eq!(brace_reference("#7B00FF"), None);
    }

    #[test]
    fn test_var_usages() {
        assert_eq!(
            sole_var_usage("var(--ds-colors-primary)").as_deref(),
            Some("--ds-colors-primary")
        );
        assert_eq!(sole_var_usage("0 0 4px var(--ds-colors-primary)"), None);
        assert_eq!(
            var_usages("0 0 4px var(--a), 0 0 8px var(--b, #fff)"),
            vec!["--a".to_string(), "--b".to_string()]
        );
    }

    #[test]
    fn test_var_rewrites_are_boundary_aware() {
        let raw = "var(--a) var(--a-light) var(--ba)";
        assert!(contains_var(raw, "--a"));
        assert!(!contains_var("var(--a-light)", "--a"));
        assert_eq!(replace_var(raw, "--a", "--z"), "var(--z) var(--a-light) var(--ba)");
        assert_eq!(
            rewrite_brace_references("{colors.a} {colors.ab}", "colors.a", "colors.z"),
            "{colors.z} {colors.ab}"
        );
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("#fff"), ValueClass::Color);
        assert_eq!(classify("rgba(0,0,0,0.5)"), ValueClass::Color);
        assert_eq!(classify("16px"), ValueClass::Dimension);
        assert_eq!(classify("0.5rem 1rem"), ValueClass::Dimension);
        assert_eq!(classify("200ms"), ValueClass::Duration);
        assert_eq!(classify("0 4px 6px rgba(0,0,0,0.1)"), ValueClass::Shadow);
        assert_eq!(classify("Inter, sans-serif"), ValueClass::Other);
    }

    #[test]
    fn test_analyze_value_maps_vars_to_paths() {
        let purple = TokenDefinition::literal(
            "cosmic-purple",
            "colors.cosmic-purple",
            Category::Color,
            "#7B00FF",
            "--colors-cosmic-purple",
        );
        let index = CssVarIndex::from_tokens([&purple]);

        let (kind, refs) = analyze_value("var(--colors-cosmic-purple)", &index);
        assert_eq!(kind, ValueKind::Reference);
        assert_eq!(refs, vec!["colors.cosmic-purple".to_string()]);

        let (kind, refs) = analyze_value("0 0 4px var(--unknown)", &index);
        assert_eq!(kind, ValueKind::Literal);
        assert_eq!(refs, vec!["--unknown".to_string()]);
    }

    #[test]
    fn test_analyze_value_lists_each_reference_once() {
        let a = TokenDefinition::literal("a", "colors.a", Category::Color, "#111111", "--a");
        let b = TokenDefinition::literal("b", "colors.b", Category::Color, "#222222", "--b");
        let index = CssVarIndex::from_tokens([&a, &b]);

        let (_, refs) = analyze_value("linear-gradient(var(--a), var(--b), var(--a))", &index);
        assert_eq!(refs, vec!["colors.a".to_string(), "colors.b".to_string()]);

        // brace and var() spellings of one token collapse too
        let (_, refs) = analyze_value("{colors.b} var(--a) var(--b)", &index);
        assert_eq!(refs, vec!["colors.b".to_string(), "colors.a".to_string()]);
    }
}
