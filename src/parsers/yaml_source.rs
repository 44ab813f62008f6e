//! YAML token source of truth
//!
//! ```yaml
//! version: 2.1.0
//! colors:
//!   brand:
//!     purple:
//!       value: "#7B00FF"
//!       comment: Primary brand color
//!   semantic:
//!     primary:
//!       value: "{colors.brand.purple}"
//! spacing:
//!   md: { value: 16px }
//! ```
//!
//! A leaf is a mapping with a `value` (or `$value`) key; a bare scalar is
//! accepted as shorthand for `{ value: … }`. A leaf's category follows its
//! top-level group unless the leaf carries a `type` (or `$type`) naming one.
//!
//! Keys are normalized to kebab-case path segments, so two sibling keys
//! that normalize alike (`brandPurple`, `brand-purple`) are rejected.

use std::collections::HashMap;
use std::path::Path;

use serde_yaml::{Mapping, Value};
use token_types::{Category, TokenDefinition};
use tracing::{debug, info, warn};

use crate::error::{ParseError, ParseResult};
use crate::source::{analyze_value, css_variable_name, path_segment, CssVarIndex, SourceDocument};

/// Top-level keys that carry document metadata rather than tokens
const METADATA_KEYS: &[&str] = &["version", "metadata", "$schema", "$metadata"];

/// Keys of a leaf mapping that describe the token itself; other mapping
/// children are nested tokens (`brand: { value: …, light: { value: … } }`)
const LEAF_ATTRIBUTES: &[&str] = &[
    "value",
    "$value",
    "comment",
    "description",
    "$description",
    "deprecated",
    "type",
    "$type",
];

struct RawLeaf {
    segments: Vec<String>,
    value: String,
    comment: Option<String>,
    deprecated: bool,
    category: Option<Category>,
}

/// Load the source of truth; a missing file yields an empty, not-present document
pub fn load_source(path: &Path, css_prefix: &str) -> ParseResult<SourceDocument> {
    let Some(text) = super::read_artifact(path) else {
        return Ok(SourceDocument {
            file: path.to_path_buf(),
            present: false,
            ..SourceDocument::default()
        });
    };

    let doc = parse_source(&text, &path.display().to_string(), css_prefix)?;
    info!("Loaded {} tokens from {:?}", doc.tokens.len(), path);
    Ok(SourceDocument {
        file: path.to_path_buf(),
        ..doc
    })
}

/// Parse source text into token definitions in document order
pub fn parse_source(text: &str, file: &str, css_prefix: &str) -> ParseResult<SourceDocument> {
    let doc: Value = serde_yaml::from_str(text).map_err(|e| ParseError::Yaml {
        file: file.to_string(),
        message: e.to_string(),
    })?;

    let mut document = SourceDocument {
        present: true,
        ..SourceDocument::default()
    };

    let top = match doc {
        Value::Mapping(m) => m,
        Value::Null => return Ok(document),
        _ => {
            return Err(ParseError::Yaml {
                file: file.to_string(),
                message: "top level must be a mapping of token groups".to_string(),
            })
        }
    };

    document.version = top
        .get("version")
        .and_then(scalar_to_string);

    let mut leaves = Vec::new();
    let mut groups = SiblingKeys::default();
    for (key, value) in &top {
        let Some(key) = key_to_string(key) else {
            warn!("{}: skipping non-string top-level key", file);
            continue;
        };
        if METADATA_KEYS.contains(&key.as_str()) {
            continue;
        }
        let mut segments = vec![groups.claim(&key, &[], file)?];
        collect_leaves(value, &mut segments, &mut leaves, file)?;
    }

    let tokens: Vec<TokenDefinition> = leaves
        .iter()
        .map(|leaf| {
            let path = leaf.segments.join(".");
            let name = leaf.segments.last().cloned().unwrap_or_default();
            let category = leaf
                .category
                .unwrap_or_else(|| Category::from_group_key(&leaf.segments[0]));
            let mut token = TokenDefinition::literal(
                name,
                path.clone(),
                category,
                leaf.value.clone(),
                css_variable_name(&path, css_prefix),
            );
            token.comment = leaf.comment.clone();
            token.deprecated = leaf.deprecated;
            token
        })
        .collect();

    // Reference analysis needs every CSS variable name known up front
    let index = CssVarIndex::from_tokens(&tokens);
    document.tokens = tokens
        .into_iter()
        .map(|mut token| {
            let (kind, references) = analyze_value(&token.raw_value, &index);
            token.value_kind = kind;
            token.semantic = token.is_reference();
            token.references = references;
            token
        })
        .collect();

    debug!("{}: parsed {} source tokens", file, document.tokens.len());
    Ok(document)
}

/// Normalized segments already used by one mapping's keys
#[derive(Default)]
struct SiblingKeys(HashMap<String, String>);

impl SiblingKeys {
    /// Normalize `key`, failing when an earlier sibling normalized the same way
    fn claim(&mut self, key: &str, parent: &[String], file: &str) -> ParseResult<String> {
        let segment = path_segment(key);
        if let Some(first) = self.0.get(&segment) {
            let path = parent
                .iter()
                .chain(std::iter::once(&segment))
                .cloned()
                .collect::<Vec<_>>()
                .join(".");
            return Err(ParseError::DuplicateKey {
                file: file.to_string(),
                path,
                first: first.clone(),
                second: key.to_string(),
            });
        }
        self.0.insert(segment.clone(), key.to_string());
        Ok(segment)
    }
}

fn collect_leaves(
    node: &Value,
    segments: &mut Vec<String>,
    out: &mut Vec<RawLeaf>,
    file: &str,
) -> ParseResult<()> {
    match node {
        Value::Mapping(map) => {
            let is_leaf = leaf_value(map).is_some();
            if let Some(value) = leaf_value(map) {
                out.push(RawLeaf {
                    segments: segments.clone(),
                    value,
                    comment: ["comment", "description", "$description"]
                        .iter()
                        .find_map(|k| map.get(*k).and_then(scalar_to_string)),
                    deprecated: map
                        .get("deprecated")
                        .and_then(Value::as_bool)
                        .unwrap_or(false),
                    category: leaf_category(map, segments, file),
                });
            }
            let mut siblings = SiblingKeys::default();
            for (key, child) in map {
                let attribute = key.as_str().is_some_and(|k| LEAF_ATTRIBUTES.contains(&k));
                if is_leaf && (attribute || !child.is_mapping()) {
                    continue;
                }
                let Some(key) = key_to_string(key) else {
                    warn!("{}: skipping non-string key under {}", file, segments.join("."));
                    continue;
                };
                let segment = siblings.claim(&key, segments, file)?;
                segments.push(segment);
                collect_leaves(child, segments, out, file)?;
                segments.pop();
            }
        }
        Value::Null => {}
        scalar => match scalar_to_string(scalar) {
            Some(value) => out.push(RawLeaf {
                segments: segments.clone(),
                value,
                comment: None,
                deprecated: false,
                category: None,
            }),
            None => warn!("{}: unsupported value at {}", file, segments.join(".")),
        },
    }
    Ok(())
}

/// Explicit `type`/`$type`; unknown names fall back to the group category
fn leaf_category(map: &Mapping, segments: &[String], file: &str) -> Option<Category> {
    let name = map
        .get("type")
        .or_else(|| map.get("$type"))
        .and_then(Value::as_str)?;
    match name.parse() {
        Ok(category) => Some(category),
        Err(_) => {
            debug!("{}: ignoring unknown type '{}' at {}", file, name, segments.join("."));
            None
        }
    }
}

fn leaf_value(map: &Mapping) -> Option<String> {
    map.get("value")
        .or_else(|| map.get("$value"))
        .and_then(scalar_to_string)
}

fn key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use token_types::ValueKind;

    const SOURCE: &str = r##"
version: 2.1.0
colors:
  brand:
    purple:
      value: "#7B00FF"
      comment: Primary brand color
    legacyPurple:
      value: "#6A00E0"
      deprecated: true
  semantic:
    primary:
      value: "{colors.brand.purple}"
    accent:
      value: "var(--ds-colors-brand-purple)"
spacing:
  md: { value: 16px }
  lg: 24px
shadows:
  card:
    $value: 0 4px 6px rgba(0, 0, 0, 0.1)
"##;

    #[test]
    fn test_parse_literals_and_references() {
        let doc = parse_source(SOURCE, "tokens.yaml", "ds").unwrap();
        assert_eq!(doc.version.as_deref(), Some("2.1.0"));

        let paths: Vec<&str> = doc.tokens.iter().map(|t| t.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "colors.brand.purple",
                "colors.brand.legacy-purple",
                "colors.semantic.primary",
                "colors.semantic.accent",
                "spacing.md",
                "spacing.lg",
                "shadows.card",
            ]
        );

        let purple = doc.get("colors.brand.purple").unwrap();
        assert_eq!(purple.value_kind, ValueKind::Literal);
        assert_eq!(purple.category, Category::Color);
        assert_eq!(purple.css_variable_name, "--ds-colors-brand-purple");
        assert_eq!(purple.comment.as_deref(), Some("Primary brand color"));

        let primary = doc.get("colors.semantic.primary").unwrap();
        assert_eq!(primary.value_kind, ValueKind::Reference);
        assert!(primary.semantic);
        assert_eq!(primary.references, vec!["colors.brand.purple".to_string()]);

        let accent = doc.get("colors.semantic.accent").unwrap();
        assert_eq!(accent.references, vec!["colors.brand.purple".to_string()]);

        assert!(doc.get("colors.brand.legacy-purple").unwrap().deprecated);
        assert_eq!(doc.get("shadows.card").unwrap().category, Category::Shadow);
        assert_eq!(doc.get("spacing.lg").unwrap().raw_value, "24px");
    }

    #[test]
    fn test_literal_and_reference_maps() {
        let doc = parse_source(SOURCE, "tokens.yaml", "ds").unwrap();
        let refs = doc.reference_map();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs["colors.semantic.primary"], "colors.brand.purple");
        assert_eq!(doc.literal_map().len(), 5);
    }

    #[test]
    fn test_leaf_with_nested_tokens() {
        let yaml = "colors:\n  brand:\n    value: \"#7B00FF\"\n    comment: base\n    light: { value: \"#A64DFF\" }\n";
        let doc = parse_source(yaml, "tokens.yaml", "ds").unwrap();
        let paths: Vec<&str> = doc.tokens.iter().map(|t| t.path.as_str()).collect();
        assert_eq!(paths, vec!["colors.brand", "colors.brand.light"]);
    }

    #[test]
    fn test_explicit_type_overrides_group() {
        let yaml = "spacing:\n  md: { value: \"#123456\", type: color }\n  lg: { value: 24px, $type: dimension }\n";
        let doc = parse_source(yaml, "tokens.yaml", "ds").unwrap();
        assert_eq!(doc.get("spacing.md").unwrap().category, Category::Color);
        assert_eq!(doc.get("spacing.lg").unwrap().category, Category::Spacing);
    }

    #[test]
    fn test_keys_normalizing_alike_are_rejected() {
        let yaml = "colors:\n  brandPurple: { value: \"#111111\" }\n  brand-purple: { value: \"#222222\" }\n";
        let err = parse_source(yaml, "tokens.yaml", "ds").unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateKey {
                file: "tokens.yaml".into(),
                path: "colors.brand-purple".into(),
                first: "brandPurple".into(),
                second: "brand-purple".into(),
            }
        );

        // top-level groups are checked the same way
        let yaml = "Colors:\n  a: { value: \"#111111\" }\ncolors:\n  b: { value: \"#222222\" }\n";
        assert!(matches!(
            parse_source(yaml, "tokens.yaml", "ds"),
            Err(ParseError::DuplicateKey { .. })
        ));

        // the same segment under different parents is fine
        let yaml = "colors:\n  brand:\n    purple: { value: \"#111111\" }\n  accent:\n    purple: { value: \"#222222\" }\n";
        assert_eq!(parse_source(yaml, "tokens.yaml", "ds").unwrap().tokens.len(), 2);
    }

    #[test]
    fn test_invalid_yaml_is_a_parse_error() {
        let err = parse_source("colors: [unclosed", "bad.yaml", "ds").unwrap_err();
        assert!(matches!(err, ParseError::Yaml { .. }));
    }

    #[test]
    fn test_missing_file_is_not_present() {
        let dir = tempfile::tempdir().unwrap();
        let doc = load_source(&dir.path().join("nope.yaml"), "ds").unwrap();
        assert!(!doc.present);
        assert!(doc.tokens.is_empty());
    }
}
