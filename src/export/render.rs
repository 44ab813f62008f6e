//! Renderers for the four token formats
//!
//! All renderers walk the same ordered path tree so that every format lists
//! tokens in the same order. A path that is both a token and a group (e.g.
//! `colors.brand` and `colors.brand.light`) renders its own value under a
//! `DEFAULT` key in the object-literal formats.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};
use token_types::{ArtifactFormat, Category, TokenDefinition};

use crate::error::ExportError;
use crate::registry::TokenRegistry;
use crate::source::path_segment;

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

const GENERATED_NOTICE: &str = "Generated by token-manager. Do not edit; change the YAML source and re-export.";

/// Ordered path tree; children keep first-insertion order
#[derive(Debug, Default)]
struct TreeNode<'a> {
    token: Option<&'a TokenDefinition>,
    children: Vec<(String, TreeNode<'a>)>,
}

impl<'a> TreeNode<'a> {
    fn build(registry: &'a TokenRegistry) -> Self {
        let mut root = TreeNode::default();
        for token in registry.tokens() {
            let mut node = &mut root;
            for segment in token.path.split('.') {
                let idx = match node.children.iter().position(|(k, _)| k == segment) {
                    Some(idx) => idx,
                    None => {
                        node.children.push((segment.to_string(), TreeNode::default()));
                        node.children.len() - 1
                    }
                };
                node = &mut node.children[idx].1;
            }
            node.token = Some(token);
        }
        root
    }
}

/// Render one format to text
pub fn render(format: ArtifactFormat, registry: &TokenRegistry) -> Result<String, ExportError> {
    match format {
        ArtifactFormat::Source => render_yaml(registry),
        ArtifactFormat::TypeScript => Ok(render_typescript(registry)),
        ArtifactFormat::Css => Ok(render_css(registry)),
        ArtifactFormat::Tailwind => Ok(render_tailwind(registry)),
    }
}

// ============================================================================
// YAML source
// ============================================================================

pub fn render_yaml(registry: &TokenRegistry) -> Result<String, ExportError> {
    let mut top = Mapping::new();
    top.insert("version".into(), registry.metadata.version.clone().into());

    let mut metadata = Mapping::new();
    metadata.insert("totalTokens".into(), (registry.metadata.total_tokens as u64).into());
    metadata.insert("deprecated".into(), (registry.metadata.deprecated as u64).into());
    metadata.insert("semantic".into(), (registry.metadata.semantic as u64).into());
    metadata.insert(
        "lastUpdated".into(),
        registry.metadata.last_updated.to_rfc3339().into(),
    );
    top.insert("metadata".into(), Value::Mapping(metadata));

    let tree = TreeNode::build(registry);
    for (key, child) in &tree.children {
        top.insert(key.clone().into(), yaml_node(child));
    }

    let body = serde_yaml::to_string(&Value::Mapping(top)).map_err(|e| ExportError::Render {
        format: ArtifactFormat::Source,
        message: e.to_string(),
    })?;
    Ok(format!("# Design tokens: source of truth\n{}", body))
}

fn yaml_node(node: &TreeNode<'_>) -> Value {
    let mut map = Mapping::new();
    if let Some(token) = node.token {
        map.insert("value".into(), token.raw_value.clone().into());
        if let Some(comment) = &token.comment {
            map.insert("comment".into(), comment.clone().into());
        }
        if token.deprecated {
            map.insert("deprecated".into(), true.into());
        }
        // only tokens filed away from their group need the category spelled out
        let group = token.path.split('.').next().unwrap_or_default();
        if Category::from_group_key(group) != token.category {
            map.insert("type".into(), token.category.as_str().into());
        }
    }
    for (key, child) in &node.children {
        map.insert(key.clone().into(), yaml_node(child));
    }
    Value::Mapping(map)
}

// ============================================================================
// TypeScript
// ============================================================================

pub fn render_typescript(registry: &TokenRegistry) -> String {
    let tree = TreeNode::build(registry);
    let mut out = String::new();
    let _ = writeln!(out, "// {}", GENERATED_NOTICE);
    let _ = writeln!(out);
    let _ = writeln!(out, "export const tokens = {{");
    write_object(&mut out, &tree, 1, &ts_key);
    let _ = writeln!(out, "}} as const;");
    let _ = writeln!(out);
    let _ = writeln!(out, "export type Tokens = typeof tokens;");
    out
}

/// camelCase when it maps back to the same kebab segment, else a quoted key
fn ts_key(segment: &str) -> String {
    let camel = camelize(segment);
    if IDENT_RE.is_match(&camel) && path_segment(&camel) == segment {
        camel
    } else {
        quote(segment)
    }
}

fn camelize(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper_next = false;
    for c in segment.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

// ============================================================================
// CSS
// ============================================================================

pub fn render_css(registry: &TokenRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "/* {} */", GENERATED_NOTICE);
    let _ = writeln!(out);
    let _ = writeln!(out, ":root {{");
    for token in registry.tokens() {
        if let Some(comment) = &token.comment {
            let _ = writeln!(out, "  /* {} */", comment.replace("*/", "* /"));
        }
        let _ = writeln!(out, "  {}: {};", token.css_variable_name, css_value(token, registry));
    }
    let _ = writeln!(out, "}}");
    out
}

/// Alias tokens become `var()` of their target so the cascade stays live
fn css_value(token: &TokenDefinition, registry: &TokenRegistry) -> String {
    if token.is_reference() {
        if let Some(target) = token.references.first().and_then(|r| registry.get(r)) {
            return format!("var({})", target.css_variable_name);
        }
    }
    token.effective_value().to_string()
}

// ============================================================================
// Tailwind
// ============================================================================

pub fn render_tailwind(registry: &TokenRegistry) -> String {
    let tree = TreeNode::build(registry);
    let mut out = String::new();
    let _ = writeln!(out, "/* {} */", GENERATED_NOTICE);
    let _ = writeln!(out, "/** @type {{import('tailwindcss').Config}} */");
    let _ = writeln!(out, "module.exports = {{");
    let _ = writeln!(out, "  theme: {{");
    let _ = writeln!(out, "    extend: {{");
    write_object(&mut out, &tree, 3, &tailwind_key);
    let _ = writeln!(out, "    }},");
    let _ = writeln!(out, "  }},");
    let _ = writeln!(out, "}};");
    out
}

fn tailwind_key(segment: &str) -> String {
    if IDENT_RE.is_match(segment) {
        segment.to_string()
    } else {
        quote(segment)
    }
}

// ============================================================================
// Shared object-literal writer
// ============================================================================

fn write_object(out: &mut String, node: &TreeNode<'_>, depth: usize, key: &dyn Fn(&str) -> String) {
    let indent = "  ".repeat(depth);
    for (segment, child) in &node.children {
        match (child.token, child.children.is_empty()) {
            (Some(token), true) => {
                let _ = writeln!(out, "{}{}: {},", indent, key(segment), quote(token.effective_value()));
            }
            (token, _) => {
                let _ = writeln!(out, "{}{}: {{", indent, key(segment));
                if let Some(token) = token {
                    let _ = writeln!(out, "{}  DEFAULT: {},", indent, quote(token.effective_value()));
                }
                write_object(out, child, depth + 1, key);
                let _ = writeln!(out, "{}}},", indent);
            }
        }
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
