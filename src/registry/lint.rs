//! Registry lint rules
//!
//! ## Rule Codes
//!
//! Each rule is a [`LintRule`]; codes are grouped by [`crate::diagnostics::RuleGroup`].
//!
//! | Range | Group |
//! |-------|----------|
//! | TOKEN001-009 | References |
//! | TOKEN010-019 | Naming |
//! | TOKEN020-029 | Values |
//! | TOKEN030-039 | Lifecycle |
//! | TOKEN040-049 | Classification |

use std::collections::{HashMap, HashSet};

use token_types::{Category, TokenDefinition};

use super::{infer_type, TokenRegistry};
use crate::diagnostics::{Diagnostic, LintRule};
use crate::normalize::{self, NormalizedValue};
use crate::resolver::ResolveErrorKind;
use crate::source::{classify, ValueClass};

// =============================================================================
// PUBLIC API
// =============================================================================

/// Lint the whole registry; errors first, then warnings, then info
pub fn validate_tokens(registry: &TokenRegistry) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    lint_references(&mut diags, registry);
    lint_naming(&mut diags, registry);
    for token in registry.tokens() {
        lint_value(&mut diags, token);
    }
    lint_deprecated_usage(&mut diags, registry);
    lint_classification(&mut diags, registry);

    diags.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.rule.cmp(&b.rule))
    });
    diags
}

// =============================================================================
// REFERENCES
// =============================================================================

fn lint_references(diags: &mut Vec<Diagnostic>, registry: &TokenRegistry) {
    // alias tokens that do not resolve
    for error in registry.resolution_errors() {
        let Some(token) = registry.get(&error.path) else {
            continue;
        };
        match &error.kind {
            ResolveErrorKind::Cycle { chain } => diags.push(
                Diagnostic::for_token(
                    LintRule::Cycle,
                    token,
                    format!("Circular reference: {}", chain.join(" -> ")),
                )
                .with_hint("Point one token of the cycle at a literal value"),
            ),
            ResolveErrorKind::Dangling { target } => diags.push(
                Diagnostic::for_token(
                    LintRule::DanglingReference,
                    token,
                    format!("Reference to missing token '{}'", target),
                )
                .with_hint("Add the missing token or update the reference"),
            ),
        }
    }

    // var()/brace usages embedded in a literal that point nowhere
    for token in registry.tokens().filter(|t| !t.is_reference()) {
        for reference in &token.references {
            if registry.get(reference).is_none() {
                diags.push(Diagnostic::for_token(
                    LintRule::UnknownEmbeddedReference,
                    token,
                    format!("Value uses unknown token '{}'", reference),
                ));
            }
        }
    }
}

// =============================================================================
// NAMING
// =============================================================================

fn lint_naming(diags: &mut Vec<Diagnostic>, registry: &TokenRegistry) {
    let mut by_var: HashMap<&str, Vec<&TokenDefinition>> = HashMap::new();
    for token in registry.tokens() {
        by_var
            .entry(token.css_variable_name.as_str())
            .or_default()
            .push(token);
    }
    let mut clashes: Vec<Vec<&TokenDefinition>> =
        by_var.into_values().filter(|t| t.len() > 1).collect();
    clashes.sort_by(|a, b| a[0].css_variable_name.cmp(&b[0].css_variable_name));
    for tokens in clashes {
        for token in &tokens[1..] {
            diags.push(Diagnostic::for_token(
                LintRule::DuplicateCssVariable,
                token,
                format!("CSS variable is also produced by '{}'", tokens[0].path),
            ));
        }
    }

    // names that do not survive the kebab-case round trip
    for token in registry.tokens() {
        if token.name != token.name.to_ascii_lowercase() || token.name.contains(' ') {
            diags.push(
                Diagnostic::for_token(LintRule::NonKebabName, token, "Token name is not kebab-case")
                    .with_hint("Use lowercase letters, digits and dashes"),
            );
        }
    }
}

// =============================================================================
// VALUES
// =============================================================================

fn lint_value(diags: &mut Vec<Diagnostic>, token: &TokenDefinition) {
    if token.raw_value.trim().is_empty() {
        diags.push(Diagnostic::for_token(LintRule::EmptyValue, token, "Token value is empty"));
        return;
    }
    if token.is_reference() {
        return;
    }

    // color tokens must hold a parseable color
    if token.category == Category::Color {
        let value = normalize::normalize(&token.raw_value);
        let color_like = matches!(value, NormalizedValue::Color(_) | NormalizedValue::Excluded(_))
            || classify(&token.raw_value) == ValueClass::Color;
        if !color_like && token.references.is_empty() {
            diags.push(
                Diagnostic::for_token(
                    LintRule::InvalidColor,
                    token,
                    format!("'{}' is not a valid color", token.raw_value),
                )
                .with_hint("Use #RRGGBB, rgb()/rgba(), hsl() or a reference"),
            );
        }
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

fn lint_deprecated_usage(diags: &mut Vec<Diagnostic>, registry: &TokenRegistry) {
    let deprecated: HashSet<&str> = registry
        .tokens()
        .filter(|t| t.deprecated)
        .map(|t| t.path.as_str())
        .collect();

    for token in registry.tokens() {
        if token.deprecated {
            continue;
        }
        for reference in &token.references {
            if deprecated.contains(reference.as_str()) {
                diags.push(Diagnostic::for_token(
                    LintRule::DeprecatedReference,
                    token,
                    format!("References deprecated token '{}'", reference),
                ));
            }
        }
    }

    if !deprecated.is_empty() {
        diags.push(Diagnostic::registry(
            LintRule::DeprecatedSummary,
            format!("{} deprecated token(s) still defined", deprecated.len()),
        ));
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

fn lint_classification(diags: &mut Vec<Diagnostic>, registry: &TokenRegistry) {
    for token in registry.tokens() {
        let basis = token.resolved_value.as_deref().unwrap_or(&token.raw_value);
        let inferred = infer_type(&token.name, basis);
        if inferred != Category::Custom && inferred != token.category {
            diags.push(Diagnostic::for_token(
                LintRule::CategoryMismatch,
                token,
                format!("Looks like {} but is filed under {}", inferred, token.category),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RuleGroup;
    use crate::parsers::yaml_source;

    fn lint(yaml: &str) -> Vec<Diagnostic> {
        let doc = yaml_source::parse_source(yaml, "tokens.yaml", "ds").unwrap();
        validate_tokens(&TokenRegistry::from_document(&doc, "ds"))
    }

    fn rules(diags: &[Diagnostic]) -> Vec<LintRule> {
        diags.iter().map(|d| d.rule).collect()
    }

    #[test]
    fn test_clean_registry() {
        let diags = lint("colors:\n  primary: { value: \"#7B00FF\" }\nspacing:\n  md: { value: 16px }\n");
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn test_reference_errors() {
        let diags = lint(
            "colors:\n  a: { value: \"{colors.b}\" }\n  b: { value: \"{colors.a}\" }\n  c: { value: \"{colors.missing}\" }\n",
        );
        let rules = rules(&diags);
        assert_eq!(rules.iter().filter(|r| **r == LintRule::Cycle).count(), 2);
        assert!(rules.contains(&LintRule::DanglingReference));
        assert!(diags.iter().all(|d| d.is_error()));

        let dangling = diags.iter().find(|d| d.rule == LintRule::DanglingReference).unwrap();
        assert_eq!(dangling.path, "colors.c");
        assert_eq!(dangling.css_variable.as_deref(), Some("--ds-colors-c"));
    }

    #[test]
    fn test_value_and_lifecycle_rules() {
        let diags = lint(
            r##"
colors:
  old: { value: "#111111", deprecated: true }
  live: { value: "{colors.old}" }
  broken: { value: "not-a-color" }
"##,
        );
        let rules = rules(&diags);
        assert!(rules.contains(&LintRule::InvalidColor));
        assert!(rules.contains(&LintRule::DeprecatedReference));
        assert!(rules.contains(&LintRule::DeprecatedSummary));
        // errors sort first
        assert_eq!(diags[0].code(), "TOKEN020");
        assert_eq!(diags[0].rule.group(), RuleGroup::Values);

        let summary = diags.last().unwrap();
        assert_eq!(summary.rule, LintRule::DeprecatedSummary);
        assert_eq!(summary.path, "$");
        assert_eq!(summary.css_variable, None);
    }

    #[test]
    fn test_duplicate_css_variable() {
        // `brand.purple-light` and `brand-purple.light` flatten identically
        let diags = lint(
            "colors:\n  brand:\n    purple-light: { value: \"#A64DFF\" }\n  brand-purple:\n    light: { value: \"#A64DFF\" }\n",
        );
        assert_eq!(rules(&diags), vec![LintRule::DuplicateCssVariable]);
        assert_eq!(diags[0].path, "colors.brand-purple.light");
        assert_eq!(diags[0].css_variable.as_deref(), Some("--ds-colors-brand-purple-light"));
        assert_eq!(diags[0].message, "CSS variable is also produced by 'colors.brand.purple-light'");
    }

    #[test]
    fn test_misfiled_token_warns() {
        let diags = lint("spacing:\n  overlay: { value: \"#000000\" }\n");
        assert_eq!(rules(&diags), vec![LintRule::CategoryMismatch]);
        assert_eq!(diags[0].rule.group(), RuleGroup::Classification);
        assert!(diags[0].is_warning());
    }
}
