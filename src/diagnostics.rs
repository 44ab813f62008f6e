//! Lint rules and the diagnostics they raise
//!
//! Every rule has a stable `TOKENnnn` code. Codes are grouped in blocks of
//! ten by the concern they check, so `TOKEN02x` is always about values.
//! A diagnostic names the token it concerns by path and by CSS variable,
//! the two spellings a designer is likely to search for.

use std::fmt;

use serde::{Deserialize, Serialize};
use token_types::TokenDefinition;

/// Path used for registry-wide diagnostics
pub const REGISTRY_PATH: &str = "$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, never fails validation
    Info,
    Warn,
    /// Fails `token-manager validate`
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        })
    }
}

/// Block of rule codes sharing a concern
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleGroup {
    /// TOKEN001-009
    References,
    /// TOKEN010-019
    Naming,
    /// TOKEN020-029
    Values,
    /// TOKEN030-039
    Lifecycle,
    /// TOKEN040-049
    Classification,
}

impl RuleGroup {
    /// First code number of the block
    pub fn base(self) -> u16 {
        match self {
            RuleGroup::References => 1,
            RuleGroup::Naming => 10,
            RuleGroup::Values => 20,
            RuleGroup::Lifecycle => 30,
            RuleGroup::Classification => 40,
        }
    }
}

/// A registry lint rule. Serializes as its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LintRule {
    /// Alias chain loops back on itself
    #[serde(rename = "TOKEN001")]
    Cycle,
    /// Alias points at a token that does not exist
    #[serde(rename = "TOKEN002")]
    DanglingReference,
    /// A literal embeds `var()`/`{}` to an unknown token
    #[serde(rename = "TOKEN003")]
    UnknownEmbeddedReference,
    /// Two paths flatten to the same CSS variable
    #[serde(rename = "TOKEN010")]
    DuplicateCssVariable,
    #[serde(rename = "TOKEN011")]
    NonKebabName,
    #[serde(rename = "TOKEN020")]
    InvalidColor,
    #[serde(rename = "TOKEN021")]
    EmptyValue,
    /// Live token depends on a deprecated one
    #[serde(rename = "TOKEN030")]
    DeprecatedReference,
    /// Count of deprecated tokens still defined
    #[serde(rename = "TOKEN031")]
    DeprecatedSummary,
    /// Value heuristics disagree with the filed category
    #[serde(rename = "TOKEN040")]
    CategoryMismatch,
}

impl LintRule {
    pub const ALL: [LintRule; 10] = [
        LintRule::Cycle,
        LintRule::DanglingReference,
        LintRule::UnknownEmbeddedReference,
        LintRule::DuplicateCssVariable,
        LintRule::NonKebabName,
        LintRule::InvalidColor,
        LintRule::EmptyValue,
        LintRule::DeprecatedReference,
        LintRule::DeprecatedSummary,
        LintRule::CategoryMismatch,
    ];

    pub fn code(self) -> &'static str {
        match self {
            LintRule::Cycle => "TOKEN001",
            LintRule::DanglingReference => "TOKEN002",
            LintRule::UnknownEmbeddedReference => "TOKEN003",
            LintRule::DuplicateCssVariable => "TOKEN010",
            LintRule::NonKebabName => "TOKEN011",
            LintRule::InvalidColor => "TOKEN020",
            LintRule::EmptyValue => "TOKEN021",
            LintRule::DeprecatedReference => "TOKEN030",
            LintRule::DeprecatedSummary => "TOKEN031",
            LintRule::CategoryMismatch => "TOKEN040",
        }
    }

    pub fn group(self) -> RuleGroup {
        match self {
            LintRule::Cycle | LintRule::DanglingReference | LintRule::UnknownEmbeddedReference => {
                RuleGroup::References
            }
            LintRule::DuplicateCssVariable | LintRule::NonKebabName => RuleGroup::Naming,
            LintRule::InvalidColor | LintRule::EmptyValue => RuleGroup::Values,
            LintRule::DeprecatedReference | LintRule::DeprecatedSummary => RuleGroup::Lifecycle,
            LintRule::CategoryMismatch => RuleGroup::Classification,
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            LintRule::Cycle
            | LintRule::DanglingReference
            | LintRule::DuplicateCssVariable
            | LintRule::InvalidColor
            | LintRule::EmptyValue => Severity::Error,
            LintRule::UnknownEmbeddedReference
            | LintRule::NonKebabName
            | LintRule::DeprecatedReference
            | LintRule::CategoryMismatch => Severity::Warn,
            LintRule::DeprecatedSummary => Severity::Info,
        }
    }
}

impl fmt::Display for LintRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One finding from [`crate::registry::validate_tokens`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub rule: LintRule,
    pub severity: Severity,
    /// Token path, or [`REGISTRY_PATH`] for registry-wide findings
    pub path: String,
    pub css_variable: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Diagnostic {
    /// Finding about a single token
    pub fn for_token(rule: LintRule, token: &TokenDefinition, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: rule.severity(),
            path: token.path.clone(),
            css_variable: Some(token.css_variable_name.clone()),
            message: message.into(),
            hint: None,
        }
    }

    /// Finding about the registry as a whole
    pub fn registry(rule: LintRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: rule.severity(),
            path: REGISTRY_PATH.to_string(),
            css_variable: None,
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn code(&self) -> &'static str {
        self.rule.code()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warn
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] {}", self.severity, self.rule, self.path)?;
        if let Some(var) = &self.css_variable {
            write!(f, " ({})", var)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "; hint: {}", hint)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use token_types::Category;

    fn purple() -> TokenDefinition {
        TokenDefinition::literal(
            "purple",
            "colors.brand.purple",
            Category::Color,
            "#7B00FF",
            "--ds-colors-brand-purple",
        )
    }

    #[test]
    fn test_token_diagnostic_names_path_and_variable() {
        let d = Diagnostic::for_token(
            LintRule::DeprecatedReference,
            &purple(),
            "References deprecated token 'colors.legacy'",
        )
        .with_hint("Point it at colors.brand.violet");
        assert!(d.is_warning());
        assert_eq!(d.code(), "TOKEN030");
        assert_eq!(
            d.to_string(),
            "warn[TOKEN030] colors.brand.purple (--ds-colors-brand-purple): \
             References deprecated token 'colors.legacy'; hint: Point it at colors.brand.violet"
        );
    }

    #[test]
    fn test_registry_diagnostic_has_no_variable() {
        let d = Diagnostic::registry(LintRule::DeprecatedSummary, "2 deprecated token(s) still defined");
        assert_eq!(d.severity, Severity::Info);
        assert_eq!(d.to_string(), "info[TOKEN031] $: 2 deprecated token(s) still defined");
    }

    #[test]
    fn test_codes_fall_inside_their_group() {
        for rule in LintRule::ALL {
            let number: u16 = rule.code()["TOKEN".len()..].parse().unwrap();
            let base = rule.group().base();
            assert!(
                (base..base + 10).contains(&number) && number > 0,
                "{} outside {:?}",
                rule,
                rule.group()
            );
        }
    }

    #[test]
    fn test_rule_serializes_as_code() {
        let d = Diagnostic::for_token(LintRule::InvalidColor, &purple(), "bad");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["rule"], "TOKEN020");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["cssVariable"], "--ds-colors-brand-purple");
    }
}
