//! Migration planning between two registry snapshots
//!
//! The plan lists steps in application order (add, rename, update, deprecate,
//! remove) plus the CSS-variable replacement pairs a codemod needs to update
//! consuming code. A removed and an added token with the same category and
//! value are treated as a rename.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;
use token_types::{Category, TokenDefinition};

use super::TokenRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "action")]
pub enum MigrationStep {
    #[serde(rename_all = "camelCase")]
    Add {
        path: String,
        value: String,
        category: Category,
    },
    #[serde(rename_all = "camelCase")]
    Rename {
        from: String,
        to: String,
        from_variable: String,
        to_variable: String,
    },
    #[serde(rename_all = "camelCase")]
    Update {
        path: String,
        from_value: String,
        to_value: String,
    },
    Deprecate { path: String },
    #[serde(rename_all = "camelCase")]
    Remove { path: String, css_variable: String },
}

impl MigrationStep {
    fn is_breaking(&self) -> bool {
        matches!(self, MigrationStep::Rename { .. } | MigrationStep::Remove { .. })
    }
}

/// `from` → `to` pair for a find-and-replace codemod
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableReplacement {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPlan {
    pub generated_at: DateTime<Utc>,
    pub from_version: String,
    pub to_version: String,
    pub steps: Vec<MigrationStep>,
    pub replacements: Vec<VariableReplacement>,
    /// True when consuming code must change (renames or removals)
    pub breaking: bool,
}

impl MigrationPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn render_markdown(&self) -> String {
        let mut md = String::new();
        let _ = writeln!(md, "# Token Migration Plan");
        let _ = writeln!(md);
        let _ = writeln!(md, "- From version: {}", self.from_version);
        let _ = writeln!(md, "- To version: {}", self.to_version);
        let _ = writeln!(md, "- Steps: {}", self.steps.len());
        let _ = writeln!(md, "- Breaking: {}", if self.breaking { "yes" } else { "no" });

        if self.steps.is_empty() {
            let _ = writeln!(md);
            let _ = writeln!(md, "No changes.");
            return md;
        }

        let _ = writeln!(md);
        let _ = writeln!(md, "## Steps");
        let _ = writeln!(md);
        for (i, step) in self.steps.iter().enumerate() {
            let line = match step {
                MigrationStep::Add { path, value, category } => {
                    format!("Add `{}` = `{}` ({})", path, value, category)
                }
                MigrationStep::Rename { from, to, from_variable, to_variable } => format!(
                    "Rename `{}` → `{}` (`{}` → `{}`)",
                    from, to, from_variable, to_variable
                ),
                MigrationStep::Update { path, from_value, to_value } => {
                    format!("Update `{}`: `{}` → `{}`", path, from_value, to_value)
                }
                MigrationStep::Deprecate { path } => format!("Deprecate `{}`", path),
                MigrationStep::Remove { path, css_variable } => {
                    format!("Remove `{}` (`{}`)", path, css_variable)
                }
            };
            let _ = writeln!(md, "{}. {}", i + 1, line);
        }

        if !self.replacements.is_empty() {
            let _ = writeln!(md);
            let _ = writeln!(md, "## Codemod replacements");
            let _ = writeln!(md);
            let _ = writeln!(md, "| From | To |");
            let _ = writeln!(md, "|------|----|");
            for r in &self.replacements {
                let _ = writeln!(md, "| `{}` | `{}` |", r.from, r.to);
            }
        }
        md
    }
}

/// Diff two snapshots into an ordered plan
pub fn generate_migration_plan(from: &TokenRegistry, to: &TokenRegistry) -> MigrationPlan {
    let old: BTreeMap<&str, &TokenDefinition> = from.tokens().map(|t| (t.path.as_str(), t)).collect();
    let new: BTreeMap<&str, &TokenDefinition> = to.tokens().map(|t| (t.path.as_str(), t)).collect();

    let removed: Vec<&TokenDefinition> = from.tokens().filter(|t| !new.contains_key(t.path.as_str())).collect();
    let added: Vec<&TokenDefinition> = to.tokens().filter(|t| !old.contains_key(t.path.as_str())).collect();

    // Pair removals with additions of the same category and value
    let mut renamed_from: HashSet<&str> = HashSet::new();
    let mut renamed_to: HashSet<&str> = HashSet::new();
    let mut renames = Vec::new();
    for gone in &removed {
        let candidate = added.iter().find(|a| {
            !renamed_to.contains(a.path.as_str())
                && a.category == gone.category
                && a.raw_value == gone.raw_value
        });
        if let Some(target) = candidate {
            renamed_from.insert(gone.path.as_str());
            renamed_to.insert(target.path.as_str());
            renames.push(MigrationStep::Rename {
                from: gone.path.clone(),
                to: target.path.clone(),
                from_variable: gone.css_variable_name.clone(),
                to_variable: target.css_variable_name.clone(),
            });
        }
    }

    let mut steps: Vec<MigrationStep> = added
        .iter()
        .filter(|t| !renamed_to.contains(t.path.as_str()))
        .map(|t| MigrationStep::Add {
            path: t.path.clone(),
            value: t.raw_value.clone(),
            category: t.category,
        })
        .collect();
    steps.extend(renames);

    let mut deprecations = Vec::new();
    for token in to.tokens() {
        let Some(before) = old.get(token.path.as_str()) else {
            continue;
        };
        if before.raw_value != token.raw_value {
            steps.push(MigrationStep::Update {
                path: token.path.clone(),
                from_value: before.raw_value.clone(),
                to_value: token.raw_value.clone(),
            });
        }
        if token.deprecated && !before.deprecated {
            deprecations.push(MigrationStep::Deprecate {
                path: token.path.clone(),
            });
        }
    }
    steps.extend(deprecations);

    steps.extend(
        removed
            .iter()
            .filter(|t| !renamed_from.contains(t.path.as_str()))
            .map(|t| MigrationStep::Remove {
                path: t.path.clone(),
                css_variable: t.css_variable_name.clone(),
            }),
    );

    let replacements = steps
        .iter()
        .filter_map(|s| match s {
            MigrationStep::Rename { from_variable, to_variable, .. } if from_variable != to_variable => {
                Some(VariableReplacement {
                    from: from_variable.clone(),
                    to: to_variable.clone(),
                })
            }
            _ => None,
        })
        .collect();

    MigrationPlan {
        generated_at: Utc::now(),
        from_version: from.metadata.version.clone(),
        to_version: to.metadata.version.clone(),
        breaking: steps.iter().any(MigrationStep::is_breaking),
        steps,
        replacements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::yaml_source;
    use pretty_assertions::assert_eq;

    fn registry(yaml: &str) -> TokenRegistry {
        let doc = yaml_source::parse_source(yaml, "tokens.yaml", "ds").unwrap();
        TokenRegistry::from_document(&doc, "ds")
    }

    #[test]
    fn test_plan_orders_steps() {
        let from = registry(
            r##"
version: 1.0.0
colors:
  cosmic-purple: { value: "#7B00FF" }
  gray: { value: "#888888" }
  legacy: { value: "#123456" }
  accent: { value: "#FF0000" }
"##,
        );
        let to = registry(
            r##"
version: 2.0.0
colors:
  vergil-purple: { value: "#7B00FF" }
  gray: { value: "#999999" }
  accent: { value: "#FF0000", deprecated: true }
  success: { value: "#00AA00" }
"##,
        );

        let plan = generate_migration_plan(&from, &to);
        let actions: Vec<&str> = plan
            .steps
            .iter()
            .map(|s| match s {
                MigrationStep::Add { .. } => "add",
                MigrationStep::Rename { .. } => "rename",
                MigrationStep::Update { .. } => "update",
                MigrationStep::Deprecate { .. } => "deprecate",
                MigrationStep::Remove { .. } => "remove",
            })
            .collect();
        assert_eq!(actions, vec!["add", "rename", "update", "deprecate", "remove"]);
        assert_eq!(
            plan.replacements,
            vec![VariableReplacement {
                from: "--ds-colors-cosmic-purple".into(),
                to: "--ds-colors-vergil-purple".into(),
            }]
        );
        assert!(plan.breaking);
        assert_eq!(plan.to_version, "2.0.0");

        let md = plan.render_markdown();
        assert!(md.contains("Rename `colors.cosmic-purple` → `colors.vergil-purple`"));

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["steps"][1]["action"], "rename");
        assert_eq!(json["steps"][1]["fromVariable"], "--ds-colors-cosmic-purple");
    }

    #[test]
    fn test_identical_snapshots_produce_empty_plan() {
        let yaml = "colors:\n  a: { value: \"#111111\" }\n";
        let plan = generate_migration_plan(&registry(yaml), &registry(yaml));
        assert!(plan.is_empty());
        assert!(!plan.breaking);
        assert!(plan.render_markdown().contains("No changes."));
    }
}
