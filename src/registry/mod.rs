//! Token registry
//!
//! In-memory view of the source of truth used by the CRUD commands. Every
//! command loads the registry, applies one mutation and hands the result to
//! [`crate::export`], which rewrites all four formats as a set.
//!
//! Mutations validate first and mutate second: a failed call leaves the
//! registry untouched.

pub mod infer;
pub mod lint;
pub mod migration;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Utc;
use regex::{Regex, RegexBuilder};
use token_types::{Category, RegistryMetadata, TokenDefinition};
use tracing::{debug, info, warn};

use crate::config::TokenSyncConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::parsers::yaml_source;
use crate::resolver::{resolve, Resolution, ResolveError};
use crate::source::{
    analyze_value, brace_references, contains_var, css_variable_name, flat_key, normalize_path,
    path_segment,
    replace_var, rewrite_brace_references, CssVarIndex, SourceDocument,
};

pub use infer::infer_type;
pub use lint::validate_tokens;
pub use migration::{generate_migration_plan, MigrationPlan, MigrationStep};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_\-]*$").unwrap());

/// Input for [`TokenRegistry::add_token`]
#[derive(Debug, Clone, Default)]
pub struct NewToken {
    pub name: String,
    pub value: String,
    /// Inferred from the path group or the value when absent
    pub category: Option<Category>,
    /// Defaults to `<category group>.<name>`
    pub path: Option<String>,
    pub comment: Option<String>,
    pub deprecated: bool,
}

/// Fields changed by [`TokenRegistry::update_token`]; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct TokenUpdate {
    pub value: Option<String>,
    pub comment: Option<String>,
    pub deprecated: Option<bool>,
}

/// Result of add/update
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub path: String,
    /// False for a no-op update; no export should follow
    pub changed: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveOutcome {
    pub removed: TokenDefinition,
    /// Dependents left pointing at the removed token (forced removal only)
    pub dangling: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameOutcome {
    pub old_path: String,
    pub new_path: String,
    pub old_css_variable: String,
    pub new_css_variable: String,
    /// Tokens whose raw value or references were rewritten
    pub rewritten: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TokenRegistry {
    /// Tokens grouped by category, insertion order within each group
    tokens: BTreeMap<Category, Vec<TokenDefinition>>,
    pub metadata: RegistryMetadata,
    css_prefix: String,
    source_file: PathBuf,
    resolution_errors: Vec<ResolveError>,
}

impl TokenRegistry {
    /// Create an empty registry
    pub fn new(css_prefix: impl Into<String>) -> Self {
        Self {
            tokens: BTreeMap::new(),
            metadata: RegistryMetadata::default(),
            css_prefix: css_prefix.into(),
            source_file: PathBuf::new(),
            resolution_errors: Vec::new(),
        }
    }

    /// Load the source of truth configured for `root`.
    ///
    /// A missing file yields an empty registry; a malformed one is an error so
    /// that CRUD commands never overwrite a file they could not read.
    pub fn load(root: &Path, config: &TokenSyncConfig) -> crate::error::Result<Self> {
        let path = root.join(&config.artifacts.source);
        let doc = yaml_source::load_source(&path, &config.css_prefix)?;
        if !doc.present {
            warn!("Token source {:?} not found; starting with an empty registry", path);
        }
        let registry = Self::from_document(&doc, &config.css_prefix);
        info!("Loaded registry with {} tokens from {:?}", registry.len(), path);
        Ok(registry)
    }

    pub fn from_document(doc: &SourceDocument, css_prefix: &str) -> Self {
        let mut registry = Self::new(css_prefix);
        registry.source_file = doc.file.clone();
        if let Some(version) = &doc.version {
            registry.metadata.version = version.clone();
        }
        for token in &doc.tokens {
            registry
                .tokens
                .entry(token.category)
                .or_default()
                .push(token.clone());
        }
        registry.refresh(false);
        registry
    }

    pub fn css_prefix(&self) -> &str {
        &self.css_prefix
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn len(&self) -> usize {
        self.tokens.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All tokens, grouped by category
    pub fn tokens(&self) -> impl Iterator<Item = &TokenDefinition> {
        self.tokens.values().flatten()
    }

    pub fn get(&self, path: &str) -> Option<&TokenDefinition> {
        self.tokens().find(|t| t.path == path)
    }

    /// Unresolvable tokens as of the last load or mutation
    pub fn resolution_errors(&self) -> &[ResolveError] {
        &self.resolution_errors
    }

    /// Snapshot in source-document form
    pub fn to_document(&self) -> SourceDocument {
        SourceDocument {
            file: self.source_file.clone(),
            present: true,
            version: Some(self.metadata.version.clone()),
            tokens: self.tokens().cloned().collect(),
        }
    }

    /// Resolve every token against the current contents
    pub fn resolution(&self) -> Resolution {
        let doc = self.to_document();
        resolve(&doc.literal_map(), &doc.reference_map())
    }

    /// Find a token by path, CSS variable name or (unique) name
    pub fn lookup(&self, ident: &str) -> RegistryResult<&TokenDefinition> {
        let ident = ident.trim();
        if let Some(token) = self.get(&normalize_path(ident)) {
            return Ok(token);
        }
        if ident.starts_with("--") {
            return self
                .tokens()
                .find(|t| t.css_variable_name == ident)
                .ok_or_else(|| RegistryError::NotFound(ident.to_string()));
        }

        let name = path_segment(ident);
        let candidates: Vec<&TokenDefinition> = self.tokens().filter(|t| t.name == name).collect();
        match candidates.as_slice() {
            [] => Err(RegistryError::NotFound(ident.to_string())),
            [token] => Ok(*token),
            many => Err(RegistryError::Ambiguous {
                name: ident.to_string(),
                candidates: many.iter().map(|t| t.path.clone()).collect(),
            }),
        }
    }

    /// Paths of tokens whose value refers to the token at `path`
    pub fn dependents_of(&self, path: &str) -> Vec<String> {
        let Some(target) = self.get(path) else {
            return Vec::new();
        };
        let var = target.css_variable_name.as_str();
        self.tokens()
            .filter(|t| t.path != path)
            .filter(|t| {
                t.references.iter().any(|r| r == path || r == var)
                    || contains_var(&t.raw_value, var)
                    || brace_references(&t.raw_value).iter().any(|r| r == path)
            })
            .map(|t| t.path.clone())
            .collect()
    }

    pub fn add_token(&mut self, new: NewToken) -> RegistryResult<MutationOutcome> {
        let value = new.value.trim().to_string();
        if value.is_empty() {
            return Err(RegistryError::EmptyValue(new.name));
        }

        let path = match &new.path {
            Some(path) => normalize_path(path),
            None => {
                let name = path_segment(&new.name);
                let category = new
                    .category
                    .unwrap_or_else(|| infer_type(&name, &value));
                format!("{}.{}", category.group_key(), name)
            }
        };
        let name = path.rsplit('.').next().unwrap_or_default().to_string();
        if !NAME_RE.is_match(&name) {
            return Err(RegistryError::InvalidName(new.name));
        }

        let category = new.category.unwrap_or_else(|| {
            let group = Category::from_group_key(path.split('.').next().unwrap_or_default());
            if group != Category::Custom {
                group
            } else {
                infer_type(&name, &value)
            }
        });

        if let Some(existing) = self.colliding_token(&path, None) {
            let existing = existing.path.clone();
            return Err(RegistryError::DuplicatePath { path, existing });
        }
        if self.name_taken(category, &name, None) {
            return Err(RegistryError::DuplicateName {
                name,
                category: category.to_string(),
            });
        }

        let mut token = TokenDefinition::literal(
            name,
            path.clone(),
            category,
            value,
            css_variable_name(&path, &self.css_prefix),
        );
        token.comment = new.comment;
        token.deprecated = new.deprecated;
        self.analyze(&mut token);

        let mut warnings = Vec::new();
        if let Some(warning) = self.inference_warning(&token) {
            warnings.push(warning);
        }

        info!("Added token {} = {}", token.path, token.raw_value);
        self.tokens.entry(category).or_default().push(token);
        self.refresh(true);

        Ok(MutationOutcome {
            path,
            changed: true,
            warnings,
        })
    }

    /// Remove a token; refuses when other tokens depend on it unless `force`
    pub fn remove_token(&mut self, ident: &str, force: bool) -> RegistryResult<RemoveOutcome> {
        let path = self.lookup(ident)?.path.clone();
        let dependents = self.dependents_of(&path);

        if !dependents.is_empty() && !force {
            return Err(RegistryError::HasDependents { path, dependents });
        }
        if !dependents.is_empty() {
            warn!(
                "Force-removing {} leaves dangling references in {}",
                path,
                dependents.join(", ")
            );
        }

        let (category, idx) = self
            .position(&path)
            .ok_or_else(|| RegistryError::NotFound(path.clone()))?;
        let removed = self.bucket_mut(category).remove(idx);
        if self.tokens.get(&category).is_some_and(Vec::is_empty) {
            self.tokens.remove(&category);
        }

        info!("Removed token {}", path);
        self.refresh(true);
        Ok(RemoveOutcome {
            removed,
            dangling: dependents,
        })
    }

    /// Rename a token and rewrite every reference to it.
    ///
    /// `new_name` is either a bare name (the token keeps its group) or a full
    /// dotted path.
    pub fn rename_token(&mut self, ident: &str, new_name: &str) -> RegistryResult<RenameOutcome> {
        let current = self.lookup(ident)?;
        let old_path = current.path.clone();
        let old_var = current.css_variable_name.clone();
        let category = current.category;

        let new_path = if new_name.contains('.') {
            normalize_path(new_name)
        } else {
            match old_path.rsplit_once('.') {
                Some((parent, _)) => format!("{}.{}", parent, path_segment(new_name)),
                None => path_segment(new_name),
            }
        };
        let name = new_path.rsplit('.').next().unwrap_or_default().to_string();
        if !NAME_RE.is_match(&name) {
            return Err(RegistryError::InvalidName(new_name.to_string()));
        }
        if let Some(existing) = self.colliding_token(&new_path, Some(&old_path)) {
            let existing = existing.path.clone();
            return Err(RegistryError::DuplicatePath {
                path: new_path,
                existing,
            });
        }
        if self.name_taken(category, &name, Some(&old_path)) {
            return Err(RegistryError::DuplicateName {
                name,
                category: category.to_string(),
            });
        }

        let new_var = css_variable_name(&new_path, &self.css_prefix);
        let mut rewritten = Vec::new();

        for token in self.tokens.values_mut().flatten() {
            if token.path == old_path {
                token.name = name.clone();
                token.path = new_path.clone();
                token.css_variable_name = new_var.clone();
                continue;
            }

            let raw = rewrite_brace_references(
                &replace_var(&token.raw_value, &old_var, &new_var),
                &old_path,
                &new_path,
            );
            let references: Vec<String> = token
                .references
                .iter()
                .map(|r| {
                    if *r == old_path {
                        new_path.clone()
                    } else if *r == old_var {
                        new_var.clone()
                    } else {
                        r.clone()
                    }
                })
                .collect();

            if raw != token.raw_value || references != token.references {
                debug!("Rewrote references in {}", token.path);
                token.raw_value = raw;
                token.references = references;
                rewritten.push(token.path.clone());
            }
        }

        info!("Renamed {} -> {} ({} dependents)", old_path, new_path, rewritten.len());
        self.refresh(true);

        Ok(RenameOutcome {
            old_path,
            new_path,
            old_css_variable: old_var,
            new_css_variable: new_var,
            rewritten,
        })
    }

    /// Update value/comment/deprecation; re-infers kind and category on a new value
    pub fn update_token(&mut self, ident: &str, update: TokenUpdate) -> RegistryResult<MutationOutcome> {
        let path = self.lookup(ident)?.path.clone();
        if let Some(value) = &update.value {
            if value.trim().is_empty() {
                return Err(RegistryError::EmptyValue(path));
            }
        }

        let (category, idx) = self
            .position(&path)
            .ok_or_else(|| RegistryError::NotFound(path.clone()))?;
        let mut token = self.tokens[&category][idx].clone();
        let mut changed = false;
        let mut warnings = Vec::new();

        if let Some(value) = update.value.map(|v| v.trim().to_string()) {
            if value != token.raw_value {
                token.raw_value = value;
                self.analyze(&mut token);

                let basis = self.inference_basis(&token);
                let inferred = infer_type(&token.name, &basis);
                if inferred != Category::Custom && inferred != token.category {
                    warnings.push(format!(
                        "'{}' reclassified from {} to {}",
                        token.path, token.category, inferred
                    ));
                    token.category = inferred;
                }
                changed = true;
            }
        }
        if let Some(comment) = update.comment {
            let comment = Some(comment).filter(|c| !c.trim().is_empty());
            if comment != token.comment {
                token.comment = comment;
                changed = true;
            }
        }
        if let Some(deprecated) = update.deprecated {
            if deprecated != token.deprecated {
                token.deprecated = deprecated;
                changed = true;
            }
        }

        if !changed {
            debug!("Update of {} is a no-op", path);
            return Ok(MutationOutcome {
                path,
                changed: false,
                warnings,
            });
        }

        self.bucket_mut(category).remove(idx);
        if token.category == category {
            self.bucket_mut(category).insert(idx, token);
        } else {
            if self.tokens.get(&category).is_some_and(Vec::is_empty) {
                self.tokens.remove(&category);
            }
            self.tokens.entry(token.category).or_default().push(token);
        }

        info!("Updated token {}", path);
        self.refresh(true);
        Ok(MutationOutcome {
            path,
            changed: true,
            warnings,
        })
    }

    /// Case-insensitive regex search over name, path, value, CSS variable and
    /// comment. An invalid pattern falls back to substring matching.
    pub fn find_tokens(&self, query: &str) -> Vec<&TokenDefinition> {
        let fields = |t: &TokenDefinition| -> Vec<String> {
            let mut fields = vec![
                t.name.clone(),
                t.path.clone(),
                t.raw_value.clone(),
                t.css_variable_name.clone(),
            ];
            fields.extend(t.resolved_value.clone());
            fields.extend(t.comment.clone());
            fields
        };

        match RegexBuilder::new(query).case_insensitive(true).build() {
            Ok(re) => self
                .tokens()
                .filter(|t| fields(t).iter().any(|f| re.is_match(f)))
                .collect(),
            Err(e) => {
                warn!("Invalid search pattern '{}' ({}); using substring match", query, e);
                let needle = query.to_lowercase();
                self.tokens()
                    .filter(|t| fields(t).iter().any(|f| f.to_lowercase().contains(&needle)))
                    .collect()
            }
        }
    }

    pub fn list_tokens(&self, category: Option<Category>, include_deprecated: bool) -> Vec<&TokenDefinition> {
        self.tokens()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .filter(|t| include_deprecated || !t.deprecated)
            .collect()
    }

    fn position(&self, path: &str) -> Option<(Category, usize)> {
        self.tokens.iter().find_map(|(category, bucket)| {
            bucket
                .iter()
                .position(|t| t.path == path)
                .map(|idx| (*category, idx))
        })
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<TokenDefinition> {
        self.tokens.entry(category).or_default()
    }

    /// Token that `path` would shadow: same path, or a different path that
    /// flattens to the same CSS variable
    fn colliding_token(&self, path: &str, except_path: Option<&str>) -> Option<&TokenDefinition> {
        let flat = flat_key(path);
        self.tokens()
            .filter(|t| Some(t.path.as_str()) != except_path)
            .find(|t| t.path == path || flat_key(&t.path) == flat)
    }

    fn name_taken(&self, category: Category, name: &str, except_path: Option<&str>) -> bool {
        self.tokens
            .get(&category)
            .is_some_and(|bucket| {
                bucket
                    .iter()
                    .any(|t| t.name == name && Some(t.path.as_str()) != except_path)
            })
    }

    /// Derive value kind, references and semantic flag from the raw value
    fn analyze(&self, token: &mut TokenDefinition) {
        let index = CssVarIndex::from_tokens(self.tokens().chain(std::iter::once(&*token)));
        let (kind, references) = analyze_value(&token.raw_value, &index);
        token.value_kind = kind;
        token.semantic = token.is_reference();
        token.references = references;
    }

    /// Value used for inference: the referenced literal for alias tokens
    fn inference_basis(&self, token: &TokenDefinition) -> String {
        if token.is_reference() {
            let resolution = self.resolution();
            if let Some(value) = token.references.first().and_then(|r| resolution.get(r)) {
                return value.to_string();
            }
        }
        token.raw_value.clone()
    }

    fn inference_warning(&self, token: &TokenDefinition) -> Option<String> {
        let inferred = infer_type(&token.name, &self.inference_basis(token));
        (inferred != Category::Custom && inferred != token.category).then(|| {
            format!(
                "'{}' looks like {} but is filed under {}",
                token.path, inferred, token.category
            )
        })
    }

    /// Re-resolve values and recount metadata
    fn refresh(&mut self, touch: bool) {
        let resolution = self.resolution();
        for token in self.tokens.values_mut().flatten() {
            token.resolved_value = resolution.get(&token.path).map(str::to_string);
        }
        self.resolution_errors = resolution.errors;

        let tokens: Vec<&TokenDefinition> = self.tokens.values().flatten().collect();
        self.metadata.total_tokens = tokens.len();
        self.metadata.deprecated = tokens.iter().filter(|t| t.deprecated).count();
        self.metadata.semantic = tokens.iter().filter(|t| t.semantic).count();
        if touch {
            self.metadata.last_updated = Utc::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use token_types::ValueKind;

    fn registry() -> TokenRegistry {
        let yaml = r##"
version: 1.2.0
colors:
  cosmic-purple: { value: "#7B00FF" }
  primary: { value: "var(--colors-cosmic-purple)" }
  accent: { value: "{colors.cosmic-purple}" }
  cosmic-purple-light: { value: "#A64DFF" }
spacing:
  md: { value: 16px }
"##;
        let doc = yaml_source::parse_source(yaml, "tokens.yaml", "").unwrap();
        TokenRegistry::from_document(&doc, "")
    }

    #[test]
    fn test_from_document_counts_metadata() {
        let reg = registry();
        assert_eq!(reg.len(), 5);
        assert_eq!(reg.metadata.version, "1.2.0");
        assert_eq!(reg.metadata.semantic, 2);
        assert_eq!(
            reg.get("colors.primary").unwrap().resolved_value.as_deref(),
            Some("#7B00FF")
        );
    }

    #[test]
    fn test_add_rejects_collisions() {
        let mut reg = registry();
        let err = reg
            .add_token(NewToken {
                name: "md".into(),
                value: "12px".into(),
                category: Some(Category::Spacing),
                ..NewToken::default()
            })
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicatePath {
                path: "spacing.md".into(),
                existing: "spacing.md".into(),
            }
        );

        let err = reg
            .add_token(NewToken {
                name: "Bad Name!".into(),
                value: "1px".into(),
                ..NewToken::default()
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName(_)));
        assert_eq!(reg.len(), 5);
    }

    #[test]
    fn test_add_rejects_flattened_variable_collision() {
        let doc = yaml_source::parse_source(
            "colors:\n  brand-purple: { value: \"#111111\" }\n",
            "tokens.yaml",
            "ds",
        )
        .unwrap();
        let mut reg = TokenRegistry::from_document(&doc, "ds");

        let err = reg
            .add_token(NewToken {
                name: "purple".into(),
                value: "#222222".into(),
                path: Some("colors.brand.purple".into()),
                ..NewToken::default()
            })
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicatePath {
                path: "colors.brand.purple".into(),
                existing: "colors.brand-purple".into(),
            }
        );
        assert_eq!(reg.len(), 1);
        assert_eq!(
            reg.tokens().filter(|t| t.css_variable_name == "--ds-colors-brand-purple").count(),
            1
        );
    }

    #[test]
    fn test_add_infers_category_and_kind() {
        let mut reg = registry();
        let outcome = reg
            .add_token(NewToken {
                name: "lg".into(),
                value: "24px".into(),
                ..NewToken::default()
            })
            .unwrap();
        assert_eq!(outcome.path, "spacing.lg");
        assert!(outcome.warnings.is_empty());

        reg.add_token(NewToken {
            name: "link".into(),
            value: "{colors.accent}".into(),
            path: Some("colors.link".into()),
            ..NewToken::default()
        })
        .unwrap();
        let link = reg.get("colors.link").unwrap();
        assert_eq!(link.value_kind, ValueKind::Reference);
        assert_eq!(link.resolved_value.as_deref(), Some("#7B00FF"));
        assert_eq!(reg.metadata.total_tokens, 7);
    }

    #[test]
    fn test_remove_blocked_by_dependents() {
        let mut reg = registry();
        let err = reg.remove_token("colors.cosmic-purple", false).unwrap_err();
        assert_eq!(
            err,
            RegistryError::HasDependents {
                path: "colors.cosmic-purple".into(),
                dependents: vec!["colors.primary".into(), "colors.accent".into()],
            }
        );
        assert_eq!(reg.len(), 5);

        let primary_before = reg.get("colors.primary").unwrap().raw_value.clone();
        let outcome = reg.remove_token("cosmic-purple", true).unwrap();
        assert_eq!(outcome.dangling.len(), 2);
        assert_eq!(reg.get("colors.primary").unwrap().raw_value, primary_before);
        assert_eq!(reg.resolution_errors().len(), 2);
    }

    #[test]
    fn test_rename_rewrites_dependents() {
        let mut reg = registry();
        let outcome = reg.rename_token("cosmic-purple", "vergil-purple").unwrap();
        assert_eq!(outcome.new_path, "colors.vergil-purple");
        assert_eq!(outcome.new_css_variable, "--colors-vergil-purple");
        assert_eq!(outcome.rewritten, vec!["colors.primary", "colors.accent"]);

        assert_eq!(reg.get("colors.primary").unwrap().raw_value, "var(--colors-vergil-purple)");
        assert_eq!(reg.get("colors.accent").unwrap().raw_value, "{colors.vergil-purple}");
        // the -light variant is a different variable
        assert!(reg.get("colors.cosmic-purple-light").is_some());
        assert!(reg
            .tokens()
            .all(|t| !contains_var(&t.raw_value, "--colors-cosmic-purple")));
        assert!(reg.resolution_errors().is_empty());
    }

    #[test]
    fn test_rename_collision() {
        let mut reg = registry();
        let err = reg.rename_token("colors.primary", "accent").unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicatePath {
                path: "colors.accent".into(),
                existing: "colors.accent".into(),
            }
        );
    }

    #[test]
    fn test_rename_rejects_flattened_variable_collision() {
        let mut reg = registry();
        // colors.cosmic.purple-light flattens onto colors.cosmic-purple-light
        let err = reg
            .rename_token("colors.accent", "colors.cosmic.purple-light")
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicatePath {
                path: "colors.cosmic.purple-light".into(),
                existing: "colors.cosmic-purple-light".into(),
            }
        );
        assert!(reg.get("colors.accent").is_some());

        // a token may be renamed onto its own flattened spelling
        let outcome = reg
            .rename_token("colors.cosmic-purple-light", "colors.cosmic.purple-light")
            .unwrap();
        assert_eq!(outcome.new_css_variable, outcome.old_css_variable);
    }

    #[test]
    fn test_update_noop_and_reclassification() {
        let mut reg = registry();
        let outcome = reg
            .update_token(
                "spacing.md",
                TokenUpdate {
                    value: Some("16px".into()),
                    ..TokenUpdate::default()
                },
            )
            .unwrap();
        assert!(!outcome.changed);

        let outcome = reg
            .update_token(
                "spacing.md",
                TokenUpdate {
                    value: Some("#123456".into()),
                    ..TokenUpdate::default()
                },
            )
            .unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(reg.get("spacing.md").unwrap().category, Category::Color);
    }

    #[test]
    fn test_find_falls_back_to_substring() {
        let reg = registry();
        let hits: Vec<&str> = reg.find_tokens("PURPLE$").iter().map(|t| t.path.as_str()).collect();
        assert_eq!(hits, vec!["colors.cosmic-purple"]);

        // unbalanced bracket is not a valid regex
        let hits = reg.find_tokens("var(--colors");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_lookup_ambiguity() {
        let mut reg = registry();
        reg.add_token(NewToken {
            name: "md".into(),
            value: "1rem".into(),
            path: Some("typography.md".into()),
            category: Some(Category::Typography),
            ..NewToken::default()
        })
        .unwrap();
        assert!(matches!(
            reg.lookup("md").unwrap_err(),
            RegistryError::Ambiguous { .. }
        ));
        assert_eq!(reg.lookup("--spacing-md").unwrap().path, "spacing.md");
    }
}
