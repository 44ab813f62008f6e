//! Multi-format token parsers
//!
//! Each artifact format is read independently into a flat path → entry map.
//! A missing file is never an error: it yields an empty map flagged as not
//! present, and validation reports the affected tokens as missing.
//!
//! ## Formats
//!
//! | Format | Module | Shape |
//! |--------|--------|-------|
//! | YAML source | [`yaml_source`] | nested mapping, `{ value: … }` leaves |
//! | TypeScript | [`typescript`] | exported object literals |
//! | CSS | [`css`] | `--prefix-path: value;` declarations |
//! | Tailwind | [`tailwind`] | `module.exports = { theme: … }` |

pub mod css;
pub mod object_literal;
pub mod tailwind;
pub mod typescript;
pub mod yaml_source;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use token_types::ArtifactFormat;
use tracing::{debug, warn};

use crate::config::TokenSyncConfig;
use crate::error::ParseError;
use crate::normalize::{self, NormalizedValue};
use crate::source::{flat_key, SourceDocument};

/// One value observed in a generated format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatEntry {
    /// Dotted path as derived by the format's parser
    pub path: String,
    /// Raw value as written
    pub raw: String,
    pub value: NormalizedValue,
    /// 1-based line in the artifact file
    pub line: usize,
}

/// Flat path → entry map for one generated format
#[derive(Debug, Clone)]
pub struct FormatMap {
    pub format: ArtifactFormat,
    pub file: PathBuf,
    /// False when the artifact file was missing or unreadable
    pub present: bool,
    /// Keyed by flat key so kebab-case segments join unambiguously
    entries: BTreeMap<String, FormatEntry>,
    /// Declarations ignored because the path was already defined
    pub duplicates: usize,
    pub errors: Vec<ParseError>,
}

impl FormatMap {
    pub fn new(format: ArtifactFormat, file: impl Into<PathBuf>) -> Self {
        Self {
            format,
            file: file.into(),
            present: true,
            entries: BTreeMap::new(),
            duplicates: 0,
            errors: Vec::new(),
        }
    }

    /// Empty map for an artifact that does not exist
    pub fn missing(format: ArtifactFormat, file: impl Into<PathBuf>) -> Self {
        Self {
            present: false,
            ..Self::new(format, file)
        }
    }

    /// Insert a raw value; the first definition of a path wins
    pub fn insert(&mut self, path: impl Into<String>, raw: &str, line: usize) -> bool {
        let path = path.into();
        let key = flat_key(&path);
        if self.entries.contains_key(&key) {
            self.duplicates += 1;
            debug!(
                "{}: duplicate definition of {} at line {}",
                self.format, path, line
            );
            return false;
        }
        let raw = normalize::clean(raw);
        let value = normalize::normalize(&raw);
        self.entries.insert(
            key,
            FormatEntry {
                path,
                raw,
                value,
                line,
            },
        );
        true
    }

    pub fn get(&self, path: &str) -> Option<&FormatEntry> {
        self.entries.get(&flat_key(path))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormatEntry> {
        self.entries.values()
    }
}

/// Read an artifact; `None` when it is missing or unreadable
pub(crate) fn read_artifact(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Artifact not found: {:?}", path);
            None
        }
        Err(e) => {
            warn!("Failed to read {:?}: {}", path, e);
            None
        }
    }
}

/// All four artifacts of a project, loaded fresh
#[derive(Debug, Clone)]
pub struct TokenSources {
    pub source: SourceDocument,
    pub typescript: FormatMap,
    pub css: FormatMap,
    pub tailwind: FormatMap,
    /// Source-of-truth parse errors (generated-format errors live on each map)
    pub errors: Vec<ParseError>,
}

impl TokenSources {
    /// Load every artifact under `root`; never fails as a whole
    pub fn load(root: &Path, config: &TokenSyncConfig) -> Self {
        let paths = &config.artifacts;

        let mut errors = Vec::new();
        let source_path = root.join(&paths.source);
        let source = match yaml_source::load_source(&source_path, &config.css_prefix) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Token source unusable: {}", e);
                errors.push(e);
                SourceDocument {
                    file: source_path,
                    present: true,
                    ..SourceDocument::default()
                }
            }
        };

        Self {
            source,
            typescript: typescript::load(&root.join(&paths.typescript)),
            css: css::load(&root.join(&paths.css), &config.css_prefix),
            tailwind: tailwind::load(&root.join(&paths.tailwind)),
            errors,
        }
    }

    /// Generated map for a format (`Source` has no flat map)
    pub fn generated(&self, format: ArtifactFormat) -> Option<&FormatMap> {
        match format {
            ArtifactFormat::TypeScript => Some(&self.typescript),
            ArtifactFormat::Css => Some(&self.css),
            ArtifactFormat::Tailwind => Some(&self.tailwind),
            ArtifactFormat::Source => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_definition_wins() {
        let mut map = FormatMap::new(ArtifactFormat::Css, "tokens.css");
        assert!(map.insert("colors.brand.purple", "#7b00ff", 3));
        assert!(!map.insert("colors.brand.purple", "#000", 9));
        assert_eq!(map.duplicates, 1);
        assert_eq!(map.get("colors.brand.purple").unwrap().value.as_str(), "#7B00FF");
    }

    #[test]
    fn test_lookup_joins_on_flat_key() {
        let mut map = FormatMap::new(ArtifactFormat::Css, "tokens.css");
        // CSS derivation turns every dash into a dot
        map.insert("colors.brand.purple.light", "#A64DFF", 1);
        assert!(map.contains("colors.brand.purple-light"));
        assert!(!map.contains("colors.brand.purple"));
    }

    #[test]
    fn test_load_with_no_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let sources = TokenSources::load(dir.path(), &TokenSyncConfig::default());
        assert!(!sources.source.present);
        assert!(!sources.typescript.present);
        assert!(!sources.css.present);
        assert!(!sources.tailwind.present);
        assert!(sources.errors.is_empty());
    }
}
