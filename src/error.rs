//! Error handling for the token-sync toolchain
//!
//! Each concern gets its own thiserror enum; `TokenSyncError` unifies them
//! for callers that drive a whole load → mutate → export cycle.

use std::path::PathBuf;

use thiserror::Error;
use token_types::ArtifactFormat;

/// Main error type for the toolchain
#[derive(Error, Debug)]
pub enum TokenSyncError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while reading one of the token artifact formats
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("YAML error in {file}: {message}")]
    Yaml { file: String, message: String },

    #[error("Syntax error in {file} at line {line}: {message}")]
    Syntax {
        file: String,
        line: usize,
        message: String,
    },

    #[error("No object literal found in {file}")]
    NoObjectLiteral { file: String },

    #[error("Keys '{first}' and '{second}' in {file} both normalize to '{path}'")]
    DuplicateKey {
        file: String,
        path: String,
        first: String,
        second: String,
    },
}

/// Registry CRUD conflicts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Token '{name}' already exists in category '{category}'")]
    DuplicateName { name: String, category: String },

    /// `existing` is the token with the same path or the same flattened CSS variable
    #[error("Token path '{path}' collides with existing token '{existing}'")]
    DuplicatePath { path: String, existing: String },

    #[error("Token '{0}' not found")]
    NotFound(String),

    #[error("Token name '{name}' is ambiguous; matches {}", .candidates.join(", "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },

    #[error(
        "Cannot remove '{path}': referenced by {} (use --force to remove anyway)",
        .dependents.join(", ")
    )]
    HasDependents {
        path: String,
        dependents: Vec<String>,
    },

    #[error("Invalid token name '{0}': use lowercase letters, digits and dashes")]
    InvalidName(String),

    #[error("Token value for '{0}' must not be empty")]
    EmptyValue(String),
}

/// Failures while writing the generated formats
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to render {format}: {message}")]
    Render {
        format: ArtifactFormat,
        message: String,
    },

    #[error(
        "Partial export: wrote [{}], failed [{}]",
        join_formats(.written),
        join_failures(.failed)
    )]
    Partial {
        written: Vec<ArtifactFormat>,
        failed: Vec<(ArtifactFormat, String)>,
    },
}

fn join_formats(formats: &[ArtifactFormat]) -> String {
    formats
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_failures(failed: &[(ArtifactFormat, String)]) -> String {
    failed
        .iter()
        .map(|(f, e)| format!("{}: {}", f, e))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration loading failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Result type aliases for convenience
pub type Result<T> = std::result::Result<T, TokenSyncError>;
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
pub type ParseResult<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_dependents_message_lists_dependents() {
        let err = RegistryError::HasDependents {
            path: "colors.cosmic-purple".to_string(),
            dependents: vec!["colors.primary".to_string(), "colors.accent".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("colors.primary, colors.accent"));
        assert!(msg.contains("--force"));
    }

    #[test]
    fn test_partial_export_message() {
        let err = ExportError::Partial {
            written: vec![ArtifactFormat::Source, ArtifactFormat::Css],
            failed: vec![(ArtifactFormat::TypeScript, "permission denied".to_string())],
        };
        assert_eq!(
            err.to_string(),
            "Partial export: wrote [YAML, CSS], failed [TypeScript: permission denied]"
        );
    }
}
