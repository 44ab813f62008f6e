//! Project configuration
//!
//! Loaded from `token-sync.yaml` at the project root. Every field has a
//! default so a project without a config file still works.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use token_types::ArtifactFormat;
use tracing::{debug, info};

use crate::error::ConfigError;

/// File name looked up at the project root
pub const CONFIG_FILE: &str = "token-sync.yaml";

/// Top-level configuration passed explicitly into load/scan/validate calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenSyncConfig {
    /// Locations of the four token artifacts, relative to the project root
    pub artifacts: ArtifactPaths,
    /// Prefix of generated CSS custom properties (`--<prefix>-colors-…`)
    pub css_prefix: String,
    /// Directory receiving JSON/Markdown reports
    pub reports_dir: PathBuf,
    pub scan: ScanConfig,
    pub dashboard: DashboardConfig,
}

impl Default for TokenSyncConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactPaths::default(),
            css_prefix: "ds".to_string(),
            reports_dir: PathBuf::from("reports"),
            scan: ScanConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub source: PathBuf,
    pub typescript: PathBuf,
    pub css: PathBuf,
    pub tailwind: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            source: PathBuf::from("tokens/design-tokens.yaml"),
            typescript: PathBuf::from("src/styles/tokens.ts"),
            css: PathBuf::from("src/styles/tokens.css"),
            tailwind: PathBuf::from("tailwind.tokens.js"),
        }
    }
}

impl ArtifactPaths {
    pub fn path_for(&self, format: ArtifactFormat) -> &Path {
        match format {
            ArtifactFormat::Source => &self.source,
            ArtifactFormat::TypeScript => &self.typescript,
            ArtifactFormat::Css => &self.css,
            ArtifactFormat::Tailwind => &self.tailwind,
        }
    }

    pub fn all(&self) -> [&Path; 4] {
        [
            self.source.as_path(),
            self.typescript.as_path(),
            self.css.as_path(),
            self.tailwind.as_path(),
        ]
    }
}

/// Hardcoded-value scanner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions (without dot) that are scanned
    pub extensions: Vec<String>,
    /// Directory names never descended into
    pub excluded_dirs: Vec<String>,
    /// Substrings of file names that exclude a file
    pub excluded_file_patterns: Vec<String>,
    /// Extensions treated as stylesheets (font-family/box-shadow rules apply)
    pub stylesheet_extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: ["ts", "tsx", "js", "jsx", "css", "scss"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excluded_dirs: [
                "node_modules",
                ".next",
                ".git",
                "dist",
                "build",
                "out",
                "coverage",
                "storybook-static",
                "target",
                "reports",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            excluded_file_patterns: [".test.", ".spec.", ".stories.", ".min.", ".d.ts"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            stylesheet_extensions: ["css", "scss"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Reports older than this are regenerated on request
    pub stale_after_secs: u64,
    /// Maximum number of findings returned in `violations`
    pub max_violations: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: 300,
            max_violations: 100,
        }
    }
}

impl TokenSyncConfig {
    /// Load `token-sync.yaml` from `root`, falling back to defaults when absent
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            debug!("No {} in {:?}, using defaults", CONFIG_FILE, root);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|source| ConfigError::Invalid { path: path.clone(), source })?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Absolute reports directory for a project root
    pub fn reports_path(&self, root: &Path) -> PathBuf {
        root.join(&self.reports_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TokenSyncConfig::load(dir.path()).unwrap();
        assert_eq!(config, TokenSyncConfig::default());
        assert_eq!(config.dashboard.stale_after_secs, 300);
    }

    #[test]
    fn test_partial_config_merges_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "css_prefix: brand\nartifacts:\n  css: styles/vars.css\n",
        )
        .unwrap();

        let config = TokenSyncConfig::load(dir.path()).unwrap();
        assert_eq!(config.css_prefix, "brand");
        assert_eq!(config.artifacts.css, PathBuf::from("styles/vars.css"));
        assert_eq!(
            config.artifacts.source,
            PathBuf::from("tokens/design-tokens.yaml")
        );
        assert!(config.scan.extensions.contains(&"tsx".to_string()));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "css_prefix: [unclosed\n").unwrap();
        assert!(matches!(
            TokenSyncConfig::load(dir.path()),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
