//! Hardcoded-value scanner
//!
//! Walks a project tree and reports literal colors, dimensions, arbitrary
//! Tailwind values, inline styles and (stylesheets only) raw font stacks and
//! shadows that bypass the token system. Nothing here is fatal: unreadable
//! files are logged and counted, and the walk continues.

pub mod patterns;
pub mod report;

use std::path::{Path, PathBuf};

use token_types::Finding;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::TokenSyncConfig;
pub use patterns::{CommentState, LineScanner};
pub use report::{GroupedFindings, ScanReport};

/// JSON report written by the scan CLI and the dashboard
pub const SCAN_REPORT_FILE: &str = "hardcoded-values-report.json";
pub const SCAN_MARKDOWN_FILE: &str = "hardcoded-values-report.md";

pub struct Scanner<'a> {
    config: &'a TokenSyncConfig,
    /// Generated token artifacts; they are supposed to hold literals
    artifacts: Vec<PathBuf>,
}

impl<'a> Scanner<'a> {
    pub fn new(root: &Path, config: &'a TokenSyncConfig) -> Self {
        let artifacts = config
            .artifacts
            .all()
            .iter()
            .map(|p| root.join(p))
            .collect();
        Self { config, artifacts }
    }

    /// Scan every eligible file under `root`
    pub fn scan(&self, root: &Path) -> ScanReport {
        let mut findings = Vec::new();
        let mut scanned = 0usize;
        let mut skipped = 0usize;

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_excluded_dir(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable path: {}", e);
                    skipped += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.should_scan(entry.path()) {
                continue;
            }

            let text = match std::fs::read_to_string(entry.path()) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Skipping {:?}: {}", entry.path(), e);
                    skipped += 1;
                    continue;
                }
            };

            let rel = relative_label(root, entry.path());
            let found = scan_text(&text, &rel, self.is_stylesheet(entry.path()));
            if !found.is_empty() {
                debug!("{}: {} findings", rel, found.len());
            }
            findings.extend(found);
            scanned += 1;
        }

        info!(
            "Scanned {} files ({} skipped), {} findings",
            scanned,
            skipped,
            findings.len()
        );
        ScanReport::new(root, scanned, skipped, findings)
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .map(|name| self.config.scan.excluded_dirs.iter().any(|d| d == name))
                .unwrap_or(false)
    }

    fn should_scan(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let scan = &self.config.scan;
        scan.extensions.iter().any(|e| e == ext)
            && !scan
                .excluded_file_patterns
                .iter()
                .any(|pattern| name.contains(pattern.as_str()))
            && !self.artifacts.iter().any(|a| a == path)
    }

    fn is_stylesheet(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.config.scan.stylesheet_extensions.iter().any(|s| s == ext))
            .unwrap_or(false)
    }
}

/// Scan `root` with the given configuration
pub fn scan(root: &Path, config: &TokenSyncConfig) -> ScanReport {
    Scanner::new(root, config).scan(root)
}

/// Scan one file's contents; `file` is the label recorded on findings
pub fn scan_text(text: &str, file: &str, stylesheet: bool) -> Vec<Finding> {
    let mut scanner = LineScanner::new(file, stylesheet);
    let mut comments = CommentState::default();
    for (idx, line) in text.lines().enumerate() {
        let code = comments.code_portion(line);
        scanner.scan_line(idx + 1, line, &code);
    }
    scanner.findings
}

fn relative_label(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
