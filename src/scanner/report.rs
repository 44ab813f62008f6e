//! Scan report aggregation and rendering

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use token_types::{Finding, FindingType};
use tracing::info;

/// Findings grouped by type, then by file, each file's list sorted by line
pub type GroupedFindings<'a> = BTreeMap<FindingType, BTreeMap<&'a str, Vec<&'a Finding>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub generated_at: DateTime<Utc>,
    pub root: PathBuf,
    pub files_scanned: usize,
    /// Unreadable files and walk errors
    pub files_skipped: usize,
    pub total_findings: usize,
    pub by_type: BTreeMap<FindingType, usize>,
    /// Findings in discovery order
    pub findings: Vec<Finding>,
}

impl ScanReport {
    pub fn new(root: &Path, files_scanned: usize, files_skipped: usize, findings: Vec<Finding>) -> Self {
        let mut by_type = BTreeMap::new();
        for finding in &findings {
            *by_type.entry(finding.finding_type).or_insert(0) += 1;
        }
        Self {
            generated_at: Utc::now(),
            root: root.to_path_buf(),
            files_scanned,
            files_skipped,
            total_findings: findings.len(),
            by_type,
            findings,
        }
    }

    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    pub fn grouped(&self) -> GroupedFindings<'_> {
        let mut groups: GroupedFindings<'_> = BTreeMap::new();
        for finding in &self.findings {
            groups
                .entry(finding.finding_type)
                .or_default()
                .entry(finding.file.as_str())
                .or_default()
                .push(finding);
        }
        for files in groups.values_mut() {
            for list in files.values_mut() {
                list.sort_by_key(|f| (f.line, f.column));
            }
        }
        groups
    }

    /// Number of distinct files with at least one finding
    pub fn files_with_findings(&self) -> usize {
        let mut files: Vec<&str> = self.findings.iter().map(|f| f.file.as_str()).collect();
        files.sort_unstable();
        files.dedup();
        files.len()
    }

    pub fn render_markdown(&self) -> String {
        let mut md = String::new();
        let _ = writeln!(md, "# Hardcoded Values Report");
        let _ = writeln!(md);
        let _ = writeln!(md, "Generated: {}", self.generated_at.to_rfc3339());
        let _ = writeln!(md);
        let _ = writeln!(md, "| Metric | Count |");
        let _ = writeln!(md, "|--------|-------|");
        let _ = writeln!(md, "| Files scanned | {} |", self.files_scanned);
        let _ = writeln!(md, "| Files skipped | {} |", self.files_skipped);
        let _ = writeln!(md, "| Files with findings | {} |", self.files_with_findings());
        let _ = writeln!(md, "| Total findings | {} |", self.total_findings);
        for (ty, count) in &self.by_type {
            let _ = writeln!(md, "| {} | {} |", ty.title(), count);
        }

        if !self.has_findings() {
            let _ = writeln!(md);
            let _ = writeln!(md, "No hardcoded values found.");
            return md;
        }

        for (ty, files) in self.grouped() {
            let _ = writeln!(md);
            let _ = writeln!(md, "## {}", ty.title());
            for (file, findings) in files {
                let _ = writeln!(md);
                let _ = writeln!(md, "### `{}`", file);
                let _ = writeln!(md);
                for f in findings {
                    let _ = writeln!(
                        md,
                        "- Line {}:{} `{}`: `{}`",
                        f.line, f.column, f.value, f.context
                    );
                }
            }
        }
        md
    }

    pub fn write_json(&self, path: &Path) -> crate::error::Result<()> {
        write_file(path, &serde_json::to_string_pretty(self)?)?;
        info!("Wrote scan report to {:?}", path);
        Ok(())
    }

    pub fn write_markdown(&self, path: &Path) -> crate::error::Result<()> {
        write_file(path, &self.render_markdown())?;
        info!("Wrote scan summary to {:?}", path);
        Ok(())
    }

    pub fn read_json(path: &Path) -> crate::error::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
}
