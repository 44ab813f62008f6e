//! Dashboard aggregation over the scan and sync reports
//!
//! [`DashboardService`] keeps the cached reports under the reports directory
//! fresh and folds them into a single camelCase JSON snapshot. Reports that are
//! missing or older than `dashboard.stale_after_secs` are regenerated by
//! running the scanner and the sync validator in-process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use token_types::{Finding, FindingType};
use tracing::{debug, info};

use crate::config::TokenSyncConfig;
use crate::error::Result;
use crate::parsers::TokenSources;
use crate::scanner::{self, ScanReport, SCAN_MARKDOWN_FILE, SCAN_REPORT_FILE};
use crate::validator::{self, SyncSummary, SYNC_REPORT_FILE};

/// Oldest activity entries are dropped past this many
const MAX_ACTIVITY: usize = 50;

// ============================================================================
// Snapshot types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub summary: DashboardSummary,
    pub metrics: BTreeMap<FindingType, usize>,
    pub components: Vec<ComponentViolations>,
    pub violations: Vec<Violation>,
    pub directory_tree: DirectoryNode,
    pub activity: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_violations: usize,
    pub files_scanned: usize,
    pub files_with_violations: usize,
    pub sync_percentage: u32,
    pub token_count: usize,
    /// 0..=100; see [`health_score`]
    pub health_score: u32,
    pub scan_generated_at: DateTime<Utc>,
}

/// Violations of one file under a `components` directory
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentViolations {
    pub name: String,
    pub file: String,
    pub violations: usize,
    pub by_type: BTreeMap<FindingType, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub finding_type: FindingType,
    pub file: String,
    pub line: usize,
    pub value: String,
}

impl From<&Finding> for Violation {
    fn from(f: &Finding) -> Self {
        Self {
            finding_type: f.finding_type,
            file: f.file.clone(),
            line: f.line,
            value: f.value.clone(),
        }
    }
}

/// A directory with the violations of everything beneath it
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DirectoryNode {
    pub name: String,
    pub path: String,
    pub violations: usize,
    pub children: Vec<DirectoryNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    ScanReport,
    SyncReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityKind,
    pub message: String,
}

/// The only part of the sync report the dashboard reads back
#[derive(Debug, Deserialize)]
struct SyncDigest {
    summary: SyncSummary,
}

// ============================================================================
// Service
// ============================================================================

pub struct DashboardService {
    root: PathBuf,
    config: TokenSyncConfig,
    /// Oldest first; reversed when a snapshot is built
    activity: Vec<ActivityEntry>,
}

impl DashboardService {
    pub fn new(root: impl Into<PathBuf>, config: TokenSyncConfig) -> Self {
        Self {
            root: root.into(),
            config,
            activity: Vec::new(),
        }
    }

    pub fn scan_report_path(&self) -> PathBuf {
        self.config.reports_path(&self.root).join(SCAN_REPORT_FILE)
    }

    pub fn sync_report_path(&self) -> PathBuf {
        self.config.reports_path(&self.root).join(SYNC_REPORT_FILE)
    }

    /// True when `path` is missing or was last written before the threshold
    pub fn is_stale(&self, path: &Path, now: DateTime<Utc>) -> bool {
        let Ok(modified) = std::fs::metadata(path).and_then(|m| m.modified()) else {
            return true;
        };
        let modified: DateTime<Utc> = modified.into();
        let threshold = Duration::seconds(self.config.dashboard.stale_after_secs as i64);
        now - modified > threshold
    }

    /// Regenerate whichever reports are stale; returns true if anything ran
    pub fn refresh_if_stale(&mut self, now: DateTime<Utc>) -> Result<bool> {
        let mut refreshed = false;

        let scan_path = self.scan_report_path();
        if self.is_stale(&scan_path, now) {
            let report = scanner::scan(&self.root, &self.config);
            report.write_json(&scan_path)?;
            report.write_markdown(&scan_path.with_file_name(SCAN_MARKDOWN_FILE))?;
            self.record(
                now,
                ActivityKind::ScanReport,
                format!(
                    "Scanned {} files, {} findings",
                    report.files_scanned, report.total_findings
                ),
            );
            refreshed = true;
        }

        let sync_path = self.sync_report_path();
        if self.is_stale(&sync_path, now) {
            let sources = TokenSources::load(&self.root, &self.config);
            let report = validator::validate(&sources);
            report.write_json(&sync_path)?;
            self.record(
                now,
                ActivityKind::SyncReport,
                format!(
                    "Validated {} tokens, {}% in sync",
                    report.summary.total, report.summary.sync_percentage
                ),
            );
            refreshed = true;
        }

        if !refreshed {
            debug!("Dashboard reports are fresh");
        }
        Ok(refreshed)
    }

    pub fn activity(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.activity.iter().rev()
    }

    /// Build the dashboard payload from the cached reports
    pub fn snapshot(&self) -> Result<DashboardSnapshot> {
        let scan = ScanReport::read_json(&self.scan_report_path())?;
        let sync_text = std::fs::read_to_string(self.sync_report_path())?;
        let sync: SyncDigest = serde_json::from_str(&sync_text)?;

        let summary = DashboardSummary {
            total_violations: scan.total_findings,
            files_scanned: scan.files_scanned,
            files_with_violations: scan.files_with_findings(),
            sync_percentage: sync.summary.sync_percentage,
            token_count: sync.summary.total,
            health_score: health_score(&scan),
            scan_generated_at: scan.generated_at,
        };

        Ok(DashboardSnapshot {
            summary,
            metrics: scan.by_type.clone(),
            components: component_violations(&scan.findings),
            violations: scan
                .findings
                .iter()
                .take(self.config.dashboard.max_violations)
                .map(Violation::from)
                .collect(),
            directory_tree: directory_tree(&scan.findings),
            activity: self.activity().cloned().collect(),
        })
    }

    fn record(&mut self, timestamp: DateTime<Utc>, kind: ActivityKind, message: String) {
        info!("{}", message);
        self.activity.push(ActivityEntry {
            timestamp,
            kind,
            message,
        });
        if self.activity.len() > MAX_ACTIVITY {
            self.activity.remove(0);
        }
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// 100 minus ten points per weighted finding per scanned file, clamped to 0
///
/// Color findings weigh 3, everything else 1.
pub fn health_score(scan: &ScanReport) -> u32 {
    if scan.files_scanned == 0 {
        return 100;
    }
    let weighted: usize = scan
        .findings
        .iter()
        .map(|f| if f.finding_type.is_color() { 3 } else { 1 })
        .sum();
    let density = weighted as f64 / scan.files_scanned as f64;
    (100.0 - density * 10.0).round().clamp(0.0, 100.0) as u32
}

/// Per-file counts for files under a `components` directory, worst first
pub fn component_violations(findings: &[Finding]) -> Vec<ComponentViolations> {
    let mut by_file: BTreeMap<&str, BTreeMap<FindingType, usize>> = BTreeMap::new();
    for finding in findings {
        if finding.file.split('/').rev().skip(1).any(|d| d == "components") {
            *by_file
                .entry(finding.file.as_str())
                .or_default()
                .entry(finding.finding_type)
                .or_insert(0) += 1;
        }
    }

    let mut components: Vec<ComponentViolations> = by_file
        .into_iter()
        .map(|(file, by_type)| {
            let base = file.rsplit('/').next().unwrap_or(file);
            ComponentViolations {
                name: base.split('.').next().unwrap_or(base).to_string(),
                file: file.to_string(),
                violations: by_type.values().sum(),
                by_type,
            }
        })
        .collect();
    components.sort_by(|a, b| b.violations.cmp(&a.violations).then_with(|| a.file.cmp(&b.file)));
    components
}

/// Directory hierarchy of findings; the root node is the scan root
pub fn directory_tree(findings: &[Finding]) -> DirectoryNode {
    let mut root = DirectoryNode::default();
    for finding in findings {
        root.violations += 1;
        let dirs: Vec<&str> = finding.file.split('/').collect();
        let mut node = &mut root;
        for dir in &dirs[..dirs.len().saturating_sub(1)] {
            let idx = match node.children.iter().position(|c| c.name == *dir) {
                Some(idx) => idx,
                None => {
                    let path = if node.path.is_empty() {
                        dir.to_string()
                    } else {
                        format!("{}/{}", node.path, dir)
                    };
                    node.children.push(DirectoryNode {
                        name: dir.to_string(),
                        path,
                        ..DirectoryNode::default()
                    });
                    node.children.len() - 1
                }
            };
            node = &mut node.children[idx];
            node.violations += 1;
        }
    }
    sort_tree(&mut root);
    root
}

fn sort_tree(node: &mut DirectoryNode) {
    node.children.sort_by(|a, b| a.name.cmp(&b.name));
    node.children.iter_mut().for_each(sort_tree);
}
