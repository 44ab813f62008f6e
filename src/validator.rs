//! Cross-format sync validation
//!
//! For every resolvable source-of-truth token, look the same path up in the
//! TypeScript, CSS and Tailwind maps and classify it:
//!
//! | Status | Rule |
//! |--------|------|
//! | `synced` | present and equal in all three formats |
//! | `outOfSync` | present with a differing value in at least one format |
//! | `notPresent` | missing somewhere, no mismatch anywhere |
//!
//! A mismatch always wins over an absence. Validation never mutates the maps.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use token_types::{ArtifactFormat, SyncState, SyncStatus};
use tracing::info;

use crate::normalize::{normalize, NormalizedValue};
use crate::parsers::{FormatEntry, TokenSources};
use crate::resolver::{resolve_document, Resolution, ResolveError};
use crate::source::{brace_reference, normalize_path, sole_var_usage, CssVarIndex};

/// File name of the JSON report inside the reports directory
pub const SYNC_REPORT_FILE: &str = "color-sync-report.json";

static IDENT_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][\w$]*(\.[\w$\-]+)+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub total: usize,
    pub synced: usize,
    pub out_of_sync: usize,
    pub not_present: usize,
    /// `round(synced / total * 100)`; 100 for an empty token set
    pub sync_percentage: u32,
}

/// Per-format load details
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatSummary {
    pub format: ArtifactFormat,
    pub file: PathBuf,
    pub present: bool,
    pub entries: usize,
    /// Paths defined in this format but absent from the source of truth
    pub orphaned: Vec<String>,
    pub parse_errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncValidationReport {
    pub generated_at: DateTime<Utc>,
    pub source_file: PathBuf,
    pub source_present: bool,
    pub summary: SyncSummary,
    pub formats: Vec<FormatSummary>,
    /// Every token that is not `synced`, in source order
    pub problems: Vec<SyncStatus>,
    pub resolution_errors: Vec<ResolveError>,
    pub source_errors: Vec<String>,
}

impl SyncValidationReport {
    pub fn status_of(&self, path: &str) -> Option<&SyncStatus> {
        self.problems.iter().find(|s| s.path == path)
    }

    pub fn is_clean(&self) -> bool {
        self.summary.out_of_sync == 0 && self.summary.not_present == 0
    }

    /// Write the report as pretty JSON, creating parent directories
    pub fn write_json(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Wrote sync report to {:?}", path);
        Ok(())
    }
}

/// Validate every resolved source token against the generated formats
pub fn validate(sources: &TokenSources) -> SyncValidationReport {
    let resolution = resolve_document(&sources.source);
    let index = sources.source.css_index();

    let mut summary = SyncSummary {
        total: 0,
        synced: 0,
        out_of_sync: 0,
        not_present: 0,
        sync_percentage: 100,
    };
    let mut problems = Vec::new();

    for token in &sources.source.tokens {
        let Some(expected_raw) = resolution.get(&token.path) else {
            continue;
        };
        let status = compare_token(&token.path, expected_raw, sources, &resolution, &index);

        summary.total += 1;
        match status.status {
            SyncState::Synced => summary.synced += 1,
            SyncState::OutOfSync => summary.out_of_sync += 1,
            SyncState::NotPresent => summary.not_present += 1,
        }
        if status.status != SyncState::Synced {
            problems.push(status);
        }
    }

    if summary.total > 0 {
        summary.sync_percentage =
            ((summary.synced as f64 / summary.total as f64) * 100.0).round() as u32;
    }

    let formats = ArtifactFormat::GENERATED
        .iter()
        .filter_map(|f| sources.generated(*f))
        .map(|map| FormatSummary {
            format: map.format,
            file: map.file.clone(),
            present: map.present,
            entries: map.len(),
            orphaned: map
                .iter()
                .filter(|e| !sources.source.tokens.iter().any(|t| same_path(&t.path, &e.path)))
                .map(|e| e.path.clone())
                .collect(),
            parse_errors: map.errors.iter().map(|e| e.to_string()).collect(),
        })
        .collect();

    info!(
        "Sync validation: {}/{} synced ({}%)",
        summary.synced, summary.total, summary.sync_percentage
    );

    SyncValidationReport {
        generated_at: Utc::now(),
        source_file: sources.source.file.clone(),
        source_present: sources.source.present,
        summary,
        formats,
        problems,
        resolution_errors: resolution.errors.clone(),
        source_errors: sources.errors.iter().map(|e| e.to_string()).collect(),
    }
}

fn same_path(a: &str, b: &str) -> bool {
    crate::source::flat_key(a) == crate::source::flat_key(b)
}

fn compare_token(
    path: &str,
    expected_raw: &str,
    sources: &TokenSources,
    resolution: &Resolution,
    index: &CssVarIndex,
) -> SyncStatus {
    let expected = normalize(expected_raw);
    let mut status = SyncStatus {
        path: path.to_string(),
        value: expected.as_str().to_string(),
        in_ts: false,
        in_css: false,
        in_tailwind: false,
        ts_value: None,
        css_value: None,
        tailwind_value: None,
        status: SyncState::Synced,
        mismatches: Vec::new(),
    };

    let mut mismatch = false;
    let mut missing = false;

    for format in ArtifactFormat::GENERATED {
        let Some(entry) = sources.generated(format).and_then(|m| m.get(path)) else {
            missing = true;
            continue;
        };

        let observed = observed_value(entry, resolution, index);
        let observed_str = Some(observed.as_str().to_string());
        match format {
            ArtifactFormat::TypeScript => {
                status.in_ts = true;
                status.ts_value = observed_str;
            }
            ArtifactFormat::Css => {
                status.in_css = true;
                status.css_value = observed_str;
            }
            ArtifactFormat::Tailwind => {
                status.in_tailwind = true;
                status.tailwind_value = observed_str;
            }
            ArtifactFormat::Source => {}
        }

        if !expected.agrees_with(&observed) {
            mismatch = true;
            status.mismatches.push(format!(
                "{}: {} (expected {})",
                format.display_name(),
                observed.as_str(),
                expected.as_str()
            ));
        }
    }

    status.status = if mismatch {
        SyncState::OutOfSync
    } else if missing {
        SyncState::NotPresent
    } else {
        SyncState::Synced
    };
    status
}

/// Observed value of a generated entry, following `var(--…)` / path aliases
fn observed_value(
    entry: &FormatEntry,
    resolution: &Resolution,
    index: &CssVarIndex,
) -> NormalizedValue {
    let target = if let Some(var) = sole_var_usage(&entry.raw) {
        index.path_for(&var).map(str::to_string)
    } else if let Some(path) = brace_reference(&entry.raw) {
        Some(path)
    } else if IDENT_PATH_RE.is_match(&entry.raw) {
        Some(normalize_path(&entry.raw))
    } else {
        None
    };

    target
        .and_then(|path| resolution.get(&path).map(normalize))
        .unwrap_or_else(|| entry.value.clone())
}

/// Console summary printed by the validator CLI
pub fn render_summary(report: &SyncValidationReport) -> String {
    let mut out = String::new();
    let s = &report.summary;

    let _ = writeln!(out, "Design token sync report");
    let _ = writeln!(out, "========================");
    if !report.source_present {
        let _ = writeln!(out, "Source of truth not found: {}", report.source_file.display());
    }
    for format in &report.formats {
        let _ = writeln!(
            out,
            "  {:<10} {} ({} entries{})",
            format.format.display_name(),
            format.file.display(),
            format.entries,
            if format.present { "" } else { ", missing" }
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Total tokens:  {}", s.total);
    let _ = writeln!(out, "Synced:        {}", s.synced);
    let _ = writeln!(out, "Out of sync:   {}", s.out_of_sync);
    let _ = writeln!(out, "Not present:   {}", s.not_present);
    let _ = writeln!(out, "Sync:          {}%", s.sync_percentage);

    if !report.problems.is_empty() {
        let _ = writeln!(out);
        for problem in &report.problems {
            let _ = writeln!(out, "  [{}] {} = {}", problem.status, problem.path, problem.value);
            for mismatch in &problem.mismatches {
                let _ = writeln!(out, "      {}", mismatch);
            }
            let missing: Vec<&str> = [
                (problem.in_ts, "TypeScript"),
                (problem.in_css, "CSS"),
                (problem.in_tailwind, "Tailwind"),
            ]
            .iter()
            .filter(|(present, _)| !present)
            .map(|(_, name)| *name)
            .collect();
            if !missing.is_empty() {
                let _ = writeln!(out, "      missing from: {}", missing.join(", "));
            }
        }
    }

    if !report.resolution_errors.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Unresolved references:");
        for error in &report.resolution_errors {
            let _ = writeln!(out, "  {}", error);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{css, tailwind, typescript, yaml_source};
    use crate::source::SourceDocument;

    fn sources(yaml: &str, ts: Option<&str>, css_text: Option<&str>, tw: Option<&str>) -> TokenSources {
        let source: SourceDocument = yaml_source::parse_source(yaml, "tokens.yaml", "ds").unwrap();
        TokenSources {
            source,
            typescript: ts
                .map(|t| typescript::parse(t, Path::new("tokens.ts")))
                .unwrap_or_else(|| crate::parsers::FormatMap::missing(ArtifactFormat::TypeScript, "tokens.ts")),
            css: css_text
                .map(|c| css::parse(c, Path::new("tokens.css"), "ds"))
                .unwrap_or_else(|| crate::parsers::FormatMap::missing(ArtifactFormat::Css, "tokens.css")),
            tailwind: tw
                .map(|t| tailwind::parse(t, Path::new("tailwind.tokens.js")))
                .unwrap_or_else(|| crate::parsers::FormatMap::missing(ArtifactFormat::Tailwind, "tailwind.tokens.js")),
            errors: Vec::new(),
        }
    }

    const YAML: &str = r##"
colors:
  brand:
    purple: { value: "#7B00FF" }
  primary: { value: "{colors.brand.purple}" }
"##;

    #[test]
    fn test_all_formats_agree() {
        let s = sources(
            YAML,
            Some("export const tokens = { colors: { brand: { purple: '#7b00ff' }, primary: colors.brand.purple } };"),
            Some(":root { --ds-colors-brand-purple: #7B00FF; --ds-colors-primary: var(--ds-colors-brand-purple); }"),
            Some("module.exports = { theme: { extend: { colors: { brand: { purple: 'rgb(123, 0, 255)' }, primary: '#7B00FF' } } } };"),
        );
        let report = validate(&s);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.synced, 2);
        assert_eq!(report.summary.sync_percentage, 100);
        assert!(report.problems.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_mismatch_beats_absence() {
        let s = sources(
            YAML,
            None,
            Some(":root { --ds-colors-brand-purple: #000000; }"),
            None,
        );
        let report = validate(&s);
        let purple = report.status_of("colors.brand.purple").unwrap();
        assert_eq!(purple.status, SyncState::OutOfSync);
        assert_eq!(
            purple.mismatches,
            vec!["CSS: #000000 (expected #7B00FF)".to_string()]
        );
        assert!(!purple.in_ts);

        let primary = report.status_of("colors.primary").unwrap();
        assert_eq!(primary.status, SyncState::NotPresent);
        assert_eq!(report.summary.sync_percentage, 0);
    }

    #[test]
    fn test_unresolved_tokens_are_reported_not_validated() {
        let yaml = "colors:\n  a: { value: \"{colors.b}\" }\n  b: { value: \"{colors.a}\" }\n  c: { value: \"#fff\" }\n";
        let report = validate(&sources(yaml, None, None, None));
        assert_eq!(report.summary.total, 1);
        assert_eq!(report.resolution_errors.len(), 2);
    }

    #[test]
    fn test_orphaned_entries_are_listed() {
        let s = sources(YAML, None, Some(":root { --ds-colors-stale: #123456; }"), None);
        let report = validate(&s);
        let css_summary = report
            .formats
            .iter()
            .find(|f| f.format == ArtifactFormat::Css)
            .unwrap();
        assert_eq!(css_summary.orphaned, vec!["colors.stale".to_string()]);
    }

    #[test]
    fn test_validation_is_repeatable() {
        let s = sources(YAML, None, Some(":root { --ds-colors-brand-purple: #7B00FF; }"), None);
        let first = validate(&s);
        let second = validate(&s);
        assert_eq!(first.summary, second.summary);
        assert_eq!(first.problems, second.problems);
        assert!(render_summary(&first).contains("Sync:          0%"));
    }
}
