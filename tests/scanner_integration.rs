//! Hardcoded-value scan over a small project tree
//!
//! Run with: cargo test --test scanner_integration

use std::path::Path;

use pretty_assertions::assert_eq;
use token_sync::scanner::{self, ScanReport, SCAN_REPORT_FILE};
use token_sync::{FindingType, TokenSyncConfig};

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "src/components/Card.tsx",
        r#"import logo from './logo#abc.svg';
export function Card() {
  return (
    <div className="p-[13px] text-gray-900" style={{ color: '#7B00FF' }}>
      <img src="https://cdn.example.com/a#fff000.png" />
      <span style={{ border: '1px solid #000000', margin: '0px' }} />
    </div>
  );
}
"#,
    );
    write(
        root,
        "src/styles/app.css",
        r#"/* #123456 in a comment is ignored */
.hero {
  background: url("/img/bg#ff00ff.png");
  color: rgb(255, 255, 255);
  padding: 24px;
  font-family: 'Comic Sans MS', cursive;
  box-shadow: none;
}
"#,
    );
    write(root, "node_modules/lib/index.js", "const c = '#abcdef';\n");
    write(root, "src/components/Card.test.tsx", "const c = '#abcdef';\n");
    // generated token artifacts are allowed to hold literals
    write(root, "src/styles/tokens.css", ":root { --ds-colors-a: #ABCDEF; }\n");
    dir
}

#[test]
fn test_scan_applies_exceptions_and_exclusions() {
    let dir = project();
    let report = scanner::scan(dir.path(), &TokenSyncConfig::default());

    assert_eq!(report.files_scanned, 2);
    let values: Vec<(FindingType, &str, &str)> = report
        .findings
        .iter()
        .map(|f| (f.finding_type, f.file.as_str(), f.value.as_str()))
        .collect();

    assert!(values.contains(&(FindingType::HexColor, "src/components/Card.tsx", "#7B00FF")));
    assert!(values.contains(&(FindingType::PixelValue, "src/styles/app.css", "24px")));
    assert!(values
        .iter()
        .any(|(t, f, _)| *t == FindingType::ArbitraryTailwind && *f == "src/components/Card.tsx"));
    assert!(values
        .iter()
        .any(|(t, f, _)| *t == FindingType::FontFamily && *f == "src/styles/app.css"));

    assert!(!values.iter().any(|(_, _, v)| v.eq_ignore_ascii_case("#000000")));
    assert!(!values.iter().any(|(t, _, v)| *t == FindingType::PixelValue && (*v == "0px" || *v == "1px")));
    // url(), links and import lines
    for suppressed in ["#abc", "#fff000", "#ff00ff", "#123456", "#abcdef"] {
        assert!(
            !values.iter().any(|(_, _, v)| v.eq_ignore_ascii_case(suppressed)),
            "{} should be suppressed",
            suppressed
        );
    }
    // white is an exception in rgb() form too
    assert!(!values.iter().any(|(t, _, _)| *t == FindingType::RgbColor));
    assert!(!values.iter().any(|(t, _, _)| *t == FindingType::BoxShadow));
    assert!(!values.iter().any(|(t, _, _)| *t == FindingType::MagicNumber));
}

#[test]
fn test_report_round_trips_through_json() {
    let dir = project();
    let config = TokenSyncConfig::default();
    let report = scanner::scan(dir.path(), &config);

    let path = config.reports_path(dir.path()).join(SCAN_REPORT_FILE);
    report.write_json(&path).unwrap();
    let back = ScanReport::read_json(&path).unwrap();
    assert_eq!(back.total_findings, report.total_findings);
    assert_eq!(back.by_type, report.by_type);

    // the reports directory itself is never scanned
    let again = scanner::scan(dir.path(), &config);
    assert_eq!(again.files_scanned, report.files_scanned);
}
