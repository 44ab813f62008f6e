//! Line-level detection rules for hardcoded values
//!
//! Each rule is applied independently to the code portion of a line. A match
//! is recorded only when it survives its category's exception filter and does
//! not sit inside a URL, a `data:` URI or an import line.

use std::sync::LazyLock;

use regex::{Match, Regex};
use token_types::{Finding, FindingType};

use crate::normalize;

static HEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6}|[0-9a-fA-F]{4}|[0-9a-fA-F]{3})\b").unwrap()
});

static RGB_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\brgba?\([^)]*\)").unwrap());

static HSL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bhsla?\([^)]*\)").unwrap());

static DIMENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w.\-#])(-?\d*\.?\d+(?:px|rem|em))\b").unwrap());

static ARBITRARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z][a-z0-9]*(?:-[a-z0-9]+)*-\[([^\]\s]+)\]").unwrap());

static INLINE_STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"style=\{\{[^}]*\}\}").unwrap());

static FONT_FAMILY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfont-family\s*:\s*([^;{}]+)").unwrap());

static BOX_SHADOW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bbox-shadow\s*:\s*([^;{}]+)").unwrap());

static URL_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\([^)]*\)|https?://[^\s'"`)]+|data:[^\s'"`)]+"#).unwrap()
});

static IMPORT_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:import\b|@import\b|export\s.*\bfrom\s+['"])|\brequire\s*\("#).unwrap()
});

const COLOR_EXCEPTIONS: &[&str] = &[
    "#000",
    "#000000",
    "#fff",
    "#ffffff",
    "transparent",
    "inherit",
    "currentcolor",
];

const DIMENSION_EXCEPTIONS: &[&str] = &["0px", "0rem", "0em", "1px", "100%"];

const SYSTEM_FONTS: &[&str] = &[
    "inherit",
    "initial",
    "unset",
    "system-ui",
    "-apple-system",
    "blinkmacsystemfont",
    "segoe ui",
    "roboto",
    "helvetica neue",
    "helvetica",
    "arial",
    "ui-sans-serif",
    "ui-serif",
    "ui-monospace",
    "sans-serif",
    "serif",
    "monospace",
    "cursive",
    "fantasy",
    "apple color emoji",
    "segoe ui emoji",
    "segoe ui symbol",
    "noto color emoji",
];

const SHADOW_EXCEPTIONS: &[&str] = &["none", "inherit", "initial", "unset"];

/// Block-comment state carried from one line to the next
#[derive(Debug, Default, Clone, Copy)]
pub struct CommentState {
    in_block: bool,
}

impl CommentState {
    /// Code portion of `line` with comments blanked to spaces (columns are kept)
    pub fn code_portion(&mut self, line: &str) -> String {
        let trimmed = line.trim_start();
        if !self.in_block
            && (trimmed.starts_with("//") || (trimmed.starts_with('*') && !trimmed.contains('{')))
        {
            return String::new();
        }

        let mut out = String::with_capacity(line.len());
        let mut rest = line;
        loop {
            if self.in_block {
                match rest.find("*/") {
                    Some(end) => {
                        out.extend(std::iter::repeat(' ').take(end + 2));
                        rest = &rest[end + 2..];
                        self.in_block = false;
                    }
                    None => {
                        out.extend(std::iter::repeat(' ').take(rest.len()));
                        break;
                    }
                }
            } else {
                match rest.find("/*") {
                    Some(start) => {
                        out.push_str(&rest[..start]);
                        out.push_str("  ");
                        rest = &rest[start + 2..];
                        self.in_block = true;
                    }
                    None => {
                        out.push_str(rest);
                        break;
                    }
                }
            }
        }
        out
    }
}

/// Collects findings for one file
pub struct LineScanner<'a> {
    file: &'a str,
    stylesheet: bool,
    pub findings: Vec<Finding>,
}

impl<'a> LineScanner<'a> {
    pub fn new(file: &'a str, stylesheet: bool) -> Self {
        Self {
            file,
            stylesheet,
            findings: Vec::new(),
        }
    }

    /// Apply every rule to one line; `code` is the comment-free portion
    pub fn scan_line(&mut self, line_no: usize, original: &str, code: &str) {
        if code.trim().is_empty() || IMPORT_LINE_RE.is_match(code) {
            return;
        }
        let suppressed: Vec<(usize, usize)> = URL_SPAN_RE
            .find_iter(code)
            .map(|m| (m.start(), m.end()))
            .collect();
        let is_suppressed = |start: usize| suppressed.iter().any(|(s, e)| start >= *s && start < *e);

        let mut hits: Vec<(FindingType, Match<'_>)> = Vec::new();

        for m in HEX_RE.find_iter(code) {
            let after_amp = code[..m.start()].ends_with('&');
            if !after_amp && !is_color_exception(m.as_str()) {
                hits.push((FindingType::HexColor, m));
            }
        }
        for m in RGB_RE.find_iter(code) {
            if !uses_var(m.as_str()) && !is_color_exception(m.as_str()) {
                hits.push((FindingType::RgbColor, m));
            }
        }
        for m in HSL_RE.find_iter(code) {
            if !uses_var(m.as_str()) {
                hits.push((FindingType::HslColor, m));
            }
        }
        for caps in DIMENSION_RE.captures_iter(code) {
            if let Some(m) = caps.get(1) {
                if !is_dimension_exception(m.as_str()) {
                    hits.push((FindingType::PixelValue, m));
                }
            }
        }
        for caps in ARBITRARY_RE.captures_iter(code) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !uses_var(inner.as_str()) && !is_dimension_exception(inner.as_str()) {
                hits.push((FindingType::ArbitraryTailwind, whole));
            }
        }

        if self.stylesheet {
            for caps in FONT_FAMILY_RE.captures_iter(code) {
                if let Some(m) = caps.get(1) {
                    if !uses_var(m.as_str()) && !is_system_font_stack(m.as_str()) {
                        hits.push((FindingType::FontFamily, m));
                    }
                }
            }
            for caps in BOX_SHADOW_RE.captures_iter(code) {
                if let Some(m) = caps.get(1) {
                    if !uses_var(m.as_str()) && !is_shadow_exception(m.as_str()) {
                        hits.push((FindingType::BoxShadow, m));
                    }
                }
            }
        } else {
            for m in INLINE_STYLE_RE.find_iter(code) {
                if !uses_var(m.as_str()) {
                    hits.push((FindingType::InlineStyle, m));
                }
            }
        }

        for (finding_type, m) in hits {
            if is_suppressed(m.start()) {
                continue;
            }
            self.findings.push(Finding {
                finding_type,
                value: m.as_str().trim().to_string(),
                file: self.file.to_string(),
                line: line_no,
                column: code[..m.start()].chars().count() + 1,
                context: original.trim().to_string(),
            });
        }
    }
}

fn uses_var(value: &str) -> bool {
    value.contains("var(--")
}

fn is_color_exception(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    if COLOR_EXCEPTIONS.contains(&lower.as_str()) {
        return true;
    }
    // rgb(0, 0, 0) and friends are pure black/white too
    matches!(
        normalize::rgb_to_hex(&lower).as_deref(),
        Some("#000000") | Some("#FFFFFF")
    )
}

/// Zero in any unit, `1px` hairlines and full-bleed percentages
fn is_dimension_exception(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    if DIMENSION_EXCEPTIONS.contains(&lower.as_str()) {
        return true;
    }
    let number = lower.trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%');
    number.parse::<f64>().map(|n| n == 0.0).unwrap_or(false)
}

fn is_system_font_stack(value: &str) -> bool {
    value
        .split(',')
        .map(|family| {
            family
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .trim_end_matches("!important")
                .trim()
                .to_ascii_lowercase()
        })
        .filter(|family| !family.is_empty())
        .all(|family| SYSTEM_FONTS.contains(&family.as_str()))
}

fn is_shadow_exception(value: &str) -> bool {
    let lower = value
        .trim()
        .trim_end_matches("!important")
        .trim()
        .to_ascii_lowercase();
    SHADOW_EXCEPTIONS.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(lines: &str, stylesheet: bool) -> Vec<Finding> {
        let mut scanner = LineScanner::new("src/App.tsx", stylesheet);
        let mut state = CommentState::default();
        for (i, line) in lines.lines().enumerate() {
            let code = state.code_portion(line);
            scanner.scan_line(i + 1, line, &code);
        }
        scanner.findings
    }

    fn values(findings: &[Finding], ty: FindingType) -> Vec<String> {
        findings
            .iter()
            .filter(|f| f.finding_type == ty)
            .map(|f| f.value.clone())
            .collect()
    }

    #[test]
    fn test_color_exceptions() {
        let findings = scan(
            "const a = '#000000';\nconst b = '#FFF';\nconst c = '#7B00FF';\nconst d = 'rgb(0, 0, 0)';\nconst e = 'rgba(123, 0, 255, 0.5)';",
            false,
        );
        assert_eq!(values(&findings, FindingType::HexColor), vec!["#7B00FF"]);
        assert_eq!(
            values(&findings, FindingType::RgbColor),
            vec!["rgba(123, 0, 255, 0.5)"]
        );
    }

    #[test]
    fn test_dimension_exceptions() {
        let findings = scan(
            "margin: 0px;\nborder-width: 1px;\npadding: 13px;\nwidth: 100%;\ngap: 0.75rem;",
            true,
        );
        assert_eq!(
            values(&findings, FindingType::PixelValue),
            vec!["13px", "0.75rem"]
        );
    }

    #[test]
    fn test_urls_and_imports_are_suppressed() {
        let findings = scan(
            "import logo from './logo#fff000.svg';\nbackground: url(\"/img/#ab12cd.png\");\nconst link = 'https://example.com/#c0ffee';\nconst img = 'data:image/svg+xml;fill=#123456';\n@import 'theme#654321.css';",
            false,
        );
        assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
    }

    #[test]
    fn test_columns_are_one_based() {
        let findings = scan("  color: #7B00FF;", true);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].column, 10);
        assert_eq!(findings[0].context, "color: #7B00FF;");
    }

    #[test]
    fn test_comments_are_skipped() {
        let src = "// color: #123456\n/* start\n#abcdef\nend */ const x = '#7B00FF';\n{/* <div style={{ color: '#222222' }} /> */}\n * #333333";
        let findings = scan(src, false);
        assert_eq!(values(&findings, FindingType::HexColor), vec!["#7B00FF"]);
        assert_eq!(findings[0].line, 4);
    }

    #[test]
    fn test_html_entities_are_not_colors() {
        assert!(scan("<span>&#123;</span>", false).is_empty());
    }

    #[test]
    fn test_arbitrary_tailwind_and_inline_style() {
        let findings = scan(
            "<div className=\"w-[13px] h-[100%] bg-[var(--ds-colors-primary)]\" style={{ marginTop: 4 }} />",
            false,
        );
        assert_eq!(
            values(&findings, FindingType::ArbitraryTailwind),
            vec!["w-[13px]"]
        );
        assert_eq!(
            values(&findings, FindingType::InlineStyle),
            vec!["style={{ marginTop: 4 }}"]
        );
    }

    #[test]
    fn test_stylesheet_only_rules() {
        let css = "body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; }\n.card { font-family: 'Inter', sans-serif; box-shadow: none; }\n.modal { box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); }";
        let findings = scan(css, true);
        assert_eq!(
            values(&findings, FindingType::FontFamily),
            vec!["'Inter', sans-serif"]
        );
        assert_eq!(
            values(&findings, FindingType::BoxShadow),
            vec!["0 4px 6px rgba(0, 0, 0, 0.1)"]
        );

        let tsx = "const s = 'font-family: Inter';";
        assert!(values(&scan(tsx, false), FindingType::FontFamily).is_empty());
    }

    #[test]
    fn test_magic_number_is_never_emitted() {
        let findings = scan("const timeout = 4711;\nconst ratio = 1.618;", false);
        assert!(findings
            .iter()
            .all(|f| f.finding_type != FindingType::MagicNumber));
    }
}
