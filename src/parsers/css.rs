//! Generated CSS custom properties
//!
//! ```css
//! :root {
//!   --ds-colors-brand-purple: #7B00FF;
//! }
//! ```
//!
//! The dotted path is derived by stripping the configured prefix and
//! replacing dashes with dots; lookups join on the flat key, so the
//! derivation's ambiguity with kebab-case segments does not matter.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use token_types::ArtifactFormat;
use tracing::{debug, info};

use super::{read_artifact, FormatMap};

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

static DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--([A-Za-z0-9_\-]+)\s*:\s*([^;{}]+?)\s*(?:;|\})").unwrap());

/// Load the generated stylesheet; missing → empty, not-present map
pub fn load(path: &Path, prefix: &str) -> FormatMap {
    match read_artifact(path) {
        Some(text) => {
            let map = parse(&text, path, prefix);
            info!("Loaded {} CSS custom properties from {:?}", map.len(), path);
            map
        }
        None => FormatMap::missing(ArtifactFormat::Css, path),
    }
}

pub fn parse(text: &str, file: &Path, prefix: &str) -> FormatMap {
    let mut map = FormatMap::new(ArtifactFormat::Css, file);
    let text = blank_comments(text);
    let var_prefix = if prefix.is_empty() {
        String::new()
    } else {
        format!("{}-", prefix)
    };

    for caps in DECL_RE.captures_iter(&text) {
        let (Some(whole), Some(name), Some(value)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let Some(body) = name.as_str().strip_prefix(var_prefix.as_str()) else {
            debug!("{:?}: ignoring unprefixed property --{}", file, name.as_str());
            continue;
        };
        let line = text[..whole.start()].matches('\n').count() + 1;
        map.insert(body.replace('-', "."), value.as_str(), line);
    }
    map
}

/// Replace comments with blank lines so line numbers stay accurate
fn blank_comments(text: &str) -> String {
    COMMENT_RE
        .replace_all(text, |caps: &regex::Captures| "\n".repeat(caps[0].matches('\n').count()))
        .into_owned()
}
