//! Generated TypeScript token module
//!
//! ```ts
//! export const tokens = {
//!   colors: { brand: { purple: '#7B00FF' } },
//! } as const;
//! export const spacing = { md: '16px' };
//! ```
//!
//! Exports named after a token group (`colors`, `spacing`, …) contribute that
//! name as the first path segment; any other export (`tokens`, `default`) is
//! unwrapped.

use std::path::Path;

use token_types::{ArtifactFormat, Category};
use tracing::{info, warn};

use super::object_literal::{flatten, parse_assignments, FlatEntry, ObjectAssignment};
use super::{read_artifact, FormatMap};
use crate::error::ParseError;
use crate::source::path_segment;

/// Load the generated TypeScript module; missing → empty, not-present map
pub fn load(path: &Path) -> FormatMap {
    match read_artifact(path) {
        Some(text) => {
            let map = parse(&text, path);
            info!("Loaded {} TypeScript entries from {:?}", map.len(), path);
            map
        }
        None => FormatMap::missing(ArtifactFormat::TypeScript, path),
    }
}

pub fn parse(text: &str, file: &Path) -> FormatMap {
    let mut map = FormatMap::new(ArtifactFormat::TypeScript, file);
    let (assignments, errors) = parse_assignments(text);
    record_errors(&mut map, file, errors);

    for assignment in &assignments {
        let root = export_root(assignment);
        for entry in flatten(&assignment.members) {
            if let Some(path) = entry_path(&root, &entry) {
                map.insert(path, &entry.raw, entry.line);
            }
        }
    }
    map
}

/// Path segments contributed by the export name itself
pub(crate) fn export_root(assignment: &ObjectAssignment) -> Vec<String> {
    match &assignment.name {
        Some(name) => {
            let segment = path_segment(name);
            if Category::from_group_key(&segment) != Category::Custom {
                vec![segment]
            } else {
                Vec::new()
            }
        }
        None => Vec::new(),
    }
}

/// Dotted path of a flattened entry; `DEFAULT` keys collapse into the parent
pub(crate) fn entry_path(root: &[String], entry: &FlatEntry) -> Option<String> {
    let segments: Vec<String> = root
        .iter()
        .cloned()
        .chain(
            entry
                .keys
                .iter()
                .filter(|k| k.as_str() != "DEFAULT")
                .map(|k| path_segment(k)),
        )
        .collect();
    (!segments.is_empty()).then(|| segments.join("."))
}

pub(crate) fn record_errors(
    map: &mut FormatMap,
    file: &Path,
    errors: Vec<super::object_literal::SyntaxError>,
) {
    for error in errors {
        warn!(
            "{:?}: syntax error at line {}: {}",
            file, error.line, error.message
        );
        map.errors.push(ParseError::Syntax {
            file: file.display().to_string(),
            line: error.line,
            message: error.message,
        });
    }
}
