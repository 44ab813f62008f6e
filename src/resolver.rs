//! Reference resolution
//!
//! Resolves `{dotted.path}` / `var(--x)` aliases down to literal values.
//! Resolution is a pure function of the literal and reference maps: a cycle or
//! dangling target fails only the tokens that reach it, every other token
//! still resolves.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::source::SourceDocument;

/// Why a single token could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ResolveErrorKind {
    /// The chain revisits a path; `chain` starts and ends at the repeated path
    Cycle { chain: Vec<String> },
    /// The chain reaches a path that does not exist
    Dangling { target: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveError {
    pub path: String,
    #[serde(flatten)]
    pub kind: ResolveErrorKind,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ResolveErrorKind::Cycle { chain } => {
                write!(f, "{}: circular reference {}", self.path, chain.join(" -> "))
            }
            ResolveErrorKind::Dangling { target } => {
                write!(f, "{}: reference to missing token '{}'", self.path, target)
            }
        }
    }
}

/// Fully resolved literal map plus per-token failures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Every resolvable path (literals included) → literal value
    pub resolved: BTreeMap<String, String>,
    pub errors: Vec<ResolveError>,
}

impl Resolution {
    pub fn get(&self, path: &str) -> Option<&str> {
        self.resolved.get(path).map(String::as_str)
    }

    pub fn error_for(&self, path: &str) -> Option<&ResolveError> {
        self.errors.iter().find(|e| e.path == path)
    }
}

/// Resolve every reference entry against the literal entries
pub fn resolve(
    literals: &BTreeMap<String, String>,
    references: &BTreeMap<String, String>,
) -> Resolution {
    let mut resolution = Resolution {
        resolved: literals.clone(),
        errors: Vec::new(),
    };

    for (path, target) in references {
        match follow(path, target, literals, references) {
            Ok(value) => {
                resolution.resolved.insert(path.clone(), value);
            }
            Err(kind) => {
                let error = ResolveError {
                    path: path.clone(),
                    kind,
                };
                warn!("Unresolved token {}", error);
                resolution.errors.push(error);
            }
        }
    }

    resolution
}

/// Resolve the source of truth's own literal and reference entries
pub fn resolve_document(doc: &SourceDocument) -> Resolution {
    resolve(&doc.literal_map(), &doc.reference_map())
}

fn follow(
    start: &str,
    first_target: &str,
    literals: &BTreeMap<String, String>,
    references: &BTreeMap<String, String>,
) -> Result<String, ResolveErrorKind> {
    let mut chain = vec![start.to_string()];
    let mut current = first_target;

    loop {
        if let Some(value) = literals.get(current) {
            return Ok(value.clone());
        }
        let Some(next) = references.get(current) else {
            return Err(ResolveErrorKind::Dangling {
                target: current.to_string(),
            });
        };
        if let Some(pos) = chain.iter().position(|p| p == current) {
            let mut cycle = chain[pos..].to_vec();
            cycle.push(current.to_string());
            return Err(ResolveErrorKind::Cycle { chain: cycle });
        }
        chain.push(current.to_string());
        current = next;
    }
}
