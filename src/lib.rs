//! token-sync - Design Token Synchronization Toolchain
//!
//! Keeps one YAML source of truth and its three generated representations
//! (TypeScript module, CSS custom properties, Tailwind theme) in agreement,
//! and finds values in the source tree that bypass the token system.
//!
//! ## Pipeline
//! YAML source -> reference resolution -> per-format parse -> normalize -> compare
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use token_sync::{config::TokenSyncConfig, parsers::TokenSources, validator};
//!
//! let root = Path::new(".");
//! let config = TokenSyncConfig::load(root).unwrap();
//! let report = validator::validate(&TokenSources::load(root, &config));
//! println!("{}", validator::render_summary(&report));
//! ```

// Core error handling
pub mod error;

// Project configuration and shared diagnostics
pub mod config;
pub mod diagnostics;

// Value model: canonical forms, path/variable naming, reference parsing
pub mod normalize;
pub mod source;

// Format readers for the four artifacts
pub mod parsers;

// Reference resolution and cross-format validation
pub mod resolver;
pub mod validator;

// Hardcoded-value scanning
pub mod scanner;

// Registry CRUD, lint, migration planning and multi-format export
pub mod export;
pub mod registry;

// Report aggregation for the dashboard endpoint
pub mod dashboard;

pub use config::TokenSyncConfig;
pub use diagnostics::{Diagnostic, LintRule, RuleGroup, Severity};
pub use error::{ExportError, ParseError, RegistryError, Result, TokenSyncError};
pub use parsers::TokenSources;
pub use registry::TokenRegistry;
pub use token_types::{
    ArtifactFormat, Category, Finding, FindingType, SyncState, SyncStatus, TokenDefinition,
};
