//! Token Types - Foundation data structures for the design-token toolchain
//!
//! This crate holds the pure data model shared by every token-sync component:
//! - Token categories and value kinds
//! - Token definitions and registry metadata
//! - Per-token sync status
//! - Hardcoded-value findings
//!
//! ## Rules
//!
//! 1. **NO BUSINESS LOGIC** - parsing, resolution and scanning live in `token-sync`
//! 2. **SERIALIZABLE** - every type round-trips through serde
//! 3. **NO WORKSPACE DEPENDENCIES**

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Errors raised when converting strings into foundation enums
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("Unknown token category '{0}'")]
    UnknownCategory(String),

    #[error("Unknown finding type '{0}'")]
    UnknownFindingType(String),
}

// ============================================================================
// TOKEN CATEGORY
// ============================================================================

/// Category a design token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Color,
    Spacing,
    Typography,
    Shadow,
    Border,
    Timing,
    Animation,
    Custom,
}

impl Category {
    /// All categories in registry order
    pub const ALL: [Category; 8] = [
        Category::Color,
        Category::Spacing,
        Category::Typography,
        Category::Shadow,
        Category::Border,
        Category::Timing,
        Category::Animation,
        Category::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Color => "color",
            Category::Spacing => "spacing",
            Category::Typography => "typography",
            Category::Shadow => "shadow",
            Category::Border => "border",
            Category::Timing => "timing",
            Category::Animation => "animation",
            Category::Custom => "custom",
        }
    }

    /// Top-level group key used in the token source document
    pub fn group_key(&self) -> &'static str {
        match self {
            Category::Color => "colors",
            Category::Spacing => "spacing",
            Category::Typography => "typography",
            Category::Shadow => "shadows",
            Category::Border => "border-radius",
            Category::Timing => "timing",
            Category::Animation => "animation",
            Category::Custom => "custom",
        }
    }

    /// Map a top-level group key (already kebab-cased) to its category
    pub fn from_group_key(key: &str) -> Category {
        match key {
            "colors" | "color" => Category::Color,
            "spacing" | "space" | "sizes" | "size" => Category::Spacing,
            "typography" | "font-size" | "font-sizes" | "font-weight" | "font-weights"
            | "font-family" | "font-families" | "fonts" | "line-height" | "line-heights"
            | "letter-spacing" => Category::Typography,
            "shadows" | "shadow" | "box-shadow" => Category::Shadow,
            "border-radius" | "radius" | "radii" | "border" | "borders" | "border-width" => {
                Category::Border
            }
            "timing" | "duration" | "durations" | "transition-duration" | "easing" => {
                Category::Timing
            }
            "animation" | "animations" | "keyframes" => Category::Animation,
            _ => Category::Custom,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or(TypesError::UnknownCategory(s.to_string()))
    }
}

// ============================================================================
// TOKEN DEFINITION
// ============================================================================

/// Whether a token holds a concrete value or points at another token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Literal,
    Reference,
}

/// A single design token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDefinition {
    /// Short identifier, unique within its category
    pub name: String,
    /// Fully-qualified dotted path, the cross-format join key
    pub path: String,
    pub category: Category,
    pub value_kind: ValueKind,
    /// Literal value or reference expression as written
    pub raw_value: String,
    /// Literal value after reference resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_value: Option<String>,
    pub css_variable_name: String,
    #[serde(default)]
    pub deprecated: bool,
    /// Alias tokens (reference-valued) are semantic
    #[serde(default)]
    pub semantic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Paths this token's raw value refers to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

impl TokenDefinition {
    /// Create a literal token; callers derive the CSS variable name
    pub fn literal(
        name: impl Into<String>,
        path: impl Into<String>,
        category: Category,
        value: impl Into<String>,
        css_variable_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            category,
            value_kind: ValueKind::Literal,
            raw_value: value.into(),
            resolved_value: None,
            css_variable_name: css_variable_name.into(),
            deprecated: false,
            semantic: false,
            comment: None,
            references: Vec::new(),
        }
    }

    pub fn is_reference(&self) -> bool {
        self.value_kind == ValueKind::Reference
    }

    /// Resolved value if known, otherwise the raw value
    pub fn effective_value(&self) -> &str {
        self.resolved_value.as_deref().unwrap_or(&self.raw_value)
    }
}

/// Registry-wide counters, re-derived after every mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryMetadata {
    pub version: String,
    pub total_tokens: usize,
    pub deprecated: usize,
    pub semantic: usize,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

impl Default for RegistryMetadata {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            total_tokens: 0,
            deprecated: 0,
            semantic: 0,
            last_updated: chrono::Utc::now(),
        }
    }
}

// ============================================================================
// ARTIFACT FORMATS
// ============================================================================

/// The four representations of the token set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Source,
    TypeScript,
    Css,
    Tailwind,
}

impl ArtifactFormat {
    pub const ALL: [ArtifactFormat; 4] = [
        ArtifactFormat::Source,
        ArtifactFormat::TypeScript,
        ArtifactFormat::Css,
        ArtifactFormat::Tailwind,
    ];

    /// Generated formats compared against the source of truth
    pub const GENERATED: [ArtifactFormat; 3] = [
        ArtifactFormat::TypeScript,
        ArtifactFormat::Css,
        ArtifactFormat::Tailwind,
    ];

    /// Label used in mismatch messages and console output
    pub fn display_name(&self) -> &'static str {
        match self {
            ArtifactFormat::Source => "YAML",
            ArtifactFormat::TypeScript => "TypeScript",
            ArtifactFormat::Css => "CSS",
            ArtifactFormat::Tailwind => "Tailwind",
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// SYNC STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    Synced,
    OutOfSync,
    NotPresent,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::Synced => write!(f, "synced"),
            SyncState::OutOfSync => write!(f, "out of sync"),
            SyncState::NotPresent => write!(f, "not present"),
        }
    }
}

/// Cross-format comparison result for one token path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub path: String,
    /// Resolved source-of-truth value
    pub value: String,
    #[serde(rename = "inTS")]
    pub in_ts: bool,
    #[serde(rename = "inCSS")]
    pub in_css: bool,
    pub in_tailwind: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tailwind_value: Option<String>,
    pub status: SyncState,
    pub mismatches: Vec<String>,
}

// ============================================================================
// FINDINGS
// ============================================================================

/// Kind of hardcoded value found by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingType {
    HexColor,
    RgbColor,
    HslColor,
    PixelValue,
    ArbitraryTailwind,
    InlineStyle,
    FontFamily,
    BoxShadow,
    /// Reserved; no scan pattern emits it
    MagicNumber,
}

impl FindingType {
    pub const ALL: [FindingType; 9] = [
        FindingType::HexColor,
        FindingType::RgbColor,
        FindingType::HslColor,
        FindingType::PixelValue,
        FindingType::ArbitraryTailwind,
        FindingType::InlineStyle,
        FindingType::FontFamily,
        FindingType::BoxShadow,
        FindingType::MagicNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FindingType::HexColor => "hex-color",
            FindingType::RgbColor => "rgb-color",
            FindingType::HslColor => "hsl-color",
            FindingType::PixelValue => "pixel-value",
            FindingType::ArbitraryTailwind => "arbitrary-tailwind",
            FindingType::InlineStyle => "inline-style",
            FindingType::FontFamily => "font-family",
            FindingType::BoxShadow => "box-shadow",
            FindingType::MagicNumber => "magic-number",
        }
    }

    /// Heading used in rendered reports
    pub fn title(&self) -> &'static str {
        match self {
            FindingType::HexColor => "Hex Colors",
            FindingType::RgbColor => "RGB Colors",
            FindingType::HslColor => "HSL Colors",
            FindingType::PixelValue => "Pixel Values",
            FindingType::ArbitraryTailwind => "Arbitrary Tailwind Values",
            FindingType::InlineStyle => "Inline Styles",
            FindingType::FontFamily => "Font Families",
            FindingType::BoxShadow => "Box Shadows",
            FindingType::MagicNumber => "Magic Numbers",
        }
    }

    pub fn is_color(&self) -> bool {
        matches!(
            self,
            FindingType::HexColor | FindingType::RgbColor | FindingType::HslColor
        )
    }
}

impl fmt::Display for FindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FindingType {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FindingType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or(TypesError::UnknownFindingType(s.to_string()))
    }
}

/// A value that bypasses the token system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub finding_type: FindingType,
    pub value: String,
    /// Path relative to the scan root, forward slashes
    pub file: String,
    /// 1-based line number
    pub line: usize,
    /// 1-based column of the match start
    pub column: usize,
    /// Full source line, trimmed
    pub context: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{} [{}] {}",
            self.file, self.line, self.column, self.finding_type, self.value
        )
    }
}
