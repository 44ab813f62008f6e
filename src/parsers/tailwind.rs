//! Generated Tailwind theme module
//!
//! Accepts both the nested `theme.extend` form and a flat theme object:
//!
//! ```js
//! module.exports = {
//!   theme: { extend: { colors: { brand: { purple: 'var(--ds-colors-brand-purple)' } } } },
//! };
//! ```
//!
//! When a `theme` key is present only its subtree is read; sibling config
//! such as `content` or `plugins` never becomes a token.

use std::path::Path;

use token_types::ArtifactFormat;
use tracing::{debug, info};

use super::object_literal::{flatten, parse_assignments};
use super::typescript::{entry_path, export_root, record_errors};
use super::{read_artifact, FormatMap};

/// Wrappers stripped from the front of every path, longest first
const THEME_WRAPPERS: &[&[&str]] = &[&["theme", "extend"], &["theme"]];

/// Top-level Tailwind config keys that are never theme scales
const CONFIG_KEYS: &[&str] = &[
    "content",
    "plugins",
    "presets",
    "darkMode",
    "prefix",
    "important",
    "separator",
    "safelist",
    "blocklist",
    "corePlugins",
    "future",
    "experimental",
];

/// Load the Tailwind theme module; missing → empty, not-present map
pub fn load(path: &Path) -> FormatMap {
    match read_artifact(path) {
        Some(text) => {
            let map = parse(&text, path);
            info!("Loaded {} Tailwind entries from {:?}", map.len(), path);
            map
        }
        None => FormatMap::missing(ArtifactFormat::Tailwind, path),
    }
}

pub fn parse(text: &str, file: &Path) -> FormatMap {
    let mut map = FormatMap::new(ArtifactFormat::Tailwind, file);
    let (assignments, errors) = parse_assignments(text);
    record_errors(&mut map, file, errors);

    for assignment in &assignments {
        let root = export_root(assignment);
        let entries = flatten(&assignment.members);
        let has_theme = entries
            .iter()
            .any(|e| e.keys.first().is_some_and(|k| k == "theme"));

        for mut entry in entries {
            let in_theme = strip_theme_wrapper(&mut entry.keys);
            let keep = if has_theme {
                in_theme
            } else {
                entry
                    .keys
                    .first()
                    .is_some_and(|k| !CONFIG_KEYS.contains(&k.as_str()))
            };
            if !keep {
                debug!("Skipping Tailwind config entry {}", entry.keys.join("."));
                continue;
            }
            if let Some(path) = entry_path(&root, &entry) {
                map.insert(path, &entry.raw, entry.line);
            }
        }
    }
    map
}

/// Strip a leading `theme`/`theme.extend`; true when one was present
fn strip_theme_wrapper(keys: &mut Vec<String>) -> bool {
    for wrapper in THEME_WRAPPERS {
        let matches = keys.len() > wrapper.len()
            && keys.iter().zip(wrapper.iter()).all(|(k, w)| k == w);
        if matches {
            keys.drain(..wrapper.len());
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_extend_is_stripped() {
        let src = r#"
/** @type {import('tailwindcss').Config} */
module.exports = {
  content: ['./src/**/*.{ts,tsx}'],
  theme: {
    extend: {
      colors: {
        brand: { purple: { DEFAULT: '#7B00FF', light: '#A64DFF' } },
      },
      borderRadius: { lg: '12px' },
    },
  },
  plugins: [],
};
"#;
        let map = parse(src, Path::new("tailwind.tokens.js"));
        assert_eq!(map.get("colors.brand.purple").unwrap().value.as_str(), "#7B00FF");
        assert!(map.contains("colors.brand.purple.light"));
        assert_eq!(map.get("border-radius.lg").unwrap().raw, "12px");
        assert!(!map.contains("content"));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_config_outside_theme_is_ignored() {
        let src = r#"
module.exports = {
  content: ['./src/**/*.tsx'],
  darkMode: 'class',
  prefix: 'tw-',
  theme: { extend: { spacing: { md: '16px' } } },
  plugins: [require('@tailwindcss/forms')],
};
"#;
        let map = parse(src, Path::new("tailwind.tokens.js"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("spacing.md").unwrap().raw, "16px");
        for key in ["content", "dark-mode", "prefix", "plugins"] {
            assert!(!map.contains(key), "{} leaked into the theme", key);
        }

        // flat theme objects drop config keys too
        let flat = "module.exports = { content: ['./a.tsx'], colors: { primary: '#7B00FF' } };";
        let map = parse(flat, Path::new("tailwind.tokens.js"));
        assert_eq!(map.len(), 1);
        assert!(map.contains("colors.primary"));
    }

    #[test]
    fn test_flat_theme_object() {
        let src = "module.exports = { colors: { primary: 'var(--ds-colors-primary)' } };";
        let map = parse(src, Path::new("tailwind.tokens.js"));
        assert_eq!(
            map.get("colors.primary").unwrap().raw,
            "var(--ds-colors-primary)"
        );
    }
}
