//! Export of the registry to all four token formats
//!
//! Every format is rendered before anything is written, so a render failure
//! leaves the files on disk untouched. Each file is then written through a
//! temp file in the target directory and renamed into place. When some writes
//! fail, [`ExportError::Partial`] names exactly which formats were written and
//! which were not.

pub mod render;

use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use token_types::ArtifactFormat;
use tracing::{info, warn};

use crate::config::TokenSyncConfig;
use crate::error::ExportError;
use crate::registry::TokenRegistry;

/// Rendered contents of one format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub format: ArtifactFormat,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub written: Vec<(ArtifactFormat, PathBuf)>,
}

/// Render all four formats in memory
pub fn render_all(registry: &TokenRegistry) -> Result<Vec<RenderedArtifact>, ExportError> {
    ArtifactFormat::ALL
        .iter()
        .map(|format| {
            render::render(*format, registry).map(|contents| RenderedArtifact {
                format: *format,
                contents,
            })
        })
        .collect()
}

/// Render and write every format under `root`
pub fn export_all(
    root: &Path,
    config: &TokenSyncConfig,
    registry: &TokenRegistry,
) -> Result<ExportReport, ExportError> {
    let rendered = render_all(registry)?;

    let mut written = Vec::new();
    let mut failed = Vec::new();
    for artifact in rendered {
        let path = root.join(config.artifacts.path_for(artifact.format));
        match write_atomic(&path, &artifact.contents) {
            Ok(()) => {
                info!("Exported {} to {:?}", artifact.format, path);
                written.push((artifact.format, path));
            }
            Err(e) => {
                warn!("Failed to export {} to {:?}: {}", artifact.format, path, e);
                failed.push((artifact.format, e.to_string()));
            }
        }
    }

    if failed.is_empty() {
        Ok(ExportReport { written })
    } else {
        Err(ExportError::Partial {
            written: written.into_iter().map(|(format, _)| format).collect(),
            failed,
        })
    }
}

/// Formats whose file on disk differs from what an export would write
pub fn stale_artifacts(
    root: &Path,
    config: &TokenSyncConfig,
    registry: &TokenRegistry,
) -> Result<Vec<ArtifactFormat>, ExportError> {
    Ok(render_all(registry)?
        .into_iter()
        // the YAML carries a timestamp, so only generated formats are compared
        .filter(|a| a.format != ArtifactFormat::Source)
        .filter(|a| {
            let path = root.join(config.artifacts.path_for(a.format));
            std::fs::read_to_string(path).map_or(true, |on_disk| on_disk != a.contents)
        })
        .map(|a| a.format)
        .collect())
}

fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
