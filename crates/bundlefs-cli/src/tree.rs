//! Moving artifacts between the pipeline and a real directory tree.

use anyhow::{Context, Result, bail};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use bundlefs_pipeline::Artifact;
use bundlefs_vfs::FileStat;

/// Read every file and directory under `input` as artifacts.
///
/// Paths are relative to `input`, `/`-separated. Directories come before
/// their contents; siblings are in name order so repeated runs ingest in the
/// same order. Symlinks are skipped.
pub fn read_tree(input: &Path) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();

    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", input.display()))?;
        if entry.depth() == 0 {
            continue;
        }

        let rel = entry.path().strip_prefix(input)?;
        let rel = rel.to_string_lossy().replace('\\', "/");
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            warn!(path = %rel, "skipping symlink");
            continue;
        }

        let metadata = entry.metadata()?;
        let stat = FileStat::from(&metadata);
        let artifact = if file_type.is_dir() {
            Artifact::directory(rel)
        } else {
            let contents = std::fs::read(entry.path())
                .with_context(|| format!("reading {}", entry.path().display()))?;
            Artifact::new(rel, contents)
        };
        artifacts.push(artifact.with_stat(stat));
    }

    debug!(count = artifacts.len(), input = %input.display(), "read input tree");
    Ok(artifacts)
}

/// Where a flushed artifact lands under `output`.
///
/// Returns `None` for artifacts that left the batch root (absolute paths)
/// or that climb out of it with `..`.
pub fn output_path(output: &Path, relative: &str) -> Option<PathBuf> {
    let rel = Path::new(relative);
    let escapes = rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || relative.is_empty() {
        return None;
    }
    Some(output.join(rel))
}

/// Write one flushed artifact under `output`. Returns whether it was written.
pub async fn write_artifact(output: &Path, artifact: &Artifact) -> Result<bool> {
    let Some(dest) = output_path(output, &artifact.relative_path) else {
        warn!(path = %artifact.relative_path, "outside the batch root, not written");
        return Ok(false);
    };

    if artifact.is_dir() {
        tokio::fs::create_dir_all(&dest).await?;
        return Ok(true);
    }

    let Some(contents) = artifact.contents.as_deref() else {
        bail!("{} has no contents", artifact.relative_path);
    };
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&dest, contents)
        .await
        .with_context(|| format!("writing {}", dest.display()))?;
    debug!(path = %dest.display(), bytes = contents.len(), "wrote");
    Ok(true)
}
