//! Sidecar inspection commands.

use std::path::Path;

use crate::model::EntityKind;
use crate::nfo::{self, trailer};

use super::is_sidecar_file;

/// Print a parsed sidecar as JSON
pub fn cmd_nfo(path: &Path, kind: Option<&str>) -> anyhow::Result<()> {
    let doc = match kind {
        Some(kind) => {
            let kind = EntityKind::parse(kind).ok_or_else(|| {
                anyhow::anyhow!("Unknown kind '{}' (expected movie, tvshow or game)", kind)
            })?;
            nfo::read(path, kind)?
        }
        None => nfo::read_any(path)?,
    };
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

/// Walk a directory and report sidecars that fail to parse
pub fn cmd_check(path: &Path, verbose: bool) -> anyhow::Result<()> {
    if !path.is_dir() {
        anyhow::bail!("Not a directory: {}", path.display());
    }

    let mut total = 0usize;
    let mut failed = 0usize;
    for entry in walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_sidecar_file(e.path()))
    {
        total += 1;
        match nfo::read_any(entry.path()) {
            Ok(doc) => {
                tracing::debug!(path = %entry.path().display(), kind = %doc.kind, "Sidecar OK");
                if verbose {
                    println!("  ✓ {} ({})", entry.path().display(), doc.kind);
                }
            }
            Err(e) => {
                failed += 1;
                println!("  ✗ {}", e);
            }
        }
    }

    println!();
    println!("Checked {} sidecar(s), {} failed", total, failed);
    if failed > 0 {
        anyhow::bail!("{} of {} sidecar(s) failed to parse", failed, total);
    }
    Ok(())
}

/// Show how a trailer URL is stored and read back
pub fn cmd_trailer(url: &str) -> anyhow::Result<()> {
    let stored = trailer::to_playback_uri(url);
    println!("Stored:    {}", stored);
    println!("Read back: {}", trailer::from_playback_uri(&stored));
    Ok(())
}
