use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use crate::model::RawDocument;

const DOCUMENT_EXTENSIONS: &[&str] = &["json", "md", "txt"];

/// Load every scraped blob in a directory as a RawDocument, source labeled
/// by file stem. An empty input set is a configuration error, not a quiet
/// empty run.
pub fn load_documents(dir: &Path) -> Result<Vec<RawDocument>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory {}", dir.display()))?;

    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext))
        })
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping unreadable file {}: {}", path.display(), e);
                continue;
            }
        };
        let source = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        debug!("Loaded {} ({} bytes)", source, text.len());
        documents.push(RawDocument { source, text });
    }

    if documents.is_empty() {
        bail!("No input documents found in {}", dir.display());
    }
    Ok(documents)
}

// ── Tests ──
