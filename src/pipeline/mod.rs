pub mod decode;
pub mod extract;
pub mod normalize;
pub mod taxonomy;

use crate::model::{CatalogEntry, RawDocument};
use decode::DecodeStrategy;
use normalize::Normalizer;

/// What one document produced, for the end-of-run report.
pub struct DocumentOutcome {
    pub source: String,
    pub strategy: DecodeStrategy,
    pub candidates: usize,
    pub rejected: usize,
    pub entries: Vec<CatalogEntry>,
}

/// Per-document pipeline: decode → extract → normalize. Documents never
/// fail; the worst case is an outcome with zero entries.
pub fn process_document(doc: &RawDocument, normalizer: &Normalizer) -> DocumentOutcome {
    let (decoded, strategy) = decode::decode(&doc.text);
    let candidates = extract::extract(decoded.as_ref(), &doc.text, &doc.source);

    let total = candidates.len();
    let entries: Vec<CatalogEntry> = candidates
        .iter()
        .filter_map(|c| normalizer.normalize(c))
        .collect();

    DocumentOutcome {
        source: doc.source.clone(),
        strategy,
        candidates: total,
        rejected: total - entries.len(),
        entries,
    }
}

// ── Tests ──
