use std::collections::HashMap;

use anyhow::{bail, Result};
use tracing::info;

use crate::model::CatalogEntry;

/// Merge entries from all sources into the final ranked, size-bounded,
/// id-assigned catalog. This is the only stateful pass in the pipeline: it
/// must see every entry before the ranking and the per-category floor can
/// be computed, so it runs once, as one unit.
pub fn consolidate(entries: Vec<CatalogEntry>, target_size: usize) -> Result<Vec<CatalogEntry>> {
    if target_size == 0 {
        bail!("target size must be positive");
    }

    let total = entries.len();
    let mut ranked = dedup(entries);
    info!("Deduplicated {} entries down to {}", total, ranked.len());

    // Stable: ties keep arrival order.
    ranked.sort_by(|a, b| b.popularity_score.total_cmp(&a.popularity_score));

    let mut final_entries = select_with_diversity(ranked, target_size);
    for (i, entry) in final_entries.iter_mut().enumerate() {
        entry.id = (i + 1) as u32;
    }
    Ok(final_entries)
}

/// Identity key for deduplication across sources.
fn identity_key(entry: &CatalogEntry) -> (String, String) {
    (
        entry.name.trim().to_lowercase(),
        entry.link.trim().to_lowercase(),
    )
}

/// Keep the first entry seen per key; a later duplicate replaces the kept
/// payload only when it is strictly more complete. The slot keeps its
/// arrival position either way.
fn dedup(entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    let mut kept: Vec<CatalogEntry> = Vec::with_capacity(entries.len());
    let mut index_by_key: HashMap<(String, String), usize> = HashMap::new();

    for entry in entries {
        let key = identity_key(&entry);
        match index_by_key.get(&key) {
            None => {
                index_by_key.insert(key, kept.len());
                kept.push(entry);
            }
            Some(&idx) => {
                if prefer_newer(&kept[idx], &entry) {
                    kept[idx] = entry;
                }
            }
        }
    }

    kept
}

/// Merge-prefer-more-complete: a duplicate wins only by filling a missing
/// link or bringing a strictly longer, non-trivial description.
fn prefer_newer(kept: &CatalogEntry, newer: &CatalogEntry) -> bool {
    if kept.link.is_empty() && !newer.link.is_empty() {
        return true;
    }
    let newer_desc = newer.description.trim();
    newer_desc.len() > kept.description.trim().len() && !newer_desc.is_empty() && newer_desc != "."
}

/// Pick `target_size` entries from the ranked pool, guaranteeing each
/// category its floor(target / categories) top-ranked slots before the rest
/// fill by overall rank. Selection happens through flags over the ranked
/// order, so the output stays score-descending throughout.
fn select_with_diversity(ranked: Vec<CatalogEntry>, target_size: usize) -> Vec<CatalogEntry> {
    if ranked.len() <= target_size {
        return ranked;
    }

    let mut categories: Vec<&str> = Vec::new();
    for entry in &ranked {
        if !categories.contains(&entry.category.as_str()) {
            categories.push(&entry.category);
        }
    }

    let per_category = target_size / categories.len();
    if categories.len() < 2 || per_category == 0 {
        let mut out = ranked;
        out.truncate(target_size);
        return out;
    }

    let mut selected = vec![false; ranked.len()];
    let mut picked = 0usize;

    // First pass: every category gets its floor of top-ranked entries.
    let mut per_category_count: HashMap<&str, usize> = HashMap::new();
    for (i, entry) in ranked.iter().enumerate() {
        let count = per_category_count.entry(entry.category.as_str()).or_insert(0);
        if *count < per_category {
            *count += 1;
            selected[i] = true;
            picked += 1;
        }
    }

    // Second pass: remaining slots go to the best of the rest.
    for flag in selected.iter_mut() {
        if picked >= target_size {
            break;
        }
        if !*flag {
            *flag = true;
            picked += 1;
        }
    }

    let mut out: Vec<CatalogEntry> = ranked
        .into_iter()
        .zip(selected)
        .filter_map(|(entry, keep)| keep.then_some(entry))
        .collect();
    out.truncate(target_size);
    out
}

// ── Tests ──
