use std::sync::LazyLock;

use regex::Regex;

use crate::model::{CandidateRecord, CategoryValue};

static TRIPLE_NDL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)"name"\s*:\s*"([^"]+)"[^}]*?"description"\s*:\s*"([^"]*)"[^}]*?"link"\s*:\s*"([^"]*)""#,
    )
    .unwrap()
});
static TRIPLE_NLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)"name"\s*:\s*"([^"]+)"[^}]*?"link"\s*:\s*"([^"]*)"[^}]*?"description"\s*:\s*"([^"]*)""#,
    )
    .unwrap()
});
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{2,4}\s+(.+)$").unwrap());
static CELL_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static LINK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]]+)\]\(([^)]+)\)\s*[-–:]\s*(.+)$").unwrap());

/// Pattern-based recovery for blobs no repair strategy could decode. The
/// families run in a fixed order and the first one producing at least one
/// candidate wins; weaker families are never layered on top of a stronger
/// match, which would duplicate records from partial overlaps.
pub fn extract(raw_text: &str, source: &str) -> Vec<CandidateRecord> {
    let families: [fn(&str, &str) -> Vec<CandidateRecord>; 4] = [
        quoted_triples_name_desc_link,
        quoted_triples_name_link_desc,
        markdown_table_rows,
        markdown_link_lines,
    ];

    for family in families {
        let records = family(raw_text, source);
        if !records.is_empty() {
            return records;
        }
    }
    Vec::new()
}

/// `"name": "..."` … `"description": "..."` … `"link": "..."` runs.
fn quoted_triples_name_desc_link(text: &str, source: &str) -> Vec<CandidateRecord> {
    TRIPLE_NDL_RE
        .captures_iter(text)
        .map(|caps| candidate(&caps[1], &caps[2], &caps[3], source))
        .collect()
}

/// Field-order variant: link before description.
fn quoted_triples_name_link_desc(text: &str, source: &str) -> Vec<CandidateRecord> {
    TRIPLE_NLD_RE
        .captures_iter(text)
        .map(|caps| candidate(&caps[1], &caps[3], &caps[2], source))
        .collect()
}

/// Markdown table rows `| [Name](url) | Title | Description | … |`, with the
/// nearest preceding heading supplying the category.
fn markdown_table_rows(text: &str, source: &str) -> Vec<CandidateRecord> {
    let mut records = Vec::new();
    let mut current_category: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();

        if let Some(caps) = HEADING_RE.captures(line) {
            current_category = Some(caps[1].trim().to_string());
            continue;
        }

        if !line.starts_with('|') || !line.ends_with('|') {
            continue;
        }
        // Separator rows: |---|---| and friends.
        if line.chars().all(|c| matches!(c, '|' | '-' | ':' | ' ')) {
            continue;
        }

        let cells: Vec<&str> = line
            .trim_matches('|')
            .split('|')
            .map(str::trim)
            .collect();
        if cells.len() < 2 {
            continue;
        }

        let Some(caps) = CELL_LINK_RE.captures(cells[0]) else {
            continue; // header row or plain-text cell
        };

        let description = cells.get(2).copied().or_else(|| cells.get(1).copied()).unwrap_or("");
        let mut record = candidate(&caps[1], description, &caps[2], source);
        record.category = current_category.clone().map(CategoryValue::One);
        records.push(record);
    }

    records
}

/// Bullet-style lines: `[Name](url) - description`.
fn markdown_link_lines(text: &str, source: &str) -> Vec<CandidateRecord> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim().trim_start_matches(['-', '*']).trim_start();
            let caps = LINK_LINE_RE.captures(line)?;
            Some(candidate(&caps[1], &caps[3], &caps[2], source))
        })
        .collect()
}

fn candidate(name: &str, description: &str, link: &str, source: &str) -> CandidateRecord {
    let link = link.trim();
    CandidateRecord {
        name: name.trim().to_string(),
        description: description.trim().to_string(),
        link: if link == "null" { String::new() } else { link.to_string() },
        category: None,
        popularity_score: None,
        source: source.to_string(),
    }
}

// ── Tests ──
