use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A pre-scraped text blob plus a provenance label (file stem or repo name).
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub source: String,
    pub text: String,
}

/// Category value as it appears in the wild: a single label or a list.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryValue {
    One(String),
    Many(Vec<String>),
}

impl CategoryValue {
    /// Flatten to a single comma-joined label for classification.
    pub fn joined(&self) -> String {
        match self {
            CategoryValue::One(s) => s.clone(),
            CategoryValue::Many(v) => v.join(", "),
        }
    }
}

/// An unvalidated record fresh out of extraction. Nothing here is trusted;
/// the normalizer decides what survives.
#[derive(Debug, Clone, Default)]
pub struct CandidateRecord {
    pub name: String,
    pub description: String,
    pub link: String,
    pub category: Option<CategoryValue>,
    /// Explicit score carried by some source datasets. When present it
    /// suppresses local score computation.
    pub popularity_score: Option<f64>,
    pub source: String,
}

/// A validated, normalized, scored catalog item. `id` stays 0 until the
/// consolidator finalizes the output order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub link: String,
    pub category: String,
    pub logo_url: String,
    pub screenshot_url: String,
    pub featured: bool,
    pub popularity_score: f64,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMetadata {
    pub total_tools: usize,
    pub generated_at: String,
    pub categories: Vec<String>,
    pub sources: Vec<String>,
}

/// The serialized catalog: metadata header plus the ordered entry list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub metadata: CatalogMetadata,
    pub tools: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog around finalized entries, deriving the metadata.
    pub fn new(tools: Vec<CatalogEntry>) -> Self {
        let mut categories: Vec<String> = tools.iter().map(|t| t.category.clone()).collect();
        categories.sort();
        categories.dedup();

        let mut sources: Vec<String> = tools.iter().map(|t| t.source.clone()).collect();
        sources.sort();
        sources.dedup();

        Catalog {
            metadata: CatalogMetadata {
                total_tools: tools.len(),
                generated_at: chrono::Utc::now().to_rfc3339(),
                categories,
                sources,
            },
            tools,
        }
    }

    pub fn save(&self, path: &str) -> Result<()> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write catalog to {}", path))
    }

    pub fn load(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog from {}", path))?;
        serde_json::from_str(&text).with_context(|| format!("Invalid catalog JSON in {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, category: &str, source: &str) -> CatalogEntry {
        CatalogEntry {
            id: 0,
            name: name.into(),
            description: String::new(),
            link: format!("https://{}.com", name.to_lowercase()),
            category: category.into(),
            logo_url: String::new(),
            screenshot_url: String::new(),
            featured: false,
            popularity_score: 1.0,
            source: source.into(),
        }
    }

    #[test]
    fn metadata_derived_from_entries() {
        let catalog = Catalog::new(vec![
            entry("A", "Writing Tools", "repo1"),
            entry("B", "Developer Tools", "repo2"),
            entry("C", "Writing Tools", "repo1"),
        ]);
        assert_eq!(catalog.metadata.total_tools, 3);
        assert_eq!(
            catalog.metadata.categories,
            vec!["Developer Tools", "Writing Tools"]
        );
        assert_eq!(catalog.metadata.sources, vec!["repo1", "repo2"]);
    }

    #[test]
    fn category_value_joined() {
        let one = CategoryValue::One("Design".into());
        assert_eq!(one.joined(), "Design");
        let many = CategoryValue::Many(vec!["Design".into(), "Art".into()]);
        assert_eq!(many.joined(), "Design, Art");
    }
}
