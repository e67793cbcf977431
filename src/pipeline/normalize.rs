use std::sync::LazyLock;

use regex::Regex;

use crate::model::{CandidateRecord, CatalogEntry};
use crate::pipeline::taxonomy::Taxonomy;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*+").unwrap());
static DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://(?:www\.)?([^/]+)").unwrap());

const NAME_MAX_CHARS: usize = 150;
const DESCRIPTION_MAX_CHARS: usize = 150;
const FEATURED_THRESHOLD: f64 = 3.0;

/// Domains whose presence marks a tool as coming from a major vendor.
const POPULAR_DOMAINS: &[&str] = &[
    "openai.com",
    "anthropic.com",
    "google.com",
    "microsoft.com",
    "adobe.com",
    "notion.so",
    "canva.com",
    "figma.com",
    "slack.com",
    "github.com",
    "huggingface.co",
    "chatgpt.com",
    "claude.ai",
];

const LOGO_SERVICE: &str = "https://logo.clearbit.com";
const SCREENSHOT_SERVICE: &str = "https://image.thum.io/get/fullpage";

/// Turns untrusted candidates into clean catalog entries, or rejects them.
/// Owns no state beyond the taxonomy it was built with.
pub struct Normalizer {
    taxonomy: Taxonomy,
}

impl Normalizer {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Normalizer { taxonomy }
    }

    /// Clean, classify, score and validate one candidate. `None` means the
    /// candidate failed a validation invariant; a bad record never aborts
    /// the batch, callers just count rejections.
    pub fn normalize(&self, candidate: &CandidateRecord) -> Option<CatalogEntry> {
        let name = clean_name(&candidate.name);
        let description = clean_description(&candidate.description);
        let link = canonicalize_url(&candidate.link);

        if name.is_empty() || name.chars().count() > NAME_MAX_CHARS {
            return None;
        }
        if name.starts_with(['{', '[', '"']) {
            return None;
        }
        if !link.starts_with("http://") && !link.starts_with("https://") {
            return None;
        }

        let category = match &candidate.category {
            Some(raw) => self
                .taxonomy
                .resolve(&raw.joined())
                .unwrap_or_else(|| self.taxonomy.infer(&format!("{} {}", name, description))),
            None => self.taxonomy.infer(&format!("{} {}", name, description)),
        };

        let popularity_score = candidate
            .popularity_score
            .unwrap_or_else(|| compute_score(&name, &description, &link));

        let domain = extract_domain(&link);

        Some(CatalogEntry {
            id: 0,
            logo_url: format!("{}/{}", LOGO_SERVICE, domain),
            screenshot_url: format!("{}/{}", SCREENSHOT_SERVICE, link),
            featured: popularity_score >= FEATURED_THRESHOLD,
            name,
            description,
            link,
            category,
            popularity_score,
            source: candidate.source.trim().to_string(),
        })
    }
}

fn clean_name(name: &str) -> String {
    EMPHASIS_RE.replace_all(name.trim(), "").trim().to_string()
}

fn clean_description(description: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(description.trim(), " ");
    let mut text = EMPHASIS_RE.replace_all(&collapsed, "").trim().to_string();

    // Scraped "[reviews...]" boilerplate: drop through the first closing
    // bracket, then any leading separator.
    if text.starts_with("[reviews") {
        text = match text.split_once(']') {
            Some((_, rest)) => rest.trim_start().trim_start_matches('-').trim().to_string(),
            None => String::new(),
        };
    }

    truncate_chars(&text, DESCRIPTION_MAX_CHARS)
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max - 3).collect();
    format!("{}...", cut.trim_end())
}

fn canonicalize_url(link: &str) -> String {
    let mut url = link.trim().to_string();
    if url.is_empty() {
        return url;
    }

    if url.starts_with("//") {
        url = format!("https:{}", url);
    } else if !url.starts_with("http://") && !url.starts_with("https://") {
        url = format!("https://{}", url);
    }

    if let Some(idx) = url.find('#') {
        url.truncate(idx);
    }
    url.trim_end_matches('/').to_string()
}

fn extract_domain(link: &str) -> String {
    DOMAIN_RE
        .captures(link)
        .map(|caps| caps[1].to_lowercase())
        .unwrap_or_default()
}

/// Heuristic score for ranking when the source carries no explicit one.
fn compute_score(name: &str, description: &str, link: &str) -> f64 {
    let mut score: f64 = 0.0;

    if !name.is_empty() {
        score += 1.0;
    }
    if !description.is_empty() {
        score += 1.0;
    }
    if !link.is_empty() {
        score += 1.0;
    }

    let desc_len = description.chars().count();
    if desc_len > 50 {
        score += 0.5;
    }
    if desc_len > 100 {
        score += 0.5;
    }

    let domain = extract_domain(link);
    if POPULAR_DOMAINS.iter().any(|popular| domain.contains(popular)) {
        score += 2.0;
    }

    if desc_len < 20 {
        score -= 0.5;
    }

    score.max(0.0)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new(Taxonomy::default_catalog())
    }

    fn candidate(name: &str, description: &str, link: &str) -> CandidateRecord {
        CandidateRecord {
            name: name.into(),
            description: description.into(),
            link: link.into(),
            category: None,
            popularity_score: None,
            source: "test".into(),
        }
    }

    #[test]
    fn empty_name_rejected() {
        assert!(normalizer().normalize(&candidate("", "", "http://x.com")).is_none());
    }

    #[test]
    fn schemeless_link_gets_https() {
        let entry = normalizer().normalize(&candidate("Foo", "", "x.com")).unwrap();
        assert_eq!(entry.link, "https://x.com");
    }

    #[test]
    fn protocol_relative_link_gets_https() {
        let entry = normalizer().normalize(&candidate("Foo", "", "//x.com/a")).unwrap();
        assert_eq!(entry.link, "https://x.com/a");
    }

    #[test]
    fn fragment_and_trailing_slash_stripped() {
        let entry = normalizer()
            .normalize(&candidate("Foo", "", "https://x.com/path/#pricing"))
            .unwrap();
        assert_eq!(entry.link, "https://x.com/path");
    }

    #[test]
    fn empty_link_rejected() {
        assert!(normalizer().normalize(&candidate("Foo", "desc", "")).is_none());
    }

    #[test]
    fn json_shaped_name_rejected() {
        for name in ["{\"name\": \"x\"}", "[1,2]", "\"quoted\""] {
            assert!(normalizer().normalize(&candidate(name, "", "http://x.com")).is_none());
        }
    }

    #[test]
    fn oversized_name_rejected() {
        let name = "x".repeat(NAME_MAX_CHARS + 1);
        assert!(normalizer().normalize(&candidate(&name, "", "http://x.com")).is_none());
    }

    #[test]
    fn emphasis_markers_stripped() {
        let entry = normalizer()
            .normalize(&candidate("**Bold Tool**", "really *great* stuff honestly", "http://x.com"))
            .unwrap();
        assert_eq!(entry.name, "Bold Tool");
        assert_eq!(entry.description, "really great stuff honestly");
    }

    #[test]
    fn whitespace_collapsed_in_description() {
        let entry = normalizer()
            .normalize(&candidate("A", "line one\n\n  line\ttwo continues here", "http://x.com"))
            .unwrap();
        assert_eq!(entry.description, "line one line two continues here");
    }

    #[test]
    fn reviews_boilerplate_stripped() {
        let entry = normalizer()
            .normalize(&candidate("A", "[reviews: 4.5 stars] - An actual description here", "http://x.com"))
            .unwrap();
        assert_eq!(entry.description, "An actual description here");
    }

    #[test]
    fn long_description_capped() {
        let long = "word ".repeat(60);
        let entry = normalizer().normalize(&candidate("A", &long, "http://x.com")).unwrap();
        assert_eq!(entry.description.chars().count(), DESCRIPTION_MAX_CHARS);
        assert!(entry.description.ends_with("..."));
    }

    #[test]
    fn synonym_category_mapped() {
        let mut c = candidate("Bar", "writes things for you properly", "http://bar.com");
        c.category = Some(crate::model::CategoryValue::One("Writing & Editing".into()));
        let entry = normalizer().normalize(&c).unwrap();
        assert_eq!(entry.category, "Writing Tools");
    }

    #[test]
    fn missing_category_inferred_from_text() {
        let entry = normalizer()
            .normalize(&candidate("DevHelper", "autocompletes code in your editor fast", "http://d.com"))
            .unwrap();
        assert_eq!(entry.category, "Developer Tools");
    }

    #[test]
    fn unknown_category_inferred_from_text() {
        let mut c = candidate("VidGen", "turn prompts into video instantly today", "http://v.com");
        c.category = Some(crate::model::CategoryValue::One("Unknown".into()));
        let entry = normalizer().normalize(&c).unwrap();
        assert_eq!(entry.category, "Video Tools");
    }

    #[test]
    fn scoring_presence_and_length() {
        // name + link, no description: 1 + 1 - 0.5 penalty
        let entry = normalizer().normalize(&candidate("A", "", "http://a.com")).unwrap();
        assert_eq!(entry.popularity_score, 1.5);
        assert!(!entry.featured);

        // 60-char description clears the first length threshold
        let desc = "a".repeat(60);
        let entry = normalizer().normalize(&candidate("A", &desc, "http://a.com")).unwrap();
        assert_eq!(entry.popularity_score, 3.5);
        assert!(entry.featured);
    }

    #[test]
    fn popular_domain_bonus() {
        let entry = normalizer()
            .normalize(&candidate("Copilot", "pair programmer for your editor", "https://github.com/features/copilot"))
            .unwrap();
        // 3.0 presence + 2.0 domain + 31-char description (no threshold, no penalty)
        assert_eq!(entry.popularity_score, 5.0);
    }

    #[test]
    fn explicit_score_wins() {
        let mut c = candidate("A", "short", "http://a.com");
        c.popularity_score = Some(9.1);
        let entry = normalizer().normalize(&c).unwrap();
        assert_eq!(entry.popularity_score, 9.1);
        assert!(entry.featured);
    }

    #[test]
    fn derived_urls() {
        let entry = normalizer()
            .normalize(&candidate("A", "", "https://www.example.com/tool"))
            .unwrap();
        assert_eq!(entry.logo_url, "https://logo.clearbit.com/example.com");
        assert_eq!(
            entry.screenshot_url,
            "https://image.thum.io/get/fullpage/https://www.example.com/tool"
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let first = normalizer()
            .normalize(&candidate(
                "**Tool**",
                "  [reviews 4/5] - A   multi\nline description of the tool  ",
                "tool.com/page/#features",
            ))
            .unwrap();

        let mut again = candidate(&first.name, &first.description, &first.link);
        again.category = Some(crate::model::CategoryValue::One(first.category.clone()));
        let second = normalizer().normalize(&again).unwrap();

        assert_eq!(second.name, first.name);
        assert_eq!(second.description, first.description);
        assert_eq!(second.link, first.link);
        assert_eq!(second.category, first.category);
        assert_eq!(second.popularity_score, first.popularity_score);
    }
}
