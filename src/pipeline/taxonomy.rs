/// Category resolution rules: an ordered synonym table plus ordered keyword
/// sets. Built once and handed to the normalizer, so the mapping stays
/// testable and swappable instead of living in a global table.
pub struct Taxonomy {
    /// (raw label, canonical category), matched case-insensitively in order;
    /// exact matches first, then substring.
    synonyms: Vec<(&'static str, &'static str)>,
    /// (canonical category, keywords), first set with a hit wins.
    keyword_rules: Vec<(&'static str, &'static [&'static str])>,
    fallback: &'static str,
}

impl Taxonomy {
    /// The catalog taxonomy used in production. Raw labels collected from
    /// the source repositories and directory sites.
    pub fn default_catalog() -> Self {
        Taxonomy {
            synonyms: vec![
                ("writing & editing", "Writing Tools"),
                ("writing assistant", "Writing Tools"),
                ("content creation and ai writing tools", "Writing Tools"),
                ("translation & transcript", "Writing Tools"),
                ("coding & development", "Developer Tools"),
                ("development and ai coding tools", "Developer Tools"),
                ("code & database assistant", "Developer Tools"),
                ("developer apis", "Developer Tools"),
                ("sdk for ai apps", "Developer Tools"),
                ("chatbots & virtual companions", "AI Chatbots"),
                ("complete list of ai chatbots", "AI Chatbots"),
                ("image generation & editing", "Image Generation"),
                ("art & image generator", "Image Generation"),
                ("art & creative design", "Design Tools"),
                ("photo & image editing", "Design Tools"),
                ("logo generator", "Design Tools"),
                ("slides & web design", "Design Tools"),
                ("office & productivity", "Productivity"),
                ("organization & automation", "Productivity"),
                ("email assistant", "Productivity"),
                ("no-code", "Productivity"),
                ("research & data analysis", "Data Analysis"),
                ("business intelligence", "Data Analysis"),
                ("video generation", "Video Tools"),
                ("ai image and video editing tools", "Video Tools"),
                ("social media", "Social Media Tools"),
                ("music & audio generation", "Audio Tools"),
                ("text to speech", "Audio Tools"),
                ("voice and speech recognition ai tools", "Audio Tools"),
                ("search engines", "Search Engines"),
                ("sales & marketing", "Marketing Tools"),
                ("content generation & seo", "Marketing Tools"),
                ("marketing and sales ai tools", "Marketing Tools"),
                ("personal assistant", "AI Assistants"),
                ("ai executive assistants", "AI Assistants"),
                ("ai agents", "AI Agents"),
                ("education & learning", "Education"),
                ("homework assistant", "Education"),
                ("mental health", "Health & Wellness"),
                ("artificial intelligence", "AI Tools"),
                ("generative ai", "AI Tools"),
                ("general purpose", "AI Tools"),
                ("ai tools", "AI Tools"),
            ],
            keyword_rules: vec![
                ("Writing Tools", &["writing", "content", "copy", "blog", "article", "grammar"]),
                ("Developer Tools", &["code", "coding", "developer", "programming", "api", "github", "ide", "debug"]),
                ("Design Tools", &["design", "image", "visual", "photo", "picture", "graphic", "logo"]),
                ("Video Tools", &["video", "clips", "streaming", "youtube"]),
                ("Audio Tools", &["audio", "voice", "sound", "music", "podcast"]),
                ("Productivity", &["productivity", "workflow", "automation", "organize", "notes"]),
                ("Search Engines", &["search", "engine", "discovery"]),
                ("Marketing Tools", &["marketing", "seo", "social media", "advertising"]),
                ("Business Tools", &["business", "sales", "crm", "finance", "analytics"]),
            ],
            fallback: "AI Tools",
        }
    }

    /// Map a raw category label to its canonical form. `None` means the
    /// label is absent or an Unknown sentinel and the caller should infer
    /// from text instead.
    pub fn resolve(&self, raw: &str) -> Option<String> {
        let lowered = raw.trim().to_lowercase();
        if lowered.is_empty() || lowered == "unknown" || lowered == "uncategorized" {
            return None;
        }

        for (label, canonical) in &self.synonyms {
            if lowered == *label {
                return Some((*canonical).to_string());
            }
        }
        for (label, canonical) in &self.synonyms {
            if lowered.contains(label) {
                return Some((*canonical).to_string());
            }
        }

        Some(title_case(raw.trim()))
    }

    /// Infer a category from free text (name + description, case-folded).
    pub fn infer(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        for (canonical, keywords) in &self.keyword_rules {
            if keywords.iter().any(|kw| lowered.contains(kw)) {
                return (*canonical).to_string();
            }
        }
        self.fallback.to_string()
    }
}

/// Capitalize the first letter of each word, leaving the rest untouched so
/// acronyms like "AI" survive a round trip.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Tests ──
