//! Result types returned by a scrape call.
//!
//! Every type here serializes to the JSON shape served by the REST layer:
//! camelCase keys, lowercase enum values, `null` for an absent canonical URL.

use serde::{Deserialize, Serialize};

/// The full outcome of one scrape call. Always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    /// The URL the caller asked for.
    pub url: String,
    /// UTC timestamp, RFC 3339 with a trailing `Z`.
    pub scraped_at: String,
    pub meta: Meta,
    pub sections: Vec<Section>,
    pub interactions: InteractionLog,
    pub errors: Vec<ErrorRecord>,
}

/// Page-level metadata. Missing fields stay empty; never null as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub title: String,
    pub description: String,
    pub language: String,
    pub canonical: Option<String>,
}

/// Kind of an extracted section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Section,
    Nav,
    Footer,
    Hero,
    List,
    Grid,
    Unknown,
}

impl SectionType {
    /// Map an element tag name to a section kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "nav" => SectionType::Nav,
            "footer" => SectionType::Footer,
            "section" | "main" | "article" | "header" => SectionType::Section,
            "tr" => SectionType::List,
            "figure" => SectionType::Grid,
            _ => SectionType::Unknown,
        }
    }
}

/// One labeled block of extracted page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Unique within one extraction pass, e.g. `article-2`, `grid-0`, `item-5`.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SectionType,
    pub label: String,
    pub source_url: String,
    pub content: Content,
    /// Serialized node, capped at the configured maximum length.
    pub raw_html: String,
    /// True iff `raw_html` was cut.
    pub truncated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub headings: Vec<String>,
    pub text: String,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    /// Reserved; always empty today.
    pub lists: Vec<serde_json::Value>,
    /// Reserved; always empty today.
    pub tables: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
}

/// What the dynamic renderer did to obtain content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionLog {
    /// Reserved for click simulation.
    pub clicks: Vec<serde_json::Value>,
    pub scrolls: u32,
    /// Distinct URLs visited, first-seen order, starting with the input URL.
    pub pages: Vec<String>,
}

impl InteractionLog {
    /// A fresh log whose page list starts with `url`.
    pub fn starting_at(url: &str) -> Self {
        Self {
            clicks: Vec::new(),
            scrolls: 0,
            pages: vec![url.to_string()],
        }
    }

    /// Record a visited URL unless it was already seen. Returns true if added.
    pub fn record_page(&mut self, url: &str) -> bool {
        if url.is_empty() || self.pages.iter().any(|p| p == url) {
            return false;
        }
        self.pages.push(url.to_string());
        true
    }

    /// Drop repeated URLs, keeping the first occurrence of each.
    pub fn dedup_pages(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.pages.retain(|p| seen.insert(p.clone()));
    }
}

/// Pipeline phase an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPhase {
    Fetch,
    Render,
    Parse,
}

/// A failure captured during a scrape call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
    pub phase: ErrorPhase,
}

impl ErrorRecord {
    pub fn new(phase: ErrorPhase, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase,
        }
    }
}
