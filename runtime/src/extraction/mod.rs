//! Content extraction from raw or rendered HTML.
//!
//! Everything here is synchronous and pure. The parsed document never
//! outlives the call that created it, so async callers stay `Send`.

pub mod heuristics;
pub mod meta;
pub mod sections;
pub mod text;

use crate::types::{Meta, Section};
use scraper::Html;

pub use heuristics::{needs_dynamic_rendering, render_decision, RenderReason};
pub use sections::{extract_sections, extract_sections_from_html, ExtractOptions};

/// Parse `html` once and extract both page metadata and sections.
pub fn extract_page(html: &str, base_url: &str, opts: &ExtractOptions) -> (Meta, Vec<Section>) {
    let document = Html::parse_document(html);
    let meta = meta::extract_meta(&document);
    let sections = sections::extract_sections(&document, base_url, opts);
    (meta, sections)
}
