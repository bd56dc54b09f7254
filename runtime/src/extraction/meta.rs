//! Page-level metadata: title, description, language, canonical URL.

use crate::types::Meta;
use scraper::{Html, Selector};

/// Extract page metadata. Missing fields fall back to empty values.
pub fn extract_meta(document: &Html) -> Meta {
    let mut meta = Meta::default();

    if let Ok(sel) = Selector::parse("title") {
        if let Some(el) = document.select(&sel).next() {
            meta.title = el.text().collect::<String>().trim().to_string();
        }
    }
    if let Ok(sel) = Selector::parse(r#"meta[name="description"]"#) {
        if let Some(el) = document.select(&sel).next() {
            meta.description = el
                .value()
                .attr("content")
                .map(|s| s.trim().to_string())
                .unwrap_or_default();
        }
    }
    if let Ok(sel) = Selector::parse("html[lang]") {
        if let Some(el) = document.select(&sel).next() {
            meta.language = el.value().attr("lang").unwrap_or_default().to_string();
        }
    }
    if let Ok(sel) = Selector::parse(r#"link[rel~="canonical"][href]"#) {
        meta.canonical = document
            .select(&sel)
            .filter_map(|el| el.value().attr("href"))
            .find(|href| !href.is_empty())
            .map(|s| s.to_string());
    }

    meta
}

/// Parse `html` and extract its metadata.
pub fn extract_meta_from_html(html: &str) -> Meta {
    extract_meta(&Html::parse_document(html))
}
