//! Turn a parsed document into typed content sections.
//!
//! Three independent passes over the same tree, concatenated in order:
//! semantic landmark tags, a microdata image grid, and table-based story
//! rows (Hacker News style listings).

use super::text::{
    clean_text, first_words, is_placeholder_text, make_absolute_url, truncate_chars,
    truncate_html,
};
use crate::config::DEFAULT_MAX_RAW_HTML_CHARS;
use crate::types::{Content, Image, Link, Section, SectionType};
use scraper::{ElementRef, Html, Selector};

/// Landmark tags considered by the semantic pass, in selector order.
pub const SEMANTIC_TAGS: [&str; 6] = ["section", "main", "article", "nav", "header", "footer"];

/// Minimum normalized text length for a semantic section.
pub const MIN_SECTION_TEXT_CHARS: usize = 50;

/// Words taken from the text when a section has no heading.
const LABEL_WORDS: usize = 6;

/// Maximum label length for a story row.
const ITEM_LABEL_CHARS: usize = 80;

const GRID_FIGURE_SELECTOR: &str = r#"figure[itemprop="image"]"#;
const STORY_ROW_SELECTOR: &str = "tr.athing";
const STORY_LINK_SELECTORS: [&str; 3] = ["a.storylink", ".titleline > a", "a"];

/// Knobs for the extractors.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    pub max_raw_html_chars: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_raw_html_chars: DEFAULT_MAX_RAW_HTML_CHARS,
        }
    }
}

/// Run every extraction pass and concatenate the results.
pub fn extract_sections(document: &Html, base_url: &str, opts: &ExtractOptions) -> Vec<Section> {
    let mut sections = extract_semantic_sections(document, base_url, opts);
    sections.extend(extract_image_grid(document, base_url, opts));
    sections.extend(extract_table_rows(document, base_url, opts));
    sections
}

/// Parse `html` and run [`extract_sections`] on it.
pub fn extract_sections_from_html(html: &str, base_url: &str, opts: &ExtractOptions) -> Vec<Section> {
    extract_sections(&Html::parse_document(html), base_url, opts)
}

// ── Semantic pass ───────────────────────────────────────────────────────────

/// Landmark elements with at least [`MIN_SECTION_TEXT_CHARS`] of real text.
///
/// Ids are `{tag}-{n}` where `n` counts retained sections only.
pub fn extract_semantic_sections(
    document: &Html,
    base_url: &str,
    opts: &ExtractOptions,
) -> Vec<Section> {
    let Ok(sel) = Selector::parse(&SEMANTIC_TAGS.join(", ")) else {
        return Vec::new();
    };

    let mut sections = Vec::new();
    for node in document.select(&sel) {
        let text = element_text(&node);
        if text.chars().count() < MIN_SECTION_TEXT_CHARS || is_placeholder_text(&text) {
            continue;
        }

        let headings = collect_headings(&node);
        let label = match headings.first() {
            Some(h) => h.clone(),
            None => first_words(&text, LABEL_WORDS),
        };
        let (raw_html, truncated) = truncate_html(&node.html(), opts.max_raw_html_chars);
        let tag = node.value().name();

        sections.push(Section {
            id: format!("{tag}-{}", sections.len()),
            kind: SectionType::from_tag(tag),
            label,
            source_url: base_url.to_string(),
            content: Content {
                headings,
                text,
                links: collect_links(&node, base_url),
                images: collect_images(&node, base_url),
                ..Default::default()
            },
            raw_html,
            truncated,
        });
    }
    sections
}

fn collect_headings(node: &ElementRef<'_>) -> Vec<String> {
    let Ok(sel) = Selector::parse("h1, h2, h3") else {
        return Vec::new();
    };
    node.select(&sel)
        .map(|h| inline_text(&h))
        .filter(|t| !t.is_empty())
        .collect()
}

fn collect_links(node: &ElementRef<'_>, base_url: &str) -> Vec<Link> {
    let Ok(sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    node.select(&sel)
        .filter_map(|a| {
            let href = make_absolute_url(base_url, a.value().attr("href")?)?;
            Some(Link {
                text: inline_text(&a),
                href,
            })
        })
        .collect()
}

fn collect_images(node: &ElementRef<'_>, base_url: &str) -> Vec<Image> {
    let Ok(sel) = Selector::parse("img") else {
        return Vec::new();
    };
    node.select(&sel)
        .filter_map(|img| {
            let src = make_absolute_url(base_url, &extract_image_src(&img)?)?;
            Some(Image {
                src,
                alt: img.value().attr("alt").unwrap_or_default().to_string(),
            })
        })
        .collect()
}

// ── Image grid pass ─────────────────────────────────────────────────────────

/// One `grid-0` section holding every image from `figure[itemprop=image]`
/// nodes, or nothing if no usable image was found.
pub fn extract_image_grid(document: &Html, base_url: &str, opts: &ExtractOptions) -> Vec<Section> {
    let (Ok(fig_sel), Ok(img_sel), Ok(title_sel), Ok(name_sel)) = (
        Selector::parse(GRID_FIGURE_SELECTOR),
        Selector::parse("img"),
        Selector::parse("a[title]"),
        Selector::parse(r#"meta[itemprop="name"]"#),
    ) else {
        return Vec::new();
    };

    let figures: Vec<ElementRef<'_>> = document.select(&fig_sel).collect();
    let Some(first) = figures.first() else {
        return Vec::new();
    };

    let mut images = Vec::new();
    for fig in &figures {
        let Some(img) = fig.select(&img_sel).next() else {
            continue;
        };
        let Some(src) = extract_image_src(&img).and_then(|s| make_absolute_url(base_url, &s))
        else {
            continue;
        };

        let mut title = fig
            .select(&title_sel)
            .next()
            .and_then(|a| a.value().attr("title"))
            .unwrap_or_default()
            .to_string();
        if let Some(meta) = fig.select(&name_sel).next() {
            if let Some(content) = meta.value().attr("content") {
                title = content.to_string();
            }
        }

        let alt = img
            .value()
            .attr("alt")
            .map(|s| s.to_string())
            .unwrap_or(title);
        images.push(Image { src, alt });
    }

    if images.is_empty() {
        return Vec::new();
    }

    let (raw_html, truncated) = truncate_html(&first.html(), opts.max_raw_html_chars);
    vec![Section {
        id: "grid-0".to_string(),
        kind: SectionType::from_tag(first.value().name()),
        label: "Image results".to_string(),
        source_url: base_url.to_string(),
        content: Content {
            images,
            ..Default::default()
        },
        raw_html,
        truncated,
    }]
}

// ── Table row pass ──────────────────────────────────────────────────────────

/// One `list` section per story row that has a title anchor.
pub fn extract_table_rows(document: &Html, base_url: &str, opts: &ExtractOptions) -> Vec<Section> {
    let Ok(row_sel) = Selector::parse(STORY_ROW_SELECTOR) else {
        return Vec::new();
    };
    let link_sels: Vec<Selector> = STORY_LINK_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect();

    let mut sections = Vec::new();
    for (idx, row) in document.select(&row_sel).enumerate() {
        let Some(anchor) = link_sels.iter().find_map(|sel| row.select(sel).next()) else {
            continue;
        };

        let title = inline_text(&anchor);
        let links = anchor
            .value()
            .attr("href")
            .and_then(|href| make_absolute_url(base_url, href))
            .map(|href| {
                vec![Link {
                    text: title.clone(),
                    href,
                }]
            })
            .unwrap_or_default();
        let (raw_html, truncated) = truncate_html(&row.html(), opts.max_raw_html_chars);

        sections.push(Section {
            id: format!("item-{idx}"),
            kind: SectionType::from_tag(row.value().name()),
            label: truncate_chars(&title, ITEM_LABEL_CHARS),
            source_url: base_url.to_string(),
            content: Content {
                headings: vec![title.clone()],
                text: title,
                links,
                ..Default::default()
            },
            raw_html,
            truncated,
        });
    }
    sections
}

// ── Shared helpers ──────────────────────────────────────────────────────────

/// Best source URL of an `<img>`: `src`, else the first `srcset` candidate,
/// else `data-src`. Returned as written in the markup (not yet absolute).
pub fn extract_image_src(img: &ElementRef<'_>) -> Option<String> {
    let attr = |name: &str| {
        img.value()
            .attr(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(src) = attr("src") {
        return Some(src.to_string());
    }
    if let Some(first) = attr("srcset")
        .and_then(|set| set.split(',').next())
        .and_then(|candidate| candidate.split_whitespace().next())
    {
        return Some(first.to_string());
    }
    attr("data-src").map(|s| s.to_string())
}

/// Block text: text nodes joined with spaces, then normalized.
fn element_text(el: &ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<Vec<_>>().join(" "))
}

/// Inline text (headings, anchors): text nodes concatenated as rendered.
fn inline_text(el: &ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<String>())
}
