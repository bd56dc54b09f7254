//! Decide whether a page needs a JavaScript-driven render.
//!
//! Rules run in order and the first match wins: no sections at all, a
//! client-side pagination marker in the markup, or fewer than three sections.

use crate::types::Section;
use std::fmt;

/// Markup fragments that advertise infinite scroll or client-side paging.
pub const PAGINATION_MARKERS: [&str; 4] = [
    "infinite-scroll",
    "pagination__next",
    "load more",
    "data-infinite-scroll",
];

/// Below this many sections the static result is treated as a partial load.
pub const MIN_STATIC_SECTIONS: usize = 3;

/// Why a dynamic render was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderReason {
    NoSections,
    PaginationMarker(&'static str),
    FewSections(usize),
}

impl fmt::Display for RenderReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderReason::NoSections => write!(f, "no sections extracted"),
            RenderReason::PaginationMarker(m) => write!(f, "pagination marker {m:?} present"),
            RenderReason::FewSections(n) => write!(f, "only {n} sections extracted"),
        }
    }
}

/// The rule that demands a dynamic render, or `None` if static is enough.
pub fn render_decision(sections: &[Section], raw_html: Option<&str>) -> Option<RenderReason> {
    if sections.is_empty() {
        return Some(RenderReason::NoSections);
    }

    if let Some(html) = raw_html {
        let lower = html.to_lowercase();
        if let Some(marker) = PAGINATION_MARKERS
            .iter()
            .copied()
            .find(|m| lower.contains(m))
        {
            return Some(RenderReason::PaginationMarker(marker));
        }
    }

    if sections.len() < MIN_STATIC_SECTIONS {
        return Some(RenderReason::FewSections(sections.len()));
    }

    None
}

pub fn needs_dynamic_rendering(sections: &[Section], raw_html: Option<&str>) -> bool {
    render_decision(sections, raw_html).is_some()
}
