//! The scrape pipeline: static fetch, extraction, render check, optional
//! dynamic render, re-extraction, and result assembly.
//!
//! A call never fails. Every collaborator failure becomes an
//! [`ErrorRecord`] and the pipeline carries on with what it has.

use crate::acquisition::{HttpClient, StaticFetcher};
use crate::config::ScrapeConfig;
use crate::extraction::{self, ExtractOptions};
use crate::renderer::{render_dynamic, Renderer};
use crate::types::{ErrorPhase, ErrorRecord, InteractionLog, Meta, ScrapeResult, Section};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

/// Message attached when nothing was extracted and nothing failed.
pub const NO_SECTIONS_MESSAGE: &str = "No meaningful content sections found";

/// Steps of one scrape call, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    StaticFetch,
    StaticExtract,
    HeuristicCheck,
    DynamicFetch,
    DynamicExtract,
    Finalize,
    Done,
}

/// Entry point for scrape calls. Cheap to share behind an `Arc`.
pub struct Scraper {
    fetcher: Arc<dyn StaticFetcher>,
    renderer: Arc<dyn Renderer>,
    config: ScrapeConfig,
}

/// Mutable state of one call while it moves through the stages.
struct Run<'a> {
    url: &'a str,
    markup: Option<String>,
    rendered: Option<String>,
    meta: Meta,
    sections: Vec<Section>,
    interactions: InteractionLog,
    errors: Vec<ErrorRecord>,
}

impl Scraper {
    pub fn new(
        fetcher: Arc<dyn StaticFetcher>,
        renderer: Arc<dyn Renderer>,
        config: ScrapeConfig,
    ) -> Self {
        Self {
            fetcher,
            renderer,
            config,
        }
    }

    /// A scraper that fetches statically over HTTP with the configured
    /// user agent and timeout.
    pub fn with_http(renderer: Arc<dyn Renderer>, config: ScrapeConfig) -> Self {
        let fetcher = HttpClient::new(&config.fetch_user_agent, config.fetch_timeout_ms);
        Self::new(Arc::new(fetcher), renderer, config)
    }

    /// Scrape one URL. Always returns a fully populated result.
    pub async fn scrape(&self, url: &str) -> ScrapeResult {
        let span = info_span!("scrape", request_id = %uuid::Uuid::new_v4(), url);
        let (result, _) = self.run(url).instrument(span).await;
        result
    }

    /// Drive the stages to `Done`, returning the result and the stages visited.
    async fn run(&self, url: &str) -> (ScrapeResult, Vec<Stage>) {
        let opts = ExtractOptions {
            max_raw_html_chars: self.config.max_raw_html_chars,
        };
        let mut run = Run {
            url,
            markup: None,
            rendered: None,
            meta: Meta::default(),
            sections: Vec::new(),
            interactions: InteractionLog::starting_at(url),
            errors: Vec::new(),
        };

        let mut stage = Stage::Start;
        let mut visited = vec![stage];
        while stage != Stage::Done {
            debug!(?stage, "entering stage");
            stage = match stage {
                Stage::Start => Stage::StaticFetch,
                Stage::StaticFetch => self.static_fetch(&mut run).await,
                Stage::StaticExtract => static_extract(&mut run, &opts),
                Stage::HeuristicCheck => heuristic_check(&run),
                Stage::DynamicFetch => self.dynamic_fetch(&mut run).await,
                Stage::DynamicExtract => dynamic_extract(&mut run, &opts),
                Stage::Finalize => finalize(&mut run),
                Stage::Done => Stage::Done,
            };
            visited.push(stage);
        }

        info!(
            sections = run.sections.len(),
            errors = run.errors.len(),
            scrolls = run.interactions.scrolls,
            "scrape finished"
        );

        let result = ScrapeResult {
            url: url.to_string(),
            scraped_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            meta: run.meta,
            sections: run.sections,
            interactions: run.interactions,
            errors: run.errors,
        };
        (result, visited)
    }

    async fn static_fetch(&self, run: &mut Run<'_>) -> Stage {
        match self.fetcher.fetch(run.url).await {
            Ok(html) => {
                debug!(bytes = html.len(), "static fetch succeeded");
                run.markup = Some(html);
            }
            Err(e) => {
                warn!(error = %e, "static fetch failed");
                run.errors.push(ErrorRecord::new(ErrorPhase::Fetch, e.to_string()));
            }
        }
        Stage::StaticExtract
    }

    async fn dynamic_fetch(&self, run: &mut Run<'_>) -> Stage {
        let outcome = render_dynamic(
            self.renderer.as_ref(),
            run.url,
            &self.config.render,
            &mut run.interactions,
        )
        .await;

        match outcome {
            Ok(html) => {
                run.rendered = Some(html);
                Stage::DynamicExtract
            }
            Err(e) => {
                warn!(error = %e, "dynamic render failed, keeping static results");
                run.errors.push(ErrorRecord::new(ErrorPhase::Render, e.to_string()));
                Stage::Finalize
            }
        }
    }
}

fn static_extract(run: &mut Run<'_>, opts: &ExtractOptions) -> Stage {
    if let Some(html) = run.markup.as_deref() {
        let (meta, sections) = extraction::extract_page(html, run.url, opts);
        debug!(sections = sections.len(), "static extraction done");
        run.meta = meta;
        run.sections = sections;
    }
    Stage::HeuristicCheck
}

fn heuristic_check(run: &Run<'_>) -> Stage {
    let markup = run.markup.as_deref().unwrap_or_default();
    match extraction::render_decision(&run.sections, Some(markup)) {
        Some(reason) => {
            info!(%reason, "dynamic rendering required");
            Stage::DynamicFetch
        }
        None => {
            debug!("static content sufficient");
            Stage::Finalize
        }
    }
}

fn dynamic_extract(run: &mut Run<'_>, opts: &ExtractOptions) -> Stage {
    if let Some(html) = run.rendered.take() {
        run.sections = extraction::extract_sections_from_html(&html, run.url, opts);
        debug!(sections = run.sections.len(), "dynamic extraction done");
    }
    Stage::Finalize
}

fn finalize(run: &mut Run<'_>) -> Stage {
    if run.sections.is_empty() && run.errors.is_empty() {
        run.errors
            .push(ErrorRecord::new(ErrorPhase::Parse, NO_SECTIONS_MESSAGE));
    }
    run.interactions.dedup_pages();
    Stage::Done
}
