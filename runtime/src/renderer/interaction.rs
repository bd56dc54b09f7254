//! Bounded scroll loop that coaxes lazy pages into loading their content.
//!
//! Two phases run back to back on one session:
//!
//! 1. Height phase: scroll to the bottom, let the page settle, and keep going
//!    while the document grows (classic infinite scroll).
//! 2. Marker phase: once the content marker exists, scroll again and wait for
//!    the marker count to rise (content that loads without growing height).
//!
//! Both phases are capped so a pathological page cannot hold the pipeline.
//! A marker that never shows up fails the render; a marker count that stops
//! rising just ends the second phase.

use super::{RenderContext, RenderError, Renderer};
use crate::config::RenderConfig;
use crate::types::InteractionLog;
use anyhow::{anyhow, Context};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const SCROLL_HEIGHT_JS: &str = "document.body.scrollHeight";
const SCROLL_TO_BOTTOM_JS: &str =
    "window.scrollTo(0, document.body.scrollHeight), document.body.scrollHeight";
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Why a scroll phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A scroll did not make the document taller.
    HeightUnchanged,
    /// The phase used all of its scrolls.
    IterationLimit,
    /// The marker count did not rise within the wait bound.
    WaitTimeout,
}

/// Render `url` in a fresh session and return the final markup.
///
/// Scrolls and visited pages are written into `log` as they happen, so a
/// failed render still reports what it did. The session is closed on every
/// path out of this function.
pub async fn render_dynamic(
    renderer: &dyn Renderer,
    url: &str,
    cfg: &RenderConfig,
    log: &mut InteractionLog,
) -> Result<String, RenderError> {
    let mut ctx = renderer.new_context().await.map_err(RenderError::Launch)?;

    let outcome = drive(ctx.as_mut(), url, cfg, log).await;

    if let Err(e) = ctx.close().await {
        warn!(url, error = %e, "failed to close browser session");
    }
    outcome
}

/// Run both scroll phases on an already open session.
pub async fn drive(
    ctx: &mut dyn RenderContext,
    url: &str,
    cfg: &RenderConfig,
    log: &mut InteractionLog,
) -> Result<String, RenderError> {
    let nav = ctx
        .navigate(url, cfg.timeout_ms)
        .await
        .map_err(|cause| RenderError::Navigation {
            url: url.to_string(),
            cause,
        })?;
    debug!(url, final_url = %nav.final_url, load_ms = nav.load_time_ms, "page loaded");

    let stop = height_phase(&*ctx, cfg, log).await?;
    debug!(?stop, scrolls = log.scrolls, "height phase finished");
    log.record_page(&ctx.get_url().await?);

    let marker = cfg.content_marker.as_str();
    let Some(initial) = wait_for_count(&*ctx, marker, 0, cfg.timeout(), cfg.poll_interval()).await?
    else {
        return Err(RenderError::MarkerTimeout {
            selector: marker.to_string(),
            timeout_ms: cfg.timeout_ms,
        });
    };

    let stop = marker_phase(&*ctx, cfg, log, initial).await?;
    debug!(?stop, scrolls = log.scrolls, pages = log.pages.len(), "marker phase finished");

    Ok(ctx.get_html().await?)
}

async fn height_phase(
    ctx: &dyn RenderContext,
    cfg: &RenderConfig,
    log: &mut InteractionLog,
) -> Result<StopReason, RenderError> {
    let mut last_height = scroll_height(ctx).await?;

    for _ in 0..cfg.height_scroll_limit {
        ctx.execute_js(SCROLL_TO_BOTTOM_JS).await?;
        tokio::time::sleep(cfg.settle_delay()).await;

        let height = scroll_height(ctx).await?;
        if height <= last_height {
            return Ok(StopReason::HeightUnchanged);
        }
        last_height = height;
        log.scrolls += 1;
    }
    Ok(StopReason::IterationLimit)
}

async fn marker_phase(
    ctx: &dyn RenderContext,
    cfg: &RenderConfig,
    log: &mut InteractionLog,
    initial_count: u64,
) -> Result<StopReason, RenderError> {
    let marker = cfg.content_marker.as_str();
    let mut last_count = initial_count;

    for _ in 0..cfg.mutation_scroll_limit {
        ctx.execute_js(SCROLL_TO_BOTTOM_JS).await?;
        log.scrolls += 1;

        let grown = wait_for_count(
            ctx,
            marker,
            last_count,
            cfg.mutation_timeout(),
            cfg.poll_interval(),
        )
        .await?;
        let Some(count) = grown else {
            return Ok(StopReason::WaitTimeout);
        };
        last_count = count;
        log.record_page(&ctx.get_url().await?);
    }
    Ok(StopReason::IterationLimit)
}

/// Poll until more than `above` elements match `selector`.
///
/// Returns the new count, or `None` once `timeout` has passed. The poll
/// interval starts at `poll` and doubles up to one second.
async fn wait_for_count(
    ctx: &dyn RenderContext,
    selector: &str,
    above: u64,
    timeout: Duration,
    poll: Duration,
) -> Result<Option<u64>, RenderError> {
    let script = format!(
        "document.querySelectorAll({}).length",
        serde_json::Value::from(selector)
    );
    let start = Instant::now();
    let mut interval = poll;

    loop {
        let count = read_number(ctx, &script).await? as u64;
        if count > above {
            return Ok(Some(count));
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(None);
        }
        tokio::time::sleep(interval.min(timeout - elapsed)).await;
        interval = (interval * 2).min(MAX_POLL_INTERVAL);
    }
}

async fn scroll_height(ctx: &dyn RenderContext) -> Result<f64, RenderError> {
    read_number(ctx, SCROLL_HEIGHT_JS).await
}

async fn read_number(ctx: &dyn RenderContext, script: &str) -> Result<f64, RenderError> {
    let value = ctx
        .execute_js(script)
        .await
        .with_context(|| format!("evaluating `{script}`"))?;
    value
        .as_f64()
        .ok_or_else(|| anyhow!("`{script}` returned {value}, expected a number").into())
}
