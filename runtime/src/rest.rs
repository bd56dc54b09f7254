// Copyright 2026 Sift Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST API for Sift.
//!
//! `POST /scrape` runs the pipeline for one URL and `GET /healthz` reports
//! liveness. `GET /` serves a small browser front-end for manual use. A
//! scrape always answers 200; failures live in the result's `errors` array.

use crate::pipeline::Scraper;
use crate::types::ScrapeResult;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Body of `POST /scrape`. A missing `url` is scraped as the empty string,
/// which the pipeline reports through its error records.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Response of `POST /scrape`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub result: ScrapeResult,
}

/// Build the axum Router with all REST endpoints.
pub fn router(scraper: Arc<Scraper>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/static/app.js", get(app_js))
        .route("/healthz", get(health))
        .route("/scrape", post(handle_scrape))
        .layer(cors)
        .with_state(scraper)
}

/// Start the REST API server on `host:port`.
pub async fn start(host: &str, port: u16, scraper: Arc<Scraper>) -> anyhow::Result<()> {
    let app = router(scraper);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("REST API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────

/// Serve the embedded front-end page.
async fn index() -> impl IntoResponse {
    Html(include_str!("ui/index.html"))
}

async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        include_str!("ui/app.js"),
    )
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn handle_scrape(
    State(scraper): State<Arc<Scraper>>,
    Json(body): Json<ScrapeRequest>,
) -> Json<ScrapeResponse> {
    let url = body.url.unwrap_or_default().trim().to_string();
    let result = scraper.scrape(&url).await;
    Json(ScrapeResponse { result })
}
