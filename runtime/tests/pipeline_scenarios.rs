//! End-to-end pipeline scenarios.
//!
//! The static side is a wiremock server; the dynamic side is a scripted
//! in-memory browser session whose marker count and URL change per scroll.

use assert_json_diff::assert_json_include;
use async_trait::async_trait;
use serde_json::json;
use sift_runtime::config::{RenderConfig, ScrapeConfig};
use sift_runtime::renderer::{NavigationResult, RenderContext, Renderer};
use sift_runtime::types::{ErrorPhase, Meta, SectionType};
use sift_runtime::Scraper;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test doubles ──

#[derive(Clone, Default)]
struct BrowserScript {
    /// Markup returned after scrolling; `None` makes the marker never appear.
    html: Option<String>,
    /// Marker count by number of scrolls so far (last value repeats).
    counts: Vec<u64>,
    /// Current URL by number of scrolls so far (last value repeats).
    urls: Vec<String>,
}

struct ScriptedBrowser {
    script: BrowserScript,
    sessions: AtomicUsize,
    closed: Arc<AtomicUsize>,
}

impl ScriptedBrowser {
    fn new(script: BrowserScript) -> Arc<Self> {
        Arc::new(Self {
            script,
            sessions: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Renderer for ScriptedBrowser {
    async fn new_context(&self) -> anyhow::Result<Box<dyn RenderContext>> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            script: self.script.clone(),
            scrolls: Mutex::new(0),
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct ScriptedSession {
    script: BrowserScript,
    scrolls: Mutex<usize>,
    closed: Arc<AtomicUsize>,
}

fn nth<T: Clone>(items: &[T], i: usize) -> T {
    items[i.min(items.len() - 1)].clone()
}

#[async_trait]
impl RenderContext for ScriptedSession {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> anyhow::Result<NavigationResult> {
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 0,
        })
    }

    async fn execute_js(&self, script: &str) -> anyhow::Result<serde_json::Value> {
        let mut scrolls = self.scrolls.lock().unwrap();
        if script.starts_with("window.scrollTo") {
            *scrolls += 1;
        }
        if script.contains("querySelectorAll") {
            if self.script.html.is_none() {
                return Ok(json!(0));
            }
            return Ok(json!(nth(&self.script.counts, *scrolls)));
        }
        // Constant document height: the height phase stops after one scroll.
        Ok(json!(900))
    }

    async fn get_html(&self) -> anyhow::Result<String> {
        Ok(self.script.html.clone().unwrap_or_default())
    }

    async fn get_url(&self) -> anyhow::Result<String> {
        Ok(nth(&self.script.urls, *self.scrolls.lock().unwrap()))
    }

    async fn close(self: Box<Self>) -> anyhow::Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── Helpers ──

fn fast_config() -> ScrapeConfig {
    ScrapeConfig {
        fetch_timeout_ms: 2_000,
        render: RenderConfig {
            timeout_ms: 30,
            settle_delay_ms: 0,
            mutation_timeout_ms: 20,
            poll_interval_ms: 1,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn article_page(title: &str, n: usize, extra: &str) -> String {
    let body: String = (0..n)
        .map(|i| {
            format!(
                "<article><h2>Headline {i}</h2>\
                 <p>This article body is comfortably longer than fifty characters.</p>\
                 <a href=\"/story/{i}\">Read more</a></article>"
            )
        })
        .collect();
    format!(
        "<html lang=\"en\"><head><title>{title}</title>\
         <meta name=\"description\" content=\"{title} description\">\
         <link rel=\"canonical\" href=\"https://example.com/canonical\"></head>\
         <body>{extra}{body}</body></html>"
    )
}

async fn serve(html: String) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;
    server
}

fn scraper(renderer: Arc<ScriptedBrowser>) -> Scraper {
    Scraper::new(
        Arc::new(sift_runtime::acquisition::HttpClient::new(
            "sift-test/1.0",
            2_000,
        )),
        renderer,
        fast_config(),
    )
}

// ── Scenarios ──

#[tokio::test]
async fn scenario_a_static_page_is_enough() {
    let server = serve(article_page("Static", 3, "")).await;
    let url = format!("{}/", server.uri());
    let browser = ScriptedBrowser::new(BrowserScript::default());

    let result = scraper(Arc::clone(&browser)).scrape(&url).await;

    assert_eq!(result.sections.len(), 3);
    assert!(result.errors.is_empty());
    assert_eq!(browser.sessions.load(Ordering::SeqCst), 0);
    assert_eq!(result.meta.title, "Static");
    assert_eq!(result.meta.description, "Static description");
    assert_eq!(result.meta.language, "en");
    assert_eq!(
        result.meta.canonical.as_deref(),
        Some("https://example.com/canonical")
    );
    assert_eq!(result.interactions.scrolls, 0);
    assert_eq!(result.interactions.pages, vec![url.clone()]);

    let first = &result.sections[0];
    assert_eq!(first.id, "article-0");
    assert_eq!(first.kind, SectionType::Section);
    assert_eq!(first.label, "Headline 0");
    assert_eq!(first.content.links[0].href, format!("{}/story/0", server.uri()));
}

#[tokio::test]
async fn scenario_b_fetch_and_render_both_fail() {
    // Nothing listens on port 1.
    let url = "http://127.0.0.1:1/";
    let browser = ScriptedBrowser::new(BrowserScript::default());

    let result = scraper(Arc::clone(&browser)).scrape(url).await;

    let phases: Vec<ErrorPhase> = result.errors.iter().map(|e| e.phase).collect();
    assert_eq!(phases, vec![ErrorPhase::Fetch, ErrorPhase::Render]);
    assert!(result.errors[1].message.contains(".article"));
    assert!(result.sections.is_empty());
    assert_eq!(result.meta, Meta::default());
    assert_eq!(browser.sessions.load(Ordering::SeqCst), 1);
    assert_eq!(browser.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn scenario_b_fetch_fails_render_recovers() {
    let url = "http://127.0.0.1:1/";
    let browser = ScriptedBrowser::new(BrowserScript {
        html: Some(article_page("Rendered", 4, "")),
        counts: vec![4],
        urls: vec![url.to_string()],
    });

    let result = scraper(browser).scrape(url).await;

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].phase, ErrorPhase::Fetch);
    assert_eq!(result.sections.len(), 4);
    // Meta comes from the static fetch only.
    assert_eq!(result.meta, Meta::default());
}

#[tokio::test]
async fn scenario_c_few_sections_replaced_by_render() {
    let server = serve(article_page("Partial", 2, "")).await;
    let url = format!("{}/", server.uri());
    let rendered = article_page("Full", 6, "");
    let browser = ScriptedBrowser::new(BrowserScript {
        html: Some(rendered),
        counts: vec![2, 2, 6, 6],
        urls: vec![url.clone()],
    });

    let result = scraper(Arc::clone(&browser)).scrape(&url).await;

    assert!(result.errors.is_empty());
    assert_eq!(result.sections.len(), 6);
    assert_eq!(result.sections[5].id, "article-5");
    assert_eq!(result.meta.title, "Partial");
    // Height phase scroll does not count; two marker-phase scrolls do.
    assert_eq!(result.interactions.scrolls, 2);
    assert_eq!(browser.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn pagination_marker_triggers_render_on_rich_page() {
    let server = serve(article_page(
        "Feed",
        5,
        "<a class=\"pagination__next\" href=\"/page/2\">Next</a>",
    ))
    .await;
    let url = format!("{}/", server.uri());
    let browser = ScriptedBrowser::new(BrowserScript {
        html: Some(article_page("Feed", 8, "")),
        counts: vec![5],
        urls: vec![url.clone()],
    });

    let result = scraper(Arc::clone(&browser)).scrape(&url).await;

    assert_eq!(browser.sessions.load(Ordering::SeqCst), 1);
    assert_eq!(result.sections.len(), 8);
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn render_failure_keeps_static_sections() {
    let server = serve(article_page("Partial", 2, "")).await;
    let url = format!("{}/", server.uri());
    let browser = ScriptedBrowser::new(BrowserScript::default());

    let result = scraper(browser).scrape(&url).await;

    assert_eq!(result.sections.len(), 2);
    assert_eq!(result.meta.title, "Partial");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].phase, ErrorPhase::Render);
}

#[tokio::test]
async fn empty_everywhere_yields_parse_error() {
    let server = serve("<html><body><p>tiny</p></body></html>".to_string()).await;
    let url = format!("{}/", server.uri());
    let browser = ScriptedBrowser::new(BrowserScript {
        html: Some("<html><body><div class=\"article\">x</div></body></html>".into()),
        counts: vec![1],
        urls: vec![url.clone()],
    });

    let result = scraper(browser).scrape(&url).await;

    assert!(result.sections.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].phase, ErrorPhase::Parse);
    assert_eq!(
        result.errors[0].message,
        "No meaningful content sections found"
    );
}

#[tokio::test]
async fn http_error_status_recorded_as_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let url = format!("{}/missing", server.uri());
    let browser = ScriptedBrowser::new(BrowserScript::default());

    let result = scraper(browser).scrape(&url).await;

    assert_eq!(result.errors[0].phase, ErrorPhase::Fetch);
    assert!(result.errors[0].message.contains("404"));
}

#[tokio::test]
async fn pages_never_repeat() {
    let server = serve(article_page("Feed", 1, "")).await;
    let url = format!("{}/", server.uri());
    let page2 = format!("{}/?page=2", server.uri());
    let browser = ScriptedBrowser::new(BrowserScript {
        html: Some(article_page("Feed", 4, "")),
        counts: vec![1, 1, 2, 3, 4],
        urls: vec![url.clone(), url.clone(), page2.clone(), url.clone(), page2.clone()],
    });

    let result = scraper(browser).scrape(&url).await;

    assert_eq!(result.interactions.pages, vec![url, page2]);
    let unique: HashSet<&String> = result.interactions.pages.iter().collect();
    assert_eq!(unique.len(), result.interactions.pages.len());
}

#[tokio::test]
async fn no_errors_implies_sections() {
    let pages = [
        article_page("One", 1, ""),
        article_page("Three", 3, ""),
        "<html><body></body></html>".to_string(),
    ];
    for page in pages {
        let server = serve(page).await;
        let url = format!("{}/", server.uri());
        let browser = ScriptedBrowser::new(BrowserScript::default());
        let result = scraper(browser).scrape(&url).await;
        assert!(!result.errors.is_empty() || !result.sections.is_empty());
    }
}

#[tokio::test]
async fn result_serializes_to_documented_shape() {
    let server = serve(article_page("Shape", 3, "")).await;
    let url = format!("{}/", server.uri());
    let browser = ScriptedBrowser::new(BrowserScript::default());

    let result = scraper(browser).scrape(&url).await;
    let value = serde_json::to_value(&result).unwrap();

    assert_json_include!(
        actual: value.clone(),
        expected: json!({
            "url": url,
            "meta": {
                "title": "Shape",
                "description": "Shape description",
                "language": "en",
                "canonical": "https://example.com/canonical"
            },
            "sections": [{
                "id": "article-0",
                "type": "section",
                "label": "Headline 0",
                "sourceUrl": url,
                "content": {
                    "headings": ["Headline 0"],
                    "links": [{ "text": "Read more" }],
                    "images": [],
                    "lists": [],
                    "tables": []
                },
                "truncated": false
            }],
            "interactions": { "clicks": [], "scrolls": 0, "pages": [url] },
            "errors": []
        })
    );
    let scraped_at = value["scrapedAt"].as_str().unwrap();
    assert!(scraped_at.ends_with('Z'));
    assert!(chrono::DateTime::parse_from_rfc3339(scraped_at).is_ok());
}
