//! Tunable constants for one scrape call.
//!
//! Defaults match the reference scraper. `from_env` overlays `SIFT_*`
//! environment variables on top of the defaults.

use std::str::FromStr;
use std::time::Duration;

/// Maximum length of a raw-HTML snapshot, in characters.
pub const DEFAULT_MAX_RAW_HTML_CHARS: usize = 2000;

/// User agent sent by the static fetcher.
pub const FETCH_USER_AGENT: &str = "Mozilla/5.0 (compatible; SiftScraper/1.0)";

/// Desktop user agent presented by the headless browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/120.0.0.0 Safari/537.36";

/// Settings for the whole pipeline.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub fetch_timeout_ms: u64,
    pub fetch_user_agent: String,
    pub max_raw_html_chars: usize,
    pub render: RenderConfig,
}

/// Settings for the headless browser and the scroll loop.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Bound on navigation and on the first content-marker wait.
    pub timeout_ms: u64,
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Maximum scrolls in the height-growth phase.
    pub height_scroll_limit: u32,
    /// Pause after each height-phase scroll.
    pub settle_delay_ms: u64,
    /// CSS selector whose element count signals loaded content.
    pub content_marker: String,
    /// Scrolls in the marker-count phase.
    pub mutation_scroll_limit: u32,
    /// Bound on each wait for the marker count to grow.
    pub mutation_timeout_ms: u64,
    /// Initial poll interval for element waits; doubles up to one second.
    pub poll_interval_ms: u64,
    /// Cap on simultaneously open browser sessions.
    pub max_sessions: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 12_000,
            fetch_user_agent: FETCH_USER_AGENT.to_string(),
            max_raw_html_chars: DEFAULT_MAX_RAW_HTML_CHARS,
            render: RenderConfig::default(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            user_agent: BROWSER_USER_AGENT.to_string(),
            viewport_width: 1280,
            viewport_height: 800,
            height_scroll_limit: 3,
            settle_delay_ms: 1500,
            content_marker: ".article".to_string(),
            mutation_scroll_limit: 3,
            mutation_timeout_ms: 10_000,
            poll_interval_ms: 100,
            max_sessions: 4,
        }
    }
}

impl ScrapeConfig {
    /// Defaults overlaid with any `SIFT_*` environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        env_override("SIFT_FETCH_TIMEOUT_MS", &mut cfg.fetch_timeout_ms);
        env_override("SIFT_MAX_RAW_HTML", &mut cfg.max_raw_html_chars);
        env_override("SIFT_RENDER_TIMEOUT_MS", &mut cfg.render.timeout_ms);
        env_override("SIFT_SETTLE_DELAY_MS", &mut cfg.render.settle_delay_ms);
        env_override(
            "SIFT_MUTATION_TIMEOUT_MS",
            &mut cfg.render.mutation_timeout_ms,
        );
        env_override("SIFT_MAX_BROWSER_SESSIONS", &mut cfg.render.max_sessions);
        if let Ok(marker) = std::env::var("SIFT_CONTENT_MARKER") {
            if !marker.trim().is_empty() {
                cfg.render.content_marker = marker.trim().to_string();
            }
        }
        cfg
    }
}

impl RenderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn mutation_timeout(&self) -> Duration {
        Duration::from_millis(self.mutation_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

fn env_override<T: FromStr>(key: &str, slot: &mut T) {
    let Ok(raw) = std::env::var(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => *slot = v,
        Err(_) => tracing::warn!(key, value = %raw, "ignoring unparsable config value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let cfg = ScrapeConfig::default();
        assert_eq!(cfg.max_raw_html_chars, 2000);
        assert_eq!(cfg.fetch_timeout_ms, 12_000);
        assert_eq!(cfg.render.height_scroll_limit, 3);
        assert_eq!(cfg.render.mutation_scroll_limit, 3);
        assert_eq!(cfg.render.settle_delay(), Duration::from_millis(1500));
        assert_eq!(cfg.render.mutation_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.render.content_marker, ".article");
    }

    #[test]
    fn test_env_override_parses_and_ignores_garbage() {
        let mut v: u64 = 5;
        std::env::set_var("SIFT_TEST_OVERRIDE_OK", "42");
        env_override("SIFT_TEST_OVERRIDE_OK", &mut v);
        assert_eq!(v, 42);

        std::env::set_var("SIFT_TEST_OVERRIDE_BAD", "forty-two");
        env_override("SIFT_TEST_OVERRIDE_BAD", &mut v);
        assert_eq!(v, 42);

        env_override("SIFT_TEST_OVERRIDE_MISSING", &mut v);
        assert_eq!(v, 42);
    }

    #[test]
    fn test_poll_interval_never_zero() {
        let cfg = RenderConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(cfg.poll_interval(), Duration::from_millis(1));
    }
}
