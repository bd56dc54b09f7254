//! Environment readiness check.

use crate::config::ScrapeConfig;
use crate::renderer::chromium::find_chromium;
use anyhow::Result;

/// Report Chromium availability and the effective configuration.
pub async fn run() -> Result<()> {
    println!("Sift Doctor");
    println!("===========");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Set SIFT_CHROMIUM_PATH or install Chrome; \
             pages will be scraped statically only."
        ),
    }

    let cfg = ScrapeConfig::from_env();
    println!();
    println!("Fetch timeout:       {}ms", cfg.fetch_timeout_ms);
    println!("Render timeout:      {}ms", cfg.render.timeout_ms);
    println!("Content marker:      {}", cfg.render.content_marker);
    println!("Raw HTML cap:        {} chars", cfg.max_raw_html_chars);
    println!("Browser sessions:    {}", cfg.render.max_sessions);

    println!();
    if chromium_path.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: STATIC ONLY");
    }

    Ok(())
}
