// Copyright 2026 Sift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sift runtime library: fetch a page, decide whether it needs a browser,
//! and extract typed content sections with a resilient error record.

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod extraction;
pub mod pipeline;
pub mod renderer;
pub mod rest;
pub mod types;

pub use config::ScrapeConfig;
pub use pipeline::Scraper;
pub use types::ScrapeResult;
