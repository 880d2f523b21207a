//! Driver layer for browser automation.
//!
//! This crate wraps a WebDriver client so the session, extraction, and
//! actuation crates never touch `fantoccini` types directly.
//!
//! - [`review_browser::driver::ReviewBrowser`]: WebDriver client wrapper and
//!   cookie injection
//! - [`review_browser::page::BrowserPage`]: short-lived tab with bounded
//!   navigation and CSS query helpers
//! - [`review_browser::pacer::Pacer`]: human-like timings and typing
//! - [`review_browser::unattended`]: launch arguments and automation-signal
//!   evasions for headless hosts
pub mod review_browser;
