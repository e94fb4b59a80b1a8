// src/checker/mod.rs
// =============================================================================
// This module contains all feed URL checking logic.
//
// Submodules:
// - http: Makes HTTP requests to check if feeds are alive
//
// This file (mod.rs) is the module root - it re-exports the public API so
// callers can write `checker::check_url()` instead of
// `checker::http::check_url()`.
// =============================================================================

mod http;

pub use http::{
    build_client, check_urls, failure_line, CheckOptions, UrlCheckResult, DEFAULT_TIMEOUT_SECS, USER_AGENT,
};

#[cfg(test)]
pub(crate) use http::test_client;
