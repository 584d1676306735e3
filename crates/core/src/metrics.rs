//! Metrics definitions for patientdesk.
//!
//! This module defines all metrics used by the list and form services.
//! Metrics are collected using the `metrics` crate and can be exported
//! to Prometheus via `metrics-exporter-prometheus`.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "pages_fetched_total",
        "Total number of patient list pages fetched"
    );
    describe_counter!(
        "forward_fill_fetches_total",
        "Pages fetched only to learn the cursor of a later page"
    );
    describe_counter!(
        "navigation_stalls_total",
        "Navigations that stopped before the requested page because results ended"
    );
    describe_counter!(
        "page_fetch_errors_total",
        "Total number of failed page fetches"
    );
    describe_counter!(
        "patient_mutations_total",
        "Patient create/update/delete calls by outcome"
    );
    describe_histogram!(
        "page_fetch_duration_seconds",
        "Time taken to fetch one page in seconds"
    );
}

/// Record a successfully fetched page.
pub fn record_page_fetched() {
    counter!("pages_fetched_total").increment(1);
}

/// Record a page fetched as part of a forward-fill sequence.
pub fn record_forward_fill_fetch() {
    counter!("forward_fill_fetches_total").increment(1);
}

/// Record a navigation that stopped at the last reachable page.
///
/// # Arguments
/// * `requested` - The page the caller asked for
pub fn record_navigation_stall(requested: u32) {
    counter!("navigation_stalls_total", "requested" => requested.to_string()).increment(1);
}

/// Record a failed page fetch.
pub fn record_page_fetch_error() {
    counter!("page_fetch_errors_total").increment(1);
}

/// Record a mutation.
///
/// # Arguments
/// * `kind` - "create", "update" or "delete"
/// * `outcome` - "ok", "not_found", "invalid" or "error"
pub fn record_mutation(kind: &str, outcome: &str) {
    counter!(
        "patient_mutations_total",
        "kind" => kind.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record page fetch duration.
pub fn record_page_fetch_duration(duration_secs: f64) {
    histogram!("page_fetch_duration_seconds").record(duration_secs);
}

/// A timer that automatically records fetch duration when dropped.
pub struct FetchTimer {
    start: Instant,
}

impl FetchTimer {
    /// Start a new fetch timer.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for FetchTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FetchTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_page_fetch_duration(duration);
    }
}
