//! Process-local parse counters.
//!
//! These back the `where_parse` tracing lane. They are monotonic between
//! calls to [`reset_parse_metrics`] and never influence parsing.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of parser observability counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseMetricsSnapshot {
    /// Fresh tokens read from source text (pushed-back tokens are not recounted).
    pub docwhere_tokens_total: u64,
    /// `parse_where` invocations.
    pub docwhere_parses_total: u64,
    /// Invocations that returned a predicate.
    pub docwhere_parses_ok_total: u64,
    /// Invocations that failed with a syntax error.
    pub docwhere_syntax_errors_total: u64,
    /// Field entries across all successfully parsed predicates.
    pub docwhere_predicate_fields_total: u64,
}

static TOKENS_TOTAL: AtomicU64 = AtomicU64::new(0);
static PARSES_TOTAL: AtomicU64 = AtomicU64::new(0);
static PARSES_OK_TOTAL: AtomicU64 = AtomicU64::new(0);
static SYNTAX_ERRORS_TOTAL: AtomicU64 = AtomicU64::new(0);
static PREDICATE_FIELDS_TOTAL: AtomicU64 = AtomicU64::new(0);

pub(crate) fn record_token() {
    TOKENS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_parse_start() {
    PARSES_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_parse_ok(fields: usize) {
    PARSES_OK_TOTAL.fetch_add(1, Ordering::Relaxed);
    let fields = u64::try_from(fields).unwrap_or(u64::MAX);
    PREDICATE_FIELDS_TOTAL.fetch_add(fields, Ordering::Relaxed);
}

pub(crate) fn record_syntax_error() {
    SYNTAX_ERRORS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

/// Read all counters.
#[must_use]
pub fn parse_metrics_snapshot() -> ParseMetricsSnapshot {
    ParseMetricsSnapshot {
        docwhere_tokens_total: TOKENS_TOTAL.load(Ordering::Relaxed),
        docwhere_parses_total: PARSES_TOTAL.load(Ordering::Relaxed),
        docwhere_parses_ok_total: PARSES_OK_TOTAL.load(Ordering::Relaxed),
        docwhere_syntax_errors_total: SYNTAX_ERRORS_TOTAL.load(Ordering::Relaxed),
        docwhere_predicate_fields_total: PREDICATE_FIELDS_TOTAL.load(Ordering::Relaxed),
    }
}

/// Zero all counters (tests and benchmarks).
pub fn reset_parse_metrics() {
    TOKENS_TOTAL.store(0, Ordering::Relaxed);
    PARSES_TOTAL.store(0, Ordering::Relaxed);
    PARSES_OK_TOTAL.store(0, Ordering::Relaxed);
    SYNTAX_ERRORS_TOTAL.store(0, Ordering::Relaxed);
    PREDICATE_FIELDS_TOTAL.store(0, Ordering::Relaxed);
}
