use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Operator-facing counters. Failures that are absorbed on the client path
/// still show up here.
#[derive(Debug, Default)]
pub struct Metrics {
    connections_opened: AtomicU64,
    connections_closed: AtomicU64,
    messages_received: AtomicU64,
    bad_requests: AtomicU64,
    lookup_errors: AtomicU64,
    enrichment_errors: AtomicU64,
    scans_logged: AtomicU64,
    audit_failures: AtomicU64,
    deadline_elapsed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub connections_opened: u64,
    pub connections_closed: u64,
    pub messages_received: u64,
    pub bad_requests: u64,
    pub lookup_errors: u64,
    pub enrichment_errors: u64,
    pub scans_logged: u64,
    pub audit_failures: u64,
    pub deadline_elapsed: u64,
}

impl Metrics {
    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bad_request(&self) {
        self.bad_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn lookup_error(&self) {
        self.lookup_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn enrichment_error(&self) {
        self.enrichment_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn scan_logged(&self) {
        self.scans_logged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn audit_failure(&self) {
        self.audit_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn deadline_elapsed(&self) {
        self.deadline_elapsed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            bad_requests: self.bad_requests.load(Ordering::Relaxed),
            lookup_errors: self.lookup_errors.load(Ordering::Relaxed),
            enrichment_errors: self.enrichment_errors.load(Ordering::Relaxed),
            scans_logged: self.scans_logged.load(Ordering::Relaxed),
            audit_failures: self.audit_failures.load(Ordering::Relaxed),
            deadline_elapsed: self.deadline_elapsed.load(Ordering::Relaxed),
        }
    }
}
