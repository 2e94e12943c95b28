//! Shared state behind the /health endpoint.
//! Updated by startup and the result-entry route.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::Serialize;

#[derive(Default)]
pub struct HealthState {
    /// True once the startup standings sweep has finished.
    pub standings_ready: AtomicBool,
    /// Results entered or cleared since startup.
    pub results_entered: AtomicU64,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub standings_ready: bool,
    pub leagues_cached: usize,
    pub results_entered: u64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_standings_ready(&self, v: bool) {
        self.standings_ready.store(v, Ordering::Relaxed);
    }

    pub fn inc_results_entered(&self) {
        self.results_entered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report(&self, leagues_cached: usize) -> HealthReport {
        HealthReport {
            standings_ready: self.standings_ready.load(Ordering::Relaxed),
            leagues_cached,
            results_entered: self.results_entered.load(Ordering::Relaxed),
        }
    }
}
