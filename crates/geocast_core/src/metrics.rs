//! Performance metrics collection for the simulation.
//!
//! Provides structured logging and metrics tracking for monitoring
//! simulation performance and health.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Rounds between periodic info-level summaries.
const LOG_EVERY: u64 = 100;

/// Metrics collector for simulation statistics.
pub struct Metrics {
    round_count: AtomicU64,
    node_count: AtomicU64,
    active_sources: AtomicU64,
    deliveries: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Creates a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            round_count: AtomicU64::new(0),
            node_count: AtomicU64::new(0),
            active_sources: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed round with its duration.
    pub fn record_round(&self, duration: Duration, nodes: usize, sources: usize, delivered: usize) {
        self.round_count.fetch_add(1, Ordering::Relaxed);
        self.node_count.store(nodes as u64, Ordering::Relaxed);
        self.active_sources.store(sources as u64, Ordering::Relaxed);
        self.deliveries.fetch_add(delivered as u64, Ordering::Relaxed);

        let round = self.round_count.load(Ordering::Relaxed);
        if round % LOG_EVERY == 0 {
            tracing::info!(
                round = round,
                nodes = nodes,
                sources = sources,
                deliveries = self.deliveries.load(Ordering::Relaxed),
                duration_ms = duration.as_millis() as u64,
                "Simulation round"
            );
        }
    }

    /// Increments a named counter.
    pub fn increment_counter(&self, name: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Current value of a named counter, 0 if never incremented.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    #[must_use]
    pub fn round_count(&self) -> u64 {
        self.round_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn node_count(&self) -> u64 {
        self.node_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn active_sources(&self) -> u64 {
        self.active_sources.load(Ordering::Relaxed)
    }

    /// Total deliveries across all rounds.
    #[must_use]
    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
pub fn init_logging() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )
    .ok();
}
