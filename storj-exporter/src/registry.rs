//! Explicitly constructed scrape registry.

use std::time::Instant;
use tokio::sync::Mutex;
use tracing::debug;

use crate::collectors::Collector;
use crate::error::ExpositionError;
use crate::exposition;
use crate::health::HealthTracker;
use crate::metric::MetricFamily;

pub struct ScrapeRegistry {
    collectors: Vec<Box<dyn Collector>>,
    scrape_lock: Mutex<()>,
    health: HealthTracker,
}

impl ScrapeRegistry {
    pub fn new(collectors: Vec<Box<dyn Collector>>) -> Self {
        Self::with_health(collectors, HealthTracker::new())
    }

    pub fn with_health(collectors: Vec<Box<dyn Collector>>, health: HealthTracker) -> Self {
        Self {
            collectors,
            scrape_lock: Mutex::new(()),
            health,
        }
    }

    pub fn health(&self) -> &HealthTracker {
        &self.health
    }

    pub fn collector_names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    /// Runs every collector in registration order. Concurrent scrapes wait
    /// for each other.
    pub async fn gather(&self) -> Vec<MetricFamily> {
        let _guard = self.scrape_lock.lock().await;
        let started = Instant::now();

        let mut families = Vec::new();
        for collector in &self.collectors {
            let produced = collector.collect().await;
            debug!(collector = collector.name(), families = produced.len(), "collector finished");
            families.extend(produced);
        }

        let samples: usize = families.iter().map(|f| f.samples.len()).sum();
        let elapsed = started.elapsed();
        self.health.record_scrape(families.len(), samples, elapsed);
        debug!(
            families = families.len(),
            samples,
            duration_ms = elapsed.as_millis() as u64,
            "scrape complete"
        );
        families
    }

    pub async fn render(&self) -> Result<String, ExpositionError> {
        let families = self.gather().await;
        exposition::encode(&families)
    }
}
