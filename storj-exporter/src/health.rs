use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Body of `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterHealth {
    pub status: String,
    pub uptime_seconds: u64,
    pub scrapes_total: u64,
    pub last_scrape: Option<ScrapeSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrapeSummary {
    pub families: usize,
    pub samples: usize,
    pub duration_ms: u64,
    pub seconds_ago: u64,
}

#[derive(Debug, Clone, Copy)]
struct LastScrape {
    at: Instant,
    families: usize,
    samples: usize,
    duration: Duration,
}

#[derive(Clone)]
pub struct HealthTracker {
    start_time: Instant,
    scrapes: Arc<AtomicU64>,
    last_scrape: Arc<Mutex<Option<LastScrape>>>,
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            scrapes: Arc::new(AtomicU64::new(0)),
            last_scrape: Arc::new(Mutex::new(None)),
        }
    }

    pub fn record_scrape(&self, families: usize, samples: usize, duration: Duration) {
        self.scrapes.fetch_add(1, Ordering::Relaxed);
        *self.last_scrape.lock() = Some(LastScrape {
            at: Instant::now(),
            families,
            samples,
            duration,
        });
    }

    pub fn scrapes_total(&self) -> u64 {
        self.scrapes.load(Ordering::Relaxed)
    }

    pub fn get_health(&self) -> ExporterHealth {
        let last_scrape = (*self.last_scrape.lock()).map(|last| ScrapeSummary {
            families: last.families,
            samples: last.samples,
            duration_ms: last.duration.as_millis() as u64,
            seconds_ago: last.at.elapsed().as_secs(),
        });

        ExporterHealth {
            status: "alive".to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            scrapes_total: self.scrapes_total(),
            last_scrape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_tracker() {
        let health = HealthTracker::new().get_health();
        assert_eq!(health.status, "alive");
        assert_eq!(health.scrapes_total, 0);
        assert!(health.last_scrape.is_none());
    }

    #[test]
    fn test_record_scrape_is_shared_between_clones() {
        let tracker = HealthTracker::new();
        let clone = tracker.clone();
        clone.record_scrape(13, 120, Duration::from_millis(250));
        clone.record_scrape(13, 118, Duration::from_millis(40));

        let health = tracker.get_health();
        assert_eq!(health.scrapes_total, 2);
        let last = health.last_scrape.unwrap();
        assert_eq!(last.samples, 118);
        assert_eq!(last.duration_ms, 40);
    }
}
