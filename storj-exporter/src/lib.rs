//! Prometheus exporter for the Storj storage node dashboard API.
//!
//! One scrape fetches fresh snapshots from the node, turns them into metric
//! families through declarative templates and renders the text exposition.

pub mod aggregate;
pub mod client;
pub mod collectors;
pub mod config;
pub mod error;
pub mod exposition;
pub mod health;
pub mod http;
pub mod logging;
pub mod metric;
pub mod models;
pub mod registry;
pub mod shutdown;

pub use client::{ApiClient, NodeApi};
pub use collectors::{build_collectors, Collector};
pub use config::{CollectorKind, ExporterConfig};
pub use metric::{MetricFamily, MetricKind, MetricTemplate, Sample, SampleValue};
pub use registry::ScrapeRegistry;
