//! Collectors turn one upstream snapshot into metric families per scrape.
//!
//! Every collector fetches fresh data on each `collect()` and keeps it in a
//! local, so concurrent calls never observe a half-replaced snapshot.

mod node;
mod payout;
mod satellite;

pub use node::NodeCollector;
pub use payout::PayoutCollector;
pub use satellite::{SatelliteCollector, SatelliteView};

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::client::NodeApi;
use crate::config::{CollectorKind, ExporterConfig};
use crate::metric::MetricFamily;

#[async_trait]
pub trait Collector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Never fails: upstream problems show up as families without samples.
    async fn collect(&self) -> Vec<MetricFamily>;
}

/// The node collector first, then the optional ones in configuration order.
pub fn build_collectors(config: &ExporterConfig, api: Arc<dyn NodeApi>) -> Vec<Box<dyn Collector>> {
    let mut collectors: Vec<Box<dyn Collector>> = vec![Box::new(NodeCollector::new(api.clone()))];
    for kind in config.enabled_collectors() {
        match kind {
            CollectorKind::Payout => collectors.push(Box::new(PayoutCollector::new(api.clone()))),
            CollectorKind::Satellite => collectors.push(Box::new(SatelliteCollector::new(
                api.clone(),
                config.satellite_concurrency,
            ))),
        }
    }
    for collector in &collectors {
        info!(collector = collector.name(), "registered collector");
    }
    collectors
}

#[cfg(test)]
pub(crate) mod stub {
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;

    use crate::client::NodeApi;
    use crate::models::{from_payload, NodeSnapshot, PayoutSnapshot, SatelliteSnapshot};

    /// Serves canned payloads; unknown satellites get the empty snapshot,
    /// the same thing the real client returns after a failed call.
    #[derive(Default)]
    pub struct StubApi {
        pub node: Value,
        pub payout: Value,
        pub satellites: HashMap<String, Value>,
    }

    #[async_trait]
    impl NodeApi for StubApi {
        async fn node(&self) -> NodeSnapshot {
            from_payload(self.node.clone())
        }

        async fn payout(&self) -> PayoutSnapshot {
            from_payload(self.payout.clone())
        }

        async fn satellite(&self, id: &str) -> SatelliteSnapshot {
            self.satellites
                .get(id)
                .cloned()
                .map(from_payload)
                .unwrap_or_default()
        }
    }
}
