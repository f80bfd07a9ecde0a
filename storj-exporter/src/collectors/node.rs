use async_trait::async_trait;
use std::sync::Arc;

use super::Collector;
use crate::client::NodeApi;
use crate::metric::{MetricFamily, MetricSource, MetricTemplate};
use crate::models::NodeSnapshot;

const NODE_INFO_KEYS: &[&str] = &[
    "nodeID",
    "wallet",
    "lastPinged",
    "upToDate",
    "version",
    "allowedVersion",
    "startedAt",
];

pub struct NodeCollector {
    api: Arc<dyn NodeApi>,
}

impl NodeCollector {
    pub fn new(api: Arc<dyn NodeApi>) -> Self {
        Self { api }
    }

    pub fn families(node: &NodeSnapshot) -> Vec<MetricFamily> {
        let disk_space = node.disk_space.as_ref().map(|m| m as &dyn MetricSource);
        let bandwidth = node.bandwidth.as_ref().map(|m| m as &dyn MetricSource);
        [
            MetricTemplate::info("storj_node", "Storj node info", Some(node), NODE_INFO_KEYS),
            MetricTemplate::gauge(
                "storj_total_diskspace",
                "Storj total diskspace metrics",
                disk_space,
                &["used", "available", "trash"],
            ),
            MetricTemplate::gauge(
                "storj_total_bandwidth",
                "Storj total bandwidth metrics",
                bandwidth,
                &["used", "available"],
            ),
        ]
        .iter()
        .map(MetricTemplate::produce)
        .collect()
    }
}

#[async_trait]
impl Collector for NodeCollector {
    fn name(&self) -> &'static str {
        "node"
    }

    async fn collect(&self) -> Vec<MetricFamily> {
        let node = self.api.node().await;
        Self::families(&node)
    }
}
