use async_trait::async_trait;
use std::sync::Arc;

use super::Collector;
use crate::client::NodeApi;
use crate::metric::{merge_families, MetricFamily, MetricTemplate};
use crate::models::PayoutSnapshot;

const NAME: &str = "storj_payout_currentMonth";
const DOCUMENTATION: &str = "Storj estimated payouts for current month";
const CURRENT_MONTH_KEYS: &[&str] = &[
    "egressBandwidth",
    "egressBandwidthPayout",
    "egressRepairAudit",
    "egressRepairAuditPayout",
    "diskSpace",
    "diskSpacePayout",
    "heldRate",
    "payout",
    "held",
];

pub struct PayoutCollector {
    api: Arc<dyn NodeApi>,
}

impl PayoutCollector {
    pub fn new(api: Arc<dyn NodeApi>) -> Self {
        Self { api }
    }

    /// One family: the `currentMonth` figures plus the top-level
    /// `currentMonthExpectations` when the node reports it.
    pub fn families(payout: &PayoutSnapshot) -> Vec<MetricFamily> {
        let current_month = MetricTemplate::gauge(NAME, DOCUMENTATION, Some(payout), CURRENT_MONTH_KEYS)
            .with_path(&["currentMonth"]);
        let expectations = MetricTemplate::gauge(NAME, DOCUMENTATION, Some(payout), &["currentMonthExpectations"]);
        merge_families(vec![current_month.produce(), expectations.produce()])
    }
}

#[async_trait]
impl Collector for PayoutCollector {
    fn name(&self) -> &'static str {
        "payout"
    }

    async fn collect(&self) -> Vec<MetricFamily> {
        let payout = self.api.payout().await;
        Self::families(&payout)
    }
}
