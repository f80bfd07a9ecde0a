//! Per-satellite metrics.
//!
//! The node snapshot lists the satellites; each one gets its own detail
//! fetch. Month figures are the sum over `bandwidthDaily`, day figures come
//! from its last entry. Families are merged across satellites so each name
//! appears once per scrape, and all of them are declared even when no
//! satellite could be read.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use super::Collector;
use crate::aggregate::{safe_index, sum_by_key, Mapping};
use crate::client::NodeApi;
use crate::metric::{merge_families, MetricFamily, MetricKind, MetricSource, MetricTemplate};
use crate::models::{SatelliteRef, SatelliteSnapshot};

const SAT_LABELS: &[&str] = &["type", "satellite", "url"];

static EMPTY: LazyLock<Mapping> = LazyLock::new(Mapping::new);
static NO_DAY: Value = Value::Null;

struct Descriptor {
    name: &'static str,
    documentation: &'static str,
    keys: &'static [&'static str],
}

impl Descriptor {
    fn template<'a>(&self, source: Option<&'a dyn MetricSource>, satellite: &SatelliteRef) -> MetricTemplate<'a> {
        MetricTemplate::gauge(self.name, self.documentation, source, self.keys)
            .with_labels(SAT_LABELS, vec![satellite.id.clone(), satellite.url.clone()])
    }

    fn skeleton(&self) -> MetricFamily {
        MetricFamily::new(self.name, self.documentation, MetricKind::Gauge, SAT_LABELS)
    }
}

const SUMMARY: Descriptor = Descriptor {
    name: "storj_sat_summary",
    documentation: "Storj satellite summary metrics",
    keys: &[
        "storageSummary",
        "bandwidthSummary",
        "egressSummary",
        "ingressSummary",
        "currentStorageUsed",
        "disqualified",
        "suspended",
    ],
};
const AUDIT: Descriptor = Descriptor {
    name: "storj_sat_audit",
    documentation: "Storj satellite audit metrics",
    keys: &["auditScore", "suspensionScore", "onlineScore"],
};
const MONTH_EGRESS: Descriptor = Descriptor {
    name: "storj_sat_month_egress",
    documentation: "Storj satellite egress since current month start",
    keys: &["repair", "audit", "usage"],
};
const MONTH_INGRESS: Descriptor = Descriptor {
    name: "storj_sat_month_ingress",
    documentation: "Storj satellite ingress since current month start",
    keys: &["repair", "usage"],
};
const DAY_EGRESS: Descriptor = Descriptor {
    name: "storj_sat_day_egress",
    documentation: "Storj satellite egress since current day start",
    keys: &["repair", "audit", "usage"],
};
const DAY_INGRESS: Descriptor = Descriptor {
    name: "storj_sat_day_ingress",
    documentation: "Storj satellite ingress since current day start",
    keys: &["repair", "usage"],
};
const DAY_STORAGE: Descriptor = Descriptor {
    name: "storj_sat_day_storage",
    documentation: "Storj satellite data stored on disk since current day start",
    keys: &["atRestTotal"],
};

const DESCRIPTORS: [&Descriptor; 7] = [
    &SUMMARY,
    &AUDIT,
    &MONTH_EGRESS,
    &MONTH_INGRESS,
    &DAY_EGRESS,
    &DAY_INGRESS,
    &DAY_STORAGE,
];

/// Derived views over one satellite snapshot.
pub struct SatelliteView<'a> {
    snapshot: &'a SatelliteSnapshot,
    pub month_egress: Cow<'a, Mapping>,
    pub month_ingress: Cow<'a, Mapping>,
    pub day_bandwidth: &'a Value,
    pub day_storage: &'a Value,
}

impl<'a> SatelliteView<'a> {
    pub fn new(snapshot: &'a SatelliteSnapshot) -> Self {
        let bandwidth_daily = snapshot.bandwidth_daily.as_deref();
        Self {
            snapshot,
            month_egress: sum_by_key(bandwidth_daily, "egress", &EMPTY),
            month_ingress: sum_by_key(bandwidth_daily, "ingress", &EMPTY),
            day_bandwidth: safe_index(bandwidth_daily, -1, &NO_DAY),
            day_storage: safe_index(snapshot.storage_daily.as_deref(), -1, &NO_DAY),
        }
    }

    /// Templates in declaration order, labelled with the satellite id and url.
    pub fn templates(&self, satellite: &SatelliteRef) -> Vec<MetricTemplate<'_>> {
        let audits = self.snapshot.audits.as_ref().map(|m| m as &dyn MetricSource);
        vec![
            SUMMARY.template(Some(self.snapshot), satellite),
            AUDIT.template(audits, satellite),
            MONTH_EGRESS.template(Some(&*self.month_egress), satellite),
            MONTH_INGRESS.template(Some(&*self.month_ingress), satellite),
            DAY_EGRESS.template(Some(self.day_bandwidth), satellite).with_path(&["egress"]),
            DAY_INGRESS.template(Some(self.day_bandwidth), satellite).with_path(&["ingress"]),
            DAY_STORAGE.template(Some(self.day_storage), satellite),
        ]
    }

    pub fn families(&self, satellite: &SatelliteRef) -> Vec<MetricFamily> {
        self.templates(satellite).iter().map(MetricTemplate::produce).collect()
    }
}

pub struct SatelliteCollector {
    api: Arc<dyn NodeApi>,
    concurrency: usize,
}

impl SatelliteCollector {
    pub fn new(api: Arc<dyn NodeApi>, concurrency: usize) -> Self {
        Self {
            api,
            concurrency: concurrency.max(1),
        }
    }

    async fn fetch(&self, satellite: SatelliteRef) -> (SatelliteRef, SatelliteSnapshot) {
        let mut snapshot = self.api.satellite(&satellite.id).await;
        snapshot.merge_flags(&satellite);
        (satellite, snapshot)
    }
}

#[async_trait]
impl Collector for SatelliteCollector {
    fn name(&self) -> &'static str {
        "sat"
    }

    async fn collect(&self) -> Vec<MetricFamily> {
        let node = self.api.node().await;
        let satellites: Vec<SatelliteRef> = node
            .satellite_refs()
            .filter_map(|entry| match entry {
                Ok(satellite) => Some(satellite),
                Err(e) => {
                    debug!(error = %e, "skipping satellite entry");
                    None
                }
            })
            .collect();

        let fetched: Vec<(SatelliteRef, SatelliteSnapshot)> = stream::iter(satellites)
            .map(|satellite| self.fetch(satellite))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut families: Vec<MetricFamily> = DESCRIPTORS.iter().map(|d| d.skeleton()).collect();
        for (satellite, snapshot) in &fetched {
            families.extend(SatelliteView::new(snapshot).families(satellite));
        }
        merge_families(families)
    }
}
