//! Typed snapshots of the storage node dashboard API.
//!
//! Scalars the API may omit are `Option<Value>`; sub-objects whose keys move
//! between releases stay as [`Mapping`]s. Shapes that do not match are read
//! leniently as `None`, so one bad field only costs the samples built from it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::aggregate::{is_truthy, Mapping};
use crate::error::SatelliteEntryError;
use crate::metric::MetricSource;

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Reads a snapshot out of a raw payload; anything unreadable is the empty snapshot.
pub fn from_payload<T: DeserializeOwned + Default>(payload: Value) -> T {
    serde_json::from_value(payload).unwrap_or_default()
}

/// `GET /api/sno/`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    #[serde(rename = "nodeID")]
    pub node_id: Option<Value>,
    pub wallet: Option<Value>,
    pub last_pinged: Option<Value>,
    pub up_to_date: Option<Value>,
    pub version: Option<Value>,
    pub allowed_version: Option<Value>,
    pub started_at: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub disk_space: Option<Mapping>,
    #[serde(default, deserialize_with = "lenient")]
    pub bandwidth: Option<Mapping>,
    #[serde(default, deserialize_with = "lenient")]
    pub satellites: Option<Vec<Value>>,
}

impl NodeSnapshot {
    /// One entry per reported satellite, in upstream order.
    pub fn satellite_refs(&self) -> impl Iterator<Item = Result<SatelliteRef, SatelliteEntryError>> + '_ {
        self.satellites
            .iter()
            .flatten()
            .map(SatelliteRef::from_entry)
    }
}

impl MetricSource for NodeSnapshot {
    fn value(&self, key: &str) -> Option<&Value> {
        match key {
            "nodeID" => self.node_id.as_ref(),
            "wallet" => self.wallet.as_ref(),
            "lastPinged" => self.last_pinged.as_ref(),
            "upToDate" => self.up_to_date.as_ref(),
            "version" => self.version.as_ref(),
            "allowedVersion" => self.allowed_version.as_ref(),
            "startedAt" => self.started_at.as_ref(),
            _ => None,
        }
    }
}

/// A satellite as listed in the node snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SatelliteRef {
    pub id: String,
    pub url: String,
    pub disqualified: bool,
    pub suspended: bool,
}

impl SatelliteRef {
    /// The API reports `disqualified`/`suspended` as a timestamp or null.
    pub fn from_entry(entry: &Value) -> Result<Self, SatelliteEntryError> {
        let entry = entry.as_object().ok_or(SatelliteEntryError::NotAnObject)?;
        let id = entry
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(SatelliteEntryError::MissingId)?;
        let url = entry
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| SatelliteEntryError::MissingUrl(id.to_string()))?;

        Ok(Self {
            id: id.to_string(),
            url: url.to_string(),
            disqualified: is_truthy(entry.get("disqualified")),
            suspended: is_truthy(entry.get("suspended")),
        })
    }
}

/// `GET /api/sno/satellite/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteSnapshot {
    pub storage_summary: Option<Value>,
    pub bandwidth_summary: Option<Value>,
    pub egress_summary: Option<Value>,
    pub ingress_summary: Option<Value>,
    pub current_storage_used: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub audits: Option<Mapping>,
    /// Chronological, last entry is the current (partial) day.
    #[serde(default, deserialize_with = "lenient")]
    pub bandwidth_daily: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub storage_daily: Option<Vec<Value>>,
    /// Filled from the node's satellite list, see [`SatelliteSnapshot::merge_flags`].
    #[serde(skip)]
    pub disqualified: Option<Value>,
    #[serde(skip)]
    pub suspended: Option<Value>,
}

impl SatelliteSnapshot {
    pub fn merge_flags(&mut self, satellite: &SatelliteRef) {
        self.disqualified = Some(Value::from(u8::from(satellite.disqualified)));
        self.suspended = Some(Value::from(u8::from(satellite.suspended)));
    }
}

impl MetricSource for SatelliteSnapshot {
    fn value(&self, key: &str) -> Option<&Value> {
        match key {
            "storageSummary" => self.storage_summary.as_ref(),
            "bandwidthSummary" => self.bandwidth_summary.as_ref(),
            "egressSummary" => self.egress_summary.as_ref(),
            "ingressSummary" => self.ingress_summary.as_ref(),
            "currentStorageUsed" => self.current_storage_used.as_ref(),
            "disqualified" => self.disqualified.as_ref(),
            "suspended" => self.suspended.as_ref(),
            _ => None,
        }
    }
}

/// `GET /api/sno/estimated-payout`
///
/// Kept as the raw object: the interesting numbers sit under `currentMonth`,
/// which the payout collector reaches through a template extraction path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PayoutSnapshot {
    pub raw: Mapping,
}

impl MetricSource for PayoutSnapshot {
    fn value(&self, key: &str) -> Option<&Value> {
        self.raw.value(key)
    }
}
