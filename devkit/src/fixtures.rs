//! Payloads shaped like a v1.x storage node dashboard API.

use serde_json::{json, Value};

pub const SAT_US1: &str = "12EayRS2V1kEsWESU9QMRseFhdxYxKicsiFmxrsLZHeLUtdps3S";
pub const SAT_EU1: &str = "12L9ZFwhzVpuEKMUNUqkaTLGzwY9G24tbiigLiXpmZWKwmcNDDs";
pub const SAT_AP1: &str = "121RTSDpyNZVcEU84Ticf2L1ntiuUimbWgfATz21tuvgk3vzoA6";

pub const SATELLITES: [(&str, &str); 3] = [
    (SAT_US1, "us1.storj.io:7777"),
    (SAT_EU1, "eu1.storj.io:7777"),
    (SAT_AP1, "ap1.storj.io:7777"),
];

/// `GET /api/sno/`. The EU satellite is suspended.
pub fn node() -> Value {
    let satellites: Vec<Value> = SATELLITES
        .iter()
        .map(|(id, url)| {
            let suspended = if *id == SAT_EU1 {
                json!("2021-06-01T10:00:00Z")
            } else {
                Value::Null
            };
            json!({
                "id": id,
                "url": url,
                "disqualified": null,
                "suspended": suspended,
                "currentStorageUsed": 1000
            })
        })
        .collect();

    json!({
        "nodeID": "1tXxQhYvkLBNh3dxNq3qjCAc2xhr8fJ4NH7AK3qa3sLZmcWjK6",
        "wallet": "0x0123456789abcdef0123456789abcdef01234567",
        "walletFeatures": null,
        "satellites": satellites,
        "diskSpace": {"used": 1500000000, "available": 2000000000, "trash": 2500, "overused": 0},
        "bandwidth": {"used": 64000, "available": 0},
        "lastPinged": "2021-06-15T12:00:00.000Z",
        "version": "1.37.1",
        "allowedVersion": "1.24.0",
        "upToDate": true,
        "startedAt": "2021-06-10T08:00:00.000Z",
        "configuredPort": "28967",
        "quicStatus": "OK"
    })
}

/// `GET /api/sno/satellite/{id}` with two days of bandwidth.
pub fn satellite() -> Value {
    json!({
        "id": SAT_US1,
        "storageDaily": [
            {"atRestTotal": 1000.5, "intervalStart": "2021-06-14T00:00:00Z"},
            {"atRestTotal": 2000.25, "intervalStart": "2021-06-15T00:00:00Z"}
        ],
        "bandwidthDaily": [
            {
                "egress": {"repair": 100, "audit": 10, "usage": 1000},
                "ingress": {"repair": 50, "usage": 500},
                "delete": 0,
                "intervalStart": "2021-06-14T00:00:00Z"
            },
            {
                "egress": {"repair": 200, "audit": 20, "usage": 2000},
                "ingress": {"repair": 60, "usage": 600},
                "delete": 0,
                "intervalStart": "2021-06-15T00:00:00Z"
            }
        ],
        "storageSummary": 3000.75,
        "bandwidthSummary": 4540,
        "egressSummary": 3330,
        "ingressSummary": 1210,
        "currentStorageUsed": 1500000,
        "audits": {"auditScore": 1, "suspensionScore": 1, "onlineScore": 0.9987, "satelliteName": "us1.storj.io:7777"},
        "priceModel": {"EgressBandwidth": 2000, "RepairBandwidth": 1000, "AuditBandwidth": 1000, "DiskSpace": 150}
    })
}

/// `GET /api/sno/estimated-payout`
pub fn payout() -> Value {
    json!({
        "currentMonth": {
            "egressBandwidth": 3330,
            "egressBandwidthPayout": 6.66,
            "egressRepairAudit": 330,
            "egressRepairAuditPayout": 0.33,
            "diskSpace": 3000.75,
            "diskSpacePayout": 4.5,
            "heldRate": 75,
            "payout": 2.87,
            "held": 8.62
        },
        "previousMonth": {
            "egressBandwidth": 100,
            "payout": 1.0,
            "held": 3.0
        },
        "currentMonthExpectations": 1830
    })
}

/// Sum of the daily egress entries in [`satellite`].
pub const MONTH_EGRESS: [(&str, f64); 3] = [("repair", 300.0), ("audit", 30.0), ("usage", 3000.0)];
/// Sum of the daily ingress entries in [`satellite`].
pub const MONTH_INGRESS: [(&str, f64); 2] = [("repair", 110.0), ("usage", 1100.0)];
