//! Prometheus text exposition.
//!
//! Non-empty families go through the `prometheus` protobuf model and
//! `TextEncoder`. The encoder refuses families without metrics, so those get
//! their `# HELP` and `# TYPE` lines written here directly.

use prometheus::proto::{self, MetricType};
use prometheus::{Encoder, TextEncoder};
use std::io::Write;

use crate::error::ExpositionError;
use crate::metric::{MetricFamily, SampleValue};

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn label(name: &str, value: &str) -> proto::LabelPair {
    let mut pair = proto::LabelPair::default();
    pair.set_name(name.to_string());
    pair.set_value(value.to_string());
    pair
}

fn to_proto(family: &MetricFamily) -> proto::MetricFamily {
    let mut out = proto::MetricFamily::default();
    out.set_name(family.exposed_name());
    out.set_help(family.documentation.clone());
    out.set_field_type(MetricType::GAUGE);

    for sample in &family.samples {
        let mut labels: Vec<proto::LabelPair> = family
            .label_names
            .iter()
            .zip(&sample.label_values)
            .map(|(name, value)| label(name, value))
            .collect();

        let value = match &sample.value {
            SampleValue::Gauge(v) => *v,
            SampleValue::Info { key, value } => {
                labels.push(label(key, value));
                1.0
            }
        };

        let mut gauge = proto::Gauge::default();
        gauge.set_value(value);
        let mut metric = proto::Metric::default();
        metric.set_label(labels.into());
        metric.set_gauge(gauge);
        out.mut_metric().push(metric);
    }
    out
}

/// Renders families in order. Families without samples keep their header.
pub fn encode(families: &[MetricFamily]) -> Result<String, ExpositionError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    for family in families {
        if family.samples.is_empty() {
            let name = family.exposed_name();
            writeln!(buffer, "# HELP {} {}", name, escape_help(&family.documentation))?;
            writeln!(buffer, "# TYPE {} gauge", name)?;
        } else {
            encoder.encode(&[to_proto(family)], &mut buffer)?;
        }
    }
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{MetricKind, Sample};

    fn sample(labels: &[&str], value: SampleValue) -> Sample {
        Sample {
            label_values: labels.iter().map(|l| l.to_string()).collect(),
            value,
        }
    }

    #[test]
    fn test_gauge_family() {
        let mut family = MetricFamily::new(
            "storj_total_diskspace",
            "Storj total diskspace metrics",
            MetricKind::Gauge,
            &["type"],
        );
        family.samples.push(sample(&["used"], SampleValue::Gauge(100.0)));
        family.samples.push(sample(&["trash"], SampleValue::Gauge(0.5)));

        let text = encode(&[family]).unwrap();
        assert!(text.contains("# HELP storj_total_diskspace Storj total diskspace metrics\n"));
        assert!(text.contains("# TYPE storj_total_diskspace gauge\n"));
        assert!(text.contains("storj_total_diskspace{type=\"used\"} 100\n"));
        assert!(text.contains("storj_total_diskspace{type=\"trash\"} 0.5\n"));
    }

    #[test]
    fn test_info_family() {
        let mut family = MetricFamily::new("storj_node", "Storj node info", MetricKind::Info, &["type"]);
        family.samples.push(sample(
            &["nodeID"],
            SampleValue::Info {
                key: "nodeID".into(),
                value: "12abc".into(),
            },
        ));

        let text = encode(&[family]).unwrap();
        assert!(text.contains("# TYPE storj_node_info gauge\n"));
        assert!(text.contains("storj_node_info{type=\"nodeID\",nodeID=\"12abc\"} 1\n"));
    }

    #[test]
    fn test_empty_family_keeps_header() {
        let empty = MetricFamily::new(
            "storj_sat_audit",
            "Storj satellite audit metrics",
            MetricKind::Gauge,
            &["type", "satellite", "url"],
        );
        let mut other = MetricFamily::new("storj_total_bandwidth", "Storj total bandwidth metrics", MetricKind::Gauge, &["type"]);
        other.samples.push(sample(&["used"], SampleValue::Gauge(7.0)));

        let text = encode(&[empty, other]).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "# HELP storj_sat_audit Storj satellite audit metrics");
        assert_eq!(lines[1], "# TYPE storj_sat_audit gauge");
        assert_eq!(lines[2], "# HELP storj_total_bandwidth Storj total bandwidth metrics");
        assert_eq!(lines[4], "storj_total_bandwidth{type=\"used\"} 7");
    }

    #[test]
    fn test_label_values_are_escaped() {
        let mut family = MetricFamily::new("storj_node", "Storj node info", MetricKind::Info, &["type"]);
        family.samples.push(sample(
            &["version"],
            SampleValue::Info {
                key: "version".into(),
                value: "v\"1\"".into(),
            },
        ));
        let text = encode(&[family]).unwrap();
        assert!(text.contains("version=\"v\\\"1\\\"\""));
    }
}
