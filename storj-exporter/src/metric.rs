//! Metric families and the declarative templates that fill them.
//!
//! A [`MetricTemplate`] names a family, points at a source and lists the
//! keys to read from it. Every key becomes the first label value of one
//! sample, so a family like `storj_total_diskspace` carries `used`,
//! `available` and `trash` side by side. Missing or null values drop the
//! sample, never the family.

use serde_json::Value;
use std::collections::HashMap;

use crate::aggregate::{nested_get, to_float, Mapping};

/// Anything a template can read keyed values from.
pub trait MetricSource {
    fn value(&self, key: &str) -> Option<&Value>;
}

impl MetricSource for Mapping {
    fn value(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !v.is_null())
    }
}

impl MetricSource for Value {
    fn value(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|object| object.value(key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    /// Descriptive record, exposed as `<name>_info` with value 1.
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Gauge(f64),
    Info { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub label_values: Vec<String>,
    pub value: SampleValue,
}

impl Sample {
    /// The per-key label, always the first one.
    pub fn discriminator(&self) -> &str {
        self.label_values.first().map(String::as_str).unwrap_or_default()
    }

    pub fn gauge(&self) -> Option<f64> {
        match self.value {
            SampleValue::Gauge(v) => Some(v),
            SampleValue::Info { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub documentation: String,
    pub kind: MetricKind,
    pub label_names: Vec<String>,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    pub fn new(name: &str, documentation: &str, kind: MetricKind, label_names: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            documentation: documentation.to_string(),
            kind,
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
            samples: Vec::new(),
        }
    }

    /// Name on the wire; info families carry the `_info` suffix.
    pub fn exposed_name(&self) -> String {
        match self.kind {
            MetricKind::Gauge => self.name.clone(),
            MetricKind::Info => format!("{}_info", self.name),
        }
    }

    /// First sample whose labels start with `label_values`.
    pub fn find(&self, label_values: &[&str]) -> Option<&Sample> {
        self.samples.iter().find(|s| {
            s.label_values.len() >= label_values.len()
                && s.label_values.iter().zip(label_values).all(|(a, b)| a == b)
        })
    }
}

/// Folds families that share a name into one, keeping first-appearance order.
pub fn merge_families(families: Vec<MetricFamily>) -> Vec<MetricFamily> {
    let mut merged: Vec<MetricFamily> = Vec::with_capacity(families.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    for family in families {
        match index.get(&family.name) {
            Some(&i) => merged[i].samples.extend(family.samples),
            None => {
                index.insert(family.name.clone(), merged.len());
                merged.push(family);
            }
        }
    }
    merged
}

const DEFAULT_LABELS: &[&str] = &["type"];

/// Declarative description of one metric family.
pub struct MetricTemplate<'a> {
    pub name: &'static str,
    pub documentation: &'static str,
    pub kind: MetricKind,
    pub source: Option<&'a dyn MetricSource>,
    pub keys: &'static [&'static str],
    /// `[discriminator, extra...]`
    pub labels: &'static [&'static str],
    pub extra_label_values: Vec<String>,
    /// Optional nested object to read the keys from, relative to `source`.
    pub path: &'static [&'static str],
}

impl<'a> MetricTemplate<'a> {
    pub fn gauge(
        name: &'static str,
        documentation: &'static str,
        source: Option<&'a dyn MetricSource>,
        keys: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            documentation,
            kind: MetricKind::Gauge,
            source,
            keys,
            labels: DEFAULT_LABELS,
            extra_label_values: Vec::new(),
            path: &[],
        }
    }

    pub fn info(
        name: &'static str,
        documentation: &'static str,
        source: Option<&'a dyn MetricSource>,
        keys: &'static [&'static str],
    ) -> Self {
        Self {
            kind: MetricKind::Info,
            ..Self::gauge(name, documentation, source, keys)
        }
    }

    pub fn with_labels(mut self, labels: &'static [&'static str], extra_label_values: Vec<String>) -> Self {
        debug_assert_eq!(labels.len(), extra_label_values.len() + 1);
        self.labels = labels;
        self.extra_label_values = extra_label_values;
        self
    }

    pub fn with_path(mut self, path: &'static [&'static str]) -> Self {
        self.path = path;
        self
    }

    fn effective_source(&self) -> Option<&'a dyn MetricSource> {
        let source = self.source?;
        let Some((first, rest)) = self.path.split_first() else {
            return Some(source);
        };
        let nested = nested_get(source.value(first)?, rest)?;
        nested.as_object().map(|object| object as &dyn MetricSource)
    }

    fn sample_value(&self, key: &str, raw: &Value) -> Option<SampleValue> {
        match self.kind {
            MetricKind::Gauge => to_float(raw).map(SampleValue::Gauge),
            MetricKind::Info => {
                let text = match raw {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    Value::Bool(true) => "True".to_string(),
                    Value::Bool(false) => "False".to_string(),
                    other => other.to_string(),
                };
                Some(SampleValue::Info {
                    key: key.to_string(),
                    value: text,
                })
            }
        }
    }

    /// Builds the family. An absent source yields the family with no samples.
    pub fn produce(&self) -> MetricFamily {
        let mut family = MetricFamily::new(self.name, self.documentation, self.kind, self.labels);
        let Some(source) = self.effective_source() else {
            return family;
        };

        for key in self.keys {
            let Some(value) = source.value(key).and_then(|raw| self.sample_value(key, raw)) else {
                continue;
            };
            let mut label_values = Vec::with_capacity(self.extra_label_values.len() + 1);
            label_values.push(key.to_string());
            label_values.extend(self.extra_label_values.iter().cloned());
            family.samples.push(Sample { label_values, value });
        }
        family
    }
}
