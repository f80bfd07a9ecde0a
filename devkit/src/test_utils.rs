/*!
Test harness for the exporter

- Starts the mock storage node API
- Parses the Prometheus text exposition back into samples
- Assertions on families and sample values
*/

use anyhow::Result;
use std::collections::BTreeMap;

use crate::mock_api::{MockStorjApi, Scenario};

/// One sample line of a text exposition.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSample {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub value: f64,
}

impl ParsedSample {
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }

    fn matches(&self, name: &str, labels: &[(&str, &str)]) -> bool {
        self.name == name && labels.iter().all(|(k, v)| self.label(k) == Some(*v))
    }
}

/// Splits `k="v",k2="v2"` honouring `\"`, `\\` and `\n` escapes.
fn parse_labels(raw: &str) -> Result<BTreeMap<String, String>> {
    let mut labels = BTreeMap::new();
    let mut chars = raw.chars().peekable();
    loop {
        while matches!(chars.peek(), Some(',') | Some(' ')) {
            chars.next();
        }
        let mut name = String::new();
        for c in chars.by_ref() {
            if c == '=' {
                break;
            }
            name.push(c);
        }
        if name.is_empty() {
            return Ok(labels);
        }
        if chars.next() != Some('"') {
            anyhow::bail!("label {} has no quoted value", name);
        }
        let mut value = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('n') => value.push('\n'),
                    Some(other) => value.push(other),
                    None => anyhow::bail!("dangling escape in label {}", name),
                },
                '"' => {
                    closed = true;
                    break;
                }
                other => value.push(other),
            }
        }
        if !closed {
            anyhow::bail!("unterminated value for label {}", name);
        }
        labels.insert(name, value);
    }
}

/// Parses every sample line; comment lines are skipped.
pub fn parse_exposition(text: &str) -> Result<Vec<ParsedSample>> {
    let mut samples = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty() && !l.starts_with('#')) {
        let (series, value) = line
            .rsplit_once(' ')
            .ok_or_else(|| anyhow::anyhow!("malformed sample line: {}", line))?;
        let (name, labels) = match series.split_once('{') {
            Some((name, rest)) => {
                let inner = rest
                    .strip_suffix('}')
                    .ok_or_else(|| anyhow::anyhow!("unclosed label set: {}", line))?;
                (name.to_string(), parse_labels(inner)?)
            }
            None => (series.to_string(), BTreeMap::new()),
        };
        samples.push(ParsedSample {
            name,
            labels,
            value: value.parse()?,
        });
    }
    Ok(samples)
}

/// Family names in `# TYPE` order.
pub fn declared_families(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|l| l.strip_prefix("# TYPE "))
        .filter_map(|l| l.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Value of the first sample of `name` carrying all of `labels`.
pub fn sample_value(text: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    parse_exposition(text)
        .ok()?
        .into_iter()
        .find(|s| s.matches(name, labels))
        .map(|s| s.value)
}

pub struct TestHarness {
    pub mock: MockStorjApi,
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        Self::with_scenario(Scenario::Success).await
    }

    pub async fn with_scenario(scenario: Scenario) -> Result<Self> {
        env_logger::builder().is_test(true).try_init().ok();
        let mock = MockStorjApi::start_with(scenario).await?;
        Ok(Self { mock })
    }

    pub fn base_url(&self) -> String {
        self.mock.base_url()
    }

    /// Fails unless every name is declared in the exposition.
    pub fn assert_families(&self, text: &str, names: &[&str]) -> Result<()> {
        let declared = declared_families(text);
        for name in names {
            if !declared.iter().any(|d| d == name) {
                anyhow::bail!("family {} not declared; got {:?}", name, declared);
            }
        }
        Ok(())
    }

    pub fn assert_sample(&self, text: &str, name: &str, labels: &[(&str, &str)], expected: f64) -> Result<()> {
        match sample_value(text, name, labels) {
            Some(v) if (v - expected).abs() < 1e-9 => Ok(()),
            Some(v) => anyhow::bail!("{}{:?} = {}, expected {}", name, labels, v, expected),
            None => anyhow::bail!("no sample {}{:?}", name, labels),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "# HELP storj_total_diskspace Storj total diskspace metrics\n\
# TYPE storj_total_diskspace gauge\n\
storj_total_diskspace{type=\"used\"} 100\n\
storj_total_diskspace{type=\"trash\"} 0.5\n\
# HELP storj_sat_audit Storj satellite audit metrics\n\
# TYPE storj_sat_audit gauge\n\
# HELP storj_node_info Storj node info\n\
# TYPE storj_node_info gauge\n\
storj_node_info{type=\"version\",version=\"v\\\"1\\\", beta\"} 1\n\
up 1\n";

    #[test]
    fn test_parse_exposition() {
        let samples = parse_exposition(TEXT).unwrap();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[1].label("type"), Some("trash"));
        assert_eq!(samples[1].value, 0.5);
        assert_eq!(samples[2].label("version"), Some("v\"1\", beta"));
        assert!(samples[3].labels.is_empty());
    }

    #[test]
    fn test_declared_families_include_empty_ones() {
        assert_eq!(
            declared_families(TEXT),
            vec!["storj_total_diskspace", "storj_sat_audit", "storj_node_info"]
        );
    }

    #[test]
    fn test_sample_value() {
        assert_eq!(sample_value(TEXT, "storj_total_diskspace", &[("type", "used")]), Some(100.0));
        assert_eq!(sample_value(TEXT, "storj_total_diskspace", &[("type", "available")]), None);
    }

    #[test]
    fn test_malformed_line() {
        assert!(parse_exposition("metric{type=\"x} 1\n").is_err());
    }

    #[tokio::test]
    async fn test_harness_assertions() {
        let harness = TestHarness::new().await.unwrap();
        assert!(harness.base_url().starts_with("http://127.0.0.1:"));
        harness.assert_families(TEXT, &["storj_sat_audit"]).unwrap();
        assert!(harness.assert_families(TEXT, &["storj_sat_summary"]).is_err());
        harness
            .assert_sample(TEXT, "storj_total_diskspace", &[("type", "trash")], 0.5)
            .unwrap();
    }
}
