/*!
# Storj DevKit - test support for the exporter

- Canned storage node API payloads
- A mock dashboard API server with failure scenarios
- Helpers to read back the text exposition
*/

pub mod fixtures;
pub mod mock_api;
pub mod test_utils;

pub use mock_api::{MockStorjApi, Scenario};
pub use test_utils::{parse_exposition, sample_value, ParsedSample, TestHarness};
