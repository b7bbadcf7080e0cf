//! Conformance fixture runner
//!
//! Loads YAML fixtures and runs their exchanges against a freshly built
//! [`TapConfig`] backed by a [`RecordingSink`].
//!
//! ```yaml
//! name: request header match
//! description: a matching request header latches the rule id
//! config:
//!   match_configs:
//!     - match_id: m1
//!       http_match_config:
//!         request_match_config:
//!           headers:
//!             - name: foo
//!               exact_match: bar
//!   output_config:
//!     sinks:
//!       - streaming_admin: {}
//! exchanges:
//!   - name: tapped
//!     request_headers: [["foo", "bar"]]
//!     expect:
//!       match_id: m1
//!   - name: not tapped
//!     request_headers: [["foo", "nope"]]
//!     expect: {}
//! ```

use crate::{Exchange, RecordingSink};
use httptap::{TapConfig, TapConfigSpec, Trace};
use serde::Deserialize;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    /// Fixture name, used in failure messages.
    pub name: String,
    /// What the fixture demonstrates.
    #[serde(default)]
    pub description: String,
    /// Tap config every exchange runs against.
    pub config: TapConfigSpec,
    /// Exchanges, run in order against one config.
    pub exchanges: Vec<FixtureExchange>,
}

/// One exchange plus its expected outcome
#[derive(Debug, Deserialize)]
pub struct FixtureExchange {
    /// Exchange name, used in failure messages.
    pub name: String,
    /// Request and response headers.
    #[serde(flatten)]
    pub exchange: Exchange,
    /// Expected outcome; empty means not tapped.
    #[serde(default)]
    pub expect: Expectation,
}

/// Expected trace. `match_id: None` means the exchange must not be tapped.
#[derive(Debug, Default, Deserialize)]
pub struct Expectation {
    /// Match id the trace must carry.
    #[serde(default)]
    pub match_id: Option<String>,
    /// Number of request headers in the trace, if checked.
    #[serde(default)]
    pub request_headers: Option<usize>,
    /// Number of response headers in the trace, if checked.
    #[serde(default)]
    pub response_headers: Option<usize>,
}

/// Result of running a single exchange
#[derive(Debug)]
pub struct ExchangeResult {
    /// Name of the exchange.
    pub exchange_name: String,
    /// Whether the outcome met the expectation.
    pub passed: bool,
    /// Expected match id.
    pub expected: Option<String>,
    /// Trace actually submitted, if any.
    pub actual: Option<Trace>,
}

impl Expectation {
    fn check(&self, tapped: bool, trace: Option<&Trace>) -> bool {
        match (&self.match_id, trace) {
            (None, None) => !tapped,
            (Some(id), Some(trace)) => {
                tapped
                    && trace.match_id == *id
                    && self
                        .request_headers
                        .map_or(true, |n| trace.request_headers.len() == n)
                    && self
                        .response_headers
                        .map_or(true, |n| trace.response_headers.len() == n)
            }
            _ => false,
        }
    }
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all exchanges in order and return results
    ///
    /// # Panics
    ///
    /// Panics if the fixture's config is rejected.
    pub fn run(&self) -> Vec<ExchangeResult> {
        let sink = RecordingSink::new();
        let config = TapConfig::new(self.config.clone(), sink.clone())
            .unwrap_or_else(|e| panic!("fixture '{}' has an invalid config: {e}", self.name));

        self.exchanges
            .iter()
            .map(|case| {
                let tapped = case.exchange.run(&config);
                let mut traces = sink.take();
                let actual = traces.pop();
                let passed = traces.is_empty() && case.expect.check(tapped, actual.as_ref());
                ExchangeResult {
                    exchange_name: case.name.clone(),
                    passed,
                    expected: case.expect.match_id.clone(),
                    actual,
                }
            })
            .collect()
    }

    /// Run all exchanges and panic on first failure
    pub fn run_and_assert(&self) {
        let results = self.run();
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' exchange '{}' failed: expected {:?}, got {:?}",
                self.name, result.exchange_name, result.expected, result.actual
            );
        }
    }
}
