//! httptap-test: Test support for the tap
//!
//! Provides a sink that records every submitted trace and a serde-friendly
//! [`Exchange`] that drives one request through the full tapper lifecycle.
//!
//! # Example
//!
//! ```
//! use httptap_test::prelude::*;
//! use httptap::{HeaderMatcher, MatchRule, StringMatcher, TapConfig};
//!
//! let sink = RecordingSink::new();
//! let rule = MatchRule::new(
//!     "m1",
//!     vec![HeaderMatcher::value("foo", StringMatcher::exact("bar").unwrap())],
//!     vec![],
//! );
//! let config = TapConfig::from_rules(vec![rule], sink.clone());
//!
//! let exchange = Exchange::new(vec![(":method", "GET"), ("foo", "bar")]);
//! assert!(exchange.run(&config));
//! assert_eq!(sink.traces()[0].match_id, "m1");
//! ```

use httptap::{HeaderMap, Sink, TapConfig, Trace};
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;

pub mod fixture;

/// Sink that keeps every submitted trace in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    traces: Mutex<Vec<Trace>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Copies of all traces submitted so far, in submission order.
    #[must_use]
    pub fn traces(&self) -> Vec<Trace> {
        self.traces.lock().clone()
    }

    /// Remove and return all traces submitted so far.
    #[must_use]
    pub fn take(&self) -> Vec<Trace> {
        std::mem::take(&mut *self.traces.lock())
    }

    /// Number of traces submitted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.traces.lock().len()
    }

    /// Returns `true` if nothing was submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traces.lock().is_empty()
    }
}

impl Sink for RecordingSink {
    fn submit_buffered_trace(&self, trace: Trace) {
        self.traces.lock().push(trace);
    }
}

/// One request/response exchange.
///
/// ```yaml
/// request_headers:
///   - [":method", "GET"]
///   - ["foo", "bar"]
/// response_headers:
///   - [":status", "200"]
/// ```
///
/// Omitting `response_headers` models an exchange that ended without a
/// response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Exchange {
    /// Final request headers.
    #[serde(default)]
    pub request_headers: Vec<(String, String)>,
    /// Final response headers, if a response was produced.
    #[serde(default)]
    pub response_headers: Option<Vec<(String, String)>>,
}

impl Exchange {
    /// An exchange with request headers only.
    pub fn new<K: Into<String>, V: Into<String>>(request_headers: Vec<(K, V)>) -> Self {
        Self {
            request_headers: pairs(request_headers),
            response_headers: None,
        }
    }

    /// Add response headers (builder pattern).
    #[must_use]
    pub fn with_response<K: Into<String>, V: Into<String>>(
        mut self,
        response_headers: Vec<(K, V)>,
    ) -> Self {
        self.response_headers = Some(pairs(response_headers));
        self
    }

    /// Request headers as a [`HeaderMap`].
    #[must_use]
    pub fn request(&self) -> HeaderMap {
        self.request_headers.iter().cloned().collect()
    }

    /// Response headers as a [`HeaderMap`], if any.
    #[must_use]
    pub fn response(&self) -> Option<HeaderMap> {
        self.response_headers
            .as_ref()
            .map(|headers| headers.iter().cloned().collect())
    }

    /// Drive one tapper through the lifecycle in proxy order.
    ///
    /// Returns what `on_log` returned.
    pub fn run(&self, config: &Arc<TapConfig>) -> bool {
        let request = self.request();
        let response = self.response();

        let mut tapper = config.new_per_request_tapper();
        tapper.on_request_headers(&request);
        if let Some(response) = &response {
            tapper.on_response_headers(response);
        }
        tapper.on_log(&request, response.as_ref())
    }
}

fn pairs<K: Into<String>, V: Into<String>>(headers: Vec<(K, V)>) -> Vec<(String, String)> {
    headers
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{Exchange, RecordingSink};
    pub use httptap::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_from_yaml() {
        let exchange: Exchange = serde_yaml::from_str(
            r#"
request_headers:
  - [":method", "GET"]
  - ["foo", "bar"]
"#,
        )
        .unwrap();
        assert_eq!(exchange.request().len(), 2);
        assert!(exchange.response().is_none());
    }

    #[test]
    fn recording_sink_take_drains() {
        let sink = RecordingSink::new();
        sink.submit_buffered_trace(Trace::default());
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.take().len(), 1);
        assert!(sink.is_empty());
    }
}
