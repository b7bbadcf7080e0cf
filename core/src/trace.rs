//! Buffered trace of one tapped exchange.

use crate::HeaderMap;
use serde::{Deserialize, Serialize};

/// One header as captured in a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceHeader {
    /// Header name exactly as stored by the proxy.
    pub key: String,
    /// Header value.
    pub value: String,
}

/// A buffered trace: the match id plus header snapshots of both directions.
///
/// `response_headers` is empty when the exchange ended without a response
/// (reset, local failure before upstream replied).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    /// Id of the rule that triggered capture.
    pub match_id: String,
    /// Request headers in container order, repeats and pseudo-headers included.
    #[serde(default)]
    pub request_headers: Vec<TraceHeader>,
    /// Response headers in container order.
    #[serde(default)]
    pub response_headers: Vec<TraceHeader>,
}

impl Trace {
    /// First captured request header with this key (case-insensitive).
    #[must_use]
    pub fn request_header(&self, key: &str) -> Option<&str> {
        find(&self.request_headers, key)
    }

    /// First captured response header with this key (case-insensitive).
    #[must_use]
    pub fn response_header(&self, key: &str) -> Option<&str> {
        find(&self.response_headers, key)
    }
}

/// Copy every entry of a header map, preserving order and multiplicity.
pub(crate) fn snapshot(headers: &HeaderMap) -> Vec<TraceHeader> {
    headers
        .iter()
        .map(|(key, value)| TraceHeader {
            key: key.to_owned(),
            value: value.to_owned(),
        })
        .collect()
}

fn find<'a>(headers: &'a [TraceHeader], key: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.key.eq_ignore_ascii_case(key))
        .map(|h| h.value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_preserves_order_and_multiplicity() {
        let headers = HeaderMap::from(vec![(":method", "GET"), ("foo", "bar"), ("foo", "baz")]);
        let copied = snapshot(&headers);
        let pairs: Vec<_> = copied
            .iter()
            .map(|h| (h.key.as_str(), h.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![(":method", "GET"), ("foo", "bar"), ("foo", "baz")]);
    }

    #[test]
    fn yaml_shape() {
        let trace = Trace {
            match_id: "foo_match_id".into(),
            request_headers: snapshot(&HeaderMap::from(vec![(":path", "/")])),
            response_headers: vec![],
        };
        let yaml = serde_yaml::to_string(&trace).unwrap();
        assert!(yaml.contains("match_id: foo_match_id"));

        let back: Trace = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.request_header(":PATH"), Some("/"));
        assert_eq!(back.response_header("date"), None);
    }
}
