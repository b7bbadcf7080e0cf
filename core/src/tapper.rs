//! `PerRequestTapper`: Per-request match latch and trace submission.

use crate::trace::snapshot;
use crate::{HeaderMap, TapConfig, Trace};
use std::sync::Arc;

/// Where a tapper is in its lifecycle.
///
/// `Unmatched → Matched → Submitted`. There is no way back, and the rule
/// index latched in `Matched` carries over into `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapperState {
    /// No rule has matched yet.
    Unmatched,
    /// A rule matched; holds its index in [`TapConfig::rules`].
    Matched(usize),
    /// The trace was handed to the sink; holds the matched rule's index.
    Submitted(usize),
}

/// Tracks one request against a [`TapConfig`].
///
/// The proxy drives it sequentially from the request's own context:
/// `on_request_headers` once, `on_response_headers` at most once,
/// `on_log` once at the end. It is not shared between requests.
///
/// # Example
///
/// ```ignore
/// let mut tapper = config.new_per_request_tapper();
/// tapper.on_request_headers(&request_headers);
/// tapper.on_response_headers(&response_headers);
/// let tapped = tapper.on_log(&request_headers, Some(&response_headers));
/// ```
#[derive(Debug)]
pub struct PerRequestTapper {
    config: Arc<TapConfig>,
    state: TapperState,
}

impl PerRequestTapper {
    pub(crate) fn new(config: Arc<TapConfig>) -> Self {
        Self {
            config,
            state: TapperState::Unmatched,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> TapperState {
        self.state
    }

    /// The latched match id, once a rule has matched.
    ///
    /// Never cleared or overwritten, including after submission.
    #[must_use]
    pub fn match_id(&self) -> Option<&str> {
        match self.state {
            TapperState::Matched(index) | TapperState::Submitted(index) => {
                Some(self.config.rule_id(index))
            }
            TapperState::Unmatched => None,
        }
    }

    /// Request headers are complete.
    pub fn on_request_headers(&mut self, headers: &HeaderMap) {
        if self.state != TapperState::Unmatched {
            return;
        }
        if let Some(index) = self.config.request_match(headers) {
            tracing::debug!(match_id = self.config.rule_id(index), "matches request headers");
            self.state = TapperState::Matched(index);
        }
    }

    /// Response headers are complete. Skipped if the request already matched.
    pub fn on_response_headers(&mut self, headers: &HeaderMap) {
        if self.state != TapperState::Unmatched {
            return;
        }
        if let Some(index) = self.config.response_match(headers) {
            tracing::debug!(match_id = self.config.rule_id(index), "matches response headers");
            self.state = TapperState::Matched(index);
        }
    }

    /// End of request. Submits the trace if a rule matched.
    ///
    /// `request_headers` and `response_headers` are the final snapshots, so
    /// fields the proxy added after the header callbacks (`content-length`,
    /// `date`, ...) are captured. `response_headers` is `None` when no
    /// response was produced.
    ///
    /// Returns `true` if a trace was submitted by this call. Calls after the
    /// first submission return `false` and submit nothing.
    pub fn on_log(
        &mut self,
        request_headers: &HeaderMap,
        response_headers: Option<&HeaderMap>,
    ) -> bool {
        let TapperState::Matched(index) = self.state else {
            return false;
        };

        let trace = Trace {
            match_id: self.config.rule_id(index).to_owned(),
            request_headers: snapshot(request_headers),
            response_headers: response_headers.map(snapshot).unwrap_or_default(),
        };

        tracing::debug!(match_id = %trace.match_id, "submitting buffered trace to sink");
        self.state = TapperState::Submitted(index);
        self.config.sink().submit_buffered_trace(trace);
        true
    }
}
