//! `TapConfig`: Immutable match rules plus the sink, shared by all requests.

use crate::{
    matches_all, HeaderMap, HeaderMatcher, MatchConfigSpec, PerRequestTapper, Sink, SinkKind,
    TapConfigSpec, TapError,
};
use std::fmt;
use std::sync::Arc;

/// One compiled match rule.
///
/// An empty matcher set never matches, so a rule with only response
/// matchers is invisible to the request scan and vice versa.
#[derive(Debug, Clone)]
pub struct MatchRule {
    id: String,
    request_headers: Vec<HeaderMatcher>,
    response_headers: Vec<HeaderMatcher>,
}

impl MatchRule {
    /// Create a rule from already compiled matcher sets.
    pub fn new(
        id: impl Into<String>,
        request_headers: Vec<HeaderMatcher>,
        response_headers: Vec<HeaderMatcher>,
    ) -> Self {
        Self {
            id: id.into(),
            request_headers,
            response_headers,
        }
    }

    fn from_spec(spec: &MatchConfigSpec) -> Result<Self, TapError> {
        let http = &spec.http_match_config;
        let compile = |specs: &[crate::HeaderMatchSpec]| {
            specs
                .iter()
                .map(HeaderMatcher::from_spec)
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(Self::new(
            spec.match_id.clone(),
            compile(&http.request_match_config.headers)?,
            compile(&http.response_match_config.headers)?,
        ))
    }

    /// The id surfaced in traces this rule triggers.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Request header matchers.
    #[must_use]
    pub fn request_headers(&self) -> &[HeaderMatcher] {
        &self.request_headers
    }

    /// Response header matchers.
    #[must_use]
    pub fn response_headers(&self) -> &[HeaderMatcher] {
        &self.response_headers
    }

    /// `true` if the request set is non-empty and fully satisfied.
    #[must_use]
    pub fn matches_request(&self, headers: &HeaderMap) -> bool {
        matches_all(headers, &self.request_headers)
    }

    /// `true` if the response set is non-empty and fully satisfied.
    #[must_use]
    pub fn matches_response(&self, headers: &HeaderMap) -> bool {
        matches_all(headers, &self.response_headers)
    }
}

/// Tap configuration: ordered rules and the single sink.
///
/// Built once per (re)configuration and never mutated afterwards. Requests
/// hold it through an `Arc`, so a replaced config stays alive until the
/// last in-flight request that started under it has finished.
///
/// # First match wins
///
/// Both scans walk the rules in declaration order and stop at the first
/// hit. Duplicate ids are allowed; only the first is ever reported.
pub struct TapConfig {
    rules: Vec<MatchRule>,
    admin_streamer: Arc<dyn Sink>,
}

impl TapConfig {
    /// Validate `spec` and compile its rules.
    ///
    /// The output config must declare exactly one sink and it must be a
    /// streaming admin sink; `admin_streamer` is where its traces go.
    ///
    /// # Errors
    ///
    /// - [`TapError::SinkCount`] unless exactly one sink is declared
    /// - [`TapError::InvalidSink`] if the sink entry sets zero or several types
    /// - [`TapError::UnsupportedSink`] for any type other than `streaming_admin`
    /// - header matcher compile errors
    pub fn new(spec: TapConfigSpec, admin_streamer: Arc<dyn Sink>) -> Result<Arc<Self>, TapError> {
        let sinks = &spec.output_config.sinks;
        if sinks.len() != 1 {
            return Err(TapError::SinkCount { count: sinks.len() });
        }
        match sinks[0].kinds().as_slice() {
            [SinkKind::StreamingAdmin] => {}
            [kind] => return Err(TapError::UnsupportedSink { kind: *kind }),
            kinds => return Err(TapError::InvalidSink { count: kinds.len() }),
        }

        let rules = spec
            .match_configs
            .iter()
            .map(MatchRule::from_spec)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(rules = rules.len(), "tap config built");
        Ok(Arc::new(Self {
            rules,
            admin_streamer,
        }))
    }

    /// Build from already compiled rules, bypassing output-config validation.
    #[must_use]
    pub fn from_rules(rules: Vec<MatchRule>, sink: Arc<dyn Sink>) -> Arc<Self> {
        Arc::new(Self {
            rules,
            admin_streamer: sink,
        })
    }

    /// The rules, in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    /// Id of the first rule whose request matchers are satisfied.
    #[must_use]
    pub fn matches_request_headers(&self, headers: &HeaderMap) -> Option<&str> {
        self.request_match(headers).map(|i| self.rules[i].id())
    }

    /// Id of the first rule whose response matchers are satisfied.
    #[must_use]
    pub fn matches_response_headers(&self, headers: &HeaderMap) -> Option<&str> {
        self.response_match(headers).map(|i| self.rules[i].id())
    }

    /// Bind a new tapper to this config. Call once per request.
    #[must_use]
    pub fn new_per_request_tapper(self: &Arc<Self>) -> PerRequestTapper {
        PerRequestTapper::new(Arc::clone(self))
    }

    /// Where completed traces go.
    #[must_use]
    pub fn sink(&self) -> &dyn Sink {
        // Only the streaming admin sink exists today.
        &*self.admin_streamer
    }

    pub(crate) fn request_match(&self, headers: &HeaderMap) -> Option<usize> {
        self.rules.iter().position(|r| r.matches_request(headers))
    }

    pub(crate) fn response_match(&self, headers: &HeaderMap) -> Option<usize> {
        self.rules.iter().position(|r| r.matches_response(headers))
    }

    pub(crate) fn rule_id(&self, index: usize) -> &str {
        self.rules[index].id()
    }
}

impl fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapConfig")
            .field("rules", &self.rules)
            .field("sink", &self.admin_streamer)
            .finish()
    }
}
