//! httptap - header-matched HTTP tap
//!
//! Selectively captures request/response headers for exchanges matching configured
//! rules and hands one buffered [`Trace`] per qualifying exchange to a [`Sink`].
//!
//! # Architecture
//!
//! - [`TapConfig`] - Immutable, shared. Ordered [`MatchRule`]s plus the single sink.
//! - [`PerRequestTapper`] - One per request. Latches the first match id, submits once.
//! - [`HeaderMatcher`] - One header predicate (exact, prefix, regex, range, present, ...).
//! - [`TapFilterConfig`] / [`TapFilter`] - Binding point inside the proxy's filter chain;
//!   holds the currently installed tap and the `rq_tapped` counter.
//!
//! # Key Invariants
//!
//! 1. **First match wins**: rules are scanned in declaration order; the first rule whose
//!    matcher set is non-empty and fully satisfied supplies the match id.
//!
//! 2. **Empty set never matches**: a rule with no request matchers can only match on
//!    response headers, and vice versa.
//!
//! 3. **Exactly once**: a tapper submits at most one trace, no matter how often
//!    `on_log` is called.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use httptap::prelude::*;
//!
//! #[derive(Debug)]
//! struct Discard;
//!
//! impl Sink for Discard {
//!     fn submit_buffered_trace(&self, _trace: Trace) {}
//! }
//!
//! let spec: TapConfigSpec = serde_json::from_str(r#"{
//!     "match_configs": [{
//!         "match_id": "foo_match_id",
//!         "http_match_config": {
//!             "request_match_config": { "headers": [{ "name": "foo", "exact_match": "bar" }] }
//!         }
//!     }],
//!     "output_config": { "sinks": [{ "streaming_admin": {} }] }
//! }"#).unwrap();
//!
//! let config = TapConfig::new(spec, Arc::new(Discard)).unwrap();
//! let mut tapper = config.new_per_request_tapper();
//!
//! let request = HeaderMap::from(vec![(":method", "GET"), ("foo", "bar")]);
//! tapper.on_request_headers(&request);
//! assert_eq!(tapper.match_id(), Some("foo_match_id"));
//! assert!(tapper.on_log(&request, None));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod config;
mod filter;
mod header_map;
mod header_matcher;
mod sink;
mod string_match;
mod tap_config;
mod tapper;
mod trace;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use config::{
    FilePerTapSinkSpec, HeaderMatchSpec, HttpMatchSpec, MatchConfigSpec, MessageMatchSpec,
    OutputConfigSpec, OutputSinkSpec, RangeSpec, StreamingAdminSinkSpec, TapConfigSpec,
};
pub use filter::{TapFilter, TapFilterConfig, TapStats};
pub use header_map::HeaderMap;
pub use header_matcher::{matches_all, HeaderMatchKind, HeaderMatcher};
pub use sink::{Sink, SinkKind};
pub use string_match::StringMatcher;
pub use tap_config::{MatchRule, TapConfig};
pub use tapper::{PerRequestTapper, TapperState};
pub use trace::{Trace, TraceHeader};

/// Prelude module for convenient imports.
///
/// ```
/// use httptap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Headers
        HeaderMap,
        HeaderMatcher,
        // Config types
        MatchConfigSpec,
        MatchRule,
        OutputSinkSpec,
        // Core types
        PerRequestTapper,
        Sink,
        TapConfig,
        TapConfigSpec,
        // Errors
        TapError,
        TapFilter,
        TapFilterConfig,
        TapperState,
        Trace,
        TraceHeader,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length for non-regex header match patterns (exact, prefix, suffix, contains).
pub const MAX_PATTERN_LENGTH: usize = 8192;

/// Maximum length for regex patterns.
///
/// Shorter limit than [`MAX_PATTERN_LENGTH`] because regex compilation cost
/// scales faster than literal matching.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from tap configuration.
///
/// All of these surface when a [`TapConfig`] is built. Matching and trace
/// construction never fail; a request that matches nothing is not an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TapError {
    /// The output config must name exactly one sink.
    #[error("tap output config must declare exactly one sink, found {count}")]
    SinkCount {
        /// Number of sinks declared.
        count: usize,
    },

    /// A sink entry must set exactly one sink type.
    #[error("tap output sink must set exactly one sink type, found {count}")]
    InvalidSink {
        /// Number of sink types set on the entry.
        count: usize,
    },

    /// Only the streaming admin sink is supported.
    #[error("tap output sink \"{kind}\" is not supported, use streaming_admin")]
    UnsupportedSink {
        /// The configured sink type.
        kind: SinkKind,
    },

    /// A header matcher has an empty name.
    #[error("header matcher name must not be empty")]
    EmptyHeaderName,

    /// A header matcher sets more than one match specifier.
    #[error("header matcher for \"{name}\" sets {count} match specifiers, at most one is allowed")]
    ConflictingSpecifiers {
        /// The header name.
        name: String,
        /// Number of specifiers set.
        count: usize,
    },

    /// A regex pattern failed to compile.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error message.
        reason: String,
    },

    /// A match pattern exceeds the maximum allowed length.
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// A range match with `start >= end` can never match.
    #[error("range match [{start}, {end}) for \"{name}\" is empty")]
    EmptyRange {
        /// The header name.
        name: String,
        /// Inclusive start.
        start: i64,
        /// Exclusive end.
        end: i64,
    },
}
