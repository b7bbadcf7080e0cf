//! Config types for tap construction.
//!
//! These mirror the declarative tap configuration and are serde-deserializable
//! from YAML or JSON. They carry the user's intent only; [`TapConfig::new`]
//! validates them and compiles the runtime types.
//!
//! | Config type | Runtime type |
//! |-------------|-------------|
//! | [`TapConfigSpec`] | [`TapConfig`] |
//! | [`MatchConfigSpec`] | [`MatchRule`](crate::MatchRule) |
//! | [`HeaderMatchSpec`] | [`HeaderMatcher`](crate::HeaderMatcher) |
//! | [`OutputSinkSpec`] | [`SinkKind`] + the sink handed to [`TapConfig::new`] |
//!
//! ```yaml
//! match_configs:
//!   - match_id: foo_match_id
//!     http_match_config:
//!       request_match_config:
//!         headers:
//!           - name: foo
//!             exact_match: bar
//! output_config:
//!   sinks:
//!     - streaming_admin: {}
//! ```
//!
//! [`TapConfig`]: crate::TapConfig
//! [`TapConfig::new`]: crate::TapConfig::new

use crate::SinkKind;
use serde::{Deserialize, Serialize};

/// Top-level tap configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TapConfigSpec {
    /// Match rules, evaluated in order (first match wins).
    #[serde(default)]
    pub match_configs: Vec<MatchConfigSpec>,

    /// Where completed traces go.
    #[serde(default)]
    pub output_config: OutputConfigSpec,
}

/// One match rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchConfigSpec {
    /// Identifier copied into every trace this rule triggers.
    #[serde(default)]
    pub match_id: String,

    /// Request and response header criteria.
    #[serde(default)]
    pub http_match_config: HttpMatchSpec,
}

/// Request/response criteria of a match rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpMatchSpec {
    /// Criteria evaluated when request headers complete.
    #[serde(default)]
    pub request_match_config: MessageMatchSpec,

    /// Criteria evaluated when response headers complete.
    #[serde(default)]
    pub response_match_config: MessageMatchSpec,
}

/// Header criteria for one direction. An empty list never matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageMatchSpec {
    /// All of these must match.
    #[serde(default)]
    pub headers: Vec<HeaderMatchSpec>,
}

/// A single header predicate.
///
/// At most one of the `*_match` specifiers may be set. When none is set the
/// predicate checks for presence of the header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderMatchSpec {
    /// Header name, compared case-insensitively.
    pub name: String,

    /// Value equals this string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_match: Option<String>,

    /// Value matches this regex in full.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_match: Option<String>,

    /// Value, parsed as a signed integer, falls in `[start, end)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_match: Option<RangeSpec>,

    /// Header presence (`true`) or absence when combined with `invert_match`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present_match: Option<bool>,

    /// Value starts with this string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_match: Option<String>,

    /// Value ends with this string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix_match: Option<String>,

    /// Value contains this string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains_match: Option<String>,

    /// Invert the result.
    #[serde(default)]
    pub invert_match: bool,
}

/// Half-open integer range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec {
    /// Inclusive start.
    pub start: i64,
    /// Exclusive end.
    pub end: i64,
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfigSpec {
    /// Exactly one sink is supported.
    #[serde(default)]
    pub sinks: Vec<OutputSinkSpec>,
}

/// One output sink. Exactly one field must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSinkSpec {
    /// Stream traces to an attached admin client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming_admin: Option<StreamingAdminSinkSpec>,

    /// Write one file per trace (declared in config, not supported by this tap).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_per_tap: Option<FilePerTapSinkSpec>,
}

impl OutputSinkSpec {
    /// A streaming admin sink entry.
    #[must_use]
    pub fn streaming_admin() -> Self {
        Self {
            streaming_admin: Some(StreamingAdminSinkSpec {}),
            ..Self::default()
        }
    }

    /// Every sink kind set on this entry, in declaration order.
    #[must_use]
    pub fn kinds(&self) -> Vec<SinkKind> {
        let mut kinds = Vec::with_capacity(1);
        if self.streaming_admin.is_some() {
            kinds.push(SinkKind::StreamingAdmin);
        }
        if self.file_per_tap.is_some() {
            kinds.push(SinkKind::FilePerTap);
        }
        kinds
    }
}

/// Streaming admin sink. No settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamingAdminSinkSpec {}

/// File-per-trace sink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilePerTapSinkSpec {
    /// Path prefix for the written files.
    pub path_prefix: String,
}
