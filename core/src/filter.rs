//! Tap filter: the binding point inside the proxy's HTTP filter chain.
//!
//! [`TapFilterConfig`] lives as long as the listener's filter chain and holds
//! the currently installed [`TapConfig`] (if any). Installing or clearing a
//! tap swaps it atomically; in-flight requests keep the config they started
//! with. [`TapFilter`] is the per-request half.

use crate::{HeaderMap, PerRequestTapper, TapConfig};
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Filter statistics.
#[derive(Debug, Default)]
pub struct TapStats {
    rq_tapped: AtomicU64,
}

impl TapStats {
    /// Requests whose trace was submitted.
    #[must_use]
    pub fn rq_tapped(&self) -> u64 {
        self.rq_tapped.load(Ordering::Relaxed)
    }
}

/// Shared filter state for one tap config id.
#[derive(Debug)]
pub struct TapFilterConfig {
    config_id: String,
    current: ArcSwapOption<TapConfig>,
    stats: TapStats,
}

impl TapFilterConfig {
    /// Create a filter config with no tap installed.
    pub fn new(config_id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            config_id: config_id.into(),
            current: ArcSwapOption::empty(),
            stats: TapStats::default(),
        })
    }

    /// The id admin sessions use to address this filter.
    #[must_use]
    pub fn config_id(&self) -> &str {
        &self.config_id
    }

    /// Install a tap, replacing any previous one.
    pub fn install(&self, config: Arc<TapConfig>) {
        tracing::debug!(config_id = %self.config_id, "installing tap config");
        self.current.store(Some(config));
    }

    /// Remove the installed tap.
    pub fn clear(&self) {
        tracing::debug!(config_id = %self.config_id, "clearing tap config");
        self.current.store(None);
    }

    /// Remove the installed tap only if it is still `config`.
    ///
    /// Returns `true` if it was cleared.
    pub fn clear_if(&self, config: &Arc<TapConfig>) -> bool {
        let previous = self.current.rcu(|current| match current {
            Some(c) if Arc::ptr_eq(c, config) => None,
            other => other.clone(),
        });
        let cleared = previous.is_some_and(|p| Arc::ptr_eq(&p, config));
        if cleared {
            tracing::debug!(config_id = %self.config_id, "cleared tap config");
        }
        cleared
    }

    /// The installed tap, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<TapConfig>> {
        self.current.load_full()
    }

    /// Filter statistics.
    #[must_use]
    pub fn stats(&self) -> &TapStats {
        &self.stats
    }
}

/// Per-request filter instance.
///
/// Binds to the tap installed when the request starts. With no tap
/// installed every callback is a no-op.
#[derive(Debug)]
pub struct TapFilter {
    config: Arc<TapFilterConfig>,
    tapper: Option<PerRequestTapper>,
}

impl TapFilter {
    /// Start a request.
    pub fn new(config: Arc<TapFilterConfig>) -> Self {
        let tapper = config.current().map(|c| c.new_per_request_tapper());
        Self { config, tapper }
    }

    /// Whether a tap was installed when this request started.
    #[must_use]
    pub fn is_tapping(&self) -> bool {
        self.tapper.is_some()
    }

    /// Request headers complete.
    pub fn decode_headers(&mut self, headers: &HeaderMap) {
        if let Some(tapper) = &mut self.tapper {
            tapper.on_request_headers(headers);
        }
    }

    /// Response headers complete.
    pub fn encode_headers(&mut self, headers: &HeaderMap) {
        if let Some(tapper) = &mut self.tapper {
            tapper.on_response_headers(headers);
        }
    }

    /// Access log point. Returns `true` if a trace was submitted.
    pub fn log(&mut self, request_headers: &HeaderMap, response_headers: Option<&HeaderMap>) -> bool {
        let Some(tapper) = &mut self.tapper else {
            return false;
        };
        let tapped = tapper.on_log(request_headers, response_headers);
        if tapped {
            self.config.stats.rq_tapped.fetch_add(1, Ordering::Relaxed);
        }
        tapped
    }
}
