//! Admin tap endpoint: attach a tap to every filter sharing a config id.

use crate::{AdminError, StreamingAdminSink};
use dashmap::DashMap;
use httptap::{TapConfig, TapConfigSpec, TapFilterConfig, Trace};
use serde::Deserialize;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;

/// Body of an admin tap request.
///
/// ```yaml
/// config_id: test_config_id
/// tap_config:
///   match_configs:
///     - match_id: m1
///       http_match_config:
///         request_match_config:
///           headers:
///             - name: foo
///               exact_match: bar
///   output_config:
///     sinks:
///       - streaming_admin: {}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TapRequest {
    /// Id of the filters to tap.
    pub config_id: String,
    /// Rules and output config to install.
    pub tap_config: TapConfigSpec,
}

/// Registry of tap filters by config id.
#[derive(Debug, Default)]
pub struct AdminTapHandler {
    filters: DashMap<String, Vec<Arc<TapFilterConfig>>>,
}

impl AdminTapHandler {
    /// Create a handler with no filters registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a filter addressable by its config id.
    ///
    /// Several filters (one per listener, say) may share an id; an attached
    /// session taps all of them.
    pub fn register_filter(&self, filter: Arc<TapFilterConfig>) {
        tracing::debug!(config_id = filter.config_id(), "registering tap filter");
        self.filters
            .entry(filter.config_id().to_owned())
            .or_default()
            .push(filter);
    }

    /// Number of filters registered under `config_id`.
    #[must_use]
    pub fn filter_count(&self, config_id: &str) -> usize {
        self.filters.get(config_id).map_or(0, |f| f.len())
    }

    /// Handle a tap request body and start streaming.
    ///
    /// # Errors
    ///
    /// Fails if the body does not parse, nothing is registered under the
    /// config id, a session is already attached to it, or the tap config
    /// is rejected.
    pub fn attach(&self, body: &str) -> Result<TapSession, AdminError> {
        let request: TapRequest = serde_yaml::from_str(body)?;
        let config_id = request.config_id;

        // Held for the check and the install so concurrent attaches serialize.
        let Some(filters) = self.filters.get_mut(&config_id) else {
            return Err(AdminError::UnknownConfigId { config_id });
        };
        if filters.iter().any(|f| f.current().is_some()) {
            return Err(AdminError::AlreadyAttached { config_id });
        }

        let (sink, rx) = StreamingAdminSink::channel(config_id.clone());
        let config = TapConfig::new(request.tap_config, Arc::new(sink))?;
        for filter in filters.iter() {
            filter.install(config.clone());
        }
        tracing::debug!(
            config_id = %config_id,
            filters = filters.len(),
            rules = config.rules().len(),
            "attached admin tap"
        );

        Ok(TapSession {
            config_id,
            config: Arc::downgrade(&config),
            filters: filters.to_vec(),
            rx,
        })
    }
}

/// An attached admin tap. Dropping it detaches the tap.
///
/// The session does not keep the tap alive: the filters and in-flight
/// requests do. Once they have all let go, the stream ends.
#[derive(Debug)]
pub struct TapSession {
    config_id: String,
    config: Weak<TapConfig>,
    filters: Vec<Arc<TapFilterConfig>>,
    rx: mpsc::UnboundedReceiver<Trace>,
}

impl TapSession {
    /// The config id this session tapped.
    #[must_use]
    pub fn config_id(&self) -> &str {
        &self.config_id
    }

    /// The installed tap, unless it has already been cleared or replaced
    /// and every request using it has finished.
    #[must_use]
    pub fn config(&self) -> Option<Arc<TapConfig>> {
        self.config.upgrade()
    }

    /// Wait for the next trace.
    ///
    /// Returns `None` once no filter or in-flight request holds the tap any
    /// more and every buffered trace has been read.
    pub async fn next_trace(&mut self) -> Option<Trace> {
        self.rx.recv().await
    }

    /// Next trace if one is already buffered.
    pub fn try_next_trace(&mut self) -> Option<Trace> {
        self.rx.try_recv().ok()
    }

    /// Render a trace the way it goes out on the admin stream.
    ///
    /// # Errors
    ///
    /// Fails if YAML serialization fails.
    pub fn render_yaml(trace: &Trace) -> Result<String, AdminError> {
        serde_yaml::to_string(trace).map_err(AdminError::Render)
    }
}

impl Drop for TapSession {
    fn drop(&mut self) {
        let Some(config) = self.config.upgrade() else {
            tracing::debug!(config_id = %self.config_id, "admin tap already released");
            return;
        };
        let cleared = self
            .filters
            .iter()
            .filter(|f| f.clear_if(&config))
            .count();
        tracing::debug!(config_id = %self.config_id, cleared, "detached admin tap");
    }
}
