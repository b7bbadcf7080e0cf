//! httptap-admin: admin streaming for the tap
//!
//! An admin client attaches a tap by posting a [`TapRequest`] addressed to a
//! config id. Every [`TapFilterConfig`](httptap::TapFilterConfig) registered
//! under that id gets the new [`TapConfig`](httptap::TapConfig); traces flow
//! back to the client through a [`TapSession`]. Dropping the session detaches
//! the tap.
//!
//! ```text
//! admin client ── POST body ──▶ AdminTapHandler::attach ──▶ TapFilterConfig::install
//!      ▲                                                          │
//!      └──── TapSession::next_trace ◀── StreamingAdminSink ◀── PerRequestTapper::on_log
//! ```

mod handler;
mod sink;

pub use handler::{AdminTapHandler, TapRequest, TapSession};
pub use sink::StreamingAdminSink;

use httptap::TapError;

/// Errors from the admin tap endpoint.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// The request body is not a valid tap request.
    #[error("invalid tap request: {0}")]
    InvalidRequest(#[from] serde_yaml::Error),

    /// No filter registered under the config id.
    #[error("unknown config id \"{config_id}\", no tap filter has registered with this id")]
    UnknownConfigId {
        /// The requested config id.
        config_id: String,
    },

    /// Another admin session already owns this config id.
    #[error("an attached admin tap stream already exists for config id \"{config_id}\"")]
    AlreadyAttached {
        /// The requested config id.
        config_id: String,
    },

    /// The tap config was rejected.
    #[error(transparent)]
    Config(#[from] TapError),

    /// A trace could not be rendered.
    #[error("failed to render trace: {0}")]
    Render(serde_yaml::Error),
}
