//! `StreamingAdminSink`: pushes traces to an attached admin client.

use httptap::{Sink, Trace};
use tokio::sync::mpsc;

/// Sink feeding an admin session's trace stream.
///
/// Submission never blocks and never fails from the caller's point of view:
/// once the session is gone, traces are dropped.
#[derive(Debug)]
pub struct StreamingAdminSink {
    config_id: String,
    tx: mpsc::UnboundedSender<Trace>,
}

impl StreamingAdminSink {
    /// Create a sink and the receiving half of its stream.
    #[must_use]
    pub fn channel(config_id: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<Trace>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            config_id: config_id.into(),
            tx,
        };
        (sink, rx)
    }

    /// The config id this sink streams for.
    #[must_use]
    pub fn config_id(&self) -> &str {
        &self.config_id
    }
}

impl Sink for StreamingAdminSink {
    fn submit_buffered_trace(&self, trace: Trace) {
        if let Err(dropped) = self.tx.send(trace) {
            tracing::debug!(
                config_id = %self.config_id,
                match_id = %dropped.0.match_id,
                "admin stream closed, dropping trace"
            );
        }
    }
}
