//! `Sink`: Destination for completed traces.

use crate::Trace;
use std::fmt;

/// Receives completed traces.
///
/// `submit_buffered_trace` is called from the finalization step of many
/// concurrent requests. Implementations own delivery: ordering,
/// backpressure, and failures stay on their side of this call.
///
/// # Example
///
/// ```
/// use httptap::{Sink, Trace};
/// use std::sync::Mutex;
///
/// #[derive(Debug, Default)]
/// struct Collect(Mutex<Vec<Trace>>);
///
/// impl Sink for Collect {
///     fn submit_buffered_trace(&self, trace: Trace) {
///         self.0.lock().unwrap().push(trace);
///     }
/// }
/// ```
pub trait Sink: Send + Sync + fmt::Debug {
    /// Take ownership of a fully populated trace.
    fn submit_buffered_trace(&self, trace: Trace);
}

/// Sink types that can appear in an output config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// Stream to an attached admin client.
    StreamingAdmin,
    /// One file per trace.
    FilePerTap,
}

impl SinkKind {
    /// Config field name of this sink type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StreamingAdmin => "streaming_admin",
            Self::FilePerTap => "file_per_tap",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
