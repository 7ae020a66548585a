//! Errors raised by the countdown widget and how they reach the user.
//!
//! The widget never panics on bad input. Rejected input is turned into an
//! [`Error`], handed to the configured [`ErrorReporter`], and shown inline
//! under the controls until the next successful change.

use std::sync::Arc;

/// Errors produced while interpreting user input or configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The time-of-day input is not three integers separated by colons.
    #[error("Invalid time format {input:?}! Use HH:MM:SS.")]
    InvalidClock {
        /// The rejected input.
        input: String,
    },

    /// The `seconds` attribute is not a non-negative integer.
    #[error("invalid seconds value {value:?}, using 0")]
    InvalidSeconds {
        /// The rejected attribute value.
        value: String,
    },
}

/// Receives errors the widget wants to surface.
///
/// Embedders pick the presentation: log it, pop a modal, or collect it for a
/// status bar. Closures work directly:
///
/// ```rust
/// use countdown_widget::error::{Error, ErrorReporter};
///
/// let reporter = |err: &Error| eprintln!("{err}");
/// reporter.report(&Error::InvalidClock { input: "ab:00:00".into() });
/// ```
pub trait ErrorReporter: Send + Sync {
    /// Presents `err` to the user.
    fn report(&self, err: &Error);
}

impl<F> ErrorReporter for F
where
    F: Fn(&Error) + Send + Sync,
{
    fn report(&self, err: &Error) {
        self(err)
    }
}

/// Default reporter: emits a `warn` level tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, err: &Error) {
        tracing::warn!(error = %err, "countdown input rejected");
    }
}

pub(crate) fn default_reporter() -> Arc<dyn ErrorReporter> {
    Arc::new(TracingReporter)
}
