#![forbid(unsafe_code)]

//! Structured logging for the selector.
//!
//! The selector logs at three levels: `warn!` for misuse by the host (an
//! unknown entry handle), `debug!` for state changes a host developer cares
//! about (entries added, selection moves, transitions finishing), and
//! `trace!` for per-frame and per-callback detail. Layout passes run inside
//! a `trace_span!`.
//!
//! With the `tracing` feature these are the `tracing` macros, re-exported
//! here and at the crate root. Without it they compile to nothing and
//! `trace_span!` yields a [`NoopSpan`], so call sites never need a `cfg`.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, trace_span, warn};

#[cfg(not(feature = "tracing"))]
mod disabled {
    /// Host misuse. Compiled out without the `tracing` feature.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// Selector state changes. Compiled out without the `tracing` feature.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Per-frame detail. Compiled out without the `tracing` feature.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// Span around a layout pass; a [`NoopSpan`](crate::logging::NoopSpan)
    /// without the `tracing` feature.
    #[macro_export]
    macro_rules! trace_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

/// Stand-in for `tracing::Span` when logging is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Mirrors `Span::enter`; the guard does nothing.
    #[must_use]
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }
}

/// Guard returned by [`NoopSpan::enter`].
#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct NoopGuard;

#[cfg(all(test, not(feature = "tracing")))]
mod tests {
    #[test]
    fn disabled_macros_accept_structured_fields() {
        let entry = 3usize;
        crate::debug!(entry, zoom = 0.5, "selection changed");
        crate::trace!(?entry, "frame");
        crate::warn!(target: "selgrid", entry, "unknown entry");
        let span = crate::trace_span!("selgrid.layout", entries = entry);
        let _guard = span.enter();
    }
}
