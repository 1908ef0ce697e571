//! Span and event macros for the correlation pipeline.
//!
//! Every public entry point opens one info-level span named after itself:
//! `lcc`, `lcc_par`, `flcc`, `flcc_prepare`, `flcc_complete` and
//! `window_sums`. Spans carry the rank and the element counts of the inputs.
//! Inside them the pipeline records events such as `lcc_cross_terms`,
//! `flcc_prepared` (padded length, placements), `normalized` (placements,
//! flat windows) and `degenerate_needle`. [`crate::Correlator`] adds a
//! `correlate` event naming the chosen method.
//!
//! Without the `tracing` feature, spans are [`NoopSpan`] guards and events
//! only borrow their field values, so call sites need no `cfg`.

/// Opens an info-level span for one pipeline stage.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

/// Records an info-level event, e.g. placement or flat-window counts.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(name: $name, $($key = $value),+)
    };
    ($name:expr) => {
        tracing::event!(name: $name, tracing::Level::INFO, {})
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let _ = ($name, $(&$value,)+);
    }};
    ($name:expr) => {{
        let _ = $name;
    }};
}

pub(crate) use trace_event;
pub(crate) use trace_span;

/// Guard returned by `trace_span!` when `tracing` is disabled.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Same shape as `tracing::Span::entered`.
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
