//! Observability: runtime telemetry (metrics), the metrics sink boundary, and
//! optional per-call tracing.
//!
//! Nothing in here reads or writes global state; tracing receives store
//! fingerprints computed by the dispatcher.

pub(crate) mod metrics;
pub(crate) mod sink;
pub(crate) mod trace;

// re-exports
pub use metrics::{EventOps, EventPerf, EventReport, EventState};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all};
pub use trace::{CallTraceEvent, CallTraceSink};
