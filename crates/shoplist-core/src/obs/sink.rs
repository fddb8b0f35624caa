//! Metrics sink boundary.
//!
//! Dispatch logic never touches `obs::metrics` directly. All instrumentation
//! flows through `MetricsEvent` and `MetricsSink`.

use crate::{
    call::Lifecycle,
    error::ErrorClass,
    obs::metrics::{self, EventReport},
    ops::{OperationKind, OperationReceipt},
};

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    CallStart {
        lifecycle: Lifecycle,
    },
    CallFinish {
        approved: bool,
        inst_delta: u64,
    },
    Operation {
        kind: OperationKind,
        relocated: bool,
        cleared: u64,
    },
    Rejected {
        class: ErrorClass,
    },
}

impl MetricsEvent {
    pub(crate) const fn operation(receipt: &OperationReceipt) -> Self {
        let cleared = match receipt.kind {
            OperationKind::ClearAll => receipt.count_before,
            _ => 0,
        };

        Self::Operation {
            kind: receipt.kind,
            relocated: receipt.relocated_from.is_some(),
            cleared,
        }
    }
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// GlobalMetricsSink
/// Process-local sink that writes into the thread-local metrics state.
///

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::CallStart { lifecycle } => {
                metrics::with_state_mut(|m| {
                    m.ops.calls = m.ops.calls.saturating_add(1);
                    metrics::bump(&mut m.lifecycles, lifecycle.name());
                });
            }

            MetricsEvent::CallFinish {
                approved,
                inst_delta,
            } => {
                metrics::with_state_mut(|m| {
                    if approved {
                        m.ops.approved = m.ops.approved.saturating_add(1);
                    } else {
                        m.ops.rejected = m.ops.rejected.saturating_add(1);
                    }
                    metrics::add_instructions(
                        &mut m.perf.call_inst_total,
                        &mut m.perf.call_inst_max,
                        inst_delta,
                    );
                });
            }

            MetricsEvent::Operation {
                kind,
                relocated,
                cleared,
            } => {
                metrics::with_state_mut(|m| {
                    let ops = &mut m.ops;
                    match kind {
                        OperationKind::Add => {
                            ops.add_calls = ops.add_calls.saturating_add(1);
                            ops.records_added = ops.records_added.saturating_add(1);
                        }
                        OperationKind::Update => {
                            ops.update_calls = ops.update_calls.saturating_add(1);
                            ops.records_updated = ops.records_updated.saturating_add(1);
                        }
                        OperationKind::Remove => {
                            ops.remove_calls = ops.remove_calls.saturating_add(1);
                            ops.records_removed = ops.records_removed.saturating_add(1);
                            if relocated {
                                ops.records_relocated = ops.records_relocated.saturating_add(1);
                            }
                        }
                        OperationKind::ClearAll => {
                            ops.clear_calls = ops.clear_calls.saturating_add(1);
                            ops.records_cleared = ops.records_cleared.saturating_add(cleared);
                        }
                    }
                });
            }

            MetricsEvent::Rejected { class } => {
                metrics::with_state_mut(|m| {
                    metrics::bump(&mut m.rejections, &class.to_string());
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    GLOBAL_METRICS_SINK.record(event);
}

/// Snapshot the current metrics state for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset all metrics state (counters + perf).
pub fn metrics_reset_all() {
    metrics::reset_all();
}

#[expect(clippy::missing_const_for_fn)]
fn read_perf_counter() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        canic_cdk::api::performance_counter(1)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        0
    }
}

///
/// Span
/// RAII guard that emits start/finish metrics events for one call.
/// A span dropped without `approve` counts as a rejection, including on unwind.
///

pub(crate) struct Span {
    start: u64,
    approved: bool,
    finished: bool,
}

impl Span {
    /// Start a metrics span for one call.
    #[must_use]
    pub(crate) fn new(lifecycle: Lifecycle) -> Self {
        record(MetricsEvent::CallStart { lifecycle });

        Self {
            start: read_perf_counter(),
            approved: false,
            finished: false,
        }
    }

    pub(crate) const fn approve(&mut self) {
        self.approved = true;
    }

    fn finish_inner(&self) {
        let now = read_perf_counter();
        let delta = now.saturating_sub(self.start);

        record(MetricsEvent::CallFinish {
            approved: self.approved,
            inst_delta: delta,
        });
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        if !self.finished {
            self.finish_inner();
            self.finished = true;
        }
    }
}

///
/// TESTS
///
