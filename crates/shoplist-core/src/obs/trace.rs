//! Call tracing boundary.
//!
//! Tracing is optional, injected by the caller, and must not affect call
//! semantics.

use crate::{
    call::Lifecycle,
    error::{ErrorClass, ErrorOrigin, InternalError},
    ops::OperationReceipt,
    store::StateFingerprint,
};

///
/// CallTraceSink
///

pub trait CallTraceSink: Send + Sync {
    fn on_event(&self, event: CallTraceEvent);
}

///
/// CallTraceEvent
///
/// `before` / `after` fingerprint the visible state on entry and on approval.
/// A rejected call has no `after`: its writes are discarded.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CallTraceEvent {
    Start {
        app_id: u64,
        lifecycle: Lifecycle,
        group_size: u32,
        before: StateFingerprint,
    },
    Finish {
        lifecycle: Lifecycle,
        operation: Option<OperationReceipt>,
        after: StateFingerprint,
    },
    Reject {
        lifecycle: Lifecycle,
        class: ErrorClass,
        origin: ErrorOrigin,
    },
}

///
/// TraceScope
///

pub(crate) struct TraceScope {
    sink: &'static dyn CallTraceSink,
    lifecycle: Lifecycle,
}

impl TraceScope {
    pub(crate) fn start(
        sink: &'static dyn CallTraceSink,
        app_id: u64,
        lifecycle: Lifecycle,
        group_size: u32,
        before: StateFingerprint,
    ) -> Self {
        sink.on_event(CallTraceEvent::Start {
            app_id,
            lifecycle,
            group_size,
            before,
        });

        Self { sink, lifecycle }
    }

    pub(crate) fn finish(self, operation: Option<OperationReceipt>, after: StateFingerprint) {
        self.sink.on_event(CallTraceEvent::Finish {
            lifecycle: self.lifecycle,
            operation,
            after,
        });
    }

    pub(crate) fn reject(self, err: &InternalError) {
        self.sink.on_event(CallTraceEvent::Reject {
            lifecycle: self.lifecycle,
            class: err.class,
            origin: err.origin,
        });
    }
}
