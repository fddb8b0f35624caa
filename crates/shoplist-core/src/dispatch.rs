//! Approval logic: authorises every call by lifecycle action and routes data
//! calls to their operation handler.

use crate::{
    call::{AppCall, Lifecycle},
    error::InternalError,
    host::check_entries,
    key::StateKey,
    layout::ListLayout,
    obs::{
        sink::{MetricsEvent, Span, record},
        trace::{CallTraceSink, TraceScope},
    },
    ops::{Operation, OperationLimits, OperationReceipt, apply},
    store::{GlobalStore, RecordStore, StagedStore, state_fingerprint},
};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use shoplist_config::ShoplistConfig;

///
/// AppState
///
/// Derived from the store: the instance is `Created` iff `Count` exists.
///

#[derive(CandidType, Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AppState {
    Uninitialized,
    Created,
}

///
/// CallReceipt
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CallReceipt {
    pub lifecycle: Lifecycle,
    pub operation: Option<OperationReceipt>,
}

impl CallReceipt {
    pub(crate) const fn lifecycle(lifecycle: Lifecycle) -> Self {
        Self {
            lifecycle,
            operation: None,
        }
    }
}

///
/// PendingCall
///
/// A call whose writes are staged but not yet durable. Its metrics span stays
/// open until the owner of the outermost commit settles it: `approve` counts
/// the call and its operation, `reject` (or a plain drop) counts a rejection.
///

#[must_use]
pub(crate) struct PendingCall {
    receipt: CallReceipt,
    span: Option<Span>,
}

impl PendingCall {
    // Calls outside the approval program carry no span.
    pub(crate) const fn untracked(receipt: CallReceipt) -> Self {
        Self {
            receipt,
            span: None,
        }
    }

    pub(crate) fn approve(self) -> CallReceipt {
        if let Some(mut span) = self.span {
            span.approve();
            if let Some(op) = &self.receipt.operation {
                record(MetricsEvent::operation(op));
            }
        }

        self.receipt
    }

    pub(crate) fn reject(self, err: &InternalError) {
        if self.span.is_some() {
            record(MetricsEvent::Rejected { class: err.class });
        }
    }
}

///
/// Dispatcher
///

#[derive(Clone, Copy)]
pub struct Dispatcher {
    layout: ListLayout,
    limits: OperationLimits,
    debug: bool,
    trace: Option<&'static dyn CallTraceSink>,
}

impl Dispatcher {
    #[must_use]
    pub const fn new(layout: ListLayout) -> Self {
        Self {
            layout,
            limits: OperationLimits { max_records: None },
            debug: false,
            trace: None,
        }
    }

    /// Cap the number of records an add may grow the list to.
    #[must_use]
    pub const fn with_max_records(mut self, max_records: u64) -> Self {
        self.limits.max_records = Some(max_records);
        self
    }

    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub const fn with_trace_sink(mut self, sink: &'static dyn CallTraceSink) -> Self {
        self.trace = Some(sink);
        self
    }

    #[must_use]
    pub fn from_config(config: &ShoplistConfig) -> Self {
        Self {
            layout: config.list.layout.into(),
            limits: OperationLimits {
                max_records: config.list.max_records,
            },
            debug: config.host.debug,
            trace: None,
        }
    }

    #[must_use]
    pub const fn layout(&self) -> ListLayout {
        self.layout
    }

    #[must_use]
    pub const fn max_records(&self) -> Option<u64> {
        self.limits.max_records
    }

    #[must_use]
    pub const fn is_debug(&self) -> bool {
        self.debug
    }

    fn debug_log(&self, s: impl Into<String>) {
        if self.debug {
            println!("[debug] {}", s.into());
        }
    }

    /// Current lifecycle state of the instance behind `store`.
    pub fn state<S: GlobalStore + ?Sized>(store: &S) -> Result<AppState, InternalError> {
        Ok(if store.contains(&StateKey::count())? {
            AppState::Created
        } else {
            AppState::Uninitialized
        })
    }

    /// Execute one call atomically.
    ///
    /// Writes are staged and reach `store` only if the call approves and every
    /// written entry fits the host's entry limits; a rejected call leaves
    /// `store` untouched.
    pub fn execute<S: GlobalStore>(
        &self,
        store: &mut S,
        call: &AppCall,
    ) -> Result<CallReceipt, InternalError> {
        self.stage(store, call).map(PendingCall::approve)
    }

    // Evaluate one call and commit its writes into `store`, leaving the call
    // pending. `store` is itself an overlay when the caller commits a group.
    pub(crate) fn stage<S: GlobalStore>(
        &self,
        store: &mut S,
        call: &AppCall,
    ) -> Result<PendingCall, InternalError> {
        let mut staged = StagedStore::new(store);
        let pending = self.evaluate(&mut staged, call)?;

        let write_set = staged.commit();
        self.debug_log(format!(
            "commit: {} put(s), {} delete(s)",
            write_set.puts, write_set.deletes
        ));

        Ok(pending)
    }

    // Run one call against a staged store with tracing and logging. Entry
    // limits are checked here so no oversized write ever reaches a commit.
    fn evaluate<S: GlobalStore>(
        &self,
        store: &mut StagedStore<'_, S>,
        call: &AppCall,
    ) -> Result<PendingCall, InternalError> {
        let lifecycle = call.lifecycle();
        let span = Span::new(lifecycle);

        let trace = match self.trace {
            Some(sink) => Some(TraceScope::start(
                sink,
                call.app_id,
                lifecycle,
                call.group_size,
                state_fingerprint(&*store)?,
            )),
            None => None,
        };

        self.debug_log(format!(
            "call: app_id={} lifecycle={lifecycle} args={} group_size={}",
            call.app_id,
            call.args.len(),
            call.group_size
        ));

        let routed = self
            .route(store, call)
            .and_then(|receipt| check_entries(store).map(|()| receipt));

        match routed {
            Ok(receipt) => {
                if let Some(op) = &receipt.operation {
                    self.debug_log(format!(
                        "{}: count {} -> {}",
                        op.kind, op.count_before, op.count_after
                    ));
                }
                if let Some(trace) = trace {
                    trace.finish(receipt.operation.clone(), state_fingerprint(&*store)?);
                }

                Ok(PendingCall {
                    receipt,
                    span: Some(span),
                })
            }
            Err(err) => {
                record(MetricsEvent::Rejected { class: err.class });
                if let Some(trace) = trace {
                    trace.reject(&err);
                }
                if self.debug {
                    println!(
                        "[warn] shoplist call rejected: lifecycle={lifecycle} error={}",
                        err.display_with_class()
                    );
                }

                Err(err)
            }
        }
    }

    fn route<S: GlobalStore>(
        &self,
        store: &mut S,
        call: &AppCall,
    ) -> Result<CallReceipt, InternalError> {
        let lifecycle = call.lifecycle();
        let mut records = RecordStore::new(store, self.layout);

        match lifecycle {
            Lifecycle::Create => {
                if records.try_count()?.is_some() {
                    return Err(InternalError::lifecycle_rejected(
                        "application is already created",
                    ));
                }
                records.set_count(0);

                Ok(CallReceipt::lifecycle(lifecycle))
            }

            Lifecycle::NoOp => {
                if call.group_size != 1 {
                    return Err(InternalError::bundle_size(call.group_size));
                }
                if records.try_count()?.is_none() {
                    return Err(InternalError::lifecycle_rejected(
                        "application has not been created",
                    ));
                }

                let op = Operation::decode(call, self.layout)?;
                let receipt = apply(&mut records, &op, self.limits)?;

                Ok(CallReceipt {
                    lifecycle,
                    operation: Some(receipt),
                })
            }

            Lifecycle::OptIn
            | Lifecycle::CloseOut
            | Lifecycle::ClearState
            | Lifecycle::UpdateApplication
            | Lifecycle::DeleteApplication => Err(InternalError::lifecycle_rejected(format!(
                "{lifecycle} is not permitted"
            ))),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(ListLayout::default())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("layout", &self.layout)
            .field("limits", &self.limits)
            .field("debug", &self.debug)
            .field("trace", &self.trace.is_some())
            .finish()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests;
