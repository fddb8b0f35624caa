use crate::{
    call::{AppCall, Lifecycle},
    dispatch::{CallReceipt, Dispatcher, PendingCall},
    error::InternalError,
    store::GlobalStore,
};
use candid::CandidType;
use serde::{Deserialize, Serialize};

///
/// Program
///
/// The two programs a deployed instance carries. The host runs the
/// clear-state program for ClearState calls and the approval program for
/// everything else.
///

#[derive(CandidType, Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Program {
    Approval,
    ClearState,
}

impl Program {
    #[must_use]
    pub const fn for_call(call: &AppCall) -> Self {
        match call.lifecycle() {
            Lifecycle::ClearState => Self::ClearState,
            _ => Self::Approval,
        }
    }

    /// Evaluate `call` under this program and commit its writes to `store`.
    ///
    /// The clear-state program approves unconditionally and writes nothing.
    pub fn evaluate<S: GlobalStore>(
        self,
        dispatcher: &Dispatcher,
        store: &mut S,
        call: &AppCall,
    ) -> Result<CallReceipt, InternalError> {
        self.stage(dispatcher, store, call).map(PendingCall::approve)
    }

    pub(crate) fn stage<S: GlobalStore>(
        self,
        dispatcher: &Dispatcher,
        store: &mut S,
        call: &AppCall,
    ) -> Result<PendingCall, InternalError> {
        match self {
            Self::Approval => dispatcher.stage(store, call),
            Self::ClearState => Ok(PendingCall::untracked(CallReceipt::lifecycle(
                Lifecycle::ClearState,
            ))),
        }
    }
}

///
/// TESTS
///
