use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters and simple perf totals for calls.
///

#[derive(CandidType, Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub perf: EventPerf,

    /// Calls per effective lifecycle action, keyed by action name.
    pub lifecycles: BTreeMap<String, u64>,

    /// Rejections per error class label.
    pub rejections: BTreeMap<String, u64>,
}

///
/// EventOps
///

#[derive(CandidType, Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Call outcomes
    pub calls: u64,
    pub approved: u64,
    pub rejected: u64,

    // Data operations
    pub add_calls: u64,
    pub update_calls: u64,
    pub remove_calls: u64,
    pub clear_calls: u64,

    // Records touched
    pub records_added: u64,
    pub records_updated: u64,
    pub records_removed: u64,
    pub records_relocated: u64,
    pub records_cleared: u64,
}

///
/// EventPerf
///

#[derive(CandidType, Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventPerf {
    // Instruction totals per call (performance_counter(1), zero off-chain)
    pub call_inst_total: u128,
    pub call_inst_max: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters and perf totals.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Accumulate instruction counts and track a max.
#[allow(clippy::missing_const_for_fn)]
pub(crate) fn add_instructions(total: &mut u128, max: &mut u64, delta_inst: u64) {
    *total = total.saturating_add(u128::from(delta_inst));
    if delta_inst > *max {
        *max = delta_inst;
    }
}

/// Bump a keyed counter.
pub(crate) fn bump(map: &mut BTreeMap<String, u64>, key: &str) {
    let entry = map.entry(key.to_string()).or_default();
    *entry = entry.saturating_add(1);
}

///
/// EventReport
///

#[derive(CandidType, Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: EventState,
    pub avg_inst_per_call: f64,
}

/// Build a metrics report from in-memory counters.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let counters = with_state(Clone::clone);

    let avg_inst_per_call = if counters.ops.calls > 0 {
        counters.perf.call_inst_total as f64 / counters.ops.calls as f64
    } else {
        0.0
    };

    EventReport {
        counters,
        avg_inst_per_call,
    }
}
