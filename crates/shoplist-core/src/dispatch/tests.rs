use crate::{
    call::{AppCall, Lifecycle, OnCompletion},
    dispatch::{AppState, CallReceipt, Dispatcher},
    error::{ErrorClass, ErrorOrigin},
    key::{Field, StateKey},
    layout::ListLayout,
    obs::{CallTraceEvent, CallTraceSink, metrics_report, metrics_reset_all},
    ops::OperationKind,
    store::{GlobalStore, MemoryStore, StableStore, state_fingerprint},
    test_support::{
        TEST_APP_ID, add_call, add_item_call, clear_call, count_of, created_store, field_of,
        full_record_of, remove_call, some4, test_memory, update_call,
    },
    value::StateValue,
    view::verify_density,
};
use std::sync::Mutex;

static TRACE_EVENTS: Mutex<Vec<CallTraceEvent>> = Mutex::new(Vec::new());
static TEST_TRACE_SINK: TestTraceSink = TestTraceSink;

///
/// TestTraceSink
///

struct TestTraceSink;

impl CallTraceSink for TestTraceSink {
    fn on_event(&self, event: CallTraceEvent) {
        TRACE_EVENTS
            .lock()
            .expect("trace event lock should succeed")
            .push(event);
    }
}

// Clear and return all buffered trace events for structural assertions.
fn take_trace_events() -> Vec<CallTraceEvent> {
    let mut events = TRACE_EVENTS
        .lock()
        .expect("trace event lock should succeed");
    let out = events.clone();
    events.clear();
    out
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(ListLayout::Full)
}

// Scenario 1 state: created, one record.
fn with_apple() -> MemoryStore {
    let mut store = MemoryStore::new();
    let d = dispatcher();

    d.execute(&mut store, &AppCall::create()).unwrap();
    d.execute(&mut store, &add_call("Apple", "2", "Produce", "fresh"))
        .unwrap();

    store
}

// ---------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------

#[test]
fn scenario_create_then_add() {
    let mut store = MemoryStore::new();
    let d = dispatcher();

    let receipt = d.execute(&mut store, &AppCall::create()).unwrap();
    assert_eq!(receipt, CallReceipt::lifecycle(Lifecycle::Create));
    assert_eq!(count_of(&store), Some(0));

    let receipt = d
        .execute(&mut store, &add_call("Apple", "2", "Produce", "fresh"))
        .unwrap();
    let op = receipt.operation.unwrap();

    assert_eq!(op.kind, OperationKind::Add);
    assert_eq!(count_of(&store), Some(1));
    assert_eq!(full_record_of(&store, 0), some4("Apple", "2", "Produce", "fresh"));
}

#[test]
fn scenario_remove_first_of_two_relocates_last() {
    let mut store = with_apple();
    let d = dispatcher();

    d.execute(&mut store, &add_call("Bread", "1", "Bakery", ""))
        .unwrap();
    assert_eq!(count_of(&store), Some(2));

    d.execute(&mut store, &remove_call(0)).unwrap();

    assert_eq!(count_of(&store), Some(1));
    assert_eq!(full_record_of(&store, 0), some4("Bread", "1", "Bakery", ""));
    for field in ListLayout::Full.fields() {
        assert!(!store.contains_key(&StateKey::field(*field, 1)));
    }
}

#[test]
fn scenario_update_in_place() {
    let mut store = with_apple();

    dispatcher()
        .execute(&mut store, &update_call(0, "Apple", "5", "Produce", "ripe"))
        .unwrap();

    assert_eq!(count_of(&store), Some(1));
    assert_eq!(full_record_of(&store, 0), some4("Apple", "5", "Produce", "ripe"));
}

#[test]
fn scenario_remove_out_of_range_is_rejected() {
    let mut store = with_apple();
    let before = store.clone();

    let err = dispatcher()
        .execute(&mut store, &remove_call(5))
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::IndexOutOfRange);
    assert_eq!(count_of(&store), Some(1));
    assert_eq!(store, before);
}

#[test]
fn scenario_clear_all_removes_every_field_key() {
    let mut store = created_store();
    let d = dispatcher();
    for name in ["Apple", "Bread", "Milk"] {
        d.execute(&mut store, &add_call(name, "1", "Misc", "")).unwrap();
    }
    assert_eq!(count_of(&store), Some(3));

    d.execute(&mut store, &clear_call()).unwrap();

    assert_eq!(count_of(&store), Some(0));
    for index in 0..3 {
        for field in ListLayout::Full.fields() {
            assert_eq!(field_of(&store, *field, index), None);
        }
    }
}

#[test]
fn scenario_add_in_two_call_bundle_is_rejected() {
    let mut store = with_apple();
    let before = store.clone();

    let call = add_call("Eggs", "12", "Dairy", "").in_group(2);
    let err = dispatcher().execute(&mut store, &call).unwrap_err();

    assert_eq!(err.class, ErrorClass::BundleSizeViolation);
    assert_eq!(count_of(&store), Some(1));
    assert_eq!(store, before);
}

// ---------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------

#[test]
fn disallowed_lifecycle_actions_reject_in_every_state() {
    let d = dispatcher();
    let forbidden = [
        OnCompletion::OptIn,
        OnCompletion::CloseOut,
        OnCompletion::ClearState,
        OnCompletion::UpdateApplication,
        OnCompletion::DeleteApplication,
    ];

    for mut store in [MemoryStore::new(), with_apple()] {
        let before = state_fingerprint(&store).unwrap();

        for oc in forbidden {
            let call = AppCall::lifecycle_call(TEST_APP_ID, oc);
            let err = d.execute(&mut store, &call).unwrap_err();

            assert_eq!(err.class, ErrorClass::LifecycleRejected, "{oc:?}");
            assert_eq!(err.origin, ErrorOrigin::Lifecycle);
        }

        assert_eq!(state_fingerprint(&store).unwrap(), before);
    }
}

#[test]
fn creation_happens_exactly_once() {
    let mut store = MemoryStore::new();
    let d = dispatcher();

    assert_eq!(Dispatcher::state(&store).unwrap(), AppState::Uninitialized);
    d.execute(&mut store, &AppCall::create()).unwrap();
    assert_eq!(Dispatcher::state(&store).unwrap(), AppState::Created);

    let err = d.execute(&mut store, &AppCall::create()).unwrap_err();
    assert_eq!(err.class, ErrorClass::LifecycleRejected);
    assert_eq!(count_of(&store), Some(0));
}

#[test]
fn creation_ignores_declared_action_and_arguments() {
    let mut store = MemoryStore::new();
    let mut call = AppCall::lifecycle_call(0, OnCompletion::DeleteApplication);
    call.args.push(b"Add".to_vec());

    dispatcher().execute(&mut store, &call).unwrap();

    assert_eq!(
        store.entries().unwrap(),
        vec![(StateKey::count(), StateValue::Uint(0))]
    );
}

#[test]
fn data_call_before_creation_is_rejected() {
    let mut store = MemoryStore::new();

    let err = dispatcher()
        .execute(&mut store, &add_call("Apple", "2", "Produce", ""))
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::LifecycleRejected);
    assert!(store.is_empty());
}

#[test]
fn bundle_check_precedes_tag_decode() {
    let mut store = with_apple();
    let call = AppCall::noop(TEST_APP_ID, vec![b"Bogus".to_vec()]).in_group(3);

    let err = dispatcher().execute(&mut store, &call).unwrap_err();
    assert_eq!(err.class, ErrorClass::BundleSizeViolation);
}

// ---------------------------------------------------------------------
// Decode and limits
// ---------------------------------------------------------------------

#[test]
fn unknown_tag_is_rejected_without_mutation() {
    let mut store = with_apple();
    let before = store.clone();

    let call = AppCall::noop(TEST_APP_ID, vec![b"add".to_vec(), b"Apple".to_vec()]);
    let err = dispatcher().execute(&mut store, &call).unwrap_err();

    assert_eq!(err.class, ErrorClass::UnknownOperation);
    assert_eq!(store, before);
}

#[test]
fn add_with_missing_fields_is_malformed() {
    let mut store = with_apple();
    let call = AppCall::noop(
        TEST_APP_ID,
        vec![b"Add".to_vec(), b"Eggs".to_vec(), b"12".to_vec()],
    );

    let err = dispatcher().execute(&mut store, &call).unwrap_err();

    assert_eq!(err.class, ErrorClass::MalformedArgument);
    assert_eq!(count_of(&store), Some(1));
}

#[test]
fn max_records_caps_adds() {
    let mut store = created_store();
    let d = dispatcher().with_max_records(2);

    d.execute(&mut store, &add_call("A", "1", "", "")).unwrap();
    d.execute(&mut store, &add_call("B", "1", "", "")).unwrap();
    let err = d.execute(&mut store, &add_call("C", "1", "", "")).unwrap_err();

    assert_eq!(err.class, ErrorClass::CapacityExceeded);
    assert_eq!(count_of(&store), Some(2));

    d.execute(&mut store, &remove_call(0)).unwrap();
    d.execute(&mut store, &add_call("C", "1", "", "")).unwrap();
    assert_eq!(count_of(&store), Some(2));
}

#[test]
fn minimal_layout_round_trip() {
    let mut store = MemoryStore::new();
    let d = Dispatcher::new(ListLayout::Minimal);

    d.execute(&mut store, &AppCall::create()).unwrap();
    d.execute(&mut store, &add_item_call("Milk")).unwrap();
    d.execute(&mut store, &add_item_call("Eggs")).unwrap();
    d.execute(&mut store, &remove_call(0)).unwrap();

    assert_eq!(count_of(&store), Some(1));
    assert_eq!(field_of(&store, Field::Item, 0), Some(b"Eggs".to_vec()));

    let err = d.execute(&mut store, &clear_call()).unwrap_err();
    assert_eq!(err.class, ErrorClass::UnknownOperation);
}

#[test]
fn corrupt_count_rejects_data_calls() {
    let mut store = MemoryStore::new();
    store.put(StateKey::count(), StateValue::Bytes(b"3".to_vec()));

    let err = dispatcher()
        .execute(&mut store, &clear_call())
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::Corruption);
}

#[test]
fn oversized_entry_never_reaches_stable_memory() {
    let mut store = StableStore::init(test_memory(11));
    let d = dispatcher();
    d.execute(&mut store, &AppCall::create()).unwrap();
    d.execute(&mut store, &add_call("Apple", "2", "Produce", ""))
        .unwrap();
    let before = state_fingerprint(&store).unwrap();

    let err = d
        .execute(&mut store, &add_call(&"x".repeat(200), "1", "", ""))
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::HostLimit);
    assert!(err.message.contains("Name_1"));
    assert_eq!(state_fingerprint(&store).unwrap(), before);
    assert_eq!(count_of(&store), Some(1));
    verify_density(&store, ListLayout::Full).unwrap();
}

#[test]
fn oversized_update_leaves_record_intact() {
    let mut store = with_apple();
    let before = state_fingerprint(&store).unwrap();

    let err = dispatcher()
        .execute(&mut store, &update_call(0, "Apple", "2", "Produce", &"n".repeat(200)))
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::HostLimit);
    assert_eq!(state_fingerprint(&store).unwrap(), before);
}

// ---------------------------------------------------------------------
// Observability
// ---------------------------------------------------------------------

#[test]
fn metrics_follow_call_outcomes() {
    metrics_reset_all();

    let mut store = with_apple();
    let d = dispatcher();
    d.execute(&mut store, &add_call("Bread", "1", "Bakery", ""))
        .unwrap();
    d.execute(&mut store, &remove_call(0)).unwrap();
    d.execute(&mut store, &remove_call(9)).unwrap_err();
    d.execute(&mut store, &clear_call()).unwrap();

    let counters = metrics_report().counters;
    assert_eq!(counters.ops.calls, 6);
    assert_eq!(counters.ops.approved, 5);
    assert_eq!(counters.ops.rejected, 1);
    assert_eq!(counters.ops.records_added, 2);
    assert_eq!(counters.ops.records_relocated, 1);
    assert_eq!(counters.ops.records_cleared, 1);
    assert_eq!(counters.rejections.get("index_out_of_range"), Some(&1));
    assert_eq!(counters.lifecycles.get("Create"), Some(&1));
}

#[test]
fn trace_reports_start_finish_and_reject() {
    take_trace_events();

    let d = dispatcher().with_trace_sink(&TEST_TRACE_SINK);
    let mut store = MemoryStore::new();
    let empty = state_fingerprint(&store).unwrap();

    d.execute(&mut store, &AppCall::create()).unwrap();
    let created = state_fingerprint(&store).unwrap();
    d.execute(&mut store, &remove_call(0)).unwrap_err();

    let events = take_trace_events();
    assert_eq!(events.len(), 4);
    assert_eq!(
        events[0],
        CallTraceEvent::Start {
            app_id: 0,
            lifecycle: Lifecycle::Create,
            group_size: 1,
            before: empty,
        }
    );
    assert_eq!(
        events[1],
        CallTraceEvent::Finish {
            lifecycle: Lifecycle::Create,
            operation: None,
            after: created,
        }
    );
    assert!(matches!(
        events[3],
        CallTraceEvent::Reject {
            lifecycle: Lifecycle::NoOp,
            class: ErrorClass::IndexOutOfRange,
            origin: ErrorOrigin::Operation,
        }
    ));
}
