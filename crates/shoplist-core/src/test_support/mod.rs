use crate::{
    call::{AppCall, encode_index},
    key::{Field, StateKey},
    ops::OperationKind,
    store::{GlobalStore, MemoryStore},
    value::StateValue,
};
use canic_cdk::structures::{
    DefaultMemoryImpl,
    memory::{MemoryId, MemoryManager, VirtualMemory},
};

/// Application id used for every non-creation call in core tests.
pub(crate) const TEST_APP_ID: u64 = 1;

// Test-only stable memory allocation for in-memory stores.
pub(crate) fn test_memory(id: u8) -> VirtualMemory<DefaultMemoryImpl> {
    let manager = MemoryManager::init(DefaultMemoryImpl::default());

    manager.get(MemoryId::new(id))
}

/// A store in the state right after creation (`Count = 0`).
pub(crate) fn created_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.put(StateKey::count(), StateValue::Uint(0));

    store
}

pub(crate) fn add_call(name: &str, qty: &str, category: &str, note: &str) -> AppCall {
    AppCall::noop(
        TEST_APP_ID,
        vec![
            OperationKind::Add.tag().to_vec(),
            name.as_bytes().to_vec(),
            qty.as_bytes().to_vec(),
            category.as_bytes().to_vec(),
            note.as_bytes().to_vec(),
        ],
    )
}

pub(crate) fn add_item_call(item: &str) -> AppCall {
    AppCall::noop(
        TEST_APP_ID,
        vec![OperationKind::Add.tag().to_vec(), item.as_bytes().to_vec()],
    )
}

pub(crate) fn update_call(
    index: u64,
    name: &str,
    qty: &str,
    category: &str,
    note: &str,
) -> AppCall {
    AppCall::noop(
        TEST_APP_ID,
        vec![
            OperationKind::Update.tag().to_vec(),
            encode_index(index).to_vec(),
            name.as_bytes().to_vec(),
            qty.as_bytes().to_vec(),
            category.as_bytes().to_vec(),
            note.as_bytes().to_vec(),
        ],
    )
}

pub(crate) fn remove_call(index: u64) -> AppCall {
    AppCall::noop(
        TEST_APP_ID,
        vec![
            OperationKind::Remove.tag().to_vec(),
            encode_index(index).to_vec(),
        ],
    )
}

pub(crate) fn clear_call() -> AppCall {
    AppCall::noop(TEST_APP_ID, vec![OperationKind::ClearAll.tag().to_vec()])
}

/// Stored count, if any.
pub(crate) fn count_of<S: GlobalStore>(store: &S) -> Option<u64> {
    store
        .get(&StateKey::count())
        .unwrap()
        .and_then(|value| value.as_uint())
}

/// Stored byte value of `field` at `index`, if any.
pub(crate) fn field_of<S: GlobalStore>(store: &S, field: Field, index: u64) -> Option<Vec<u8>> {
    store
        .get(&StateKey::field(field, index))
        .unwrap()
        .and_then(|value| value.as_bytes().map(<[u8]>::to_vec))
}

/// All four full-layout field values at `index`, as UTF-8 strings.
pub(crate) fn full_record_of<S: GlobalStore>(store: &S, index: u64) -> [Option<String>; 4] {
    [Field::Name, Field::Qty, Field::Category, Field::Note].map(|field| {
        field_of(store, field, index).map(|bytes| String::from_utf8(bytes).unwrap())
    })
}

/// Shorthand for an expected full record.
pub(crate) fn some4(name: &str, qty: &str, category: &str, note: &str) -> [Option<String>; 4] {
    [name, qty, category, note].map(|s| Some(s.to_string()))
}
