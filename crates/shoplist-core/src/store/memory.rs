use crate::{error::InternalError, key::StateKey, store::GlobalStore, value::StateValue};
use derive_more::{Deref, DerefMut};
use std::collections::BTreeMap;

///
/// MemoryStore
///
/// Heap-backed global state. Used off-chain and in tests.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Eq, PartialEq)]
pub struct MemoryStore(BTreeMap<StateKey, StateValue>);

impl MemoryStore {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }
}

impl GlobalStore for MemoryStore {
    fn get(&self, key: &StateKey) -> Result<Option<StateValue>, InternalError> {
        Ok(self.0.get(key).cloned())
    }

    fn put(&mut self, key: StateKey, value: StateValue) {
        self.0.insert(key, value);
    }

    fn delete(&mut self, key: &StateKey) {
        self.0.remove(key);
    }

    fn entries(&self) -> Result<Vec<(StateKey, StateValue)>, InternalError> {
        Ok(self
            .0
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}

impl FromIterator<(StateKey, StateValue)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (StateKey, StateValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
