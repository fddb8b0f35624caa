use crate::{
    error::InternalError,
    key::StateKey,
    store::GlobalStore,
    value::{RawStateValue, StateValue},
};
use canic_cdk::structures::{BTreeMap, DefaultMemoryImpl, memory::VirtualMemory};
use derive_more::{Deref, DerefMut};

///
/// StableStore
///
/// Global state persisted in stable memory. Values are kept in their tagged
/// raw form and decoded on read, so a corrupt entry surfaces as an error on
/// the call that touches it instead of trapping at load.
///

#[derive(Deref, DerefMut)]
pub struct StableStore(BTreeMap<StateKey, RawStateValue, VirtualMemory<DefaultMemoryImpl>>);

impl StableStore {
    /// Initialize (or reopen) a store over the provided backing memory.
    #[must_use]
    pub fn init(memory: VirtualMemory<DefaultMemoryImpl>) -> Self {
        Self(BTreeMap::init(memory))
    }
}

impl GlobalStore for StableStore {
    fn get(&self, key: &StateKey) -> Result<Option<StateValue>, InternalError> {
        self.0
            .get(key)
            .map(|raw| StateValue::try_from_raw(&raw).map_err(InternalError::from))
            .transpose()
    }

    fn put(&mut self, key: StateKey, value: StateValue) {
        self.0.insert(key, value.to_raw());
    }

    fn delete(&mut self, key: &StateKey) {
        self.0.remove(key);
    }

    fn entries(&self) -> Result<Vec<(StateKey, StateValue)>, InternalError> {
        self.0
            .iter()
            .map(|entry| {
                let value = StateValue::try_from_raw(&entry.value())?;

                Ok((entry.key().clone(), value))
            })
            .collect()
    }
}
