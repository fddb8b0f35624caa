use crate::{error::InternalError, key::StateKey, store::GlobalStore, value::StateValue};
use std::collections::BTreeMap;

///
/// StagedStore
///
/// Write overlay over a base store for one call (or one atomic group).
///
/// Reads see staged writes first. Nothing reaches the base store until
/// `commit`; dropping the overlay discards every staged write, which is how a
/// rejected call leaves state untouched.
///

pub struct StagedStore<'a, S: GlobalStore> {
    base: &'a mut S,
    writes: BTreeMap<StateKey, Option<StateValue>>,
}

impl<'a, S: GlobalStore> StagedStore<'a, S> {
    pub fn new(base: &'a mut S) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
        }
    }

    /// Staged writes in key order; `None` marks a delete.
    pub fn staged(&self) -> impl Iterator<Item = (&StateKey, Option<&StateValue>)> {
        self.writes.iter().map(|(key, value)| (key, value.as_ref()))
    }

    #[must_use]
    pub fn write_set(&self) -> WriteSet {
        let puts = self.writes.values().filter(|w| w.is_some()).count() as u64;
        let deletes = self.writes.len() as u64 - puts;

        WriteSet { puts, deletes }
    }

    /// Apply staged writes to the base store in key order.
    pub fn commit(self) -> WriteSet {
        let write_set = self.write_set();

        for (key, write) in self.writes {
            match write {
                Some(value) => self.base.put(key, value),
                None => self.base.delete(&key),
            }
        }

        write_set
    }
}

impl<S: GlobalStore> GlobalStore for StagedStore<'_, S> {
    fn get(&self, key: &StateKey) -> Result<Option<StateValue>, InternalError> {
        match self.writes.get(key) {
            Some(write) => Ok(write.clone()),
            None => self.base.get(key),
        }
    }

    fn put(&mut self, key: StateKey, value: StateValue) {
        self.writes.insert(key, Some(value));
    }

    fn delete(&mut self, key: &StateKey) {
        self.writes.insert(key.clone(), None);
    }

    fn entries(&self) -> Result<Vec<(StateKey, StateValue)>, InternalError> {
        let mut merged: BTreeMap<StateKey, StateValue> = self.base.entries()?.into_iter().collect();

        for (key, write) in &self.writes {
            match write {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        Ok(merged.into_iter().collect())
    }
}

///
/// WriteSet
///
/// Distinct keys written (`puts`) and deleted (`deletes`) by a staged call.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WriteSet {
    pub puts: u64,
    pub deletes: u64,
}
