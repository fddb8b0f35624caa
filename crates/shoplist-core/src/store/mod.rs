//! Global-state storage: the flat key-value map a deployed instance owns.
//!
//! Handlers never touch a concrete map. They receive a `&mut impl GlobalStore`
//! and go through `RecordStore` for typed record access.

mod memory;
mod records;
mod stable;
mod staged;

pub use memory::*;
pub use records::*;
pub use stable::*;
pub use staged::*;

use crate::{error::InternalError, key::StateKey, value::StateValue};
use sha2::{Digest, Sha256};
use std::fmt;

///
/// GlobalStore
///
/// Flat byte-keyed map with integer or byte-string values.
/// Reads of absent keys return `None`; deletes of absent keys are no-ops.
///

pub trait GlobalStore {
    fn get(&self, key: &StateKey) -> Result<Option<StateValue>, InternalError>;

    fn put(&mut self, key: StateKey, value: StateValue);

    fn delete(&mut self, key: &StateKey);

    /// Every entry, in key order.
    fn entries(&self) -> Result<Vec<(StateKey, StateValue)>, InternalError>;

    fn contains(&self, key: &StateKey) -> Result<bool, InternalError> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: GlobalStore + ?Sized> GlobalStore for &mut S {
    fn get(&self, key: &StateKey) -> Result<Option<StateValue>, InternalError> {
        (**self).get(key)
    }

    fn put(&mut self, key: StateKey, value: StateValue) {
        (**self).put(key, value);
    }

    fn delete(&mut self, key: &StateKey) {
        (**self).delete(key);
    }

    fn entries(&self) -> Result<Vec<(StateKey, StateValue)>, InternalError> {
        (**self).entries()
    }
}

///
/// StateFingerprint
///
/// SHA-256 over every entry in key order. Two stores with equal fingerprints
/// hold the same global state.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct StateFingerprint([u8; 32]);

impl StateFingerprint {
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for StateFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Fingerprint the full contents of `store`.
pub fn state_fingerprint<S: GlobalStore + ?Sized>(
    store: &S,
) -> Result<StateFingerprint, InternalError> {
    let mut hasher = Sha256::new();

    for (key, value) in store.entries()? {
        // length-prefix both halves so adjacent entries cannot alias
        hasher.update((key.len() as u64).to_be_bytes());
        hasher.update(key.as_bytes());

        let raw = value.to_raw();
        hasher.update((raw.len() as u64).to_be_bytes());
        hasher.update(raw.as_bytes());
    }

    Ok(StateFingerprint(hasher.finalize().into()))
}
