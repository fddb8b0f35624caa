//! Core runtime for a shared shopping list hosted on a flat global key-value
//! store: state keys and values, the record store, swap-delete compaction,
//! and the call dispatcher that gates every mutation.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod call;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod key;
pub mod layout;
pub mod obs;
pub mod ops;
pub mod program;
pub mod store;
pub mod value;
pub mod view;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Global-state key holding the record count.
pub const COUNT_KEY: &[u8] = b"Count";

/// Maximum global-state key length accepted by the host.
pub const MAX_KEY_BYTES: usize = 64;

/// Maximum combined key and byte-value length accepted by the host.
pub const MAX_ENTRY_BYTES: usize = 128;

///
/// Prelude
///
/// Domain vocabulary only; stores and handlers stay one level down.
///

pub mod prelude {
    pub use crate::{
        call::{AppCall, Lifecycle, OnCompletion},
        dispatch::{CallReceipt, Dispatcher},
        host::{Host, StateSchema},
        key::{Field, StateKey},
        layout::{ListLayout, Record},
        ops::OperationKind,
        store::{GlobalStore, MemoryStore, StableStore},
        value::StateValue,
        view::{ListItem, ListView},
    };
}
