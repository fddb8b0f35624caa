//! In-process host: owns the global store, enforces the host's entry, schema
//! and call limits, and commits call groups atomically.

use crate::{
    MAX_ENTRY_BYTES, MAX_KEY_BYTES,
    call::{AppCall, MAX_ARGS, MAX_ARGS_TOTAL_BYTES, MAX_GROUP_SIZE},
    dispatch::{AppState, CallReceipt, Dispatcher, PendingCall},
    error::{ErrorClass, ErrorOrigin, InternalError},
    key::StateKey,
    program::Program,
    store::{GlobalStore, StagedStore},
    value::StateValue,
    view::{ListView, verify_density},
};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use shoplist_config::{
    DEFAULT_APP_ID, DEFAULT_GLOBAL_BYTE_SLICES, DEFAULT_GLOBAL_UINTS, ShoplistConfig,
};
use thiserror::Error as ThisError;

///
/// StateSchema
///
/// Global-state slots reserved at deploy time.
///

#[derive(CandidType, Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StateSchema {
    pub global_uints: u64,
    pub global_byte_slices: u64,
}

impl Default for StateSchema {
    fn default() -> Self {
        Self {
            global_uints: DEFAULT_GLOBAL_UINTS,
            global_byte_slices: DEFAULT_GLOBAL_BYTE_SLICES,
        }
    }
}

///
/// HostLimitError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum HostLimitError {
    #[error("group has {size} calls (allowed 1..={max})", max = MAX_GROUP_SIZE)]
    GroupSize { size: usize },

    #[error("call carries {count} arguments (max {max})", max = MAX_ARGS)]
    TooManyArgs { count: usize },

    #[error("call arguments total {bytes} bytes (max {max})", max = MAX_ARGS_TOTAL_BYTES)]
    ArgsTooLarge { bytes: usize },

    #[error("key {key} is {len} bytes (max {max})", max = MAX_KEY_BYTES)]
    KeyTooLong { key: String, len: usize },

    #[error("entry {key} is {len} bytes (max {max})", max = MAX_ENTRY_BYTES)]
    EntryTooLarge { key: String, len: usize },

    #[error("state holds {used} integer entries (schema allows {max})")]
    UintSlots { used: u64, max: u64 },

    #[error("state holds {used} byte entries (schema allows {max})")]
    ByteSlots { used: u64, max: u64 },
}

impl From<HostLimitError> for InternalError {
    fn from(err: HostLimitError) -> Self {
        Self::new(ErrorClass::HostLimit, ErrorOrigin::Host, err.to_string())
    }
}

///
/// Host
///
/// Plays the role of the chain for one application instance. Calls arrive in
/// groups; every call of a group runs against one shared overlay and the
/// group commits only if every call approves.
///

pub struct Host<S: GlobalStore> {
    store: S,
    dispatcher: Dispatcher,
    schema: StateSchema,
    assign_id: u64,
    app_id: Option<u64>,
}

impl<S: GlobalStore> Host<S> {
    /// Open a host over `store`. A store that already holds `Count` is
    /// treated as a created instance under the default application id.
    pub fn open(store: S, dispatcher: Dispatcher) -> Result<Self, InternalError> {
        let app_id = match Dispatcher::state(&store)? {
            AppState::Created => Some(DEFAULT_APP_ID),
            AppState::Uninitialized => None,
        };

        Ok(Self {
            store,
            dispatcher,
            schema: StateSchema::default(),
            assign_id: DEFAULT_APP_ID,
            app_id,
        })
    }

    /// Open a host configured from `config`.
    pub fn from_config(store: S, config: &ShoplistConfig) -> Result<Self, InternalError> {
        let host = Self::open(store, Dispatcher::from_config(config))?
            .with_app_id(config.host.app_id)
            .with_schema(StateSchema {
                global_uints: config.host.global_uints,
                global_byte_slices: config.host.global_byte_slices,
            });

        Ok(host)
    }

    #[must_use]
    pub const fn with_schema(mut self, schema: StateSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the id assigned at creation (and adopted by an existing instance).
    #[must_use]
    pub const fn with_app_id(mut self, app_id: u64) -> Self {
        self.assign_id = app_id;
        if self.app_id.is_some() {
            self.app_id = Some(app_id);
        }
        self
    }

    /// Application id, once the instance exists.
    #[must_use]
    pub const fn app_id(&self) -> Option<u64> {
        self.app_id
    }

    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub const fn schema(&self) -> StateSchema {
        self.schema
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Decoded list as an external reader sees it.
    pub fn view(&self) -> Result<ListView, InternalError> {
        ListView::read(&self.store, self.dispatcher.layout())
    }

    /// Submit a single call (a group of one).
    pub fn submit(&mut self, call: AppCall) -> Result<CallReceipt, InternalError> {
        let mut receipts = self.submit_group(vec![call])?;

        receipts
            .pop()
            .ok_or_else(|| InternalError::host_internal("group of one produced no receipt"))
    }

    /// Submit an atomic group. Each call is stamped with the group size.
    ///
    /// Calls count as approved in metrics only once the group commits. With
    /// debug on, the staged state is checked for density before commit.
    pub fn submit_group(
        &mut self,
        calls: Vec<AppCall>,
    ) -> Result<Vec<CallReceipt>, InternalError> {
        if calls.is_empty() || calls.len() > MAX_GROUP_SIZE {
            return Err(HostLimitError::GroupSize { size: calls.len() }.into());
        }
        let group_size = u32::try_from(calls.len())
            .map_err(|_| HostLimitError::GroupSize { size: calls.len() })?;

        for call in &calls {
            check_call(call)?;
        }

        let mut app_id = self.app_id;
        let mut staged = StagedStore::new(&mut self.store);
        let mut pending = Vec::with_capacity(calls.len());

        for call in calls {
            let call = call.in_group(group_size);

            if !call.is_creation() && app_id != Some(call.app_id) {
                let err = InternalError::new(
                    ErrorClass::LifecycleRejected,
                    ErrorOrigin::Host,
                    format!("no application with id {}", call.app_id),
                );
                return Err(reject_all(pending, err));
            }

            match Program::for_call(&call).stage(&self.dispatcher, &mut staged, &call) {
                Ok(call_pending) => pending.push(call_pending),
                Err(err) => return Err(reject_all(pending, err)),
            }
            if call.is_creation() {
                app_id = Some(self.assign_id);
            }
        }

        if let Err(err) = check_state(&staged, self.schema) {
            return Err(reject_all(pending, err));
        }
        if self.dispatcher.is_debug()
            && let Err(err) = verify_density(&staged, self.dispatcher.layout())
        {
            return Err(reject_all(pending, err));
        }

        staged.commit();
        self.app_id = app_id;

        Ok(pending.into_iter().map(PendingCall::approve).collect())
    }
}

// Settle every staged call of a failed group as rejected.
fn reject_all(pending: Vec<PendingCall>, err: InternalError) -> InternalError {
    for call in pending {
        call.reject(&err);
    }

    err
}

// Per-call argument limits, checked before anything runs.
fn check_call(call: &AppCall) -> Result<(), HostLimitError> {
    if call.args.len() > MAX_ARGS {
        return Err(HostLimitError::TooManyArgs {
            count: call.args.len(),
        });
    }

    let bytes = call.args_bytes();
    if bytes > MAX_ARGS_TOTAL_BYTES {
        return Err(HostLimitError::ArgsTooLarge { bytes });
    }

    Ok(())
}

// Entry limits over every put `staged` holds.
pub(crate) fn check_entries<S: GlobalStore>(
    staged: &StagedStore<'_, S>,
) -> Result<(), InternalError> {
    for (key, value) in staged.staged() {
        if let Some(value) = value {
            check_entry(key, value)?;
        }
    }

    Ok(())
}

// Schema limits over the state a group would commit. Entry limits were
// already enforced per call.
fn check_state<S: GlobalStore>(
    staged: &StagedStore<'_, S>,
    schema: StateSchema,
) -> Result<(), InternalError> {
    let (mut uints, mut byte_slices) = (0u64, 0u64);
    for (_, value) in staged.entries()? {
        match value {
            StateValue::Uint(_) => uints += 1,
            StateValue::Bytes(_) => byte_slices += 1,
        }
    }

    if uints > schema.global_uints {
        return Err(HostLimitError::UintSlots {
            used: uints,
            max: schema.global_uints,
        }
        .into());
    }
    if byte_slices > schema.global_byte_slices {
        return Err(HostLimitError::ByteSlots {
            used: byte_slices,
            max: schema.global_byte_slices,
        }
        .into());
    }

    Ok(())
}

fn check_entry(key: &StateKey, value: &StateValue) -> Result<(), HostLimitError> {
    if key.len() > MAX_KEY_BYTES {
        return Err(HostLimitError::KeyTooLong {
            key: key.to_string(),
            len: key.len(),
        });
    }

    if let StateValue::Bytes(bytes) = value {
        let len = key.len() + bytes.len();
        if len > MAX_ENTRY_BYTES {
            return Err(HostLimitError::EntryTooLarge {
                key: key.to_string(),
                len,
            });
        }
    }

    Ok(())
}

///
/// TESTS
///
