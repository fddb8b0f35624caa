//! Shoplist canister: one application instance whose global state lives in
//! stable memory. Every inbound call goes through the in-process host, so
//! lifecycle gating, host limits and group atomicity match off-chain use.

use canic_cdk::{
    export_candid, query,
    structures::{
        DefaultMemoryImpl,
        memory::{MemoryId, MemoryManager},
    },
    update,
};
use shoplist::{
    Error,
    config::ShoplistConfig,
    core::{
        call::AppCall,
        dispatch::CallReceipt,
        host::Host,
        obs::{EventReport, metrics_report, metrics_reset_all},
        store::{GlobalStore, StableStore, state_fingerprint},
        value::StateValue,
        view::ListView,
    },
    error::{ErrorKind, ErrorOrigin},
};
use std::cell::RefCell;

const CONFIG: &str = include_str!("../shoplist.toml");
const STATE_MEMORY_ID: u8 = 0;

thread_local! {
    static MEMORY_MANAGER: MemoryManager<DefaultMemoryImpl> =
        MemoryManager::init(DefaultMemoryImpl::default());

    static HOST: RefCell<Option<Host<StableStore>>> = const { RefCell::new(None) };
}

// Open the host over stable memory using the bundled config.
fn open_host() -> Result<Host<StableStore>, Error> {
    let config = ShoplistConfig::from_toml_str(CONFIG)?;
    let memory = MEMORY_MANAGER.with(|m| m.get(MemoryId::new(STATE_MEMORY_ID)));

    Ok(Host::from_config(StableStore::init(memory), &config)?)
}

// Lazily initialize and access the host.
fn with_host<R>(f: impl FnOnce(&mut Host<StableStore>) -> Result<R, Error>) -> Result<R, Error> {
    HOST.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(open_host()?);
        }

        slot.as_mut().map_or_else(
            || {
                Err(Error::new(
                    ErrorKind::Internal,
                    ErrorOrigin::Host,
                    "host unavailable after init",
                ))
            },
            f,
        )
    })
}

///
/// ENDPOINTS
///

/// Submit one call as a group of one.
#[update]
pub fn call(app_call: AppCall) -> Result<CallReceipt, Error> {
    with_host(|host| Ok(host.submit(app_call)?))
}

/// Submit an atomic group of calls.
#[update]
pub fn call_group(calls: Vec<AppCall>) -> Result<Vec<CallReceipt>, Error> {
    with_host(|host| Ok(host.submit_group(calls)?))
}

/// Decoded list, ordered by index.
#[query]
pub fn list() -> Result<ListView, Error> {
    with_host(|host| Ok(host.view()?))
}

/// Raw global state in key order.
#[query]
pub fn state() -> Result<Vec<(Vec<u8>, StateValue)>, Error> {
    with_host(|host| {
        let entries = host.store().entries()?;

        Ok(entries
            .into_iter()
            .map(|(key, value)| (key.as_bytes().to_vec(), value))
            .collect())
    })
}

/// Hex SHA-256 over the global state.
#[query]
pub fn state_hash() -> Result<String, Error> {
    with_host(|host| Ok(state_fingerprint(host.store())?.to_string()))
}

/// Ephemeral call counters since the last reset.
#[query]
pub fn metrics() -> EventReport {
    metrics_report()
}

/// Reset ephemeral call counters.
#[update]
pub fn metrics_reset() {
    metrics_reset_all();
}

export_candid!();
