//! ## Crate layout
//! - `config`: TOML configuration (`shoplist.toml`).
//! - `core`: state keys and values, stores, operations, dispatch, and the
//!   in-process host.
//! - `client`: typed calls over a host, for off-chain use and tests.
//! - `error`: public error type with a stable kind + origin taxonomy.
//!
//! The `prelude` module mirrors the surface used inside canister code.

pub use shoplist_config as config;
pub use shoplist_core as core;

pub mod client;
pub mod error;

pub use error::Error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        client::ListClient,
        config::{LayoutKind, ShoplistConfig},
        core::{
            obs::{metrics_report, metrics_reset_all},
            prelude::*,
            store::state_fingerprint,
        },
        error::{Error, ErrorKind, ErrorOrigin},
    };
    pub use candid::CandidType;
    pub use serde::{Deserialize, Serialize};
}
