//! Inbound call shape: lifecycle action, positional byte-string arguments, and
//! the size of the atomic group the host received the call in.

use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    key::INDEX_BYTES,
    layout::{ListLayout, Record},
};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

/// Application id carried by the call that creates the instance.
pub const CREATION_APP_ID: u64 = 0;

/// Maximum number of arguments on one call.
pub const MAX_ARGS: usize = 16;

/// Maximum total argument bytes on one call.
pub const MAX_ARGS_TOTAL_BYTES: usize = 2048;

/// Maximum number of calls in one atomic group.
pub const MAX_GROUP_SIZE: usize = 16;

///
/// ArgumentError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum ArgumentError {
    #[error("missing call argument at position {position}")]
    Missing { position: usize },

    #[error("index argument at position {position} is {len} bytes (max {max})", max = INDEX_BYTES)]
    IndexTooWide { position: usize, len: usize },
}

impl From<ArgumentError> for InternalError {
    fn from(err: ArgumentError) -> Self {
        Self::new(
            ErrorClass::MalformedArgument,
            ErrorOrigin::Argument,
            err.to_string(),
        )
    }
}

///
/// OnCompletion
///
/// Caller-declared completion action attached to every call.
///

#[derive(CandidType, Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum OnCompletion {
    #[default]
    NoOp,
    OptIn,
    CloseOut,
    ClearState,
    UpdateApplication,
    DeleteApplication,
}

///
/// Lifecycle
///
/// Effective lifecycle action of a call. Creation is signalled by the
/// application id sentinel and takes precedence over the declared action.
///

#[derive(
    CandidType, Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum Lifecycle {
    Create,
    OptIn,
    CloseOut,
    ClearState,
    UpdateApplication,
    DeleteApplication,
    NoOp,
}

impl Lifecycle {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::OptIn => "OptIn",
            Self::CloseOut => "CloseOut",
            Self::ClearState => "ClearState",
            Self::UpdateApplication => "UpdateApplication",
            Self::DeleteApplication => "DeleteApplication",
            Self::NoOp => "NoOp",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

///
/// AppCall
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AppCall {
    pub app_id: u64,
    pub on_completion: OnCompletion,
    pub args: Vec<Vec<u8>>,
    pub group_size: u32,
}

impl AppCall {
    /// The call that creates the application instance.
    #[must_use]
    pub const fn create() -> Self {
        Self {
            app_id: CREATION_APP_ID,
            on_completion: OnCompletion::NoOp,
            args: Vec::new(),
            group_size: 1,
        }
    }

    /// A plain data call carrying `args`.
    #[must_use]
    pub const fn noop(app_id: u64, args: Vec<Vec<u8>>) -> Self {
        Self {
            app_id,
            on_completion: OnCompletion::NoOp,
            args,
            group_size: 1,
        }
    }

    /// An argument-less call declaring `on_completion`.
    #[must_use]
    pub const fn lifecycle_call(app_id: u64, on_completion: OnCompletion) -> Self {
        Self {
            app_id,
            on_completion,
            args: Vec::new(),
            group_size: 1,
        }
    }

    /// Mark this call as one of a `group_size`-call atomic group.
    #[must_use]
    pub fn in_group(mut self, group_size: u32) -> Self {
        self.group_size = group_size;
        self
    }

    #[must_use]
    pub const fn is_creation(&self) -> bool {
        self.app_id == CREATION_APP_ID
    }

    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        if self.is_creation() {
            return Lifecycle::Create;
        }

        match self.on_completion {
            OnCompletion::NoOp => Lifecycle::NoOp,
            OnCompletion::OptIn => Lifecycle::OptIn,
            OnCompletion::CloseOut => Lifecycle::CloseOut,
            OnCompletion::ClearState => Lifecycle::ClearState,
            OnCompletion::UpdateApplication => Lifecycle::UpdateApplication,
            OnCompletion::DeleteApplication => Lifecycle::DeleteApplication,
        }
    }

    /// Total bytes across all arguments.
    #[must_use]
    pub fn args_bytes(&self) -> usize {
        self.args.iter().map(Vec::len).sum()
    }

    /// Raw argument at `position`.
    pub fn arg(&self, position: usize) -> Result<&[u8], ArgumentError> {
        self.args
            .get(position)
            .map(Vec::as_slice)
            .ok_or(ArgumentError::Missing { position })
    }

    /// Argument at `position` decoded as a big-endian index.
    pub fn index_arg(&self, position: usize) -> Result<u64, ArgumentError> {
        decode_index(self.arg(position)?)
            .map_err(|len| ArgumentError::IndexTooWide { position, len })
    }

    /// `layout.width()` consecutive arguments starting at `start`, as a record.
    pub fn record_args(&self, start: usize, layout: ListLayout) -> Result<Record, ArgumentError> {
        let values = (start..start + layout.width())
            .map(|position| self.arg(position).map(<[u8]>::to_vec))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Record::from_values(values))
    }
}

/// Decode a big-endian unsigned integer of at most eight bytes.
///
/// An empty slice decodes to zero. Returns the offending length on overflow.
pub const fn decode_index(bytes: &[u8]) -> Result<u64, usize> {
    if bytes.len() > INDEX_BYTES {
        return Err(bytes.len());
    }

    let mut value = 0u64;
    let mut i = 0;
    while i < bytes.len() {
        value = (value << 8) | (bytes[i] as u64);
        i += 1;
    }

    Ok(value)
}

/// Encode an index the way callers pass it: eight bytes, big-endian.
#[must_use]
pub const fn encode_index(index: u64) -> [u8; INDEX_BYTES] {
    index.to_be_bytes()
}

///
/// TESTS
///
