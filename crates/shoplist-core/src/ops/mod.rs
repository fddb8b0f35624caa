//! Data operations routed from no-op calls.
//!
//! Each handler has the shape `(records, operands) -> receipt` and mutates the
//! store in place. Handlers assume they run inside a staged call: an `Err`
//! return may leave writes behind in the overlay, which the caller discards.

mod add;
mod clear;
mod remove;
mod update;

use crate::{
    call::AppCall,
    error::InternalError,
    layout::{ListLayout, Record},
    store::{GlobalStore, RecordStore},
};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// OperationKind
///
/// Operation tag carried in `argument[0]`. Matching is exact and
/// case-sensitive.
///

#[derive(
    CandidType, Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum OperationKind {
    Add,
    Update,
    Remove,
    ClearAll,
}

impl OperationKind {
    pub const ALL: [Self; 4] = [Self::Add, Self::Update, Self::Remove, Self::ClearAll];

    #[must_use]
    pub const fn tag(self) -> &'static [u8] {
        match self {
            Self::Add => b"Add",
            Self::Update => b"Update",
            Self::Remove => b"Remove",
            Self::ClearAll => b"ClearAll",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Update => "Update",
            Self::Remove => "Remove",
            Self::ClearAll => "ClearAll",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

///
/// Operation
///
/// A fully decoded data operation with its operands.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Operation {
    Add { record: Record },
    Update { index: u64, record: Record },
    Remove { index: u64 },
    ClearAll,
}

impl Operation {
    /// Decode `argument[0]` and the operands it implies.
    ///
    /// Tags the layout does not route decode to `UnknownOperation`, the
    /// same as tags that match nothing.
    pub fn decode(call: &AppCall, layout: ListLayout) -> Result<Self, InternalError> {
        let tag = call.arg(0)?;
        let kind = OperationKind::from_tag(tag)
            .filter(|kind| layout.supports(*kind))
            .ok_or_else(|| InternalError::unknown_operation(tag))?;

        let op = match kind {
            OperationKind::Add => Self::Add {
                record: call.record_args(1, layout)?,
            },
            OperationKind::Update => Self::Update {
                index: call.index_arg(1)?,
                record: call.record_args(2, layout)?,
            },
            OperationKind::Remove => Self::Remove {
                index: call.index_arg(1)?,
            },
            OperationKind::ClearAll => Self::ClearAll,
        };

        Ok(op)
    }

    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Add { .. } => OperationKind::Add,
            Self::Update { .. } => OperationKind::Update,
            Self::Remove { .. } => OperationKind::Remove,
            Self::ClearAll => OperationKind::ClearAll,
        }
    }
}

///
/// OperationReceipt
///
/// What a successful operation did to the list.
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OperationReceipt {
    pub kind: OperationKind,
    pub count_before: u64,
    pub count_after: u64,

    /// Slot written or vacated (add/update/remove).
    pub index: Option<u64>,

    /// Former last slot moved into `index` by a remove.
    pub relocated_from: Option<u64>,
}

impl OperationReceipt {
    pub(crate) const fn new(kind: OperationKind, count_before: u64, count_after: u64) -> Self {
        Self {
            kind,
            count_before,
            count_after,
            index: None,
            relocated_from: None,
        }
    }

    pub(crate) const fn at(mut self, index: u64) -> Self {
        self.index = Some(index);
        self
    }

    pub(crate) const fn relocated_from(mut self, from: u64) -> Self {
        self.relocated_from = Some(from);
        self
    }
}

///
/// OperationLimits
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OperationLimits {
    pub max_records: Option<u64>,
}

/// Run a decoded operation against `records`.
pub fn apply<S: GlobalStore>(
    records: &mut RecordStore<'_, S>,
    op: &Operation,
    limits: OperationLimits,
) -> Result<OperationReceipt, InternalError> {
    match op {
        Operation::Add { record } => add::add(records, record, limits.max_records),
        Operation::Update { index, record } => update::update(records, *index, record),
        Operation::Remove { index } => remove::remove(records, *index),
        Operation::ClearAll => clear::clear_all(records),
    }
}
