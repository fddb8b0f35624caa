use crate::{
    MAX_ENTRY_BYTES,
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use candid::CandidType;
use canic_cdk::structures::{Storable, storable::Bound};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error as ThisError;

///
/// StateValue
///
/// A global-state value: an opaque byte string or an unsigned integer.
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StateValue {
    Bytes(Vec<u8>),
    Uint(u64),
}

impl StateValue {
    // ── Stored tags (DO NOT reorder) ─────────────────────────────────
    pub(crate) const TAG_BYTES: u8 = 0;
    pub(crate) const TAG_UINT: u8 = 1;

    const UINT_SIZE: usize = 8;

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Uint(_) => None,
        }
    }

    #[must_use]
    pub const fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            Self::Bytes(_) => None,
        }
    }

    /// Encode into the tagged stable-memory representation.
    #[must_use]
    pub fn to_raw(&self) -> RawStateValue {
        let (tag, payload): (u8, Cow<'_, [u8]>) = match self {
            Self::Bytes(bytes) => (Self::TAG_BYTES, Cow::Borrowed(bytes)),
            Self::Uint(v) => (Self::TAG_UINT, Cow::Owned(v.to_be_bytes().to_vec())),
        };

        let mut out = Vec::with_capacity(1 + payload.len());
        out.push(tag);
        out.extend_from_slice(&payload);

        RawStateValue(out)
    }

    /// Decode the tagged stable-memory representation.
    pub fn try_from_raw(raw: &RawStateValue) -> Result<Self, StateValueDecodeError> {
        let Some((&tag, payload)) = raw.0.split_first() else {
            return Err(StateValueDecodeError::Empty);
        };

        match tag {
            Self::TAG_BYTES => Ok(Self::Bytes(payload.to_vec())),
            Self::TAG_UINT => {
                let bytes = <[u8; Self::UINT_SIZE]>::try_from(payload)
                    .map_err(|_| StateValueDecodeError::UintWidth { len: payload.len() })?;

                Ok(Self::Uint(u64::from_be_bytes(bytes)))
            }
            tag => Err(StateValueDecodeError::UnknownTag { tag }),
        }
    }
}

impl From<u64> for StateValue {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<Vec<u8>> for StateValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for StateValue {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

///
/// StateValueDecodeError
///

#[derive(Debug, ThisError)]
pub enum StateValueDecodeError {
    #[error("stored value is empty")]
    Empty,

    #[error("stored value has unknown tag {tag}")]
    UnknownTag { tag: u8 },

    #[error("stored integer has {len} bytes (expected 8)")]
    UintWidth { len: usize },
}

impl From<StateValueDecodeError> for InternalError {
    fn from(err: StateValueDecodeError) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Store, err.to_string())
    }
}

///
/// RawStateValue
///
/// Tagged bytes as persisted in stable memory.
///

/// Max stored bytes for one value: tag plus the largest host value.
#[expect(clippy::cast_possible_truncation)]
pub const MAX_RAW_VALUE_BYTES: u32 = 1 + MAX_ENTRY_BYTES as u32;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawStateValue(Vec<u8>);

impl RawStateValue {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Storable for RawStateValue {
    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.0)
    }

    fn from_bytes(bytes: Cow<'_, [u8]>) -> Self {
        Self(bytes.into_owned())
    }

    fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    const BOUND: Bound = Bound::Bounded {
        max_size: MAX_RAW_VALUE_BYTES,
        is_fixed_size: false,
    };
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_is_tagged_big_endian() {
        let raw = StateValue::Uint(258).to_raw();

        assert_eq!(raw.as_bytes(), &[1, 0, 0, 0, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn empty_bytes_survive_storage() {
        let raw = StateValue::Bytes(Vec::new()).to_raw();

        assert_eq!(raw.as_bytes(), &[0]);
        assert_eq!(
            StateValue::try_from_raw(&raw).unwrap(),
            StateValue::Bytes(Vec::new())
        );
    }

    #[test]
    fn corrupt_values_are_rejected() {
        let empty = RawStateValue::from_bytes(Cow::Borrowed(&[]));
        assert!(matches!(
            StateValue::try_from_raw(&empty),
            Err(StateValueDecodeError::Empty)
        ));

        let bad_tag = RawStateValue::from_bytes(Cow::Borrowed(&[9, 1]));
        assert!(matches!(
            StateValue::try_from_raw(&bad_tag),
            Err(StateValueDecodeError::UnknownTag { tag: 9 })
        ));

        let short_uint = RawStateValue::from_bytes(Cow::Borrowed(&[1, 0, 1]));
        let err: InternalError = StateValue::try_from_raw(&short_uint).unwrap_err().into();
        assert_eq!(err.class, ErrorClass::Corruption);
    }
}
