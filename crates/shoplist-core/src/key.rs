//! Global-state key derivation.
//!
//! A record field lives at `<Field>_` followed by the 8-byte big-endian record
//! index. The record count lives at the bare `Count` key. The codec is pure
//! and infallible; `StateKey::decode` is its inverse for readers.

use crate::{COUNT_KEY, MAX_KEY_BYTES};
use candid::CandidType;
use canic_cdk::structures::{Storable, storable::Bound};
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt};

/// Width of the encoded record index suffix.
pub const INDEX_BYTES: usize = 8;

///
/// Field
///

#[derive(
    CandidType, Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum Field {
    Name,
    Qty,
    Category,
    Note,
    Item,
}

impl Field {
    /// Every known field, in prefix lookup order.
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Qty,
        Self::Category,
        Self::Note,
        Self::Item,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Qty => "Qty",
            Self::Category => "Category",
            Self::Note => "Note",
            Self::Item => "Item",
        }
    }

    /// Key prefix including the trailing separator.
    #[must_use]
    pub const fn prefix(self) -> &'static [u8] {
        match self {
            Self::Name => b"Name_",
            Self::Qty => b"Qty_",
            Self::Category => b"Category_",
            Self::Note => b"Note_",
            Self::Item => b"Item_",
        }
    }

    #[must_use]
    pub fn from_prefix(prefix: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.prefix() == prefix)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

///
/// DecodedKey
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodedKey {
    Count,
    Field { field: Field, index: u64 },
    Unknown,
}

///
/// StateKey
///
/// Raw global-state key. Ordering is plain byte ordering.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StateKey(Vec<u8>);

impl StateKey {
    /// The record count key.
    #[must_use]
    pub fn count() -> Self {
        Self(COUNT_KEY.to_vec())
    }

    /// Key of `field` for the record at `index`.
    #[must_use]
    pub fn field(field: Field, index: u64) -> Self {
        let prefix = field.prefix();
        let mut bytes = Vec::with_capacity(prefix.len() + INDEX_BYTES);
        bytes.extend_from_slice(prefix);
        bytes.extend_from_slice(&index.to_be_bytes());

        Self(bytes)
    }

    /// Wrap raw bytes read back from the host.
    #[must_use]
    pub fn from_raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

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

    /// Classify this key as the count, a field slot, or something else.
    #[must_use]
    pub fn decode(&self) -> DecodedKey {
        if self.0 == COUNT_KEY {
            return DecodedKey::Count;
        }

        let Some(split) = self.0.len().checked_sub(INDEX_BYTES) else {
            return DecodedKey::Unknown;
        };
        let (prefix, suffix) = self.0.split_at(split);

        let Some(field) = Field::from_prefix(prefix) else {
            return DecodedKey::Unknown;
        };
        let Ok(suffix) = <[u8; INDEX_BYTES]>::try_from(suffix) else {
            return DecodedKey::Unknown;
        };

        DecodedKey::Field {
            field,
            index: u64::from_be_bytes(suffix),
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode() {
            DecodedKey::Count => f.write_str("Count"),
            DecodedKey::Field { field, index } => write!(f, "{field}_{index}"),
            DecodedKey::Unknown => write!(f, "{}", self.0.escape_ascii()),
        }
    }
}

impl Storable for StateKey {
    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.0)
    }

    fn from_bytes(bytes: Cow<'_, [u8]>) -> Self {
        Self(bytes.into_owned())
    }

    fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    #[expect(clippy::cast_possible_truncation)]
    const BOUND: Bound = Bound::Bounded {
        max_size: MAX_KEY_BYTES as u32,
        is_fixed_size: false,
    };
}

///
/// TESTS
///
