//! Read-only decoding of global state into an ordered list, the way an
//! external client reads it.

use crate::{
    error::InternalError,
    key::{DecodedKey, Field, StateKey},
    layout::{ListLayout, Record},
    store::GlobalStore,
    value::StateValue,
};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// FieldValue
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldValue {
    pub field: Field,
    pub value: Vec<u8>,
}

///
/// ListItem
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ListItem {
    pub index: u64,
    pub fields: Vec<FieldValue>,
}

impl ListItem {
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&[u8]> {
        self.fields
            .iter()
            .find(|fv| fv.field == field)
            .map(|fv| fv.value.as_slice())
    }

    /// Field values in `layout` order; fields the item lacks read as empty.
    #[must_use]
    pub fn record(&self, layout: ListLayout) -> Record {
        let values = layout
            .fields()
            .iter()
            .map(|field| self.get(*field).map(<[u8]>::to_vec).unwrap_or_default())
            .collect();

        Record::from_values(values)
    }
}

///
/// ListView
///
/// Items are ordered by index. Building a view checks density: every index in
/// `[0, count)` carries every layout field and no field key sits outside it.
///

#[derive(CandidType, Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ListView {
    pub count: u64,
    pub items: Vec<ListItem>,
}

impl ListView {
    /// Decode the full contents of `store`.
    pub fn read<S: GlobalStore + ?Sized>(
        store: &S,
        layout: ListLayout,
    ) -> Result<Self, InternalError> {
        Self::from_entries(store.entries()?, layout)
    }

    /// Decode raw global-state entries. Keys that are neither `Count` nor a
    /// field key are ignored.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (StateKey, StateValue)>,
        layout: ListLayout,
    ) -> Result<Self, InternalError> {
        let mut count = None;
        let mut slots: BTreeMap<u64, BTreeMap<Field, Vec<u8>>> = BTreeMap::new();

        for (key, value) in entries {
            match key.decode() {
                DecodedKey::Count => match value {
                    StateValue::Uint(n) => count = Some(n),
                    StateValue::Bytes(_) => {
                        return Err(InternalError::store_corruption(
                            "Count is stored as bytes, expected an integer",
                        ));
                    }
                },
                DecodedKey::Field { field, index } => {
                    if layout.position(field).is_none() {
                        return Err(InternalError::store_corruption(format!(
                            "{key} is not a {layout:?} layout field"
                        )));
                    }
                    let StateValue::Bytes(bytes) = value else {
                        return Err(InternalError::store_corruption(format!(
                            "{key} is stored as an integer, expected bytes"
                        )));
                    };
                    slots.entry(index).or_default().insert(field, bytes);
                }
                DecodedKey::Unknown => {}
            }
        }

        let count = count.unwrap_or(0);
        let mut items = Vec::with_capacity(slots.len());

        for (expected, (index, mut fields)) in (0..).zip(slots) {
            if index != expected || index >= count {
                return Err(InternalError::store_corruption(format!(
                    "record slot {index} breaks density (count {count})"
                )));
            }

            let fields = layout
                .fields()
                .iter()
                .map(|field| {
                    fields
                        .remove(field)
                        .map(|value| FieldValue {
                            field: *field,
                            value,
                        })
                        .ok_or_else(|| {
                            InternalError::store_corruption(format!(
                                "{} is missing inside the dense range",
                                StateKey::field(*field, index)
                            ))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            items.push(ListItem { index, fields });
        }

        if items.len() as u64 != count {
            return Err(InternalError::store_corruption(format!(
                "count is {count} but {} record slot(s) are present",
                items.len()
            )));
        }

        Ok(Self { count, items })
    }

    #[must_use]
    pub fn get(&self, index: u64) -> Option<&ListItem> {
        usize::try_from(index).ok().and_then(|i| self.items.get(i))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListItem> {
        self.items.iter()
    }
}

/// Check that `store` is dense under `layout`.
pub fn verify_density<S: GlobalStore + ?Sized>(
    store: &S,
    layout: ListLayout,
) -> Result<(), InternalError> {
    ListView::read(store, layout).map(|_| ())
}

///
/// TESTS
///
