use crate::{key::Field, ops::OperationKind};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use shoplist_config::LayoutKind;

///
/// ListLayout
///
/// Which fields make up a record and which operations the dispatcher routes.
/// `Full` is the canonical four-field list; `Minimal` keeps one opaque item
/// per record and only supports add and remove.
///

#[derive(CandidType, Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum ListLayout {
    #[default]
    Full,
    Minimal,
}

impl ListLayout {
    const FULL_FIELDS: [Field; 4] = [Field::Name, Field::Qty, Field::Category, Field::Note];
    const MINIMAL_FIELDS: [Field; 1] = [Field::Item];

    /// Record fields in positional argument order.
    #[must_use]
    pub const fn fields(self) -> &'static [Field] {
        match self {
            Self::Full => &Self::FULL_FIELDS,
            Self::Minimal => &Self::MINIMAL_FIELDS,
        }
    }

    /// Number of global entries one record occupies.
    #[must_use]
    pub const fn width(self) -> usize {
        self.fields().len()
    }

    #[must_use]
    pub const fn supports(self, op: OperationKind) -> bool {
        match self {
            Self::Full => true,
            Self::Minimal => matches!(op, OperationKind::Add | OperationKind::Remove),
        }
    }

    #[must_use]
    pub fn position(self, field: Field) -> Option<usize> {
        self.fields().iter().position(|f| *f == field)
    }
}

impl From<LayoutKind> for ListLayout {
    fn from(kind: LayoutKind) -> Self {
        match kind {
            LayoutKind::Full => Self::Full,
            LayoutKind::Minimal => Self::Minimal,
        }
    }
}

///
/// Record
///
/// One list entry: field values in layout order, each an opaque byte string.
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Record {
    values: Vec<Vec<u8>>,
}

impl Record {
    /// Build a four-field record for the full layout.
    pub fn full(
        name: impl Into<Vec<u8>>,
        qty: impl Into<Vec<u8>>,
        category: impl Into<Vec<u8>>,
        note: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            values: vec![name.into(), qty.into(), category.into(), note.into()],
        }
    }

    /// Build a single-item record for the minimal layout.
    pub fn item(item: impl Into<Vec<u8>>) -> Self {
        Self {
            values: vec![item.into()],
        }
    }

    #[must_use]
    pub const fn from_values(values: Vec<Vec<u8>>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[Vec<u8>] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Vec<u8>> {
        self.values
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.values.len()
    }

    /// Value of `field` under `layout`, if the layout has that field.
    #[must_use]
    pub fn get(&self, layout: ListLayout, field: Field) -> Option<&[u8]> {
        layout
            .position(field)
            .and_then(|pos| self.values.get(pos))
            .map(Vec::as_slice)
    }
}

///
/// TESTS
///
