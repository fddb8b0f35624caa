use crate::{
    error::InternalError,
    key::StateKey,
    layout::{ListLayout, Record},
    store::GlobalStore,
    value::StateValue,
};

///
/// RecordStore
///
/// Typed record access over a global store for one layout.
///
/// Records live at dense indices `[0, Count)`, one entry per field. This type
/// only reads and writes slots; keeping them dense is the caller's contract.
///

pub struct RecordStore<'a, S: GlobalStore> {
    store: &'a mut S,
    layout: ListLayout,
}

impl<'a, S: GlobalStore> RecordStore<'a, S> {
    pub const fn new(store: &'a mut S, layout: ListLayout) -> Self {
        Self { store, layout }
    }

    #[must_use]
    pub const fn layout(&self) -> ListLayout {
        self.layout
    }

    /// Stored count, or `None` before the instance is created.
    pub fn try_count(&self) -> Result<Option<u64>, InternalError> {
        match self.store.get(&StateKey::count())? {
            None => Ok(None),
            Some(StateValue::Uint(count)) => Ok(Some(count)),
            Some(StateValue::Bytes(_)) => Err(InternalError::store_corruption(
                "Count is stored as bytes, expected an integer",
            )),
        }
    }

    /// Stored count; an absent count reads as zero.
    pub fn count(&self) -> Result<u64, InternalError> {
        Ok(self.try_count()?.unwrap_or(0))
    }

    pub fn set_count(&mut self, count: u64) {
        self.store.put(StateKey::count(), StateValue::Uint(count));
    }

    /// Read every field of the record at `index`.
    pub fn read(&self, index: u64) -> Result<Record, InternalError> {
        let mut values = Vec::with_capacity(self.layout.width());

        for field in self.layout.fields() {
            let key = StateKey::field(*field, index);
            match self.store.get(&key)? {
                Some(StateValue::Bytes(bytes)) => values.push(bytes),
                Some(StateValue::Uint(_)) => {
                    return Err(InternalError::store_corruption(format!(
                        "{key} is stored as an integer, expected bytes"
                    )));
                }
                None => {
                    return Err(InternalError::store_corruption(format!(
                        "{key} is missing inside the dense range"
                    )));
                }
            }
        }

        Ok(Record::from_values(values))
    }

    /// Write every field of `record` at `index`.
    pub fn write(&mut self, index: u64, record: &Record) -> Result<(), InternalError> {
        if record.width() != self.layout.width() {
            return Err(InternalError::store_internal(format!(
                "record has {} fields, layout {:?} expects {}",
                record.width(),
                self.layout,
                self.layout.width()
            )));
        }

        for (field, value) in self.layout.fields().iter().zip(record.values()) {
            self.store.put(
                StateKey::field(*field, index),
                StateValue::Bytes(value.clone()),
            );
        }

        Ok(())
    }

    /// Delete every field key at `index`.
    pub fn delete(&mut self, index: u64) {
        for field in self.layout.fields() {
            self.store.delete(&StateKey::field(*field, index));
        }
    }

    /// Copy every field value from slot `from` into slot `to`.
    /// Slot `from` is left in place.
    pub fn copy(&mut self, from: u64, to: u64) -> Result<(), InternalError> {
        let record = self.read(from)?;

        self.write(to, &record)
    }
}
