use crate::{
    error::InternalError,
    layout::Record,
    ops::{OperationKind, OperationReceipt},
    store::{GlobalStore, RecordStore},
};

/// Append `record` at index `Count`, then bump `Count`.
pub(super) fn add<S: GlobalStore>(
    records: &mut RecordStore<'_, S>,
    record: &Record,
    max_records: Option<u64>,
) -> Result<OperationReceipt, InternalError> {
    let index = records.count()?;

    if let Some(max) = max_records
        && index >= max
    {
        return Err(InternalError::capacity_exceeded(index, max));
    }

    let count = index
        .checked_add(1)
        .ok_or_else(|| InternalError::store_internal("Count overflow on add"))?;

    records.write(index, record)?;
    records.set_count(count);

    Ok(OperationReceipt::new(OperationKind::Add, index, count).at(index))
}
