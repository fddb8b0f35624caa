use crate::{
    error::InternalError,
    ops::{OperationKind, OperationReceipt},
    store::{GlobalStore, RecordStore},
};

/// Delete every record in `[0, Count)` and reset `Count` to zero.
/// Clearing an empty list is a no-op that still approves.
pub(super) fn clear_all<S: GlobalStore>(
    records: &mut RecordStore<'_, S>,
) -> Result<OperationReceipt, InternalError> {
    let count = records.count()?;

    for index in 0..count {
        records.delete(index);
    }
    records.set_count(0);

    Ok(OperationReceipt::new(OperationKind::ClearAll, count, 0))
}
