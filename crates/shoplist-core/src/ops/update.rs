use crate::{
    error::InternalError,
    layout::Record,
    ops::{OperationKind, OperationReceipt},
    store::{GlobalStore, RecordStore},
};

/// Overwrite the record at `index` in place. `Count` is unchanged.
pub(super) fn update<S: GlobalStore>(
    records: &mut RecordStore<'_, S>,
    index: u64,
    record: &Record,
) -> Result<OperationReceipt, InternalError> {
    let count = records.count()?;
    if index >= count {
        return Err(InternalError::index_out_of_range(
            OperationKind::Update,
            index,
            count,
        ));
    }

    records.write(index, record)?;

    Ok(OperationReceipt::new(OperationKind::Update, count, count).at(index))
}
