use crate::{
    error::InternalError,
    ops::{OperationKind, OperationReceipt},
    store::{GlobalStore, RecordStore},
};

///
/// Remove
///
/// Swap-last delete. The last record moves into the vacated slot so indices
/// stay dense; removal does not preserve order.
///

pub(super) fn remove<S: GlobalStore>(
    records: &mut RecordStore<'_, S>,
    index: u64,
) -> Result<OperationReceipt, InternalError> {
    let count = records.count()?;

    // an empty list has no last index
    let last = count
        .checked_sub(1)
        .ok_or_else(|| InternalError::index_out_of_range(OperationKind::Remove, index, count))?;

    if index > last {
        return Err(InternalError::index_out_of_range(
            OperationKind::Remove,
            index,
            count,
        ));
    }

    let mut receipt = OperationReceipt::new(OperationKind::Remove, count, last).at(index);
    if index != last {
        records.copy(last, index)?;
        receipt = receipt.relocated_from(last);
    }

    records.delete(last);
    records.set_count(last);

    Ok(receipt)
}
