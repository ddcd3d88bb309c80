//! Operations on the singleton counter record.

use tracing::debug;

use crate::error::{store_failure, ServiceError};
use crate::store::RecordStore;
use crate::validation::parse_count;

/// Current counter value. An absent record is `NotFound`, not zero.
pub fn get_count(store: &impl RecordStore) -> Result<i64, ServiceError> {
    let raw = store
        .read_count()
        .map_err(store_failure("get count"))?
        .ok_or(ServiceError::NotFound)?;

    raw.parse::<i64>()
        .map_err(|error| ServiceError::MalformedData {
            action: "get count",
            detail: format!("stored count '{raw}' is not an integer: {error}"),
        })
}

/// Overwrites the counter. Negative values are stored as given.
pub fn set_count(store: &impl RecordStore, count: i64) -> Result<(), ServiceError> {
    store
        .write_count(count)
        .map_err(store_failure("set count"))?;
    debug!(count, "count set");
    Ok(())
}

/// Parses `raw` as an integer and stores it. Nothing is written when parsing fails.
pub fn set_count_from_text(store: &impl RecordStore, raw: &str) -> Result<i64, ServiceError> {
    let count = parse_count(raw)?;
    set_count(store, count)?;
    Ok(count)
}

/// Increments the counter by one in a single atomic store update and returns
/// the new value.
pub fn add_count(store: &impl RecordStore) -> Result<i64, ServiceError> {
    let count = store
        .increment_count(1)
        .map_err(store_failure("increase count"))?;
    debug!(count, "count increased");
    Ok(count)
}
