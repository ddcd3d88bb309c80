use crate::error::StoreError;
use crate::records::{PreRegistration, RegistrationEntry};

/// Access to the singleton records of the main table.
///
/// `increment_count` and `append_registration` must be applied atomically by
/// the backing store so that concurrent callers never lose an update.
pub trait RecordStore {
    /// Raw numeric text of the counter, or `None` when the record is absent.
    fn read_count(&self) -> Result<Option<String>, StoreError>;

    fn write_count(&self, count: i64) -> Result<(), StoreError>;

    /// Adds `delta` to the counter, creating it at `delta` when absent, and
    /// returns the updated value.
    fn increment_count(&self, delta: i64) -> Result<i64, StoreError>;

    fn read_registrations(&self) -> Result<Option<Vec<RegistrationEntry>>, StoreError>;

    /// Appends one entry, creating the list when absent, and returns the new
    /// list length.
    fn append_registration(&self, entry: &RegistrationEntry) -> Result<usize, StoreError>;
}

/// Append-only pre-registration table.
pub trait PreRegistrationStore {
    fn insert_pre_registration(&self, entry: &PreRegistration) -> Result<(), StoreError>;

    /// Every stored email, following continuation until the table is exhausted.
    fn scan_pre_registration_emails(&self) -> Result<Vec<String>, StoreError>;
}

/// Everything the API handlers need from storage.
pub trait ApiStore: RecordStore + PreRegistrationStore {}

impl<T: RecordStore + PreRegistrationStore> ApiStore for T {}
