//! Process-local store with the same semantics as the DynamoDB adapter.

use std::sync::{Mutex, MutexGuard};

use crate::error::StoreError;
use crate::records::{PreRegistration, RegistrationEntry};
use crate::store::{PreRegistrationStore, RecordStore};

#[derive(Debug, Default)]
struct MemoryState {
    count: Option<String>,
    registrations: Option<Vec<RegistrationEntry>>,
    pre_registrations: Vec<PreRegistration>,
    writes: usize,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores counter text verbatim, bypassing numeric encoding.
    pub fn seed_raw_count(&self, raw: impl Into<String>) -> Result<(), StoreError> {
        self.lock()?.count = Some(raw.into());
        Ok(())
    }

    pub fn pre_registrations(&self) -> Result<Vec<PreRegistration>, StoreError> {
        Ok(self.lock()?.pre_registrations.clone())
    }

    /// Number of mutating calls that reached the store.
    pub fn write_count_total(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.writes)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::backend("in-memory store lock poisoned"))
    }
}

impl RecordStore for InMemoryStore {
    fn read_count(&self) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.count.clone())
    }

    fn write_count(&self, count: i64) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.count = Some(count.to_string());
        state.writes += 1;
        Ok(())
    }

    fn increment_count(&self, delta: i64) -> Result<i64, StoreError> {
        let mut state = self.lock()?;
        let current = match state.count.as_deref() {
            None => 0,
            Some(raw) => raw.parse::<i64>().map_err(|error| {
                StoreError::malformed(format!("stored count '{raw}' cannot be incremented: {error}"))
            })?,
        };
        let updated = current
            .checked_add(delta)
            .ok_or_else(|| StoreError::count_overflow(delta))?;
        state.count = Some(updated.to_string());
        state.writes += 1;
        Ok(updated)
    }

    fn read_registrations(&self) -> Result<Option<Vec<RegistrationEntry>>, StoreError> {
        Ok(self.lock()?.registrations.clone())
    }

    fn append_registration(&self, entry: &RegistrationEntry) -> Result<usize, StoreError> {
        let mut state = self.lock()?;
        let list = state.registrations.get_or_insert_with(Vec::new);
        list.push(entry.clone());
        let length = list.len();
        state.writes += 1;
        Ok(length)
    }
}

impl PreRegistrationStore for InMemoryStore {
    fn insert_pre_registration(&self, entry: &PreRegistration) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.pre_registrations.push(entry.clone());
        state.writes += 1;
        Ok(())
    }

    fn scan_pre_registration_emails(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .lock()?
            .pre_registrations
            .iter()
            .map(|entry| entry.email.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_creates_missing_counter() {
        let store = InMemoryStore::new();

        assert_eq!(store.increment_count(1), Ok(1));
        assert_eq!(store.read_count(), Ok(Some("1".to_string())));
    }

    #[test]
    fn increment_refuses_non_numeric_counter() {
        let store = InMemoryStore::new();
        store.seed_raw_count("lots").expect("seed should succeed");

        let error = store.increment_count(1).expect_err("text counter should fail");
        assert!(matches!(error, StoreError::Malformed(_)));
        assert_eq!(store.write_count_total(), Ok(0));
    }

    #[test]
    fn increment_refuses_overflow_and_keeps_value() {
        let store = InMemoryStore::new();
        store.write_count(i64::MAX).expect("write should succeed");

        assert_eq!(store.increment_count(1), Err(StoreError::count_overflow(1)));
        assert_eq!(store.read_count(), Ok(Some(i64::MAX.to_string())));
        assert_eq!(store.write_count_total(), Ok(1));
    }

    #[test]
    fn append_reports_list_length() {
        let store = InMemoryStore::new();

        assert_eq!(
            store.append_registration(&RegistrationEntry::new("1", 10)),
            Ok(1)
        );
        assert_eq!(
            store.append_registration(&RegistrationEntry::new("2", 11)),
            Ok(2)
        );
    }
}
