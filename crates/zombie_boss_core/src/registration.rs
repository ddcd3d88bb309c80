//! Game registrations and pre-registration emails.

use tracing::debug;

use crate::error::{store_failure, ServiceError};
use crate::records::{PreRegistration, RegistrationEntry};
use crate::store::{PreRegistrationStore, RecordStore};
use crate::validation::{validate_email, validate_game_id};

/// Registrations in append order. An absent list record reads as empty.
pub fn get_register(store: &impl RecordStore) -> Result<Vec<RegistrationEntry>, ServiceError> {
    Ok(store
        .read_registrations()
        .map_err(store_failure("get register list"))?
        .unwrap_or_default())
}

/// Appends `game_id` to the registration list and returns the new list length.
pub fn register(
    store: &impl RecordStore,
    game_id: &str,
    timestamp: i64,
) -> Result<usize, ServiceError> {
    validate_game_id(game_id)?;

    let entry = RegistrationEntry::new(game_id, timestamp);
    let length = store
        .append_registration(&entry)
        .map_err(store_failure("update register list"))?;
    debug!(game_id, length, "registration appended");
    Ok(length)
}

pub fn get_pre_register(store: &impl PreRegistrationStore) -> Result<Vec<String>, ServiceError> {
    store
        .scan_pre_registration_emails()
        .map_err(store_failure("get pre-register list"))
}

/// Records an email. Repeated emails are stored again.
pub fn pre_register(
    store: &impl PreRegistrationStore,
    email: &str,
    timestamp: i64,
) -> Result<(), ServiceError> {
    validate_email(email)?;

    store
        .insert_pre_registration(&PreRegistration::new(email, timestamp))
        .map_err(store_failure("pre-register"))?;
    debug!(timestamp, "pre-registration stored");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;

    #[test]
    fn get_register_on_empty_store_is_empty() {
        let store = InMemoryStore::new();

        assert_eq!(get_register(&store), Ok(Vec::new()));
    }

    #[test]
    fn register_appends_in_order() {
        let store = InMemoryStore::new();

        assert_eq!(register(&store, "123", 100), Ok(1));
        assert_eq!(register(&store, "456", 101), Ok(2));
        assert_eq!(register(&store, "123", 102), Ok(3));

        let entries = get_register(&store).expect("list should load");
        assert_eq!(
            entries,
            vec![
                RegistrationEntry::new("123", 100),
                RegistrationEntry::new("456", 101),
                RegistrationEntry::new("123", 102),
            ]
        );
    }

    #[test]
    fn register_rejects_non_numeric_game_id_without_writing() {
        let store = InMemoryStore::new();

        let error = register(&store, "abc", 100).expect_err("letters should fail");
        assert_eq!(error.status_code(), 400);
        assert_eq!(store.write_count_total(), Ok(0));
        assert_eq!(get_register(&store), Ok(Vec::new()));
    }

    #[test]
    fn pre_register_keeps_duplicates() {
        let store = InMemoryStore::new();

        pre_register(&store, "a@b.com", 5).expect("first insert should succeed");
        pre_register(&store, "a@b.com", 6).expect("second insert should succeed");

        assert_eq!(
            get_pre_register(&store),
            Ok(vec!["a@b.com".to_string(), "a@b.com".to_string()])
        );
        let stored = store.pre_registrations().expect("entries should load");
        assert_eq!(stored[1], PreRegistration::new("a@b.com", 6));
    }

    #[test]
    fn pre_register_rejects_malformed_email_without_writing() {
        let store = InMemoryStore::new();

        let error = pre_register(&store, "not-an-email", 5).expect_err("should fail");
        assert!(matches!(error, ServiceError::Validation(_)));
        assert_eq!(store.write_count_total(), Ok(0));
    }
}
