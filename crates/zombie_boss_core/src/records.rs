use serde::{Deserialize, Serialize};

/// Partition key attribute shared by both singleton records.
pub const RECORD_ID_ATTRIBUTE: &str = "id";

pub const COUNTER_RECORD_ID: &str = "zombieBossCount";
pub const COUNT_ATTRIBUTE: &str = "Count";

pub const REGISTER_LIST_RECORD_ID: &str = "registerList";
pub const REGISTER_LIST_ATTRIBUTE: &str = "list";

pub const GAME_ID_ATTRIBUTE: &str = "game_id";
pub const EMAIL_ATTRIBUTE: &str = "email";
pub const TIMESTAMP_ATTRIBUTE: &str = "timestamp";

/// One element of the registration list record, in append order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationEntry {
    pub game_id: String,
    /// Unix seconds at which the registration was received.
    pub timestamp: i64,
}

impl RegistrationEntry {
    pub fn new(game_id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            game_id: game_id.into(),
            timestamp,
        }
    }
}

/// An item of the pre-registration table. Written once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreRegistration {
    pub email: String,
    pub timestamp: i64,
}

impl PreRegistration {
    pub fn new(email: impl Into<String>, timestamp: i64) -> Self {
        Self {
            email: email.into(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_entry_serializes_with_stored_field_names() {
        let entry = RegistrationEntry::new("42", 1_734_000_000);
        let value = serde_json::to_value(&entry).expect("entry should serialize");

        assert_eq!(value[GAME_ID_ATTRIBUTE], "42");
        assert_eq!(value[TIMESTAMP_ATTRIBUTE], 1_734_000_000);
    }
}
