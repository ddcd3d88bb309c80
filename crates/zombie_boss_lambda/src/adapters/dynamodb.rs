//! DynamoDB implementation of the record and pre-registration stores.
//!
//! Main table: partition key `id` (S), holding the `zombieBossCount` item
//! (`Count`: N) and the `registerList` item (`list`: L of `{game_id, timestamp}`).
//! Pre-registration table: one item per email (`email`: S, `timestamp`: N).

use std::collections::HashMap;
use std::future::Future;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use tracing::{debug, info};
use zombie_boss_core::error::StoreError;
use zombie_boss_core::records::{
    PreRegistration, RegistrationEntry, COUNTER_RECORD_ID, COUNT_ATTRIBUTE, EMAIL_ATTRIBUTE,
    GAME_ID_ATTRIBUTE, RECORD_ID_ATTRIBUTE, REGISTER_LIST_ATTRIBUTE, REGISTER_LIST_RECORD_ID,
    TIMESTAMP_ATTRIBUTE,
};
use zombie_boss_core::store::{PreRegistrationStore, RecordStore};

use crate::config::ApiConfig;

pub type Item = HashMap<String, AttributeValue>;

#[derive(Clone)]
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
    pre_register_table_name: String,
}

/// One page of a scan, with the key to resume from when more remain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPage {
    pub items: Vec<Item>,
    pub last_evaluated_key: Option<Item>,
}

impl DynamoDbStore {
    pub async fn connect(config: &ApiConfig) -> Self {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let client = match config.dynamodb_endpoint.as_deref() {
            Some(endpoint) => {
                let dynamo_config = aws_sdk_dynamodb::config::Builder::from(&aws_config)
                    .endpoint_url(endpoint)
                    .build();
                Client::from_conf(dynamo_config)
            }
            None => Client::new(&aws_config),
        };

        info!(
            table = %config.table_name,
            pre_register_table = %config.pre_register_table_name,
            region = %config.region,
            "connected to DynamoDB"
        );
        Self::new(
            client,
            config.table_name.clone(),
            config.pre_register_table_name.clone(),
        )
    }

    pub fn new(
        client: Client,
        table_name: impl Into<String>,
        pre_register_table_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            pre_register_table_name: pre_register_table_name.into(),
        }
    }

    fn get_record(&self, record_id: &str) -> Result<Option<Item>, StoreError> {
        let request = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(RECORD_ID_ATTRIBUTE, AttributeValue::S(record_id.to_string()))
            .consistent_read(true)
            .send();

        let output = block_on(request).map_err(|error| {
            StoreError::backend(format!(
                "DynamoDB get_item for '{record_id}' failed: {}",
                DisplayErrorContext(&error)
            ))
        })?;
        Ok(output.item)
    }

    fn scan_page(&self, exclusive_start_key: Option<Item>) -> Result<ScanPage, StoreError> {
        let request = self
            .client
            .scan()
            .table_name(&self.pre_register_table_name)
            .projection_expression("#email")
            .expression_attribute_names("#email", EMAIL_ATTRIBUTE)
            .set_exclusive_start_key(exclusive_start_key)
            .send();

        let output = block_on(request).map_err(|error| {
            StoreError::backend(format!(
                "DynamoDB scan of '{}' failed: {}",
                self.pre_register_table_name,
                DisplayErrorContext(&error)
            ))
        })?;
        Ok(ScanPage {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key,
        })
    }
}

impl RecordStore for DynamoDbStore {
    fn read_count(&self) -> Result<Option<String>, StoreError> {
        self.get_record(COUNTER_RECORD_ID)?
            .map(|item| decode_count(&item))
            .transpose()
    }

    fn write_count(&self, count: i64) -> Result<(), StoreError> {
        let request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item(
                RECORD_ID_ATTRIBUTE,
                AttributeValue::S(COUNTER_RECORD_ID.to_string()),
            )
            .item(COUNT_ATTRIBUTE, AttributeValue::N(count.to_string()))
            .send();

        block_on(request).map_err(|error| {
            StoreError::backend(format!(
                "DynamoDB put_item for count failed: {}",
                DisplayErrorContext(&error)
            ))
        })?;
        debug!(count, "stored count in DynamoDB");
        Ok(())
    }

    fn increment_count(&self, delta: i64) -> Result<i64, StoreError> {
        let (condition, bound) = increment_guard(delta);
        let request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(
                RECORD_ID_ATTRIBUTE,
                AttributeValue::S(COUNTER_RECORD_ID.to_string()),
            )
            .update_expression("ADD #count :delta")
            .expression_attribute_names("#count", COUNT_ATTRIBUTE)
            .condition_expression(condition)
            .expression_attribute_values(":delta", AttributeValue::N(delta.to_string()))
            .expression_attribute_values(":bound", bound)
            .return_values(ReturnValue::UpdatedNew)
            .send();

        let output = block_on(request).map_err(|error| {
            if error
                .as_service_error()
                .is_some_and(UpdateItemError::is_conditional_check_failed_exception)
            {
                return StoreError::count_overflow(delta);
            }
            StoreError::backend(format!(
                "DynamoDB update_item for count failed: {}",
                DisplayErrorContext(&error)
            ))
        })?;
        let attributes = output.attributes.unwrap_or_default();
        let raw = decode_count(&attributes)?;
        raw.parse::<i64>().map_err(|error| {
            StoreError::malformed(format!("updated count '{raw}' is not an integer: {error}"))
        })
    }

    fn read_registrations(&self) -> Result<Option<Vec<RegistrationEntry>>, StoreError> {
        self.get_record(REGISTER_LIST_RECORD_ID)?
            .map(|item| decode_registrations(&item))
            .transpose()
    }

    fn append_registration(&self, entry: &RegistrationEntry) -> Result<usize, StoreError> {
        let request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(
                RECORD_ID_ATTRIBUTE,
                AttributeValue::S(REGISTER_LIST_RECORD_ID.to_string()),
            )
            .update_expression("SET #list = list_append(if_not_exists(#list, :empty), :entry)")
            .expression_attribute_names("#list", REGISTER_LIST_ATTRIBUTE)
            .expression_attribute_values(":empty", AttributeValue::L(Vec::new()))
            .expression_attribute_values(
                ":entry",
                AttributeValue::L(vec![encode_registration(entry)]),
            )
            .return_values(ReturnValue::UpdatedNew)
            .send();

        let output = block_on(request).map_err(|error| {
            StoreError::backend(format!(
                "DynamoDB update_item for register list failed: {}",
                DisplayErrorContext(&error)
            ))
        })?;
        let attributes = output.attributes.unwrap_or_default();
        match attributes.get(REGISTER_LIST_ATTRIBUTE) {
            Some(AttributeValue::L(list)) => Ok(list.len()),
            _ => Err(StoreError::malformed(
                "update_item did not return the register list",
            )),
        }
    }
}

impl PreRegistrationStore for DynamoDbStore {
    fn insert_pre_registration(&self, entry: &PreRegistration) -> Result<(), StoreError> {
        let request = self
            .client
            .put_item()
            .table_name(&self.pre_register_table_name)
            .item(EMAIL_ATTRIBUTE, AttributeValue::S(entry.email.clone()))
            .item(
                TIMESTAMP_ATTRIBUTE,
                AttributeValue::N(entry.timestamp.to_string()),
            )
            .send();

        block_on(request).map_err(|error| {
            StoreError::backend(format!(
                "DynamoDB put_item for pre-registration failed: {}",
                DisplayErrorContext(&error)
            ))
        })?;
        Ok(())
    }

    fn scan_pre_registration_emails(&self) -> Result<Vec<String>, StoreError> {
        collect_scan_emails(|start_key| self.scan_page(start_key))
    }
}

/// Condition for `ADD #count :delta` that refuses results outside the `i64`
/// range. DynamoDB numbers are wider than `i64`.
pub fn increment_guard(delta: i64) -> (&'static str, AttributeValue) {
    if delta >= 0 {
        (
            "attribute_not_exists(#count) OR #count <= :bound",
            AttributeValue::N((i64::MAX - delta).to_string()),
        )
    } else {
        (
            "attribute_not_exists(#count) OR #count >= :bound",
            AttributeValue::N((i64::MIN - delta).to_string()),
        )
    }
}

/// Runs an SDK future from a synchronous store method on the multi-thread runtime.
fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

pub fn decode_count(item: &Item) -> Result<String, StoreError> {
    match item.get(COUNT_ATTRIBUTE) {
        Some(AttributeValue::N(raw)) | Some(AttributeValue::S(raw)) => Ok(raw.clone()),
        Some(other) => Err(StoreError::malformed(format!(
            "attribute '{COUNT_ATTRIBUTE}' has unexpected type {other:?}"
        ))),
        None => Err(StoreError::malformed(format!(
            "counter record has no '{COUNT_ATTRIBUTE}' attribute"
        ))),
    }
}

pub fn encode_registration(entry: &RegistrationEntry) -> AttributeValue {
    AttributeValue::M(HashMap::from([
        (
            GAME_ID_ATTRIBUTE.to_string(),
            AttributeValue::S(entry.game_id.clone()),
        ),
        (
            TIMESTAMP_ATTRIBUTE.to_string(),
            AttributeValue::N(entry.timestamp.to_string()),
        ),
    ]))
}

/// Decodes the `list` attribute. A record without the attribute reads as empty.
pub fn decode_registrations(item: &Item) -> Result<Vec<RegistrationEntry>, StoreError> {
    let list = match item.get(REGISTER_LIST_ATTRIBUTE) {
        None | Some(AttributeValue::Null(_)) => return Ok(Vec::new()),
        Some(AttributeValue::L(list)) => list,
        Some(other) => {
            return Err(StoreError::malformed(format!(
                "attribute '{REGISTER_LIST_ATTRIBUTE}' has unexpected type {other:?}"
            )))
        }
    };

    list.iter()
        .enumerate()
        .map(|(index, value)| decode_registration(index, value))
        .collect()
}

fn decode_registration(index: usize, value: &AttributeValue) -> Result<RegistrationEntry, StoreError> {
    let AttributeValue::M(fields) = value else {
        return Err(StoreError::malformed(format!(
            "register list entry {index} is not a map"
        )));
    };

    let game_id = match fields.get(GAME_ID_ATTRIBUTE) {
        Some(AttributeValue::S(game_id)) | Some(AttributeValue::N(game_id)) => game_id.clone(),
        _ => {
            return Err(StoreError::malformed(format!(
                "register list entry {index} has no '{GAME_ID_ATTRIBUTE}'"
            )))
        }
    };
    let timestamp = match fields.get(TIMESTAMP_ATTRIBUTE) {
        Some(AttributeValue::N(raw)) => raw.parse::<i64>().map_err(|error| {
            StoreError::malformed(format!(
                "register list entry {index} has invalid timestamp '{raw}': {error}"
            ))
        })?,
        _ => {
            return Err(StoreError::malformed(format!(
                "register list entry {index} has no numeric '{TIMESTAMP_ATTRIBUTE}'"
            )))
        }
    };

    Ok(RegistrationEntry { game_id, timestamp })
}

/// Follows `last_evaluated_key` until the scan is exhausted, keeping string emails.
pub fn collect_scan_emails(
    mut fetch_page: impl FnMut(Option<Item>) -> Result<ScanPage, StoreError>,
) -> Result<Vec<String>, StoreError> {
    let mut emails = Vec::new();
    let mut start_key = None;
    let mut pages = 0usize;

    loop {
        let page = fetch_page(start_key.take())?;
        pages += 1;
        emails.extend(page.items.into_iter().filter_map(|mut item| {
            match item.remove(EMAIL_ATTRIBUTE) {
                Some(AttributeValue::S(email)) => Some(email),
                _ => None,
            }
        }));

        match page.last_evaluated_key {
            Some(key) if !key.is_empty() => start_key = Some(key),
            _ => break,
        }
    }

    debug!(pages, emails = emails.len(), "scanned pre-registrations");
    Ok(emails)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_item(email: &str) -> Item {
        HashMap::from([(
            EMAIL_ATTRIBUTE.to_string(),
            AttributeValue::S(email.to_string()),
        )])
    }

    #[test]
    fn decodes_numeric_count() {
        let item = HashMap::from([
            (
                RECORD_ID_ATTRIBUTE.to_string(),
                AttributeValue::S(COUNTER_RECORD_ID.to_string()),
            ),
            (COUNT_ATTRIBUTE.to_string(), AttributeValue::N("12".to_string())),
        ]);

        assert_eq!(decode_count(&item), Ok("12".to_string()));
    }

    #[test]
    fn count_without_attribute_is_malformed() {
        let item = HashMap::from([(
            RECORD_ID_ATTRIBUTE.to_string(),
            AttributeValue::S(COUNTER_RECORD_ID.to_string()),
        )]);

        assert!(matches!(decode_count(&item), Err(StoreError::Malformed(_))));
    }

    #[test]
    fn increment_guard_leaves_room_for_delta() {
        let (condition, bound) = increment_guard(1);
        assert_eq!(condition, "attribute_not_exists(#count) OR #count <= :bound");
        assert_eq!(bound, AttributeValue::N((i64::MAX - 1).to_string()));

        let (condition, bound) = increment_guard(-1);
        assert_eq!(condition, "attribute_not_exists(#count) OR #count >= :bound");
        assert_eq!(bound, AttributeValue::N((i64::MIN + 1).to_string()));
    }

    #[test]
    fn registration_encoding_matches_decoding() {
        let entry = RegistrationEntry::new("123", 1_734_000_000);
        let item = HashMap::from([(
            REGISTER_LIST_ATTRIBUTE.to_string(),
            AttributeValue::L(vec![encode_registration(&entry)]),
        )]);

        assert_eq!(decode_registrations(&item), Ok(vec![entry]));
    }

    #[test]
    fn missing_list_attribute_reads_as_empty() {
        let item = HashMap::from([(
            RECORD_ID_ATTRIBUTE.to_string(),
            AttributeValue::S(REGISTER_LIST_RECORD_ID.to_string()),
        )]);

        assert_eq!(decode_registrations(&item), Ok(Vec::new()));
    }

    #[test]
    fn list_entry_without_timestamp_is_malformed() {
        let item = HashMap::from([(
            REGISTER_LIST_ATTRIBUTE.to_string(),
            AttributeValue::L(vec![AttributeValue::M(HashMap::from([(
                GAME_ID_ATTRIBUTE.to_string(),
                AttributeValue::S("9".to_string()),
            )]))]),
        )]);

        let error = decode_registrations(&item).expect_err("entry should fail");
        assert!(error.to_string().contains("entry 0"));
    }

    #[test]
    fn scan_follows_every_page() {
        let mut requested_keys = Vec::new();
        let emails = collect_scan_emails(|start_key| {
            requested_keys.push(start_key.clone());
            Ok(match start_key {
                None => ScanPage {
                    items: vec![email_item("a@b.com"), email_item("c@d.com")],
                    last_evaluated_key: Some(email_item("c@d.com")),
                },
                Some(_) => ScanPage {
                    items: vec![email_item("e@f.com")],
                    last_evaluated_key: None,
                },
            })
        })
        .expect("scan should succeed");

        assert_eq!(emails, vec!["a@b.com", "c@d.com", "e@f.com"]);
        assert_eq!(requested_keys.len(), 2);
        assert_eq!(requested_keys[1], Some(email_item("c@d.com")));
    }

    #[test]
    fn scan_skips_items_without_string_email() {
        let emails = collect_scan_emails(|_| {
            Ok(ScanPage {
                items: vec![
                    email_item("a@b.com"),
                    HashMap::from([(
                        EMAIL_ATTRIBUTE.to_string(),
                        AttributeValue::N("1".to_string()),
                    )]),
                    HashMap::new(),
                ],
                last_evaluated_key: Some(HashMap::new()),
            })
        })
        .expect("scan should succeed");

        assert_eq!(emails, vec!["a@b.com"]);
    }

    #[test]
    fn scan_stops_on_page_error() {
        let error = collect_scan_emails(|_| Err(StoreError::backend("throttled")))
            .expect_err("scan should fail");

        assert_eq!(error, StoreError::backend("throttled"));
    }
}
