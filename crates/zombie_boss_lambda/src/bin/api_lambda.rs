use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use zombie_boss_lambda::adapters::dynamodb::DynamoDbStore;
use zombie_boss_lambda::config::ApiConfig;
use zombie_boss_lambda::handlers::api::{handle_api_event, ApiGatewayResponse, ApiHandlerConfig};
use zombie_boss_lambda::telemetry::init_tracing;

async fn handle_request(
    event: LambdaEvent<Value>,
    handler_config: &ApiHandlerConfig,
    store: &DynamoDbStore,
) -> Result<ApiGatewayResponse, Error> {
    let received_at = Utc::now().timestamp();
    Ok(handle_api_event(
        event.payload,
        handler_config,
        received_at,
        store,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = ApiConfig::from_env().map_err(|error| Error::from(error.to_string()))?;
    let store = DynamoDbStore::connect(&config).await;
    let handler_config = ApiHandlerConfig {
        base_path: config.base_path.clone(),
    };

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| {
        handle_request(event, &handler_config, &store)
    }))
    .await
}
