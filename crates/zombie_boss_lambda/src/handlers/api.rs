use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use zombie_boss_core::counter::{add_count, get_count, set_count_from_text};
use zombie_boss_core::error::ServiceError;
use zombie_boss_core::registration::{get_pre_register, get_register, pre_register, register};
use zombie_boss_core::store::ApiStore;

use crate::handlers::routes::{request_line, resolve, Route};

const COMPONENT: &str = "api_handler";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiHandlerConfig {
    pub base_path: Option<String>,
}

/// Routes one API Gateway event to its operation and renders the response
/// envelope. `received_at` is the Unix time stamped onto new entries.
pub fn handle_api_event(
    event: Value,
    config: &ApiHandlerConfig,
    received_at: i64,
    store: &impl ApiStore,
) -> ApiGatewayResponse {
    let started_at = Instant::now();

    let line = match request_line(&event) {
        Ok(value) => value,
        Err(message) => {
            warn!(component = COMPONENT, event = "request_rejected", %message);
            return envelope_response(400, true, &message, Value::Null);
        }
    };
    info!(
        component = COMPONENT,
        event = "request_received",
        method = %line.method,
        path = %line.path
    );

    let Some(route) = resolve(&line.method, &line.path, config.base_path.as_deref()) else {
        warn!(
            component = COMPONENT,
            event = "route_not_found",
            method = %line.method,
            path = %line.path
        );
        let response =
            envelope_response(404, true, &format!("Not Found: {}", line.path), Value::Null);
        return completed("route_not_found", response, started_at);
    };

    if route == Route::Preflight {
        let response = ApiGatewayResponse {
            status_code: 204,
            headers: response_headers(),
            body: String::new(),
        };
        return completed(route.operation(), response, started_at);
    }

    let response = match dispatch(&route, received_at, store) {
        Ok(body) => envelope_response(200, false, &success_message(&route), body),
        Err(service_error) => {
            let status_code = service_error.status_code();
            if service_error.is_client_error() {
                warn!(
                    component = COMPONENT,
                    event = "request_failed",
                    operation = route.operation(),
                    status_code,
                    error = %service_error
                );
            } else {
                error!(
                    component = COMPONENT,
                    event = "request_failed",
                    operation = route.operation(),
                    status_code,
                    error = %service_error
                );
            }
            envelope_response(
                status_code,
                true,
                &failure_message(&route, &service_error),
                Value::Null,
            )
        }
    };

    completed(route.operation(), response, started_at)
}

fn completed(operation: &str, response: ApiGatewayResponse, started_at: Instant) -> ApiGatewayResponse {
    info!(
        component = COMPONENT,
        event = "request_completed",
        operation,
        status_code = response.status_code,
        duration_ms = started_at.elapsed().as_millis() as u64
    );
    response
}

fn dispatch(route: &Route, received_at: i64, store: &impl ApiStore) -> Result<Value, ServiceError> {
    match route {
        Route::Ping => Ok(json!({ "message": "pong" })),
        Route::GetCount => get_count(store).map(|count| json!({ "count": count })),
        Route::AddCount => add_count(store).map(|count| json!({ "count": count })),
        Route::SetCount(raw) => set_count_from_text(store, raw).map(|_| Value::Null),
        Route::GetPreRegister => get_pre_register(store).map(|emails| json!(emails)),
        Route::PreRegister(email) => pre_register(store, email, received_at).map(|()| Value::Null),
        Route::GetRegister => get_register(store).map(|entries| json!(entries)),
        Route::Register(game_id) => register(store, game_id, received_at).map(|_| Value::Null),
        Route::Preflight => Ok(Value::Null),
    }
}

fn success_message(route: &Route) -> String {
    format!("{} successfully.", capitalize(route.operation()))
}

fn failure_message(route: &Route, service_error: &ServiceError) -> String {
    match service_error {
        // Already carry the attempted action.
        ServiceError::Store { .. } | ServiceError::MalformedData { .. } => {
            capitalize(&service_error.to_string())
        }
        _ => format!("Failed {}: {service_error}", route.operation()),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn response_headers() -> Value {
    json!({
        "Content-Type": "application/json",
        "Access-Control-Allow-Origin": "*",
        "Access-Control-Allow-Methods": "GET, POST, PUT, OPTIONS",
        "Access-Control-Allow-Headers": "Content-Type",
    })
}

fn envelope_response(status_code: u16, is_error: bool, message: &str, body: Value) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: response_headers(),
        body: json!({
            "error": is_error,
            "message": message,
            "body": body,
        })
        .to_string(),
    }
}
