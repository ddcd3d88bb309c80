use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Ping,
    GetCount,
    AddCount,
    SetCount(String),
    GetPreRegister,
    PreRegister(String),
    GetRegister,
    Register(String),
    Preflight,
}

impl Route {
    /// Operation description used in response messages.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::GetCount => "getting count",
            Self::AddCount => "increasing count",
            Self::SetCount(_) => "setting count",
            Self::GetPreRegister => "getting pre-register list",
            Self::PreRegister(_) => "inserting pre-register email",
            Self::GetRegister => "getting register list",
            Self::Register(_) => "inserting register gameId",
            Self::Preflight => "preflight",
        }
    }
}

/// Method and path of an API Gateway proxy event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub path: String,
}

/// Reads the request line from an HTTP API (v2) or REST API (v1) event.
pub fn request_line(event: &Value) -> Result<RequestLine, String> {
    let Some(object) = event.as_object() else {
        return Err("Request payload must be a JSON object".to_string());
    };

    let method = event
        .pointer("/requestContext/http/method")
        .or_else(|| object.get("httpMethod"))
        .and_then(Value::as_str)
        .ok_or_else(|| "Request event has no HTTP method".to_string())?;
    let path = object
        .get("rawPath")
        .or_else(|| object.get("path"))
        .and_then(Value::as_str)
        .ok_or_else(|| "Request event has no path".to_string())?;

    Ok(RequestLine {
        method: method.to_ascii_uppercase(),
        path: path.to_string(),
    })
}

/// Matches a request against the API surface. `None` means no route exists.
pub fn resolve(method: &str, path: &str, base_path: Option<&str>) -> Option<Route> {
    if method == "OPTIONS" {
        return Some(Route::Preflight);
    }

    let path = strip_base_path(path, base_path)?;
    let segments: Vec<Cow<'_, str>> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy())
        .collect();
    let segments: Vec<&str> = segments.iter().map(|segment| &**segment).collect();

    let route = match (method, segments.as_slice()) {
        ("GET", ["ping"]) => Route::Ping,
        ("GET", ["count"]) => Route::GetCount,
        ("PUT", ["count"]) | ("PUT" | "POST", ["count", "add"]) => Route::AddCount,
        ("POST", ["count", "set", count]) | ("POST", ["count", count]) => {
            Route::SetCount(count.to_string())
        }
        ("GET", ["pre-register"]) => Route::GetPreRegister,
        ("POST", ["pre-register", email]) => Route::PreRegister(email.to_string()),
        ("GET", ["register"]) => Route::GetRegister,
        ("POST", ["register", game_id]) => Route::Register(game_id.to_string()),
        _ => return None,
    };
    Some(route)
}

fn strip_base_path<'a>(path: &'a str, base_path: Option<&str>) -> Option<&'a str> {
    let Some(base) = base_path.map(|base| base.trim_end_matches('/')) else {
        return Some(path);
    };
    if base.is_empty() || base == "/" {
        return Some(path);
    }

    let base = base.strip_prefix('/').unwrap_or(base);
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    match trimmed.strip_prefix(base) {
        Some("") => Some("/"),
        Some(rest) if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}
