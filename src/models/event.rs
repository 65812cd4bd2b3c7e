//! Host invocation event and response shapes.

use std::collections::BTreeMap;

use axum::http::Method;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Invocation event as delivered by the function host.
///
/// Accepts the Netlify / API Gateway REST (v1) shape and the HTTP API (v2)
/// shape, where the method lives under `requestContext.http` and the query
/// arrives as `rawQueryString`. Hosts send `null` for absent maps, so every
/// map is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    #[serde(default)]
    pub http_method: Option<String>,

    #[serde(default)]
    pub path: Option<String>,

    /// Un-decoded path, preferred by some hosts
    #[serde(default)]
    pub raw_path: Option<String>,

    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub multi_value_headers: Option<BTreeMap<String, Vec<String>>>,

    #[serde(default)]
    pub query_string_parameters: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub multi_value_query_string_parameters: Option<BTreeMap<String, Vec<String>>>,

    /// Already-encoded query string (Netlify)
    #[serde(default)]
    pub raw_query: Option<String>,

    /// Already-encoded query string (HTTP API v2)
    #[serde(default)]
    pub raw_query_string: Option<String>,

    /// Request cookies, split out of the headers by HTTP API v2
    #[serde(default)]
    pub cookies: Option<Vec<String>>,

    #[serde(default)]
    pub request_context: Option<RequestContext>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// The part of the host request context the adapter reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub http: Option<HttpDescription>,
}

/// `requestContext.http` of an HTTP API v2 event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpDescription {
    #[serde(default)]
    pub method: Option<String>,

    #[serde(default)]
    pub path: Option<String>,
}

impl FunctionEvent {
    /// Build a bodiless event, mostly for synthesized calls.
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            http_method: Some(method.to_string()),
            path: Some(path.to_string()),
            ..Default::default()
        }
    }

    /// Attach a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Attach a text body.
    pub fn with_text_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.is_base64_encoded = false;
        self
    }

    /// Attach a binary body, base64-encoded the way hosts deliver it.
    pub fn with_binary_body(mut self, body: &[u8]) -> Self {
        self.body = Some(STANDARD.encode(body));
        self.is_base64_encoded = true;
        self
    }

    fn http_description(&self) -> Option<&HttpDescription> {
        self.request_context.as_ref()?.http.as_ref()
    }

    /// Method as reported by the host, if any.
    pub fn request_method(&self) -> Option<&str> {
        let non_blank = |m: &&str| !m.trim().is_empty();
        self.http_method
            .as_deref()
            .filter(non_blank)
            .or_else(|| self.http_description()?.method.as_deref().filter(non_blank))
    }

    /// Path as reported by the host, if any.
    pub fn request_path(&self) -> Option<&str> {
        self.raw_path
            .as_deref()
            .or(self.path.as_deref())
            .or_else(|| self.http_description()?.path.as_deref())
    }
}

/// Host metadata for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationContext {
    pub request_id: Option<String>,
    pub function_name: Option<String>,
    /// Host deadline, milliseconds since the Unix epoch
    pub deadline_ms: Option<u64>,
}

/// Request body after transport decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    #[default]
    Empty,
    Text(String),
    Binary(Vec<u8>),
}

impl Body {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Body::Empty => Vec::new(),
            Body::Text(text) => text.into_bytes(),
            Body::Binary(bytes) => bytes,
        }
    }
}

/// Typed view of an invocation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    /// Header pairs in a stable order; repeated names keep every value
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl TryFrom<FunctionEvent> for InboundRequest {
    type Error = AppError;

    fn try_from(event: FunctionEvent) -> Result<Self> {
        let method = match event.request_method() {
            Some(m) => Method::from_bytes(m.trim().to_ascii_uppercase().as_bytes())
                .map_err(|e| AppError::request("method", e))?,
            None => Method::GET,
        };

        let path = event
            .request_path()
            .filter(|p| !p.is_empty())
            .unwrap_or("/")
            .to_string();

        let query = query_string(&event);
        let headers = header_pairs(&event);

        let body = match event.body {
            None => Body::Empty,
            Some(b) if b.is_empty() => Body::Empty,
            Some(b) if event.is_base64_encoded => {
                Body::Binary(STANDARD.decode(b.as_bytes()).map_err(|e| AppError::request("body", e))?)
            }
            Some(b) => Body::Text(b),
        };

        Ok(Self {
            method,
            path,
            query,
            headers,
            body,
        })
    }
}

fn query_string(event: &FunctionEvent) -> Option<String> {
    if let Some(raw) = event.raw_query.as_deref().or(event.raw_query_string.as_deref()) {
        let raw = raw.trim_start_matches('?');
        return (!raw.is_empty()).then(|| raw.to_string());
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    if let Some(params) = &event.multi_value_query_string_parameters {
        for (name, values) in params {
            for value in values {
                serializer.append_pair(name, value);
                any = true;
            }
        }
    } else if let Some(params) = &event.query_string_parameters {
        for (name, value) in params {
            serializer.append_pair(name, value);
            any = true;
        }
    }
    any.then(|| serializer.finish())
}

fn header_pairs(event: &FunctionEvent) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let multi = event.multi_value_headers.as_ref();

    if let Some(multi) = multi {
        for (name, values) in multi {
            pairs.extend(values.iter().map(|v| (name.clone(), v.clone())));
        }
    }
    if let Some(single) = &event.headers {
        for (name, value) in single {
            let covered = multi.is_some_and(|m| m.keys().any(|k| k.eq_ignore_ascii_case(name)));
            if !covered {
                pairs.push((name.clone(), value.clone()));
            }
        }
    }
    if let Some(cookies) = event.cookies.as_ref().filter(|c| !c.is_empty()) {
        if !pairs.iter().any(|(name, _)| name.eq_ignore_ascii_case("cookie")) {
            pairs.push(("cookie".to_string(), cookies.join("; ")));
        }
    }
    pairs
}

/// Response handed back to the function host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Only names that appear more than once, e.g. `set-cookie`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub multi_value_headers: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub body: String,

    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl FunctionResponse {
    /// JSON response with the given status.
    pub fn json<T: Serialize>(status_code: u16, payload: &T) -> Self {
        let body = serde_json::to_string(payload).unwrap_or_else(|e| {
            serde_json::json!({
                "ok": false,
                "reason": "serialize_failed",
                "message": e.to_string(),
            })
            .to_string()
        });
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            multi_value_headers: BTreeMap::new(),
            body,
            is_base64_encoded: false,
        }
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Raw body bytes, undoing base64 transport encoding.
    pub fn body_bytes(&self) -> Result<Vec<u8>> {
        if self.is_base64_encoded {
            STANDARD
                .decode(self.body.as_bytes())
                .map_err(AppError::response)
        } else {
            Ok(self.body.clone().into_bytes())
        }
    }

    /// Body parsed as JSON.
    pub fn body_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.body_bytes()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_netlify_event_deserializes() {
        let json = r#"{
            "path": "/.netlify/functions/api/projects",
            "httpMethod": "post",
            "headers": {"content-type": "application/json", "x-forwarded-for": "1.2.3.4"},
            "multiValueHeaders": null,
            "queryStringParameters": {"page": "2"},
            "rawQuery": "page=2&sort=desc",
            "body": "{\"name\":\"مشروع\"}",
            "isBase64Encoded": false
        }"#;
        let event: FunctionEvent = serde_json::from_str(json).unwrap();
        let request = InboundRequest::try_from(event).unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/.netlify/functions/api/projects");
        assert_eq!(request.query.as_deref(), Some("page=2&sort=desc"));
        assert_eq!(request.headers.len(), 2);
        assert_eq!(request.body, Body::Text("{\"name\":\"مشروع\"}".into()));
    }

    #[test]
    fn test_http_api_v2_event_deserializes() {
        let json = r#"{
            "version": "2.0",
            "routeKey": "$default",
            "rawPath": "/api/projects",
            "rawQueryString": "page=2&tag=a%20b",
            "cookies": ["session=abc", "theme=dark"],
            "headers": {"content-type": "application/json"},
            "queryStringParameters": {"page": "2", "tag": "a b"},
            "requestContext": {
                "http": {"method": "POST", "path": "/api/projects", "protocol": "HTTP/1.1"},
                "requestId": "id-1"
            },
            "body": "{}",
            "isBase64Encoded": false
        }"#;

        let event: FunctionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.request_method(), Some("POST"));
        let request = InboundRequest::try_from(event).unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/api/projects");
        assert_eq!(request.query.as_deref(), Some("page=2&tag=a%20b"));
        assert!(
            request
                .headers
                .contains(&("cookie".to_string(), "session=abc; theme=dark".to_string()))
        );
    }

    #[test]
    fn test_v2_path_falls_back_to_request_context() {
        let json = r#"{"requestContext": {"http": {"method": "delete", "path": "/api/items/3"}}}"#;
        let event: FunctionEvent = serde_json::from_str(json).unwrap();
        let request = InboundRequest::try_from(event).unwrap();
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.path, "/api/items/3");
    }

    #[test]
    fn test_empty_event_defaults() {
        let request = InboundRequest::try_from(FunctionEvent::default()).unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/");
        assert!(request.query.is_none());
        assert_eq!(request.body, Body::Empty);
    }

    #[test]
    fn test_query_from_parameters_is_encoded() {
        let mut params = BTreeMap::new();
        params.insert("q".to_string(), "a b&c".to_string());
        let event = FunctionEvent {
            query_string_parameters: Some(params),
            ..FunctionEvent::new("GET", "/api/search")
        };
        let request = InboundRequest::try_from(event).unwrap();
        assert_eq!(request.query.as_deref(), Some("q=a+b%26c"));
    }

    #[test]
    fn test_multi_value_query_wins() {
        let mut multi = BTreeMap::new();
        multi.insert("tag".to_string(), vec!["x".to_string(), "y".to_string()]);
        let mut single = BTreeMap::new();
        single.insert("tag".to_string(), "y".to_string());
        let event = FunctionEvent {
            multi_value_query_string_parameters: Some(multi),
            query_string_parameters: Some(single),
            ..FunctionEvent::new("GET", "/api/items")
        };
        let request = InboundRequest::try_from(event).unwrap();
        assert_eq!(request.query.as_deref(), Some("tag=x&tag=y"));
    }

    #[test]
    fn test_multi_value_headers_are_not_duplicated() {
        let mut multi = BTreeMap::new();
        multi.insert(
            "Cookie".to_string(),
            vec!["a=1".to_string(), "b=2".to_string()],
        );
        let event = FunctionEvent {
            multi_value_headers: Some(multi),
            ..FunctionEvent::new("GET", "/api/me").with_header("cookie", "a=1")
        };
        let request = InboundRequest::try_from(event).unwrap();
        assert_eq!(
            request.headers,
            vec![
                ("Cookie".to_string(), "a=1".to_string()),
                ("Cookie".to_string(), "b=2".to_string()),
            ]
        );
    }

    #[test]
    fn test_base64_body_becomes_binary() {
        let bytes = vec![0u8, 159, 146, 150, 255];
        let event = FunctionEvent::new("POST", "/api/upload").with_binary_body(&bytes);
        let request = InboundRequest::try_from(event).unwrap();
        assert_eq!(request.body, Body::Binary(bytes));
    }

    #[test]
    fn test_invalid_base64_is_request_error() {
        let event = FunctionEvent {
            body: Some("not base64!!".into()),
            is_base64_encoded: true,
            ..FunctionEvent::new("POST", "/api/upload")
        };
        let err = InboundRequest::try_from(event).unwrap_err();
        assert_eq!(err.kind(), "request");
    }

    #[test]
    fn test_invalid_method_is_request_error() {
        let err = InboundRequest::try_from(FunctionEvent::new("GE T", "/")).unwrap_err();
        assert_eq!(err.kind(), "request");
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom(r#"field "name" is "bad""#))
        }
    }

    #[test]
    fn test_json_fallback_escapes_error_message() {
        let response = FunctionResponse::json(500, &Unserializable);
        let body = response.body_json().unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["reason"], "serialize_failed");
        assert!(body["message"].as_str().unwrap().contains(r#""name""#));
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = FunctionResponse::json(503, &serde_json::json!({"ok": false}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], 503);
        assert_eq!(value["isBase64Encoded"], false);
        assert_eq!(value["headers"]["content-type"], "application/json");
        assert!(value.get("multiValueHeaders").is_none());
        assert_eq!(response.header("Content-Type"), Some("application/json"));
    }
}
