//! Conversion between host events and the application's HTTP types.

use std::collections::BTreeMap;

use axum::body::Body as HttpBody;
use axum::http::{HeaderName, HeaderValue, Request, Response, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{FunctionResponse, InboundRequest, InvocationContext};
use crate::utils::media::BinaryTypes;

/// Remove the host mount prefix, keeping the application's own prefix.
///
/// `/.netlify/functions/api/health` becomes `/api/health`; a path equal to
/// the prefix becomes `/`; anything else passes through untouched.
pub fn strip_mount_prefix(path: &str, mount_prefix: &str) -> String {
    if mount_prefix == "/" || mount_prefix.is_empty() {
        return path.to_string();
    }
    match path.strip_prefix(mount_prefix) {
        Some("") => "/".to_string(),
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => path.to_string(),
    }
}

/// Percent-encode what a URI path cannot carry as-is.
///
/// Hosts hand over decoded paths (`/api/projects/my project`). Existing
/// escapes and `/` separators are kept.
pub fn encode_path(path: &str) -> Result<String> {
    let mut url = Url::parse("http://localhost").map_err(|e| AppError::request("path", e))?;
    url.set_path(path);
    Ok(url.path().to_string())
}

/// Build the request the application router sees.
pub fn to_http_request(
    inbound: InboundRequest,
    mount_prefix: &str,
    ctx: InvocationContext,
) -> Result<Request<HttpBody>> {
    let path = encode_path(&strip_mount_prefix(&inbound.path, mount_prefix))?;
    let uri = match &inbound.query {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    let mut builder = Request::builder().method(inbound.method).uri(&uri);

    if let Some(headers) = builder.headers_mut() {
        for (name, value) in &inbound.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| AppError::request(format!("header {name:?}"), e))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| AppError::request(format!("header {name}"), e))?;
            headers.append(name, value);
        }
    }

    builder
        .extension(ctx)
        .body(HttpBody::from(inbound.body.into_bytes()))
        .map_err(|e| AppError::request(format!("uri {uri:?}"), e))
}

/// Collect the application response into the host shape.
///
/// Bodies with a binary content type, or that are not valid UTF-8, travel
/// base64-encoded.
pub async fn to_function_response(
    response: Response<HttpBody>,
    binary: &BinaryTypes,
    max_body_bytes: usize,
) -> Result<FunctionResponse> {
    let (parts, body) = response.into_parts();

    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in &parts.headers {
        grouped
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    let mut headers = BTreeMap::new();
    let mut multi_value_headers = BTreeMap::new();
    for (name, mut values) in grouped {
        if values.len() == 1 {
            headers.insert(name, values.remove(0));
        } else {
            multi_value_headers.insert(name, values);
        }
    }

    let bytes = axum::body::to_bytes(body, max_body_bytes)
        .await
        .map_err(|e| AppError::response(format!("failed to read body: {e}")))?;

    let is_binary = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| binary.is_binary(ct));

    let (body, is_base64_encoded) = if is_binary {
        (STANDARD.encode(&bytes), true)
    } else {
        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => (text, false),
            Err(_) => (STANDARD.encode(&bytes), true),
        }
    };

    Ok(FunctionResponse {
        status_code: parts.status.as_u16(),
        headers,
        multi_value_headers,
        body,
        is_base64_encoded,
    })
}
