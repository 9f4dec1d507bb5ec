//! Executing one operation against the remote service.

use std::time::Instant;

use rekt_api::{BodyEncoding, RektHttpClient};
use rekt_registry::OperationEntry;
use rekt_types::{ArgsLocation, Verb};
use rekt_util::http::{build_query_pairs, parse_response_json_strict};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{Arguments, CallError, RequestRecord, Response};

/// Resolves `arguments` for `entry`, issues the request, and decodes the body.
///
/// Argument validation happens before anything is sent. Arguments go to the
/// query string for `GET`, `HEAD` and `DELETE` and to the body for `POST`,
/// `PUT` and `PATCH`; `null` values are never transmitted. Any 2xx status
/// is a success.
///
/// # Errors
///
/// See [`CallError`]. Non-2xx responses become [`CallError::Remote`] carrying
/// the status and the raw body.
pub async fn execute(http: &RektHttpClient, entry: &OperationEntry, arguments: Arguments) -> Result<Response, CallError> {
    let operation = entry.name.as_str();
    let record = RequestRecord::build(operation, entry.request_schema(), arguments)?;
    let location = entry.verb.args_location().ok_or_else(|| CallError::UnsupportedVerb {
        operation: operation.to_string(),
        verb: entry.verb,
    })?;

    let params = record.params();
    let url = entry.resource.url.as_str();
    let method = to_method(entry.verb);
    debug!(
        operation,
        method = %method,
        url,
        param_count = params.len(),
        "http request started"
    );

    let started = Instant::now();
    let mut request = http.request(method.clone(), url);
    if !params.is_empty() {
        request = match location {
            ArgsLocation::Query => request.query(&build_query_pairs(&params)),
            ArgsLocation::Body => match http.options().body_encoding {
                BodyEncoding::Form => request.form(&build_query_pairs(&params)),
                BodyEncoding::Json => request.json(&Value::Object(params)),
            },
        };
    }

    let response = request.send().await.map_err(|source| {
        warn!(operation, method = %method, url, error = %source, "http request failed");
        CallError::Transport {
            operation: operation.to_string(),
            source,
        }
    })?;
    let status = response.status();
    let text = response.text().await.map_err(|source| CallError::Transport {
        operation: operation.to_string(),
        source,
    })?;
    let duration_ms = started.elapsed().as_millis() as u64;

    if !status.is_success() {
        warn!(
            operation,
            method = %method,
            url,
            status = status.as_u16(),
            duration_ms,
            "http request returned error status"
        );
        return Err(CallError::Remote {
            operation: operation.to_string(),
            status: status.as_u16(),
            body: text,
        });
    }

    let body = parse_response_json_strict(&text, Some(status)).map_err(|source| {
        warn!(operation, status = status.as_u16(), error = %source, "response body is not json");
        CallError::Decode {
            operation: operation.to_string(),
            source,
        }
    })?;
    debug!(
        operation,
        method = %method,
        url,
        status = status.as_u16(),
        duration_ms,
        "http request completed"
    );

    Ok(Response::new(entry.response_descriptor().clone(), body))
}

fn to_method(verb: Verb) -> Method {
    match verb {
        Verb::Get => Method::GET,
        Verb::Post => Method::POST,
        Verb::Put => Method::PUT,
        Verb::Patch => Method::PATCH,
        Verb::Delete => Method::DELETE,
        Verb::Head => Method::HEAD,
        Verb::Options => Method::OPTIONS,
    }
}
