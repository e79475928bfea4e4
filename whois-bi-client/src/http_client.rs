//! Generic HTTP client tools
//!
//! Every endpoint goes through the same two steps: [`HttpUtils::execute_request`]
//! sends the request and reads the body, [`HttpUtils::classify_response`] turns
//! status, content type and body into either the parsed JSON value or a
//! [`ClientError`].
//!
//! # Classification rules
//! - 2xx: the body is parsed as JSON (an empty body is `null`); an error
//!   envelope still fails with [`ClientError::Api`]
//! - non-2xx with a JSON body: an error envelope fails with
//!   [`ClientError::Api`], anything else with [`ClientError::Transport`]
//! - non-2xx without a JSON body: [`ClientError::Transport`] with the status line
//!
//! An error envelope is a JSON object whose only field is `Error` or `error`
//! holding a string. The status code never changes how an envelope is treated.

use reqwest::RequestBuilder;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::utils::log_sanitizer::truncate_for_log;

/// Field names the server uses for error envelopes.
const ENVELOPE_KEYS: [&str; 2] = ["Error", "error"];

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Canonical reason phrase, e.g. `"Bad Gateway"`.
    pub reason: &'static str,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    fn status_line(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }

    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns the fully read response
    ///
    /// # Arguments
    /// * `request_builder` - configured request constructor (URL, headers, body)
    /// * `method_name` - request method name (such as "GET", "POST", used for logs)
    /// * `url` - request URL (for logging)
    ///
    /// # Returns
    /// * `Ok(RawResponse)` - any HTTP status, classification happens later
    /// * `Err(ClientError::Transport | ClientError::Timeout)` - no response received
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method_name: &str,
        url: &str,
    ) -> Result<RawResponse> {
        log::debug!("{method_name} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                ClientError::Transport {
                    status: None,
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        log::debug!("Response Status: {status}");

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport {
                status: Some(status.as_u16()),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!("Response Body: {}", truncate_for_log(&body));

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or(""),
            content_type,
            body,
        })
    }

    /// Turn a raw response into its JSON body or a [`ClientError`].
    pub fn classify_response(response: &RawResponse) -> Result<Value> {
        if (200..300).contains(&response.status) {
            let value = if response.body.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&response.body).map_err(|e| {
                    log::error!("JSON parse failed: {e}");
                    log::error!("Raw response: {}", truncate_for_log(&response.body));
                    ClientError::Parse {
                        detail: e.to_string(),
                    }
                })?
            };
            return match error_envelope(&value) {
                Some(message) => Err(ClientError::Api {
                    status: response.status,
                    message: message.to_string(),
                }),
                None => Ok(value),
            };
        }

        if response.is_json()
            && let Ok(value) = serde_json::from_str::<Value>(&response.body)
        {
            if let Some(message) = error_envelope(&value) {
                return Err(ClientError::Api {
                    status: response.status,
                    message: message.to_string(),
                });
            }
            return Err(ClientError::Transport {
                status: Some(response.status),
                detail: format!(
                    "{}: {}",
                    response.status_line(),
                    truncate_for_log(&response.body)
                ),
            });
        }

        Err(ClientError::Transport {
            status: Some(response.status),
            detail: response.status_line(),
        })
    }

    /// Decode a classified JSON value into the target type
    ///
    /// # Returns
    /// * `Ok(T)` - successfully parsed
    /// * `Err(ClientError::Parse)` - parsing failed
    pub fn parse_json<T>(value: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(value).map_err(|e| {
            log::error!("Unexpected response shape: {e}");
            ClientError::Parse {
                detail: e.to_string(),
            }
        })
    }
}

/// Message of an error envelope, if `value` is one.
fn error_envelope(value: &Value) -> Option<&str> {
    let map = value.as_object()?;
    if map.len() != 1 {
        return None;
    }
    ENVELOPE_KEYS
        .iter()
        .find_map(|key| map.get(*key))
        .and_then(Value::as_str)
}
