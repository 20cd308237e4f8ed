//! Conversion request submission.
//!
//! One JSON POST to the service's `/api/convert` endpoint via the curl crate
//! (libcurl). The body carries the video URL, an optional quality, and the
//! header fingerprint; the response is either an error message or a download
//! link. Runs in the current thread; call from `spawn_blocking` if used from
//! async code.

use std::collections::BTreeMap;
use std::time::Duration;

use curl::easy::{Easy, List};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path of the conversion endpoint, relative to the service base URL.
pub const CONVERT_PATH: &str = "/api/convert";

/// JSON body of a conversion request.
///
/// `headers` is the browser fingerprint forwarded for the backend's benefit;
/// cookies are never sent.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,
    pub headers: BTreeMap<String, String>,
}

/// JSON body of a conversion response.
///
/// Exactly one of `error` / `download_url` is meaningfully populated;
/// `title` and `cached` are advisory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cached: Option<bool>,
}

/// Failure of the conversion call itself, before any UI interpretation.
///
/// A backend-reported `error` field is NOT one of these: the backend sends it
/// as a parseable JSON body (often with a 4xx/5xx status), so it comes back
/// as an `Ok(ConvertResponse)` for the submission layer to interpret.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("request failed: {0}")]
    Transport(#[from] curl::Error),
    #[error("conversion endpoint returned HTTP {0}")]
    Http(u32),
    #[error("malformed conversion response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// POSTs `request` to `{service_url}/api/convert` and parses the JSON reply.
///
/// The body is parsed regardless of HTTP status, since the backend reports
/// conversion failures as `{"error": ...}` with a non-2xx status. A non-2xx
/// status with an unparseable body maps to [`ConvertError::Http`]. No
/// timeout is applied unless `timeout` is set.
pub fn post_convert(
    service_url: &str,
    request: &ConvertRequest,
    timeout: Option<Duration>,
) -> Result<ConvertResponse, ConvertError> {
    let endpoint = join_endpoint(service_url);
    let body = serde_json::to_vec(request)?;

    let mut response_body: Vec<u8> = Vec::new();
    let mut easy = Easy::new();
    easy.url(&endpoint)?;
    easy.post(true)?;
    easy.post_fields_copy(&body)?;
    easy.follow_location(true)?;
    if let Some(t) = timeout {
        easy.timeout(t)?;
    }
    // The POST itself goes out under the impersonated user agent, matching
    // how the fingerprinted browser would have issued it.
    if let Some(ua) = request.headers.get("User-Agent") {
        easy.useragent(ua)?;
    }

    let mut list = List::new();
    list.append("Content-Type: application/json")?;
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            response_body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    tracing::debug!(code, bytes = response_body.len(), "conversion response");

    match serde_json::from_slice::<ConvertResponse>(&response_body) {
        Ok(parsed) => Ok(parsed),
        Err(_) if !(200..300).contains(&code) => Err(ConvertError::Http(code)),
        Err(e) => Err(ConvertError::Malformed(e)),
    }
}

fn join_endpoint(service_url: &str) -> String {
    format!("{}{}", service_url.trim_end_matches('/'), CONVERT_PATH)
}
