//! Shared HTTP exchange for all adapters.
//!
//! Maps transport failures onto [`VendorError`] so every backend reports
//! network, status, timeout, and envelope problems the same way.

use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::commit::request::GenerationRequest;
use crate::commit::response::{GenerationResult, ResponseParser};
use crate::error::{DecodeError, VendorError};
use crate::llm::transcript::restore_primer;
use crate::llm::vendor::VendorKind;

/// Send `request`, enforce `deadline`, and decode a 2xx JSON body as `T`.
///
/// Returns the decoded envelope together with the raw body.
pub async fn post_json<T: DeserializeOwned>(
    vendor: VendorKind,
    request: RequestBuilder,
    deadline: Duration,
) -> Result<(T, String), VendorError> {
    let name = vendor.as_str();

    let exchange = async {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok::<_, reqwest::Error>((status, body))
    };

    let (status, body) = match timeout(deadline, exchange).await {
        Ok(Ok(pair)) => pair,
        Ok(Err(err)) => return Err(classify(vendor, err, deadline)),
        Err(_) => {
            return Err(VendorError::Timeout {
                vendor: name,
                secs: deadline.as_secs(),
            });
        }
    };

    if !status.is_success() {
        warn!("{} returned HTTP {}", name, status.as_u16());
        return Err(VendorError::Http {
            vendor: name,
            status: status.as_u16(),
            body,
        });
    }

    debug!("{} responded with {} bytes", name, body.len());

    match serde_json::from_str::<T>(&body) {
        Ok(envelope) => Ok((envelope, body)),
        Err(e) => {
            warn!("Failed to decode {} response envelope: {}\n{}", name, e, body);
            Err(DecodeError::new(format!("unexpected {name} response: {e}"), body).into())
        }
    }
}

fn classify(vendor: VendorKind, err: reqwest::Error, deadline: Duration) -> VendorError {
    let name = vendor.as_str();

    if err.is_timeout() {
        return VendorError::Timeout {
            vendor: name,
            secs: deadline.as_secs(),
        };
    }

    if err.is_connect() {
        let host = err
            .url()
            .and_then(|url| url.host_str())
            .unwrap_or("unknown host")
            .to_string();
        warn!("Could not connect to {} at {}: {}", name, host, err);
        return VendorError::NetworkUnavailable { vendor: name, host };
    }

    VendorError::Request {
        vendor: name,
        source: err,
    }
}

/// Fail with a decode error when an envelope carried no text.
pub(crate) fn require_content(
    vendor: VendorKind,
    content: Option<String>,
    body: &str,
) -> Result<String, VendorError> {
    content.ok_or_else(|| {
        warn!("{} response had no message content\n{}", vendor.as_str(), body);
        DecodeError::new(format!("{} response had no message content", vendor.as_str()), body)
            .into()
    })
}

/// Restore the primer on `content` and parse it for `request`.
///
/// Decode failures are logged with the full text before being returned.
pub(crate) fn decode_reply(
    vendor: VendorKind,
    request: &GenerationRequest,
    content: &str,
) -> Result<GenerationResult, VendorError> {
    let raw = restore_primer(request.format().primer(), content);
    ResponseParser::for_request(request).parse(&raw).map_err(|err| {
        warn!("{} reply could not be decoded: {}\n{}", vendor.as_str(), err.reason(), err.raw());
        VendorError::Decode(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Envelope {}

    #[tokio::test]
    async fn test_connection_refused_is_network_unavailable() {
        // Nothing listens on the loopback discard port.
        let request = reqwest::Client::new().post("http://127.0.0.1:9/api/chat");
        let result = post_json::<Envelope>(VendorKind::Ollama, request, Duration::from_secs(5)).await;
        match result {
            Err(VendorError::NetworkUnavailable { vendor, host }) => {
                assert_eq!(vendor, "Ollama");
                assert_eq!(host, "127.0.0.1");
            }
            other => panic!("Expected NetworkUnavailable, got: {:?}", other),
        }
    }

    #[test]
    fn test_require_content_missing_is_decode_error() {
        let err = require_content(VendorKind::OpenAi, None, r#"{"choices":[]}"#).unwrap_err();
        match err {
            VendorError::Decode(decode) => assert_eq!(decode.raw(), r#"{"choices":[]}"#),
            other => panic!("Expected Decode, got: {:?}", other),
        }
    }
}
