use fw_core::ports::GatewayError;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Error body shapes returned by the auth, REST and functions endpoints.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}

pub fn map_status(status: StatusCode, message: Option<String>) -> GatewayError {
    let message = message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unexpected server response")
            .to_string()
    });
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::unauthorized(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GatewayError::network(format!("server timed out ({})", status.as_u16()))
        }
        StatusCode::TOO_MANY_REQUESTS => GatewayError::network("too many requests, try again shortly"),
        _ if status.is_server_error() => {
            GatewayError::network(format!("server error ({})", status.as_u16()))
        }
        _ => GatewayError::rejected(message, Some(status.as_u16())),
    }
}

pub fn map_transport(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::network("request timed out")
    } else if err.is_decode() {
        GatewayError::rejected("Unexpected response from the server", None)
    } else {
        GatewayError::network(err.without_url().to_string())
    }
}

/// Turn a non-success response into a [`GatewayError`].
pub(crate) async fn read_error(response: Response) -> GatewayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), body = %body, "request failed");
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message);
    map_status(status, message)
}
