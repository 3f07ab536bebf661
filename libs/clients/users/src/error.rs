use serde::Deserialize;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Failed call to the users API.
///
/// `status_code` is `None` when no response arrived (connect error, timeout,
/// undecodable body).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClientError {
    pub message: String,
    /// Message reported by the server, or the raw body when it is not JSON
    pub server_message: String,
    pub status_code: Option<u16>,
    pub url: Option<String>,
}

#[derive(Deserialize)]
struct ServerError {
    message: String,
}

impl ClientError {
    pub(crate) fn transport(url: &str, err: reqwest::Error) -> Self {
        Self {
            message: format!("Request to {} failed", url),
            server_message: err.to_string(),
            status_code: err.status().map(|s| s.as_u16()),
            url: Some(url.to_string()),
        }
    }

    pub(crate) fn from_body(url: &str, status: u16, body: &str) -> Self {
        let server_message = serde_json::from_str::<ServerError>(body)
            .map(|e| e.message)
            .unwrap_or_else(|_| body.to_string());

        Self {
            message: format!("Request to {} returned {}", url, status),
            server_message,
            status_code: Some(status),
            url: Some(url.to_string()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status_code == Some(409)
    }
}
