use std::time::Duration;

use thiserror::Error;

/// Health probe failure. Display-only: the dashboard keeps working.
#[derive(Debug, Clone, Error)]
pub enum ConnectivityError {
    #[error("health check unreachable: {0}")]
    Transport(String),
    #[error("health check returned {0}")]
    Status(String),
    #[error("health check payload unreadable: {0}")]
    Payload(String),
    #[error("service reported status {0:?}")]
    Unhealthy(String),
    #[error("health check timed out after {0:?}")]
    Timeout(Duration),
}

/// Anything that stops a prediction from reaching the result panel.
/// The `Display` text is what the notice shows.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    #[error("{0}")]
    Transport(String),
    #[error("API Error: {0}")]
    Status(String),
    #[error("Invalid response: {0}")]
    Decode(String),
    #[error("Invalid prediction: {0}")]
    InvalidResult(String),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Request cancelled")]
    Cancelled,
    #[error("Invalid input: {0}")]
    Form(#[from] FormError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("unknown field {0:?}")]
    UnknownField(String),
    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange { field: &'static str, min: f64, max: f64, value: f64 },
    #[error("{field} must be one of {allowed}, got {value:?}")]
    NotAllowed { field: &'static str, allowed: String, value: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Status line text for a non-success response, e.g. `500 Internal Server Error`.
pub fn status_text(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => status.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_failure_reads_like_the_notice() {
        let err = RequestError::Status(status_text(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(err.to_string(), "API Error: Internal Server Error");
    }

    #[test]
    fn unknown_status_falls_back_to_code() {
        let code = reqwest::StatusCode::from_u16(599).unwrap();
        assert_eq!(status_text(code), "599");
    }

    #[test]
    fn form_errors_convert() {
        let err: RequestError = FormError::UnknownField("grip".into()).into();
        assert_eq!(err.to_string(), "Invalid input: unknown field \"grip\"");
    }
}
