use serde_json::Value;
use thiserror::Error;

/// Shown for transport failures, which are always worth retrying
pub const NETWORK_ERROR_MESSAGE: &str = "Network error, try again";

#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend refused the request and said why
    #[error("{0}")]
    Rejected(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|&i| body.is_char_boundary(i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    /// The `error` or `message` field of a JSON error body
    pub fn backend_message(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;
        ["error", "message"]
            .iter()
            .filter_map(|key| value.get(*key).and_then(Value::as_str))
            .find(|msg| !msg.is_empty())
            .map(String::from)
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::backend_message(body);
        let detail = message.clone().unwrap_or_else(|| Self::truncate_body(body));
        match status.as_u16() {
            401 => ApiError::Unauthorized(detail),
            403 => ApiError::AccessDenied(detail),
            404 => ApiError::NotFound(detail),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(detail),
            400..=499 if message.is_some() => ApiError::Rejected(detail),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, detail)),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Text to put in front of the user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NetworkError(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ApiError::Rejected(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::AccessDenied(msg)
            | ApiError::NotFound(msg)
            | ApiError::ServerError(msg)
                if !msg.is_empty() =>
            {
                msg.clone()
            }
            other => other.to_string(),
        }
    }

    /// `user_message` for any error coming out of the client
    pub fn describe(err: &anyhow::Error) -> String {
        if let Some(api) = err.downcast_ref::<ApiError>() {
            api.user_message()
        } else if err.downcast_ref::<reqwest::Error>().is_some() {
            NETWORK_ERROR_MESSAGE.to_string()
        } else {
            err.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_backend_message_prefers_error_field() {
        assert_eq!(
            ApiError::backend_message(r#"{"error":"Email already registered","message":"x"}"#),
            Some("Email already registered".to_string())
        );
        assert_eq!(
            ApiError::backend_message(r#"{"message":"Invalid OTP"}"#),
            Some("Invalid OTP".to_string())
        );
        assert_eq!(ApiError::backend_message("<html>oops</html>"), None);
        assert_eq!(ApiError::backend_message(r#"{"error":""}"#), None);
    }

    #[test]
    fn test_from_status_taxonomy() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error":"Invalid email"}"#);
        assert!(matches!(err, ApiError::Rejected(_)));
        assert_eq!(err.user_message(), "Invalid email");

        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"message":"Token expired"}"#);
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Token expired");

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "plain text");
        assert!(matches!(err, ApiError::InvalidResponse(_)));

        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "é".repeat(400);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn test_describe_plain_anyhow_error() {
        let err = anyhow::anyhow!("Passwords do not match");
        assert_eq!(ApiError::describe(&err), "Passwords do not match");

        let err = anyhow::Error::from(ApiError::Rejected("Invalid OTP".to_string()))
            .context("Failed to verify OTP");
        assert_eq!(ApiError::describe(&err), "Invalid OTP");
    }
}
