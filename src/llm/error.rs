// ABOUTME: Error type for model invocation — provider, stream, truncation, and timeout failures.
// ABOUTME: Any of these may surface mid-stream; callers treat them as abortable.

use std::time::Duration;

use async_openai::error::OpenAIError;

/// Failures raised while invoking a chat model.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("missing API key: set {0}")]
    MissingApiKey(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("provider error: {0}")]
    Provider(String),

    #[error("stream failed: {0}")]
    Stream(String),

    #[error("model stream ended before the reply was complete")]
    Incomplete,

    #[error("no response from model within {0:?}")]
    Timeout(Duration),
}

impl LlmError {
    /// Map a non-success HTTP status and its message to an error.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => LlmError::AuthenticationFailed(message),
            429 => LlmError::RateLimited,
            _ => LlmError::Provider(format!("HTTP {status}: {message}")),
        }
    }
}

impl From<OpenAIError> for LlmError {
    fn from(err: OpenAIError) -> Self {
        match &err {
            OpenAIError::ApiError(api_err) => {
                let code = api_err.code.as_deref().unwrap_or("");
                let kind = api_err.r#type.as_deref().unwrap_or("");

                if code == "invalid_api_key" || kind == "authentication_error" {
                    LlmError::AuthenticationFailed(api_err.message.clone())
                } else if code == "rate_limit_exceeded" || kind == "rate_limit_error" {
                    LlmError::RateLimited
                } else {
                    LlmError::Provider(api_err.message.clone())
                }
            }
            OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status() {
                Some(status) => LlmError::from_status(status.as_u16(), err.to_string()),
                None => LlmError::Provider(err.to_string()),
            },
            OpenAIError::StreamError(stream_err) => LlmError::Stream(stream_err.to_string()),
            _ => LlmError::Provider(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(
            LlmError::from_status(401, String::new()),
            LlmError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            LlmError::from_status(429, String::new()),
            LlmError::RateLimited
        ));
        let err = LlmError::from_status(500, "boom".into());
        assert_eq!(err.to_string(), "provider error: HTTP 500: boom");
    }

    #[test]
    fn invalid_argument_becomes_provider_error() {
        let err = LlmError::from(OpenAIError::InvalidArgument("bad".into()));
        assert!(matches!(err, LlmError::Provider(ref m) if m.contains("bad")));
    }
}
