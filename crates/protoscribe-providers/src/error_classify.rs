//! Error classification for OpenAI-compatible endpoints
//!
//! Errors usually arrive as `{"error": {"message": "...", "type": "...", "code": "..."}}`;
//! some compatible servers send the fields flat at the top level. Both are parsed and
//! mapped to [`ProviderError`] by status code first, then by code and message patterns.

use crate::error::ProviderError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

const DEFAULT_RATE_LIMIT_RETRY_MS: u64 = 60_000;
const PROVIDER_NAME: &str = "openai";

lazy_static! {
    static ref CONTEXT_OVERFLOW_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)context_length_exceeded").unwrap(),
        Regex::new(r"(?i)maximum context length").unwrap(),
        Regex::new(r"(?i)exceeds.*token.*limit").unwrap(),
    ];

    static ref RATE_LIMIT_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)rate[_\s]?limit").unwrap(),
        Regex::new(r"(?i)too many requests").unwrap(),
    ];

    static ref BILLING_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)insufficient_quota").unwrap(),
        Regex::new(r"(?i)exceeded.*quota").unwrap(),
        Regex::new(r"(?i)billing").unwrap(),
    ];

    static ref AUTH_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)invalid[_\s]?api[_\s]?key").unwrap(),
        Regex::new(r"(?i)incorrect api key").unwrap(),
        Regex::new(r"(?i)unauthorized").unwrap(),
    ];

    static ref MODEL_NOT_FOUND_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)model_not_found").unwrap(),
        Regex::new(r"(?i)model .* does not exist").unwrap(),
    ];

    static ref OVERLOADED_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)overloaded").unwrap(),
        Regex::new(r"(?i)server_error").unwrap(),
    ];

    static ref TOKEN_RE: Regex =
        Regex::new(r"(\d[\d,]*)\s*tokens?\b.*?(\d[\d,]*)\s*(?:tokens?|limit|maximum)\b").unwrap();
}

#[derive(Debug, Deserialize)]
struct FlatErrorResponse {
    message: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedErrorResponse {
    error: NestedError,
}

#[derive(Debug, Deserialize)]
struct NestedError {
    message: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
}

/// Fields pulled out of an error body
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OpenAIErrorInfo {
    pub message: String,
    pub error_type: Option<String>,
    pub code: Option<String>,
}

/// Parse an error body, trying the nested format first, then flat, then raw text
pub fn parse_error_body(body: &str) -> OpenAIErrorInfo {
    if let Ok(nested) = serde_json::from_str::<NestedErrorResponse>(body) {
        return OpenAIErrorInfo {
            message: nested.error.message.unwrap_or_else(|| body.to_string()),
            error_type: nested.error.error_type,
            code: nested.error.code,
        };
    }

    if let Ok(flat) = serde_json::from_str::<FlatErrorResponse>(body) {
        if flat.message.is_some() || flat.error_type.is_some() || flat.code.is_some() {
            return OpenAIErrorInfo {
                message: flat.message.unwrap_or_else(|| body.to_string()),
                error_type: flat.error_type,
                code: flat.code,
            };
        }
    }

    OpenAIErrorInfo {
        message: body.to_string(),
        error_type: None,
        code: None,
    }
}

fn matches_any(patterns: &[Regex], message: &str) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(message))
}

fn parse_token_counts(message: &str) -> (u64, u64) {
    if let Some(caps) = TOKEN_RE.captures(message) {
        let parse = |s: &str| s.replace(',', "").parse::<u64>().unwrap_or(0);
        return (parse(&caps[1]), parse(&caps[2]));
    }
    (0, 0)
}

/// Classify a failed completion call
///
/// `model` is the identifier that was requested; it is echoed back in
/// [`ProviderError::ModelNotFound`].
pub fn classify_error(status: u16, body: &str, model: &str) -> ProviderError {
    let info = parse_error_body(body);
    let message = &info.message;
    let code = info.code.as_deref();

    match status {
        401 | 403 => return ProviderError::AuthenticationFailed(message.clone()),
        402 => {
            return ProviderError::PaymentRequired {
                message: message.clone(),
            }
        }
        404 => {
            return ProviderError::ModelNotFound {
                model: model.to_string(),
            }
        }
        429 if code == Some("insufficient_quota") => {
            return ProviderError::PaymentRequired {
                message: message.clone(),
            }
        }
        429 => {
            return ProviderError::RateLimited {
                retry_after_ms: DEFAULT_RATE_LIMIT_RETRY_MS,
            }
        }
        _ => {}
    }

    if code == Some("context_length_exceeded") || matches_any(&CONTEXT_OVERFLOW_PATTERNS, message)
    {
        let (used, limit) = parse_token_counts(message);
        return ProviderError::ContextExceeded { used, limit };
    }

    if code == Some("model_not_found") || matches_any(&MODEL_NOT_FOUND_PATTERNS, message) {
        return ProviderError::ModelNotFound {
            model: model.to_string(),
        };
    }

    if code == Some("rate_limit_exceeded") || matches_any(&RATE_LIMIT_PATTERNS, message) {
        return ProviderError::RateLimited {
            retry_after_ms: DEFAULT_RATE_LIMIT_RETRY_MS,
        };
    }

    if code == Some("insufficient_quota") || matches_any(&BILLING_PATTERNS, message) {
        return ProviderError::PaymentRequired {
            message: message.clone(),
        };
    }

    if code == Some("invalid_api_key") || matches_any(&AUTH_PATTERNS, message) {
        return ProviderError::AuthenticationFailed(message.clone());
    }

    if status >= 500 || matches_any(&OVERLOADED_PATTERNS, message) {
        return ProviderError::Unavailable {
            provider: PROVIDER_NAME.to_string(),
        };
    }

    ProviderError::InvalidResponse(format!("API error {}: {}", status, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = "gpt-4o-mini";

    #[test]
    fn test_parse_nested_error() {
        let body = r#"{"error": {"message": "Rate limit exceeded", "type": "requests", "code": "rate_limit_exceeded"}}"#;
        let info = parse_error_body(body);
        assert_eq!(info.message, "Rate limit exceeded");
        assert_eq!(info.error_type.as_deref(), Some("requests"));
        assert_eq!(info.code.as_deref(), Some("rate_limit_exceeded"));
    }

    #[test]
    fn test_parse_flat_error() {
        let body = r#"{"message": "Invalid API key", "type": "invalid_request_error", "code": "invalid_api_key"}"#;
        let info = parse_error_body(body);
        assert_eq!(info.message, "Invalid API key");
        assert_eq!(info.code.as_deref(), Some("invalid_api_key"));
    }

    #[test]
    fn test_parse_raw_body() {
        let info = parse_error_body("upstream connect error");
        assert_eq!(info.message, "upstream connect error");
        assert!(info.code.is_none());
    }

    #[test]
    fn test_classify_auth_by_status() {
        let err = classify_error(
            401,
            r#"{"error": {"message": "Incorrect API key provided"}}"#,
            MODEL,
        );
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
    }

    #[test]
    fn test_classify_rate_limit_by_status() {
        let err = classify_error(429, r#"{"error": {"message": "slow down"}}"#, MODEL);
        assert!(matches!(err, ProviderError::RateLimited { .. }));
    }

    #[test]
    fn test_classify_quota_on_429_is_billing() {
        let err = classify_error(
            429,
            r#"{"error": {"message": "You exceeded your current quota", "code": "insufficient_quota"}}"#,
            MODEL,
        );
        assert!(matches!(err, ProviderError::PaymentRequired { .. }));
    }

    #[test]
    fn test_classify_model_not_found() {
        let err = classify_error(
            400,
            r#"{"error": {"message": "The model `ft:gone` does not exist", "code": "model_not_found"}}"#,
            "ft:gone",
        );
        match err {
            ProviderError::ModelNotFound { model } => assert_eq!(model, "ft:gone"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_classify_context_overflow_extracts_counts() {
        let err = classify_error(
            400,
            r#"{"error": {"message": "You requested 130,500 tokens, which exceeds the 128,000 token limit", "code": "context_length_exceeded"}}"#,
            MODEL,
        );
        match err {
            ProviderError::ContextExceeded { used, limit } => {
                assert_eq!(used, 130_500);
                assert_eq!(limit, 128_000);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_classify_server_error() {
        let err = classify_error(503, "Service Unavailable", MODEL);
        assert!(matches!(err, ProviderError::Unavailable { .. }));
    }

    #[test]
    fn test_classify_unrecognized_error() {
        let err = classify_error(400, r#"{"error": {"message": "Unknown parameter"}}"#, MODEL);
        match err {
            ProviderError::InvalidResponse(msg) => {
                assert_eq!(msg, "API error 400: Unknown parameter")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
