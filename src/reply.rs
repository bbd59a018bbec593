use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ConsoleError, Result};

/// Symbolic failure codes the console reacts to specifically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCode {
    PagePathNotFound,
    PageInvalidPath,
    PagePathConflict,
    UserInvalidQuery,
    UserIdNotFound,
    LoginTokenNotFound,
    Other(String),
}

impl FailureCode {
    pub fn parse(message: &str) -> Self {
        match message {
            "PAGE_PATH_NOT_FOUND" => FailureCode::PagePathNotFound,
            "PAGE_INVALID_PATH" => FailureCode::PageInvalidPath,
            "PAGE_PATH_CONFLICT" => FailureCode::PagePathConflict,
            "USER_INVALID_QUERY" => FailureCode::UserInvalidQuery,
            "USER_ID_NOT_FOUND" => FailureCode::UserIdNotFound,
            "LOGIN_TOKEN_NOT_FOUND" => FailureCode::LoginTokenNotFound,
            other => FailureCode::Other(other.to_string()),
        }
    }
}

/// Application-level outcome of a JSON response.
///
/// Payload endpoints (list, count, fetch) return the payload itself on
/// success and an object carrying a `success` key only on failure. Status
/// endpoints (exists, mutations) always carry `success`.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Ok(T),
    Failure { message: String },
}

fn failure_message(value: &Value) -> String {
    match value.get("message") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Null) | None => "unknown error".to_string(),
        Some(other) => other.to_string(),
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ConsoleError::Decode(e.to_string()))
}

impl<T: DeserializeOwned> Reply<T> {
    /// Payload convention: the mere presence of `success` means failure.
    pub fn from_payload(value: Value) -> Result<Self> {
        if value.get("success").is_some() {
            return Ok(Reply::Failure {
                message: failure_message(&value),
            });
        }
        decode(value).map(Reply::Ok)
    }

    /// Status convention: `success: true` decodes the whole object as `T`.
    pub fn from_status(value: Value) -> Result<Self> {
        match value.get("success").and_then(Value::as_bool) {
            Some(true) => decode(value).map(Reply::Ok),
            _ => Ok(Reply::Failure {
                message: failure_message(&value),
            }),
        }
    }
}

impl<T> Reply<T> {
    pub fn code(&self) -> Option<FailureCode> {
        match self {
            Reply::Ok(_) => None,
            Reply::Failure { message } => Some(FailureCode::parse(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Count {
        count: u64,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Exists {
        exists: bool,
    }

    #[test]
    fn payload_without_success_is_ok() {
        let reply: Reply<Count> = Reply::from_payload(json!({"count": 47})).unwrap();
        assert_eq!(reply, Reply::Ok(Count { count: 47 }));
    }

    #[test]
    fn payload_with_success_key_is_failure_even_if_true() {
        let reply: Reply<Count> =
            Reply::from_payload(json!({"success": true, "message": "odd"})).unwrap();
        assert_eq!(
            reply,
            Reply::Failure {
                message: "odd".to_string()
            }
        );
    }

    #[test]
    fn payload_array_is_ok() {
        let reply: Reply<Vec<u32>> = Reply::from_payload(json!([1, 2, 3])).unwrap();
        assert_eq!(reply, Reply::Ok(vec![1, 2, 3]));
    }

    #[test]
    fn payload_with_wrong_shape_is_decode_error() {
        let err = Reply::<Count>::from_payload(json!({"total": 3})).unwrap_err();
        assert!(matches!(err, ConsoleError::Decode(_)));
    }

    #[test]
    fn status_success_decodes_extra_fields() {
        let reply: Reply<Exists> =
            Reply::from_status(json!({"success": true, "exists": false})).unwrap();
        assert_eq!(reply, Reply::Ok(Exists { exists: false }));
    }

    #[test]
    fn status_failure_keeps_message() {
        let reply: Reply<Exists> =
            Reply::from_status(json!({"success": false, "message": "PAGE_PATH_MISSING"})).unwrap();
        assert_eq!(
            reply.code(),
            Some(FailureCode::Other("PAGE_PATH_MISSING".to_string()))
        );
    }

    #[test]
    fn missing_message_gets_placeholder() {
        let reply: Reply<Exists> = Reply::from_status(json!({"success": false})).unwrap();
        assert_eq!(
            reply,
            Reply::Failure {
                message: "unknown error".to_string()
            }
        );
    }

    #[test]
    fn failure_code_recognizes_known_codes() {
        assert_eq!(
            FailureCode::parse("PAGE_PATH_NOT_FOUND"),
            FailureCode::PagePathNotFound
        );
        assert_eq!(
            FailureCode::parse("USER_INVALID_QUERY"),
            FailureCode::UserInvalidQuery
        );
    }
}
