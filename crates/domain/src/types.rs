//! Wire shapes exchanged with the bookstore backend
//!
//! The backend wraps every JSON response in an envelope. Successful calls
//! carry `data`; failed calls always carry at least `message`, and
//! validation failures add a list of per-field details.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Success envelope returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// A single field-level entry of a validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Error-shaped body returned on non-2xx responses
///
/// Every field except `message` is optional because the backend is not
/// consistent about which ones it fills in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "code", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldErrorDetail>,
}

impl ErrorBody {
    /// Best-effort extraction from an arbitrary JSON payload.
    ///
    /// Each member is read on its own: a field of the wrong type is
    /// dropped and a detail entry that does not parse is skipped, so one
    /// malformed member never costs the caller the rest of the body.
    pub fn from_payload(payload: &Value) -> Self {
        let text = |key: &str| payload.get(key).and_then(Value::as_str).map(str::to_string);

        let details = payload
            .get("details")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| FieldErrorDetail::deserialize(entry).ok())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            message: text("message").unwrap_or_default(),
            error_code: text("errorCode").or_else(|| text("code")),
            status_code: payload
                .get("statusCode")
                .and_then(Value::as_u64)
                .and_then(|status| u16::try_from(status).ok()),
            details,
        }
    }
}

/// Access/refresh token pair issued by the refresh endpoint
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: None }
    }

    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }
}

// Tokens must never end up in logs.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_success_envelope() {
        let payload = json!({
            "success": true,
            "message": "ok",
            "data": [{"id": 1}],
            "timestamp": "2024-01-01T00:00:00Z",
            "statusCode": 200
        });
        let envelope: ApiEnvelope<Vec<Value>> = serde_json::from_value(payload).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.status_code, Some(200));
    }

    #[test]
    fn parses_validation_body_with_details() {
        let payload = json!({
            "success": false,
            "message": "Validation failed",
            "errorCode": "VALIDATION_ERROR",
            "statusCode": 422,
            "details": [
                {"field": "email", "message": "Email already taken"},
                {"message": "Something global", "code": "GLOBAL"}
            ]
        });
        let body = ErrorBody::from_payload(&payload);
        assert_eq!(body.message, "Validation failed");
        assert_eq!(body.error_code.as_deref(), Some("VALIDATION_ERROR"));
        assert_eq!(body.details.len(), 2);
        assert_eq!(body.details[0].field.as_deref(), Some("email"));
        assert_eq!(body.details[1].field, None);
        assert_eq!(body.details[1].code.as_deref(), Some("GLOBAL"));
    }

    #[test]
    fn malformed_members_do_not_discard_the_rest() {
        let payload = json!({
            "message": "Validation failed",
            "errorCode": 17,
            "statusCode": "422",
            "details": [
                {"field": "email", "message": "x"},
                {"field": "name"},
                "not an object"
            ]
        });
        let body = ErrorBody::from_payload(&payload);
        assert_eq!(body.message, "Validation failed");
        assert_eq!(body.error_code, None);
        assert_eq!(body.status_code, None);
        assert_eq!(body.details.len(), 1);
        assert_eq!(body.details[0].field.as_deref(), Some("email"));
        assert_eq!(body.details[0].message, "x");
    }

    #[test]
    fn accepts_code_alias() {
        let body = ErrorBody::from_payload(&json!({"message": "nope", "code": "E1"}));
        assert_eq!(body.error_code.as_deref(), Some("E1"));
    }

    #[test]
    fn non_object_payload_yields_empty_body() {
        let body = ErrorBody::from_payload(&json!("plain string"));
        assert_eq!(body, ErrorBody::default());
    }

    #[test]
    fn token_pair_debug_is_redacted() {
        let pair = TokenPair::new("secret-access").with_refresh_token("secret-refresh");
        let rendered = format!("{pair:?}");
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn token_pair_uses_camel_case() {
        let pair: TokenPair =
            serde_json::from_value(json!({"accessToken": "a", "refreshToken": "r"})).unwrap();
        assert_eq!(pair.access_token, "a");
        assert_eq!(pair.refresh_token.as_deref(), Some("r"));
    }
}
