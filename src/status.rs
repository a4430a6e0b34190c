//! Forced status code validation and classification.
//!
//! `GET /status/{code}` answers with exactly the requested status. Codes at or
//! above [`ERROR_THRESHOLD`] get an error-shaped body, the rest a success body
//! carrying the reason phrase.

use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;

/// First status code answered with an error-shaped body.
pub const ERROR_THRESHOLD: u16 = 400;

/// Body of a forced status response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForcedStatusBody {
    /// The forced status code.
    pub status_code: u16,
    /// Reason phrase, present on error-shaped bodies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Description of the response.
    pub message: String,
}

/// Response for a forced status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcedStatus {
    /// Status line of the response.
    pub status: StatusCode,
    /// JSON body.
    pub body: ForcedStatusBody,
}

impl ForcedStatus {
    /// Whether this went down the error path.
    pub fn is_error(&self) -> bool {
        self.status.as_u16() >= ERROR_THRESHOLD
    }
}

impl IntoResponse for ForcedStatus {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Parse a raw path segment into a known, positive status code.
pub fn validate(raw: &str) -> Result<StatusCode, ApiError> {
    let value: i64 = raw
        .parse()
        .map_err(|_| ApiError::InvalidStatusCode(format!("\"code\" must be a number, got {raw:?}")))?;

    if value <= 0 {
        return Err(ApiError::InvalidStatusCode(
            "\"code\" must be a positive number".to_string(),
        ));
    }

    let status = u16::try_from(value)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .filter(|status| status.canonical_reason().is_some())
        .ok_or_else(|| {
            ApiError::InvalidStatusCode(format!("\"code\" must be a known HTTP status code, got {value}"))
        })?;

    // 1xx cannot be a final response on the wire.
    if status.is_informational() {
        return Err(ApiError::InvalidStatusCode(format!(
            "\"code\" must not be an informational status, got {value}"
        )));
    }

    Ok(status)
}

/// Build the response for a forced status code.
pub fn classify(status: StatusCode) -> ForcedStatus {
    let code = status.as_u16();
    let reason = status.canonical_reason().unwrap_or("Unknown").to_string();

    let body = if code >= ERROR_THRESHOLD {
        ForcedStatusBody {
            status_code: code,
            error: Some(reason),
            message: format!("Forced status code: {code}"),
        }
    } else {
        ForcedStatusBody {
            status_code: code,
            error: None,
            message: reason,
        }
    };

    ForcedStatus { status, body }
}

/// Extracts and validates the `code` path parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcedCode(pub StatusCode);

#[async_trait]
impl<S> FromRequestParts<S> for ForcedCode
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::InvalidStatusCode(rejection.body_text()))?;

        validate(&raw).map(ForcedCode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn validate_accepts_known_codes() {
        assert_eq!(validate("200").unwrap(), StatusCode::OK);
        assert_eq!(validate("418").unwrap(), StatusCode::IM_A_TEAPOT);
        assert_eq!(validate("503").unwrap(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn validate_rejects_non_numeric() {
        assert!(validate("abc").is_err());
        assert!(validate("4o4").is_err());
        assert!(validate("2.5").is_err());
        assert!(validate("").is_err());
    }

    #[test]
    fn validate_rejects_non_positive() {
        assert!(validate("0").is_err());
        assert!(validate("-200").is_err());
    }

    #[test]
    fn validate_rejects_unknown_codes() {
        assert!(validate("99").is_err());
        assert!(validate("299").is_err());
        assert!(validate("600").is_err());
        assert!(validate("70000").is_err());
        assert!(validate("99999999999999999999").is_err());
    }

    #[test]
    fn validate_rejects_informational_codes() {
        for raw in ["100", "101", "102", "103"] {
            assert!(validate(raw).is_err(), "{raw}");
        }
        assert_eq!(validate("200").unwrap(), StatusCode::OK);
    }

    #[test]
    fn every_known_code_round_trips_its_status() {
        for code in 100..600u16 {
            let Ok(status) = StatusCode::from_u16(code) else {
                continue;
            };
            if status.canonical_reason().is_none() || status.is_informational() {
                continue;
            }

            let forced = classify(validate(&code.to_string()).unwrap());
            assert_eq!(forced.status.as_u16(), code);
            assert_eq!(forced.body.status_code, code);
            assert_eq!(forced.is_error(), code >= ERROR_THRESHOLD);
        }
    }

    #[test]
    fn success_codes_carry_reason_phrase() {
        let forced = classify(StatusCode::OK);

        assert_eq!(
            forced.body,
            ForcedStatusBody {
                status_code: 200,
                error: None,
                message: "OK".to_string(),
            }
        );
        assert_eq!(
            serde_json::to_value(&forced.body).unwrap(),
            serde_json::json!({"statusCode": 200, "message": "OK"})
        );
    }

    #[test]
    fn error_codes_carry_error_shape() {
        let forced = classify(StatusCode::NOT_FOUND);

        assert!(forced.is_error());
        assert_eq!(
            serde_json::to_value(&forced.body).unwrap(),
            serde_json::json!({
                "statusCode": 404,
                "error": "Not Found",
                "message": "Forced status code: 404"
            })
        );
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(!classify(StatusCode::PERMANENT_REDIRECT).is_error());
        assert!(classify(StatusCode::BAD_REQUEST).is_error());
    }
}
