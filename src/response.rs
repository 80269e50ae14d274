use serde::Serialize;
use utoipa::ToSchema;

use crate::error::FieldError;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

/// Error payload: the message repeated under `error`, plus field-level
/// details for validation failures.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorData {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

impl ApiResponse<ErrorData> {
    pub fn failure(message: impl Into<String>, errors: Option<Vec<FieldError>>) -> Self {
        let message = message.into();
        Self {
            data: Some(ErrorData {
                error: message.clone(),
                errors,
            }),
            message,
            meta: Some(Meta::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_envelope_repeats_message_and_carries_fields() {
        let resp = ApiResponse::failure(
            "Validation error",
            Some(vec![FieldError::new("phone", "Phone must be 9 to 10 digits")]),
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["message"], "Validation error");
        assert_eq!(json["data"]["error"], "Validation error");
        assert_eq!(json["data"]["errors"][0]["field"], "phone");
    }

    #[test]
    fn failure_envelope_omits_empty_field_list() {
        let resp = ApiResponse::failure("Sale not found", None);
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["data"].get("errors").is_none());
    }
}
