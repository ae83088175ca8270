use crate::error::{ServerError, ServerResult, ValidationIssue};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use store::StatusStore;
use tracing::info;

/// The one supported mutation action.
const MARK_SHIPPED: &str = "mark_shipped";

/// Mark-shipped mutation request.
///
/// Every field is optional at the serde layer so malformed bodies reach the
/// field-level validator instead of dying in deserialization with a shape
/// error the caller can't act on.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub parcel_id: Option<String>,
    #[serde(default)]
    pub transaction_ids: Option<Vec<String>>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

#[derive(Debug)]
struct ValidatedUpdate {
    parcel_id: String,
    transaction_ids: Vec<String>,
    tracking_number: Option<String>,
}

/// Mark a parcel as shipped.
///
/// Validates the request shape before touching the store; a rejected
/// request mutates nothing. A store write failure is surfaced as an
/// explicit 500; shipment-confirmation loss must never be silent.
pub async fn update_status(
    State(state): State<ServerState>,
    Json(request): Json<UpdateStatusRequest>,
) -> ServerResult<impl IntoResponse> {
    let validated = validate(request).map_err(ServerError::Validation)?;

    state.store.mark_shipped(
        &validated.parcel_id,
        &validated.transaction_ids,
        validated.tracking_number.as_deref(),
    )?;

    info!(
        parcel_id = %validated.parcel_id,
        transactions = validated.transaction_ids.len(),
        "parcel_marked_shipped"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Parcel marked as shipped"
    })))
}

fn validate(request: UpdateStatusRequest) -> Result<ValidatedUpdate, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    let parcel_id = request.parcel_id.unwrap_or_default();
    if parcel_id.is_empty() {
        issues.push(ValidationIssue {
            field: "parcelId".to_string(),
            message: "Parcel ID is required".to_string(),
        });
    }

    let transaction_ids = request.transaction_ids.unwrap_or_default();
    if transaction_ids.is_empty() {
        issues.push(ValidationIssue {
            field: "transactionIds".to_string(),
            message: "At least one transaction ID is required".to_string(),
        });
    }

    if request.action.as_deref() != Some(MARK_SHIPPED) {
        issues.push(ValidationIssue {
            field: "action".to_string(),
            message: format!("Action must be \"{MARK_SHIPPED}\""),
        });
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    Ok(ValidatedUpdate {
        parcel_id,
        transaction_ids,
        tracking_number: request.tracking_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(value: serde_json::Value) -> UpdateStatusRequest {
        serde_json::from_value(value).expect("request should deserialize")
    }

    #[test]
    fn complete_request_validates() {
        let validated = validate(request(json!({
            "parcelId": "abc12345",
            "transactionIds": ["pi_1"],
            "action": "mark_shipped",
            "trackingNumber": "1Z999"
        })))
        .expect("valid request");
        assert_eq!(validated.parcel_id, "abc12345");
        assert_eq!(validated.tracking_number.as_deref(), Some("1Z999"));
    }

    #[test]
    fn missing_fields_are_each_reported() {
        let issues = validate(request(json!({}))).expect_err("invalid request");
        let fields: Vec<&str> = issues.iter().map(|issue| issue.field.as_str()).collect();
        assert_eq!(fields, vec!["parcelId", "transactionIds", "action"]);
    }

    #[test]
    fn empty_transaction_list_is_rejected() {
        let issues = validate(request(json!({
            "parcelId": "abc12345",
            "transactionIds": [],
            "action": "mark_shipped"
        })))
        .expect_err("invalid request");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "transactionIds");
    }

    #[test]
    fn unknown_action_is_rejected() {
        let issues = validate(request(json!({
            "parcelId": "abc12345",
            "transactionIds": ["pi_1"],
            "action": "mark_delivered"
        })))
        .expect_err("invalid request");
        assert_eq!(issues[0].field, "action");
    }

    #[test]
    fn tracking_number_is_optional() {
        let validated = validate(request(json!({
            "parcelId": "abc12345",
            "transactionIds": ["pi_1"],
            "action": "mark_shipped"
        })))
        .expect("valid request");
        assert!(validated.tracking_number.is_none());
    }
}
