use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use shipdesk::{FulfillmentSnapshot, ShipmentStatus};
use tracing::error;

/// Tagged response for the data endpoint: callers branch on `success`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DataResponse {
    Success {
        success: bool,
        data: FulfillmentSnapshot,
    },
    Failure {
        success: bool,
        error: String,
    },
}

/// Run a reconciliation cycle and return the full reconciled view.
///
/// Failures come back as a tagged failure payload with a generic message;
/// the detailed cause is logged server-side only. The caller's retry
/// affordance is "call this again".
pub async fn fulfillment_data(State(state): State<ServerState>) -> Json<DataResponse> {
    match shipdesk::run_cycle(state.payments.as_ref(), state.store.as_ref()).await {
        Ok(snapshot) => Json(DataResponse::Success {
            success: true,
            data: snapshot,
        }),
        Err(err) => {
            error!(error = %err, "fulfillment_data_failed");
            Json(DataResponse::Failure {
                success: false,
                error: "Failed to fetch fulfillment data".to_string(),
            })
        }
    }
}

/// Run a reconciliation cycle and export the pending parcels as a
/// shipping-label CSV.
pub async fn fulfillment_labels(State(state): State<ServerState>) -> ServerResult<Response> {
    let snapshot = shipdesk::run_cycle(state.payments.as_ref(), state.store.as_ref()).await?;

    let pending: Vec<_> = snapshot
        .parcels
        .into_iter()
        .filter(|parcel| parcel.status == ShipmentStatus::Pending)
        .collect();

    let csv = export::render_csv(&export::label_rows(&pending))?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"shipping-labels.csv\"",
        ),
    ];
    Ok((headers, csv).into_response())
}
