pub mod dashboard_controller;
pub mod energy_controller;
pub mod finance_controller;
pub mod maintenance_controller;
pub mod site_controller;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDateTime};
use tracing::warn;

use crate::error::EngineError;

/// Input validation failures become `422 {"error": "..."}`.
impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        warn!(error = %self, "rejected engine input");
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Wall-clock instant the engine evaluates "today" against.
pub(crate) fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
