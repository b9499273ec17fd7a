use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::application::ports::annotation_store::ClusterHealth;
use crate::bootstrap::app_context::AppContext;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResp {
    pub status: &'static str,
}

#[utoipa::path(
    get,
    path = "/_status",
    tag = "Health",
    responses(
        (status = 200, body = HealthResp),
        (status = 503, body = HealthResp)
    )
)]
pub async fn health(State(ctx): State<AppContext>) -> (StatusCode, Json<HealthResp>) {
    match ctx.annotation_store().cluster_health().await {
        Ok(ClusterHealth::Green | ClusterHealth::Yellow) => {
            (StatusCode::OK, Json(HealthResp { status: "ok" }))
        }
        Ok(ClusterHealth::Red) => {
            warn!("search cluster status is red");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResp { status: "degraded" }),
            )
        }
        Err(err) => {
            error!(error = ?err, "healthcheck_failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResp { status: "degraded" }),
            )
        }
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new().route("/_status", get(health)).with_state(ctx)
}
