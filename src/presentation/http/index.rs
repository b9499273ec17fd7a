use axum::http::{StatusCode, header};
use axum::routing::get;
use axum::{Router, extract::State};

use crate::bootstrap::app_context::AppContext;

#[utoipa::path(
    get,
    path = "/",
    tag = "Annotation",
    responses((status = 302, description = "Redirect to the front site"))
)]
pub async fn index(State(ctx): State<AppContext>) -> (StatusCode, [(header::HeaderName, String); 1]) {
    front_site_redirect(&ctx.cfg.front_site_url)
}

// axum's Redirect answers 303/307/308; share links want a plain 302.
fn front_site_redirect(url: &str) -> (StatusCode, [(header::HeaderName, String); 1]) {
    (StatusCode::FOUND, [(header::LOCATION, url.to_string())])
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new().route("/", get(index)).with_state(ctx)
}
