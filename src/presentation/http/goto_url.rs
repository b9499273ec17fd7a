use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{
    Router,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::application::use_cases::links::LinkSettings;
use crate::application::use_cases::links::resolve_url::ResolveUrlLinks;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::page::{RedirectPage, error_page, redirect_page};

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/goto_url", get(goto_url))
        .with_state(ctx)
}

#[derive(Debug, Deserialize)]
pub struct GotoParams {
    url: Option<String>,
    group: Option<String>,
    q: Option<String>,
}

#[utoipa::path(
    get,
    path = "/goto_url",
    tag = "Annotation",
    params(
        ("url" = String, Query, description = "Target page URL"),
        ("group" = Option<String>, Query, description = "Group to open the client with"),
        ("q" = Option<String>, Query, description = "Search query to open the client with")
    ),
    responses(
        (status = 200, description = "Interstitial redirect page", content_type = "text/html"),
        (status = 400, description = "Missing or invalid url parameter")
    )
)]
pub async fn goto_url(
    State(ctx): State<AppContext>,
    Query(params): Query<GotoParams>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let settings = LinkSettings::from_config(&ctx.cfg);
    let checker = ctx.embed_checker();
    let uc = ResolveUrlLinks {
        embed: checker.as_ref(),
        settings: &settings,
    };

    let links = match uc
        .execute(
            params.url.as_deref(),
            params.group.as_deref(),
            params.q.as_deref(),
        )
        .await
    {
        Ok(links) => links,
        Err(err) => {
            warn!(url = ?params.url, reason = err.reason(), "goto_url_rejected");
            return Err(error_page(StatusCode::BAD_REQUEST, &err.to_string()));
        }
    };

    let settings_json = json!({
        "chromeExtensionId": settings.extension_id("default"),
        "viaUrl": links.via_url,
        "extensionUrl": links.extension_url,
        "alwaysUseVia": false,
    })
    .to_string();

    Ok(redirect_page(&RedirectPage {
        settings_json: &settings_json,
        title: &links.pretty_url,
        pretty_url: &links.pretty_url,
        metadata: None,
        fallback_url: &links.extension_url,
    }))
}
