use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{
    Router,
    extract::{Path, State},
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::application::ports::annotation_store::AnnotationFetchError;
use crate::application::services::annotation::{AnnotationParseError, parse_annotation};
use crate::application::use_cases::links::LinkSettings;
use crate::application::use_cases::links::resolve_annotation::ResolveAnnotationLinks;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::page::{RedirectPage, error_page, redirect_page};

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/:id", get(annotation))
        .route("/:id/*url", get(annotation_with_url))
        .with_state(ctx)
}

type PageResult = Result<Html<String>, (StatusCode, Html<String>)>;

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Annotation",
    params(("id" = String, Path, description = "Annotation ID")),
    responses(
        (status = 200, description = "Interstitial redirect page", content_type = "text/html"),
        (status = 404, description = "Annotation missing or deleted"),
        (status = 422, description = "Annotation cannot be shown in context")
    )
)]
pub async fn annotation(State(ctx): State<AppContext>, Path(id): Path<String>) -> PageResult {
    resolve_and_render(&ctx, &id).await
}

// The trailing URL is decorative (it makes share links readable); only the
// annotation id drives the lookup.
#[utoipa::path(
    get,
    path = "/{id}/{url}",
    tag = "Annotation",
    params(
        ("id" = String, Path, description = "Annotation ID"),
        ("url" = String, Path, description = "Display-only copy of the document URL")
    ),
    responses((status = 200, description = "Interstitial redirect page", content_type = "text/html"))
)]
pub async fn annotation_with_url(
    State(ctx): State<AppContext>,
    Path((id, _url)): Path<(String, String)>,
) -> PageResult {
    resolve_and_render(&ctx, &id).await
}

async fn resolve_and_render(ctx: &AppContext, id: &str) -> PageResult {
    let document = match ctx.annotation_store().get_annotation(id).await {
        Ok(document) => document,
        Err(AnnotationFetchError::NotFound) => {
            info!(annotation_id = id, "annotation_not_found");
            return Err(error_page(StatusCode::NOT_FOUND, "Annotation not found"));
        }
        Err(AnnotationFetchError::Backend(err)) => {
            error!(annotation_id = id, error = ?err, "annotation_fetch_failed");
            return Err(error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Sorry, but something went wrong looking up that annotation. \
                 The problem has been reported, please try again later.",
            ));
        }
    };

    let parsed = match parse_annotation(&document) {
        Ok(parsed) => parsed,
        Err(AnnotationParseError::Deleted) => {
            info!(annotation_id = id, "annotation_deleted");
            return Err(error_page(StatusCode::NOT_FOUND, "Annotation not found"));
        }
        Err(err) => {
            warn!(annotation_id = id, reason = err.reason(), "invalid_annotation");
            return Err(error_page(StatusCode::UNPROCESSABLE_ENTITY, &err.to_string()));
        }
    };

    let settings = LinkSettings::from_config(&ctx.cfg);
    let checker = ctx.embed_checker();
    let uc = ResolveAnnotationLinks {
        embed: checker.as_ref(),
        settings: &settings,
    };
    let links = match uc.execute(&parsed).await {
        Ok(links) => links,
        Err(err) => {
            warn!(annotation_id = id, reason = err.reason(), "annotation_not_resolvable");
            return Err(error_page(StatusCode::UNPROCESSABLE_ENTITY, &err.to_string()));
        }
    };

    info!(
        annotation_id = id,
        via = links.via_url.is_some(),
        always_use_via = links.always_use_via,
        "annotation_resolved"
    );

    let settings_json = json!({
        "chromeExtensionId": links.extension_id,
        "viaUrl": links.via_url,
        "extensionUrl": links.extension_url,
        "alwaysUseVia": links.always_use_via,
    })
    .to_string();

    Ok(redirect_page(&RedirectPage {
        settings_json: &settings_json,
        title: &links.title,
        pretty_url: &links.pretty_url,
        metadata: parsed
            .show_metadata
            .then_some((parsed.quote.as_str(), parsed.text.as_str())),
        fallback_url: &links.extension_url,
    }))
}
