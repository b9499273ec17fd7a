use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use bouncer::application::ports::embed_checker::EmbedChecker;
use bouncer::bootstrap::app_context::{AppContext, AppServices};
use bouncer::bootstrap::config::Config;
use bouncer::infrastructure::embed::{
    EmbedPatterns, ProbeCache, ProbeEmbedChecker, TieredEmbedChecker,
};
use bouncer::infrastructure::search::EsAnnotationStore;

#[derive(OpenApi)]
#[openapi(
    paths(
        bouncer::presentation::http::index::index,
        bouncer::presentation::http::goto_url::goto_url,
        bouncer::presentation::http::health::health,
        bouncer::presentation::http::annotation::annotation,
        bouncer::presentation::http::annotation::annotation_with_url,
    ),
    components(schemas(bouncer::presentation::http::health::HealthResp)),
    tags(
        (name = "Annotation", description = "Annotation share-link redirects"),
        (name = "Health", description = "System health checks")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "bouncer=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(?cfg, "Starting bouncer");

    let annotation_store = Arc::new(EsAnnotationStore::new(
        &cfg.elasticsearch_url,
        &cfg.elasticsearch_index,
    ));

    let patterns = EmbedPatterns::compile(&cfg.embed_patterns)?;
    let embed_checker: Arc<dyn EmbedChecker> = if cfg.embed_probe_enabled {
        let cache = ProbeCache::new(cfg.embed_cache_capacity, cfg.embed_cache_ttl);
        let probe = Arc::new(ProbeEmbedChecker::new(
            cfg.embed_markers.clone(),
            cfg.embed_probe_max_lines,
            cfg.embed_probe_timeout,
            cache,
        )?);
        Arc::new(TieredEmbedChecker::with_probe(patterns, probe))
    } else {
        Arc::new(TieredEmbedChecker::new(patterns))
    };

    let ctx = AppContext::new(
        cfg.clone(),
        AppServices::new(annotation_store, embed_checker),
    );

    let app = Router::new()
        .merge(bouncer::presentation::http::index::routes(ctx.clone()))
        .merge(bouncer::presentation::http::goto_url::routes(ctx.clone()))
        .merge(bouncer::presentation::http::health::routes(ctx.clone()))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        // Catch-all annotation routes go last.
        .merge(bouncer::presentation::http::annotation::routes(ctx.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%addr, "HTTP listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(error) => {
            // Returning here would stop the server; keep serving instead.
            tracing::error!(%error, "failed to install shutdown signal handler");
            std::future::pending::<()>().await;
        }
    }
}
