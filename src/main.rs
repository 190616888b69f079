use crate::{
    app::App,
    auth::{ApiKeys, require_auth},
    db::PostgresDb,
    db_pool::DbPool,
    handler::{
        handle_analytics, handle_assets, handle_conversion, handle_create_link,
        handle_create_offer, handle_generate, handle_generate_wrong_method, handle_get_only,
        handle_health, handle_ingest_trend, handle_link_trend_offer, handle_offer_redirect,
        handle_offers, handle_post_only, handle_posts, handle_publish, handle_redirect,
        handle_summary, handle_trends,
    },
    migrations::run_migrations,
    webhook::WebhookNotifier,
};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use clap::Parser;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod analytics;
mod app;
mod auth;
mod content;
mod db;
mod db_pool;
mod handler;
mod migrations;
mod models;
mod schema;
mod signals;
mod webhook;

#[cfg(not(debug_assertions))]
#[must_use]
pub const fn is_debug() -> bool {
    false
}

#[cfg(debug_assertions)]
#[must_use]
pub const fn is_debug() -> bool {
    true
}

#[derive(Default, Parser, Debug)]
struct Arguments {
    #[arg(long, default_value_t = true, help = "Relax CORS", env = "RELAX_CORS")]
    cors_relaxed: bool,

    #[arg(long, default_value_t = 8080, help = "Port to listen on", env = "PORT")]
    port: u16,

    #[arg(long, help = "Logging level of the Rust log", env = "RUST_LOG")]
    #[clap(default_value_t = String::from("info,tower_http=debug"))]
    rust_log_level: String,

    #[arg(long, env = "DATABASE_URL")]
    db_url: String,

    #[arg(
        long,
        default_value_t = 10,
        help = "DB pool size",
        env = "DB_POOL_SIZE"
    )]
    db_pool_size: usize,

    #[arg(
        long,
        default_value_t = String::new(),
        help = "Outbound post-notification hook, disabled when empty",
        env = "ZAPIER_HOOK_URL"
    )]
    webhook_url: String,

    #[arg(
        long,
        default_value_t = String::new(),
        help = "Comma-separated API keys for the conversion webhook",
        env = "KEYS"
    )]
    keys: String,
}

fn setup_cors(relaxed: bool) -> CorsLayer {
    if relaxed {
        tracing::info!("cors setup: very_permissive");
        CorsLayer::very_permissive().allow_credentials(true)
    } else {
        tracing::info!("cors setup: default");
        CorsLayer::new()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();

    let log_level = args.rust_log_level;

    let cors_relaxed = args.cors_relaxed;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_level.clone()))
        .with(tracing_subscriber::fmt::layer().with_ansi(is_debug()))
        .init();

    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Could not install rustls default crypto provider.");

    run_migrations(&args.db_url)?;

    let dbpool = DbPool::build(&args.db_url, args.db_pool_size).await?;

    let api_keys = ApiKeys::new(&args.keys);

    let app = App::new(
        Arc::new(PostgresDb::new(dbpool)),
        WebhookNotifier::new(&args.webhook_url),
    );

    let router = Router::new()
        //authenticated routes
        .route("/api/webhooks/conversion", post(handle_conversion))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
        //public routes
        .route("/api/health", get(handle_health))
        .route(
            "/api/links/new",
            post(handle_create_link).fallback(handle_post_only),
        )
        .route("/api/r/{id}", get(handle_redirect))
        .route("/api/go/{slug}", get(handle_offer_redirect))
        .route(
            "/api/content/generate",
            post(handle_generate).fallback(handle_generate_wrong_method),
        )
        .route(
            "/api/analytics",
            get(handle_analytics).fallback(handle_get_only),
        )
        .route(
            "/api/analytics/summary",
            get(handle_summary).fallback(handle_get_only),
        )
        .route("/api/trends", get(handle_trends).post(handle_ingest_trend))
        .route("/api/offers", get(handle_offers).post(handle_create_offer))
        .route("/api/trend-offers", post(handle_link_trend_offer))
        .route("/api/assets", get(handle_assets))
        .route(
            "/api/posts/publish",
            post(handle_publish).fallback(handle_post_only),
        )
        .route("/api/posts", get(handle_posts))
        .layer(TraceLayer::new_for_http())
        .layer(setup_cors(cors_relaxed))
        .with_state(app);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    tracing::info!("listening on http://{}", addr);

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    signals::create_term_signal_handler(tx);

    let listener = TcpListener::bind(addr).await?;

    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    );

    let graceful = server.with_graceful_shutdown(async {
        rx.await.ok();
    });

    if let Err(e) = graceful.await {
        tracing::error!("server error: {}", e);
    }

    Ok(())
}
