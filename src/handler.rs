use crate::{
    app::App,
    auth::AuthenticatedKey,
    db::DbError,
    models::{NewConversion, NewOffer, NewTrend, TrendOffer},
};
use afflow_rs::{ConversionRequest, CreateLinkRequest, GenerateRequest, PublishRequest};
use axum::{
    Extension, Json,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info};
use uuid::Uuid;

/// Request/response error taxonomy of the HTTP surface.
///
/// The two redirect flows answer in plain text while every other endpoint
/// answers JSON; the inconsistency is inherited from the original API and
/// kept for compatibility.
#[derive(Debug)]
pub enum AppError {
    /// Missing or empty required field. 400 with a descriptive message.
    BadRequest(String),
    /// No matching row. 404, plain text.
    NotFound(&'static str),
    /// Counter-flow redirect failed past the lookup. 500, plain text;
    /// the cause is logged server-side only.
    RedirectFailed,
    /// Store failure surfaced with the underlying message.
    Store(DbError),
    /// Store failure surfaced as a fixed code; the real error is only
    /// logged.
    StoreCode(&'static str, DbError),
    /// Store failure surfaced with the underlying message when it has
    /// one; the fixed code is only the fallback for a blank message.
    StoreFallback(&'static str, DbError),
    /// Anything else. The client sees a generic code, never the cause.
    Runtime(anyhow::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "bad request: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::RedirectFailed => write!(f, "redirect failed"),
            Self::Store(e) => write!(f, "{e}"),
            Self::StoreCode(code, e) => write!(f, "{code}: {e}"),
            Self::StoreFallback(_, e) => write!(f, "{e}"),
            Self::Runtime(e) => write!(f, "{e}"),
        }
    }
}

/// The redirect endpoints answer 302 Found, the status the stored links
/// were created against; axum's `Redirect` helper only offers 303/307/308.
fn redirect_found(url: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            Self::RedirectFailed => {
                (StatusCode::INTERNAL_SERVER_ERROR, "REDIRECT_FAILED").into_response()
            }
            Self::Store(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
            Self::StoreCode(code, e) => {
                error!("store failure behind {code}: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": code })),
                )
                    .into_response()
            }
            Self::StoreFallback(code, e) => {
                let msg = e.to_string();
                let body = if msg.is_empty() { code.to_string() } else { msg };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": body })),
                )
                    .into_response()
            }
            Self::Runtime(e) => {
                error!("runtime error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "FUNCTION_RUNTIME_ERROR" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        Self::Store(e)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Runtime(e)
    }
}

#[derive(Deserialize, Debug)]
pub struct TrendIngestRequest {
    pub topic: String,
    pub source: Option<String>,
    pub score: Option<f64>,
    pub region: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct OfferCreateRequest {
    pub merchant: String,
    pub product: String,
    pub commission_type: Option<String>,
    pub rate: Option<String>,
    #[serde(default)]
    pub deeplink_template: String,
    pub network: Option<String>,
    pub approved: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct TrendOfferRequest {
    pub trend_id: Uuid,
    pub offer_id: Uuid,
    pub fit_score: Option<f64>,
}

pub async fn handle_health(State(app): State<Arc<App>>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "env": {
            "database_url": true,
            "webhook_url": app.webhook_configured(),
        },
        "version": option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
    }))
}

pub async fn handle_create_link(
    State(app): State<Arc<App>>,
    Json(create): Json<CreateLinkRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("handle_create_link: '{}'", create.name);

    let link = app.create_link(create).await?;

    Ok(Json(json!({ "link": link })))
}

pub async fn handle_redirect(
    Path(id): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    State(app): State<Arc<App>>,
) -> Result<Response, AppError> {
    info!("handle_redirect: {id}");

    let Ok(id) = Uuid::parse_str(&id) else {
        return Err(AppError::NotFound("Link not found"));
    };

    let source = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("direct");

    match app
        .redirect(id, source, Some(addr.ip().to_string()))
        .await
    {
        Ok(url) => Ok(redirect_found(url)),
        Err(e @ AppError::NotFound(_)) => Err(e),
        Err(e) => {
            error!("redirect failed: {e}");
            Err(AppError::RedirectFailed)
        }
    }
}

pub async fn handle_offer_redirect(
    Path(slug): Path<String>,
    headers: HeaderMap,
    State(app): State<Arc<App>>,
) -> Result<Response, AppError> {
    info!("handle_offer_redirect: {slug}");

    let Ok(slug) = Uuid::parse_str(&slug) else {
        return Err(AppError::NotFound("Link Not Found"));
    };

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let url = app.offer_redirect(slug, user_agent).await?;

    Ok(redirect_found(url))
}

pub async fn handle_generate(
    State(app): State<Arc<App>>,
    Json(generate): Json<GenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("handle_generate: '{}'", generate.topic);

    Ok(Json(app.generate_content(generate).await?))
}

pub async fn handle_publish(
    State(app): State<Arc<App>>,
    Json(publish): Json<PublishRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("handle_publish: '{}'", publish.platform);

    let outcome = app.publish_content(publish).await?;

    info!(notification = ?outcome.notification, post_id = %outcome.post.id, "published");

    Ok(Json(json!({ "scheduled": true, "post": outcome.post })))
}

pub async fn handle_analytics(
    State(app): State<Arc<App>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app.analytics().await?))
}

pub async fn handle_summary(State(app): State<Arc<App>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app.summary().await?))
}

pub async fn handle_trends(State(app): State<Arc<App>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app.trends().await?))
}

pub async fn handle_ingest_trend(
    State(app): State<Arc<App>>,
    Json(ingest): Json<TrendIngestRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("handle_ingest_trend: '{}'", ingest.topic);

    let trend = app
        .ingest_trend(NewTrend {
            topic: ingest.topic,
            source: ingest.source,
            score: ingest.score,
            region: ingest.region,
            status: ingest.status,
        })
        .await?;

    Ok(Json(json!({ "status": "ok", "trend": trend })))
}

pub async fn handle_offers(State(app): State<Arc<App>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app.offers().await?))
}

pub async fn handle_create_offer(
    State(app): State<Arc<App>>,
    Json(create): Json<OfferCreateRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("handle_create_offer: '{}'", create.merchant);

    let offer = app
        .create_offer(NewOffer {
            merchant: create.merchant,
            product: create.product,
            commission_type: create.commission_type,
            rate: create.rate,
            deeplink_template: create.deeplink_template,
            network: create.network,
            approved: create.approved,
        })
        .await?;

    Ok(Json(offer))
}

pub async fn handle_link_trend_offer(
    State(app): State<Arc<App>>,
    Json(pair): Json<TrendOfferRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pair = app
        .link_trend_offer(TrendOffer {
            trend_id: pair.trend_id,
            offer_id: pair.offer_id,
            fit_score: pair.fit_score,
        })
        .await?;

    Ok(Json(pair))
}

pub async fn handle_assets(State(app): State<Arc<App>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app.assets().await?))
}

pub async fn handle_posts(State(app): State<Arc<App>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app.posts().await?))
}

pub async fn handle_conversion(
    Extension(AuthenticatedKey(api_key)): Extension<AuthenticatedKey>,
    State(app): State<Arc<App>>,
    Json(conversion): Json<ConversionRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!(api_key, "handle_conversion: '{}'", conversion.network);

    let conversion = app
        .record_conversion(NewConversion {
            network: conversion.network,
            click_ref: conversion.click_ref,
            amount: Some(conversion.amount),
            commission: Some(conversion.commission),
        })
        .await?;

    Ok(Json(json!({ "status": "ok", "conversion": conversion })))
}

// Wrong-method fallbacks, preserving the original bodies.

pub async fn handle_post_only() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "POST only" })),
    )
}

pub async fn handle_get_only() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "GET only" })),
    )
}

pub async fn handle_generate_wrong_method() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Use POST with JSON { topic, offer }" })),
    )
}
