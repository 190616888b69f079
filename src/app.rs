use crate::{
    analytics::{self, AnalyticsReport, SummaryReport},
    content,
    db::Store,
    handler::AppError,
    models::{
        Asset, Conversion, Link, NewAsset, NewClick, NewClickEvent, NewConversion, NewLink,
        NewOffer, NewPost, NewTrend, Offer, Post, Trend, TrendOffer,
    },
    webhook::{Notification, PostNotification, WebhookNotifier},
};
use afflow_rs::{CreateLinkRequest, GenerateRequest, GenerateResponse, PublishRequest};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// The slug flow has no caller address available, the original logged a
/// digest of this placeholder instead.
const PLACEHOLDER_ADDR: &str = "unknown";

const TOP_LINKS_LIMIT: i64 = 10;

fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Result of scheduling or publishing a post. The webhook dispatch marker
/// is deliberately separate from the stored post: notification delivery is
/// best-effort and never affects the core outcome.
#[derive(Clone, Debug)]
pub struct PublishOutcome {
    pub post: Post,
    pub notification: Notification,
}

#[derive(Clone)]
pub struct App {
    db: Arc<dyn Store>,
    webhook: WebhookNotifier,
}

impl App {
    pub fn new(db: Arc<dyn Store>, webhook: WebhookNotifier) -> Arc<Self> {
        Arc::new(Self { db, webhook })
    }

    pub fn webhook_configured(&self) -> bool {
        self.webhook.is_configured()
    }

    #[instrument(skip(self), err)]
    pub async fn create_link(&self, payload: CreateLinkRequest) -> Result<Link, AppError> {
        if payload.name.is_empty() || payload.affiliate_url.is_empty() {
            return Err(AppError::BadRequest(String::from(
                "name and affiliate_url required",
            )));
        }

        let link = self
            .db
            .create_link(&NewLink {
                name: payload.name,
                affiliate_url: payload.affiliate_url,
            })
            .await?;

        info!(id = %link.id, "link created");

        Ok(link)
    }

    /// Counter-based redirect flow: look up, bump the counter, append a
    /// click event, hand back the destination.
    ///
    /// The bump and the event insert are two independent writes with no
    /// transaction around them; a crash in between leaves one without the
    /// other. An empty `affiliate_url` is not validated and redirects to
    /// an empty location, matching the historical behavior.
    pub async fn redirect(
        &self,
        id: Uuid,
        source: &str,
        ip: Option<String>,
    ) -> Result<String, AppError> {
        let Some(link) = self.db.link_by_id(id).await? else {
            return Err(AppError::NotFound("Link not found"));
        };

        self.db.bump_click_count(id).await?;

        self.db
            .log_click_event(&NewClickEvent {
                link_id: Some(link.id),
                source: Some(source.to_string()),
                ip,
            })
            .await?;

        info!(%id, "redirect");

        Ok(link.affiliate_url)
    }

    /// Hash-logged redirect flow, independent from [`Self::redirect`]: it
    /// writes a `clicks` row keyed by slug plus SHA-256 digests and never
    /// touches a counter. Every failure, lookup included, collapses into
    /// the same not-found outcome so the caller renders one inline state.
    pub async fn offer_redirect(&self, slug: Uuid, user_agent: &str) -> Result<String, AppError> {
        let offer = match self.db.offer_by_slug(slug).await {
            Ok(Some(offer)) if !offer.deeplink_template.is_empty() => offer,
            Ok(_) => return Err(AppError::NotFound("Link Not Found")),
            Err(e) => {
                error!(%slug, "offer lookup failed: {e}");
                return Err(AppError::NotFound("Link Not Found"));
            }
        };

        let click = NewClick {
            post_id: None,
            link_slug: Some(slug.to_string()),
            ip_hash: Some(sha256_hex(PLACEHOLDER_ADDR)),
            ua_hash: Some(sha256_hex(user_agent)),
        };

        if let Err(e) = self.db.log_click(&click).await {
            error!(%slug, "click log failed: {e}");
            return Err(AppError::NotFound("Link Not Found"));
        }

        info!(%slug, "offer redirect");

        Ok(offer.deeplink_template)
    }

    #[instrument(skip(self, payload))]
    pub async fn generate_content(
        &self,
        payload: GenerateRequest,
    ) -> Result<GenerateResponse, AppError> {
        let script = content::render_script(&payload.topic, &payload.offer);
        let caption = content::render_caption(&payload.topic);

        if !payload.save {
            return Ok(GenerateResponse {
                script,
                caption,
                saved: false,
                trend_id: None,
            });
        }

        let trend_id = match payload.trend_id {
            Some(id) => id,
            None => {
                self.db
                    .create_trend(&NewTrend {
                        topic: payload.topic.clone(),
                        source: Some(String::from("content-generate")),
                        score: None,
                        region: None,
                        status: Some(String::from("new")),
                    })
                    .await
                    .map_err(|e| AppError::StoreCode("DB_INSERT_FAILED", e))?
                    .id
            }
        };

        let asset = self
            .db
            .create_asset(&NewAsset {
                trend_id: Some(trend_id),
                offer_id: payload.offer_id,
                type_: Some(String::from("script")),
                path: Some(script.clone()),
                status: Some(String::from("draft")),
                metrics_json: Some(serde_json::json!({
                    "caption": caption,
                    "auto_generated": true,
                })),
            })
            .await
            .map_err(|e| AppError::StoreCode("DB_INSERT_FAILED", e))?;

        info!(asset_id = %asset.id, %trend_id, "content generated");

        if payload.auto_publish {
            self.publish_content(PublishRequest {
                asset_id: Some(asset.id),
                platform: payload
                    .platform
                    .unwrap_or_else(|| String::from("tiktok")),
                scheduled_at: Some(Utc::now() + Duration::hours(1)),
                url: None,
                caption: Some(caption.clone()),
                asset_url: None,
            })
            .await?;
        }

        Ok(GenerateResponse {
            script,
            caption,
            saved: true,
            trend_id: Some(trend_id),
        })
    }

    /// Stores the post, then hands the notification to a detached task.
    /// Status is derived here: a scheduled time means "scheduled",
    /// otherwise the post counts as published right now.
    #[instrument(skip(self, payload), err)]
    pub async fn publish_content(
        &self,
        payload: PublishRequest,
    ) -> Result<PublishOutcome, AppError> {
        let now = Utc::now();

        let status = if payload.scheduled_at.is_some() {
            "scheduled"
        } else {
            "published"
        };

        let post = self
            .db
            .create_post(&NewPost {
                asset_id: payload.asset_id,
                platform: Some(payload.platform.clone()),
                status: Some(status.to_string()),
                scheduled_at: payload.scheduled_at,
                published_at: payload.scheduled_at.is_none().then_some(now),
                url: payload.url,
            })
            .await?;

        let notification = self.webhook.notify(PostNotification {
            platform: payload.platform,
            caption: payload.caption.unwrap_or_default(),
            asset_url: payload.asset_url.unwrap_or_default(),
            schedule: payload.scheduled_at.unwrap_or(now),
            post_id: post.id,
        });

        info!(post_id = %post.id, status, ?notification, "post stored");

        Ok(PublishOutcome { post, notification })
    }

    /// Full aggregate over every click, conversion and post counter; the
    /// three reads run concurrently.
    pub async fn analytics(&self) -> Result<AnalyticsReport, AppError> {
        let (clicks, conversions, posts) = tokio::try_join!(
            self.db.clicks(),
            self.db.conversions(),
            self.db.post_engagement(),
        )?;

        Ok(analytics::compute_report(&clicks, &conversions, &posts))
    }

    /// Endpoint-level summary: last-24h click-event count plus the ten
    /// most-clicked links. Intentionally shares no code with
    /// [`Self::analytics`] (the two contracts predate this service and
    /// drift independently).
    pub async fn summary(&self) -> Result<SummaryReport, AppError> {
        let since = Utc::now() - Duration::hours(24);

        let (last_24h_clicks, top_links) = tokio::try_join!(
            self.db.count_click_events_since(since),
            self.db.top_links(TOP_LINKS_LIMIT),
        )
        .map_err(|e| AppError::StoreFallback("ANALYTICS_FAIL", e))?;

        Ok(SummaryReport {
            last_24h_clicks,
            top_links,
        })
    }

    pub async fn trends(&self) -> Result<Vec<Trend>, AppError> {
        Ok(self.db.trends().await?)
    }

    #[instrument(skip(self, trend), err)]
    pub async fn ingest_trend(&self, trend: NewTrend) -> Result<Trend, AppError> {
        if trend.topic.is_empty() {
            return Err(AppError::BadRequest(String::from("topic required")));
        }

        Ok(self.db.create_trend(&trend).await?)
    }

    pub async fn offers(&self) -> Result<Vec<Offer>, AppError> {
        Ok(self.db.offers().await?)
    }

    #[instrument(skip(self, offer), err)]
    pub async fn create_offer(&self, offer: NewOffer) -> Result<Offer, AppError> {
        if offer.deeplink_template.is_empty() {
            return Err(AppError::BadRequest(String::from(
                "deeplink_template required",
            )));
        }

        Ok(self.db.create_offer(&offer).await?)
    }

    pub async fn link_trend_offer(&self, pair: TrendOffer) -> Result<TrendOffer, AppError> {
        Ok(self.db.link_trend_offer(&pair).await?)
    }

    pub async fn assets(&self) -> Result<Vec<Asset>, AppError> {
        Ok(self.db.assets().await?)
    }

    pub async fn posts(&self) -> Result<Vec<Post>, AppError> {
        Ok(self.db.posts().await?)
    }

    #[instrument(skip(self, conversion), err)]
    pub async fn record_conversion(
        &self,
        conversion: NewConversion,
    ) -> Result<Conversion, AppError> {
        Ok(self.db.create_conversion(&conversion).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{DbError, MockStore},
        models::Click,
    };

    fn test_app(db: MockStore) -> Arc<App> {
        App::new(Arc::new(db), WebhookNotifier::new(""))
    }

    fn stored_link(id: Uuid, url: &str) -> Link {
        Link {
            id,
            name: String::from("campaign"),
            affiliate_url: url.to_string(),
            click_count: 3,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_redirect_bumps_counter_and_logs_event() {
        let id = Uuid::new_v4();
        let link = stored_link(id, "https://merchant.example/deal");

        let mut db = MockStore::new();
        db.expect_link_by_id()
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));
        db.expect_bump_click_count()
            .times(1)
            .withf(move |got| *got == id)
            .returning(|_| Ok(()));
        db.expect_log_click_event()
            .times(1)
            .withf(move |ev| {
                ev.link_id == Some(id)
                    && ev.source.as_deref() == Some("direct")
                    && ev.ip.as_deref() == Some("127.0.0.1")
            })
            .returning(|_| Ok(()));

        let app = test_app(db);

        let url = app
            .redirect(id, "direct", Some(String::from("127.0.0.1")))
            .await
            .unwrap();

        assert_eq!(url, "https://merchant.example/deal");
    }

    #[tokio::test]
    async fn test_redirect_unknown_link_mutates_nothing() {
        // no bump/log expectations: any write would panic the mock
        let mut db = MockStore::new();
        db.expect_link_by_id().times(1).returning(|_| Ok(None));

        let app = test_app(db);

        let err = app.redirect(Uuid::new_v4(), "direct", None).await;

        assert!(matches!(err, Err(AppError::NotFound("Link not found"))));
    }

    #[tokio::test]
    async fn test_redirect_empty_destination_is_passed_through() {
        let id = Uuid::new_v4();
        let link = stored_link(id, "");

        let mut db = MockStore::new();
        db.expect_link_by_id()
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));
        db.expect_bump_click_count().times(1).returning(|_| Ok(()));
        db.expect_log_click_event().times(1).returning(|_| Ok(()));

        let app = test_app(db);

        assert_eq!(app.redirect(id, "direct", None).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_offer_redirect_logs_digests() {
        let slug = Uuid::new_v4();
        let slug_text = slug.to_string();
        let expected_ip = sha256_hex("unknown");
        let expected_ua = sha256_hex("Mozilla/5.0");

        let mut db = MockStore::new();
        db.expect_offer_by_slug().times(1).returning(move |_| {
            Ok(Some(Offer {
                id: slug,
                merchant: String::from("FitBand"),
                product: String::from("FitBand Pro"),
                commission_type: None,
                rate: None,
                deeplink_template: String::from("https://fitband.example/?aff=7"),
                network: None,
                approved: Some(true),
                created_at: None,
            }))
        });
        db.expect_log_click()
            .times(1)
            .withf(move |click| {
                click.link_slug.as_deref() == Some(slug_text.as_str())
                    && click.ip_hash.as_deref() == Some(expected_ip.as_str())
                    && click.ua_hash.as_deref() == Some(expected_ua.as_str())
            })
            .returning(|click| {
                Ok(Click {
                    id: 1,
                    post_id: None,
                    link_slug: click.link_slug.clone(),
                    ip_hash: click.ip_hash.clone(),
                    ua_hash: click.ua_hash.clone(),
                    ts: None,
                })
            });

        let app = test_app(db);

        let url = app.offer_redirect(slug, "Mozilla/5.0").await.unwrap();

        assert_eq!(url, "https://fitband.example/?aff=7");
    }

    #[tokio::test]
    async fn test_offer_redirect_any_failure_is_not_found() {
        // missing offer
        let mut db = MockStore::new();
        db.expect_offer_by_slug().returning(|_| Ok(None));
        let err = test_app(db).offer_redirect(Uuid::new_v4(), "ua").await;
        assert!(matches!(err, Err(AppError::NotFound("Link Not Found"))));

        // lookup failure
        let mut db = MockStore::new();
        db.expect_offer_by_slug()
            .returning(|_| Err(DbError::General(String::from("boom"))));
        let err = test_app(db).offer_redirect(Uuid::new_v4(), "ua").await;
        assert!(matches!(err, Err(AppError::NotFound("Link Not Found"))));

        // offer found but no destination template; no click row either
        // (a log_click call would panic the mock)
        let mut db = MockStore::new();
        db.expect_offer_by_slug().returning(|slug| {
            Ok(Some(Offer {
                id: slug,
                merchant: String::from("FitBand"),
                product: String::from("FitBand Pro"),
                commission_type: None,
                rate: None,
                deeplink_template: String::new(),
                network: None,
                approved: Some(true),
                created_at: None,
            }))
        });
        let err = test_app(db).offer_redirect(Uuid::new_v4(), "ua").await;
        assert!(matches!(err, Err(AppError::NotFound("Link Not Found"))));
    }

    #[tokio::test]
    async fn test_generate_persists_trend_and_asset() {
        let trend_id = Uuid::new_v4();

        let mut db = MockStore::new();
        db.expect_create_trend()
            .times(1)
            .withf(|trend| {
                trend.topic == "fitness gadgets"
                    && trend.source.as_deref() == Some("content-generate")
            })
            .returning(move |trend| {
                Ok(Trend {
                    id: trend_id,
                    topic: trend.topic.clone(),
                    source: trend.source.clone(),
                    score: None,
                    region: None,
                    status: trend.status.clone(),
                    created_at: None,
                })
            });
        db.expect_create_asset()
            .times(1)
            .withf(move |asset| {
                asset.trend_id == Some(trend_id)
                    && asset.type_.as_deref() == Some("script")
                    && asset.metrics_json.as_ref().unwrap()["auto_generated"] == true
            })
            .returning(|asset| {
                Ok(Asset {
                    id: Uuid::new_v4(),
                    trend_id: asset.trend_id,
                    offer_id: asset.offer_id,
                    type_: asset.type_.clone(),
                    path: asset.path.clone(),
                    status: asset.status.clone(),
                    metrics_json: asset.metrics_json.clone(),
                    created_at: None,
                })
            });

        let app = test_app(db);

        let resp = app
            .generate_content(GenerateRequest {
                topic: String::from("fitness gadgets"),
                offer: String::from("FitBand Pro"),
                ..GenerateRequest::default()
            })
            .await
            .unwrap();

        assert!(resp.script.contains("fitness gadgets"));
        assert!(resp.script.contains("FitBand Pro"));
        assert!(resp.caption.contains("#ai #tools #trending"));
        assert!(resp.saved);
        assert_eq!(resp.trend_id, Some(trend_id));
    }

    #[tokio::test]
    async fn test_generate_without_save_touches_no_rows() {
        let app = test_app(MockStore::new());

        let resp = app
            .generate_content(GenerateRequest {
                save: false,
                ..GenerateRequest::default()
            })
            .await
            .unwrap();

        assert!(!resp.saved);
        assert_eq!(resp.trend_id, None);
        assert!(resp.script.contains("AI tool"));
    }

    #[tokio::test]
    async fn test_generate_insert_failure_surfaces_code() {
        let mut db = MockStore::new();
        db.expect_create_trend()
            .returning(|_| Err(DbError::General(String::from("insert failed"))));

        let app = test_app(db);

        let err = app.generate_content(GenerateRequest::default()).await;

        assert!(matches!(
            err,
            Err(AppError::StoreCode("DB_INSERT_FAILED", _))
        ));
    }

    fn returning_post(post: &NewPost) -> Post {
        Post {
            id: Uuid::new_v4(),
            asset_id: post.asset_id,
            platform: post.platform.clone(),
            status: post.status.clone(),
            scheduled_at: post.scheduled_at,
            published_at: post.published_at,
            url: post.url.clone(),
            impressions: Some(0),
            clicks: Some(0),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_publish_with_schedule_is_scheduled() {
        let scheduled_at = Utc::now() + Duration::hours(2);

        let mut db = MockStore::new();
        db.expect_create_post()
            .times(1)
            .withf(move |post| {
                post.status.as_deref() == Some("scheduled")
                    && post.scheduled_at == Some(scheduled_at)
                    && post.published_at.is_none()
            })
            .returning(|post| Ok(returning_post(post)));

        let app = test_app(db);

        let outcome = app
            .publish_content(PublishRequest {
                asset_id: None,
                platform: String::from("tiktok"),
                scheduled_at: Some(scheduled_at),
                url: None,
                caption: None,
                asset_url: None,
            })
            .await
            .unwrap();

        assert_eq!(outcome.post.status.as_deref(), Some("scheduled"));
        assert_eq!(outcome.notification, Notification::Skipped);
    }

    #[tokio::test]
    async fn test_publish_without_schedule_is_published_now() {
        let before = Utc::now();

        let mut db = MockStore::new();
        db.expect_create_post()
            .times(1)
            .withf(move |post| {
                post.status.as_deref() == Some("published")
                    && post.scheduled_at.is_none()
                    && post.published_at.is_some_and(|at| at >= before)
            })
            .returning(|post| Ok(returning_post(post)));

        let app = test_app(db);

        let outcome = app
            .publish_content(PublishRequest {
                asset_id: None,
                platform: String::from("youtube"),
                scheduled_at: None,
                url: None,
                caption: None,
                asset_url: None,
            })
            .await
            .unwrap();

        let published_at = outcome.post.published_at.unwrap();
        assert!(published_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_create_link_requires_both_fields() {
        let app = test_app(MockStore::new());

        let err = app
            .create_link(CreateLinkRequest {
                name: String::from("campaign"),
                affiliate_url: String::new(),
            })
            .await;

        assert!(matches!(err, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_analytics_over_empty_store() {
        let mut db = MockStore::new();
        db.expect_clicks().returning(|| Ok(vec![]));
        db.expect_conversions().returning(|| Ok(vec![]));
        db.expect_post_engagement().returning(|| Ok(vec![]));

        let app = test_app(db);

        let report = app.analytics().await.unwrap();

        assert_eq!(report.total_clicks, 0);
        assert_eq!(report.ctr, "0.00");
        assert_eq!(report.conversion_rate, "0.00");
        assert_eq!(report.epc, "0.00");
    }

    #[tokio::test]
    async fn test_summary_failure_keeps_db_message() {
        let mut db = MockStore::new();
        db.expect_count_click_events_since()
            .returning(|_| Err(DbError::General(String::from("down"))));
        db.expect_top_links().returning(|_| Ok(vec![]));

        let app = test_app(db);

        let err = app.summary().await.unwrap_err();

        assert!(matches!(
            &err,
            AppError::StoreFallback("ANALYTICS_FAIL", _)
        ));
        assert!(err.to_string().contains("down"));
    }
}
