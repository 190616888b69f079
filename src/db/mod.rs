use crate::models::{
    Asset, Click, Conversion, Link, LinkStats, NewAsset, NewClick, NewClickEvent, NewConversion,
    NewLink, NewOffer, NewPost, NewTrend, Offer, Post, PostEngagement, Trend, TrendOffer,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::result::DatabaseErrorKind;
use thiserror::Error;
use uuid::Uuid;

mod postgres;

pub use postgres::PostgresDb;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    General(String),
    #[error("Duplicate Id Error")]
    DuplicateId,
}

impl From<diesel::result::Error> for DbError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DbError::DuplicateId
            }
            _ => DbError::General(e.to_string()),
        }
    }
}

impl From<deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>> for DbError {
    fn from(e: deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>) -> Self {
        DbError::General(e.to_string())
    }
}

/// One method per data-access operation. All persistent state lives behind
/// this trait; handlers never touch the pool directly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    // links + click_events (counter-based redirect flow)
    async fn create_link(&self, link: &NewLink) -> Result<Link, DbError>;
    async fn link_by_id(&self, id: Uuid) -> Result<Option<Link>, DbError>;
    async fn bump_click_count(&self, id: Uuid) -> Result<(), DbError>;
    async fn log_click_event(&self, event: &NewClickEvent) -> Result<(), DbError>;
    async fn top_links(&self, limit: i64) -> Result<Vec<LinkStats>, DbError>;
    async fn count_click_events_since(&self, since: DateTime<Utc>) -> Result<i64, DbError>;

    // trends
    async fn trends(&self) -> Result<Vec<Trend>, DbError>;
    async fn create_trend(&self, trend: &NewTrend) -> Result<Trend, DbError>;

    // offers
    async fn offers(&self) -> Result<Vec<Offer>, DbError>;
    async fn create_offer(&self, offer: &NewOffer) -> Result<Offer, DbError>;
    async fn offer_by_slug(&self, slug: Uuid) -> Result<Option<Offer>, DbError>;
    async fn link_trend_offer(&self, pair: &TrendOffer) -> Result<TrendOffer, DbError>;

    // assets
    async fn assets(&self) -> Result<Vec<Asset>, DbError>;
    async fn create_asset(&self, asset: &NewAsset) -> Result<Asset, DbError>;

    // posts
    async fn posts(&self) -> Result<Vec<Post>, DbError>;
    async fn create_post(&self, post: &NewPost) -> Result<Post, DbError>;
    async fn post_engagement(&self) -> Result<Vec<PostEngagement>, DbError>;

    // clicks (hash-logged redirect flow)
    async fn clicks(&self) -> Result<Vec<Click>, DbError>;
    async fn log_click(&self, click: &NewClick) -> Result<Click, DbError>;

    // conversions
    async fn conversions(&self) -> Result<Vec<Conversion>, DbError>;
    async fn create_conversion(&self, conversion: &NewConversion) -> Result<Conversion, DbError>;
}
