use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::{
    db::Store,
    db_pool::DbPool,
    models::{
        Asset, Click, Conversion, Link, LinkStats, NewAsset, NewClick, NewClickEvent,
        NewConversion, NewLink, NewOffer, NewPost, NewTrend, Offer, Post, PostEngagement, Trend,
        TrendOffer,
    },
    schema,
};

#[derive(Clone)]
pub struct PostgresDb {
    db: DbPool,
}

impl PostgresDb {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Store for PostgresDb {
    async fn create_link(&self, link: &NewLink) -> Result<Link, super::DbError> {
        Ok(diesel::insert_into(schema::links::table)
            .values(link)
            .returning(Link::as_returning())
            .get_result(&mut self.db.0.get().await?)
            .await?)
    }

    async fn link_by_id(&self, id: Uuid) -> Result<Option<Link>, super::DbError> {
        Ok(schema::links::table
            .filter(schema::links::id.eq(id))
            .select(Link::as_select())
            .first(&mut self.db.0.get().await?)
            .await
            .optional()?)
    }

    async fn bump_click_count(&self, id: Uuid) -> Result<(), super::DbError> {
        diesel::update(schema::links::table.filter(schema::links::id.eq(id)))
            .set(schema::links::click_count.eq(schema::links::click_count + 1))
            .execute(&mut self.db.0.get().await?)
            .await?;

        Ok(())
    }

    async fn log_click_event(&self, event: &NewClickEvent) -> Result<(), super::DbError> {
        diesel::insert_into(schema::click_events::table)
            .values(event)
            .execute(&mut self.db.0.get().await?)
            .await?;

        Ok(())
    }

    async fn top_links(&self, limit: i64) -> Result<Vec<LinkStats>, super::DbError> {
        Ok(schema::links::table
            .order(schema::links::click_count.desc())
            .limit(limit)
            .select(LinkStats::as_select())
            .load(&mut self.db.0.get().await?)
            .await?)
    }

    async fn count_click_events_since(&self, since: DateTime<Utc>) -> Result<i64, super::DbError> {
        Ok(schema::click_events::table
            .filter(schema::click_events::ts.ge(since))
            .count()
            .get_result(&mut self.db.0.get().await?)
            .await?)
    }

    async fn trends(&self) -> Result<Vec<Trend>, super::DbError> {
        Ok(schema::trends::table
            .order(schema::trends::created_at.desc())
            .select(Trend::as_select())
            .load(&mut self.db.0.get().await?)
            .await?)
    }

    async fn create_trend(&self, trend: &NewTrend) -> Result<Trend, super::DbError> {
        Ok(diesel::insert_into(schema::trends::table)
            .values(trend)
            .returning(Trend::as_returning())
            .get_result(&mut self.db.0.get().await?)
            .await?)
    }

    async fn offers(&self) -> Result<Vec<Offer>, super::DbError> {
        Ok(schema::offers::table
            .order(schema::offers::created_at.desc())
            .select(Offer::as_select())
            .load(&mut self.db.0.get().await?)
            .await?)
    }

    async fn create_offer(&self, offer: &NewOffer) -> Result<Offer, super::DbError> {
        Ok(diesel::insert_into(schema::offers::table)
            .values(offer)
            .returning(Offer::as_returning())
            .get_result(&mut self.db.0.get().await?)
            .await?)
    }

    async fn offer_by_slug(&self, slug: Uuid) -> Result<Option<Offer>, super::DbError> {
        Ok(schema::offers::table
            .filter(schema::offers::id.eq(slug))
            .select(Offer::as_select())
            .first(&mut self.db.0.get().await?)
            .await
            .optional()?)
    }

    async fn link_trend_offer(&self, pair: &TrendOffer) -> Result<TrendOffer, super::DbError> {
        Ok(diesel::insert_into(schema::trend_offers::table)
            .values(pair)
            .returning(TrendOffer::as_returning())
            .get_result(&mut self.db.0.get().await?)
            .await?)
    }

    async fn assets(&self) -> Result<Vec<Asset>, super::DbError> {
        Ok(schema::assets::table
            .order(schema::assets::created_at.desc())
            .select(Asset::as_select())
            .load(&mut self.db.0.get().await?)
            .await?)
    }

    async fn create_asset(&self, asset: &NewAsset) -> Result<Asset, super::DbError> {
        Ok(diesel::insert_into(schema::assets::table)
            .values(asset)
            .returning(Asset::as_returning())
            .get_result(&mut self.db.0.get().await?)
            .await?)
    }

    async fn posts(&self) -> Result<Vec<Post>, super::DbError> {
        Ok(schema::posts::table
            .order(schema::posts::created_at.desc())
            .select(Post::as_select())
            .load(&mut self.db.0.get().await?)
            .await?)
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, super::DbError> {
        Ok(diesel::insert_into(schema::posts::table)
            .values(post)
            .returning(Post::as_returning())
            .get_result(&mut self.db.0.get().await?)
            .await?)
    }

    async fn post_engagement(&self) -> Result<Vec<PostEngagement>, super::DbError> {
        Ok(schema::posts::table
            .select(PostEngagement::as_select())
            .load(&mut self.db.0.get().await?)
            .await?)
    }

    async fn clicks(&self) -> Result<Vec<Click>, super::DbError> {
        Ok(schema::clicks::table
            .select(Click::as_select())
            .load(&mut self.db.0.get().await?)
            .await?)
    }

    async fn log_click(&self, click: &NewClick) -> Result<Click, super::DbError> {
        Ok(diesel::insert_into(schema::clicks::table)
            .values(click)
            .returning(Click::as_returning())
            .get_result(&mut self.db.0.get().await?)
            .await?)
    }

    async fn conversions(&self) -> Result<Vec<Conversion>, super::DbError> {
        Ok(schema::conversions::table
            .select(Conversion::as_select())
            .load(&mut self.db.0.get().await?)
            .await?)
    }

    async fn create_conversion(
        &self,
        conversion: &NewConversion,
    ) -> Result<Conversion, super::DbError> {
        Ok(diesel::insert_into(schema::conversions::table)
            .values(conversion)
            .returning(Conversion::as_returning())
            .get_result(&mut self.db.0.get().await?)
            .await?)
    }
}
