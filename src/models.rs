use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::trends)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Trend {
    pub id: Uuid,
    pub topic: String,
    pub source: Option<String>,
    pub score: Option<f64>,
    pub region: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::trends)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewTrend {
    pub topic: String,
    pub source: Option<String>,
    pub score: Option<f64>,
    pub region: Option<String>,
    pub status: Option<String>,
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::offers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Offer {
    pub id: Uuid,
    pub merchant: String,
    pub product: String,
    pub commission_type: Option<String>,
    pub rate: Option<String>,
    pub deeplink_template: String,
    pub network: Option<String>,
    pub approved: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::offers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewOffer {
    pub merchant: String,
    pub product: String,
    pub commission_type: Option<String>,
    pub rate: Option<String>,
    pub deeplink_template: String,
    pub network: Option<String>,
    pub approved: Option<bool>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::trend_offers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TrendOffer {
    pub trend_id: Uuid,
    pub offer_id: Uuid,
    pub fit_score: Option<f64>,
}

/// `path` carries the generated text itself, not a file location. The
/// column name is inherited from the original schema.
#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::assets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Asset {
    pub id: Uuid,
    pub trend_id: Option<Uuid>,
    pub offer_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub path: Option<String>,
    pub status: Option<String>,
    pub metrics_json: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::assets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAsset {
    pub trend_id: Option<Uuid>,
    pub offer_id: Option<Uuid>,
    pub type_: Option<String>,
    pub path: Option<String>,
    pub status: Option<String>,
    pub metrics_json: Option<serde_json::Value>,
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: Uuid,
    pub asset_id: Option<Uuid>,
    pub platform: Option<String>,
    pub status: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub impressions: Option<i32>,
    pub clicks: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPost {
    pub asset_id: Option<Uuid>,
    pub platform: Option<String>,
    pub status: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

/// Impression/click counters of a post, the only columns the full
/// analytics report reads from the posts table.
#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostEngagement {
    pub impressions: Option<i32>,
    pub clicks: Option<i32>,
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::clicks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Click {
    pub id: i64,
    pub post_id: Option<Uuid>,
    pub link_slug: Option<String>,
    pub ip_hash: Option<String>,
    pub ua_hash: Option<String>,
    pub ts: Option<DateTime<Utc>>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::clicks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewClick {
    pub post_id: Option<Uuid>,
    pub link_slug: Option<String>,
    pub ip_hash: Option<String>,
    pub ua_hash: Option<String>,
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::conversions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Conversion {
    pub id: i64,
    pub network: String,
    pub click_ref: Option<String>,
    pub amount: Option<f64>,
    pub commission: Option<f64>,
    pub ts: Option<DateTime<Utc>>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::conversions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewConversion {
    pub network: String,
    pub click_ref: Option<String>,
    pub amount: Option<f64>,
    pub commission: Option<f64>,
}

#[derive(Queryable, Selectable, Serialize, Clone, PartialEq, Debug)]
#[diesel(table_name = crate::schema::links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Link {
    pub id: Uuid,
    pub name: String,
    pub affiliate_url: String,
    pub click_count: i32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewLink {
    pub name: String,
    pub affiliate_url: String,
}

/// Subset of a link row returned by the top-links summary.
#[derive(Queryable, Selectable, Serialize, Clone, PartialEq, Debug)]
#[diesel(table_name = crate::schema::links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LinkStats {
    pub id: Uuid,
    pub name: String,
    pub affiliate_url: String,
    pub click_count: i32,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::click_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewClickEvent {
    pub link_id: Option<Uuid>,
    pub source: Option<String>,
    pub ip: Option<String>,
}
