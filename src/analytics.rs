use crate::models::{Click, Conversion, LinkStats, PostEngagement};
use serde::Serialize;

/// Endpoint-level summary: a time-windowed click-event count plus the
/// most-clicked links. A separate contract from [`AnalyticsReport`] — the
/// two paths share no queries and drift independently.
#[derive(Serialize, Clone, Debug)]
pub struct SummaryReport {
    pub last_24h_clicks: i64,
    pub top_links: Vec<LinkStats>,
}

/// Full aggregate report over all clicks, conversions and post counters.
///
/// The ratio fields are fixed two-decimal strings, not floats: existing
/// consumers of this payload expect string fields, and `"0.00"` when the
/// denominator is zero.
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub total_clicks: u64,
    pub total_conversions: u64,
    pub total_revenue: f64,
    pub total_impressions: i64,
    pub total_post_clicks: i64,
    /// post-clicks / impressions, as a percentage.
    pub ctr: String,
    /// conversions / clicks, as a percentage.
    pub conversion_rate: String,
    /// revenue / clicks (earnings per click), plain ratio.
    pub epc: String,
}

fn two_decimals(numerator: f64, denominator: f64) -> String {
    if denominator > 0.0 {
        format!("{:.2}", numerator / denominator)
    } else {
        String::from("0.00")
    }
}

pub fn compute_report(
    clicks: &[Click],
    conversions: &[Conversion],
    posts: &[PostEngagement],
) -> AnalyticsReport {
    let total_clicks = clicks.len() as u64;
    let total_conversions = conversions.len() as u64;
    let total_revenue: f64 = conversions.iter().map(|c| c.commission.unwrap_or(0.0)).sum();
    let total_impressions: i64 = posts
        .iter()
        .map(|p| i64::from(p.impressions.unwrap_or(0)))
        .sum();
    let total_post_clicks: i64 = posts.iter().map(|p| i64::from(p.clicks.unwrap_or(0))).sum();

    AnalyticsReport {
        total_clicks,
        total_conversions,
        total_revenue,
        total_impressions,
        total_post_clicks,
        ctr: two_decimals(total_post_clicks as f64 * 100.0, total_impressions as f64),
        conversion_rate: two_decimals(total_conversions as f64 * 100.0, total_clicks as f64),
        epc: two_decimals(total_revenue, total_clicks as f64),
    }
}
