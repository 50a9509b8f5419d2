use serde::{Deserialize, Serialize};

use crate::scoring::normalize::{
    hype_age_factor, hype_engagement_factor, hype_price_change_factor, hype_sentiment_factor,
    hype_volume_factor,
};
use crate::{MarketMetrics, SocialSnapshot, UNKNOWN_AGE_DAYS};

const HYPE_BASE: f64 = 20.0;
const HYPE_CAP: f64 = 100.0;

#[derive(Debug, Clone, Default)]
pub struct HypeInput {
    pub age_days: Option<f64>,
    pub market: MarketMetrics,
    pub social: SocialSnapshot,
}

/// Hype score with every intermediate factor that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypeBreakdown {
    pub score: u8,
    pub age_days: f64,
    pub age_factor: f64,
    pub volume_factor: f64,
    pub price_change_factor: f64,
    pub social_engagement: f64,
    pub social_factor: f64,
    pub average_sentiment: f64,
    pub sentiment_factor: f64,
}

pub fn score_hype(input: &HypeInput) -> HypeBreakdown {
    let age_days = input.age_days.unwrap_or(UNKNOWN_AGE_DAYS);
    let age_factor = hype_age_factor(age_days);
    let volume_factor = hype_volume_factor(input.market.volume_24h);
    let price_change_factor = hype_price_change_factor(input.market.price_change_24h);

    let social_engagement = input.social.hype_engagement();
    let social_factor = hype_engagement_factor(social_engagement);
    let average_sentiment = input.social.average_sentiment();
    let sentiment_factor = hype_sentiment_factor(average_sentiment);

    let raw = HYPE_BASE
        * age_factor
        * volume_factor
        * price_change_factor
        * social_factor
        * sentiment_factor;

    HypeBreakdown {
        score: raw.min(HYPE_CAP).max(0.0).round() as u8,
        age_days,
        age_factor,
        volume_factor,
        price_change_factor,
        social_engagement,
        social_factor,
        average_sentiment,
        sentiment_factor,
    }
}
