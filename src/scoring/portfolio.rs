use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::{format_float, format_usd, AllocationCategory, RiskTolerance};

const ESTABLISHED_SHARE: f64 = 0.4;
const NEW_SHARE: f64 = 0.4;
const SPECULATIVE_SHARE: f64 = 0.2;
const NEW_SAFETY_FRACTION: f64 = 0.7;

pub const PORTFOLIO_DISCLAIMERS: [&str; 4] = [
    "Memecoins are highly speculative and can go to zero within hours.",
    "Scores are heuristic aggregates of public data, not predictions or financial advice.",
    "Liquidity can disappear without warning; exits may be impossible at quoted prices.",
    "Only invest what you can afford to lose entirely.",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskPreset {
    pub max_tokens: usize,
    pub established_ratio: f64,
    pub new_ratio: f64,
    pub speculative_ratio: f64,
    pub min_safety_score: f64,
}

impl RiskPreset {
    pub fn for_tolerance(tolerance: RiskTolerance) -> Self {
        match tolerance {
            RiskTolerance::Conservative => Self {
                max_tokens: 5,
                established_ratio: 0.7,
                new_ratio: 0.3,
                speculative_ratio: 0.0,
                min_safety_score: 80.0,
            },
            RiskTolerance::Moderate => Self {
                max_tokens: 8,
                established_ratio: 0.5,
                new_ratio: 0.3,
                speculative_ratio: 0.2,
                min_safety_score: 70.0,
            },
            RiskTolerance::Aggressive => Self {
                max_tokens: 12,
                established_ratio: 0.3,
                new_ratio: 0.4,
                speculative_ratio: 0.3,
                min_safety_score: 60.0,
            },
            RiskTolerance::VeryAggressive => Self {
                max_tokens: 15,
                established_ratio: 0.2,
                new_ratio: 0.4,
                speculative_ratio: 0.4,
                min_safety_score: 50.0,
            },
        }
    }

    pub fn category_for(&self, safety_score: f64) -> AllocationCategory {
        if safety_score >= self.min_safety_score {
            AllocationCategory::Established
        } else if safety_score >= self.min_safety_score * NEW_SAFETY_FRACTION {
            AllocationCategory::New
        } else {
            AllocationCategory::Speculative
        }
    }

    /// Bucket size cap; a non-empty bucket always keeps at least one token.
    pub fn bucket_limit(&self, category: AllocationCategory) -> usize {
        let share = match category {
            AllocationCategory::Established => ESTABLISHED_SHARE,
            AllocationCategory::New => NEW_SHARE,
            AllocationCategory::Speculative => SPECULATIVE_SHARE,
        };
        ((self.max_tokens as f64 * share).floor() as usize).max(1)
    }

    pub fn ratio(&self, category: AllocationCategory) -> f64 {
        match category {
            AllocationCategory::Established => self.established_ratio,
            AllocationCategory::New => self.new_ratio,
            AllocationCategory::Speculative => self.speculative_ratio,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioCandidate {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub safety_score: f64,
    pub opportunity_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub token: String,
    pub name: String,
    pub symbol: String,
    pub amount_usd: f64,
    pub category: AllocationCategory,
    pub reasoning: String,
    pub opportunity_score: f64,
    pub safety_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub entry: String,
    pub exit: String,
    pub time_horizon: String,
    pub rebalancing: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioPlan {
    pub risk_tolerance: RiskTolerance,
    pub investment_size: f64,
    pub preset: RiskPreset,
    pub allocations: Vec<AllocationEntry>,
    pub total_allocated: f64,
    pub unallocated: f64,
    pub strategy: Strategy,
    pub disclaimers: Vec<String>,
}

/// Buckets candidates by safety, keeps the best of each bucket and splits
/// the investment across them with weights decaying by rank.
pub fn allocate_portfolio(
    candidates: &[PortfolioCandidate],
    investment_size: f64,
    tolerance: RiskTolerance,
    existing_portfolio: &[String],
) -> PortfolioPlan {
    let preset = RiskPreset::for_tolerance(tolerance);
    let investment = if investment_size.is_finite() {
        investment_size.max(0.0)
    } else {
        0.0
    };

    let established = select_bucket(candidates, &preset, AllocationCategory::Established, existing_portfolio);
    let new = select_bucket(candidates, &preset, AllocationCategory::New, existing_portfolio);
    let speculative = select_bucket(candidates, &preset, AllocationCategory::Speculative, existing_portfolio);

    let mut allocations = Vec::new();
    let established_total = distribute(
        &established,
        investment * preset.established_ratio,
        AllocationCategory::Established,
        &preset,
        &mut allocations,
    );
    let new_total = distribute(
        &new,
        investment * preset.new_ratio,
        AllocationCategory::New,
        &preset,
        &mut allocations,
    );
    let remaining = (investment - established_total - new_total).max(0.0);
    let speculative_budget = (investment * preset.speculative_ratio).min(remaining);
    distribute(
        &speculative,
        speculative_budget,
        AllocationCategory::Speculative,
        &preset,
        &mut allocations,
    );

    let total_allocated = round_cents(allocations.iter().map(|entry| entry.amount_usd).sum());
    PortfolioPlan {
        risk_tolerance: tolerance,
        investment_size: investment,
        preset,
        allocations,
        total_allocated,
        unallocated: round_cents((investment - total_allocated).max(0.0)),
        strategy: strategy_for(tolerance),
        disclaimers: PORTFOLIO_DISCLAIMERS.iter().map(|line| line.to_string()).collect(),
    }
}

fn select_bucket<'a>(
    candidates: &'a [PortfolioCandidate],
    preset: &RiskPreset,
    category: AllocationCategory,
    existing_portfolio: &[String],
) -> Vec<&'a PortfolioCandidate> {
    if preset.ratio(category) <= 0.0 {
        return Vec::new();
    }
    let held: HashSet<&str> = existing_portfolio.iter().map(|token| token.trim()).collect();
    let mut seen = HashSet::new();
    let mut bucket: Vec<&PortfolioCandidate> = candidates
        .iter()
        .filter(|candidate| preset.category_for(candidate.safety_score) == category)
        .filter(|candidate| !held.contains(candidate.address.trim()))
        .filter(|candidate| seen.insert(candidate.address.trim()))
        .collect();

    bucket.sort_by(|a, b| {
        b.opportunity_score
            .partial_cmp(&a.opportunity_score)
            .unwrap_or(Ordering::Equal)
    });
    bucket.truncate(preset.bucket_limit(category));
    bucket
}

/// Appends the bucket's entries and returns the dollars actually allocated.
fn distribute(
    bucket: &[&PortfolioCandidate],
    bucket_allocation: f64,
    category: AllocationCategory,
    preset: &RiskPreset,
    allocations: &mut Vec<AllocationEntry>,
) -> f64 {
    if bucket.is_empty() || bucket_allocation <= 0.0 {
        return 0.0;
    }
    let size = bucket.len() as f64;
    let mut allocated = 0.0;

    for (index, candidate) in bucket.iter().enumerate() {
        let weight = position_weight(index, bucket.len());
        // Floor, not round: rounding up across positions can overshoot the investment.
        let amount = floor_cents(bucket_allocation * weight / size);
        if amount <= 0.0 {
            continue;
        }
        allocated += amount;
        allocations.push(AllocationEntry {
            token: candidate.address.clone(),
            name: candidate.name.clone(),
            symbol: candidate.symbol.clone(),
            amount_usd: amount,
            category,
            reasoning: reasoning(candidate, category, preset, index, bucket.len(), amount),
            opportunity_score: candidate.opportunity_score,
            safety_score: candidate.safety_score,
        });
    }
    allocated
}

/// 1.0 for the top pick, decaying linearly towards 0.5 for the last.
pub fn position_weight(index: usize, bucket_size: usize) -> f64 {
    if bucket_size == 0 {
        return 0.0;
    }
    1.0 - (index as f64 / bucket_size as f64) * 0.5
}

fn reasoning(
    candidate: &PortfolioCandidate,
    category: AllocationCategory,
    preset: &RiskPreset,
    index: usize,
    bucket_size: usize,
    amount: f64,
) -> String {
    let qualifier = match category {
        AllocationCategory::Established => format!(
            "safety {}/100 meets the {} minimum",
            format_float(candidate.safety_score, 0),
            format_float(preset.min_safety_score, 0)
        ),
        AllocationCategory::New => format!(
            "safety {}/100 is close to the {} minimum",
            format_float(candidate.safety_score, 0),
            format_float(preset.min_safety_score, 0)
        ),
        AllocationCategory::Speculative => format!(
            "high-risk pick with safety {}/100",
            format_float(candidate.safety_score, 0)
        ),
    };
    format!(
        "{} position #{} of {} ({}): {}; opportunity score {}.",
        category.label(),
        index + 1,
        bucket_size,
        format_usd(amount),
        qualifier,
        format_float(candidate.opportunity_score, 2)
    )
}

pub fn strategy_for(tolerance: RiskTolerance) -> Strategy {
    let (entry, exit, time_horizon, rebalancing) = match tolerance {
        RiskTolerance::Conservative => (
            "Enter in three equal tranches over several days; skip tokens that pump more than 30% in a day.",
            "Take 50% profit at 2x, move stops to breakeven, exit fully on a 20% drawdown.",
            "Weeks to a few months.",
            "Review weekly; drop any token whose safety score falls below 80.",
        ),
        RiskTolerance::Moderate => (
            "Enter in two tranches; buy dips on tokens with stable liquidity.",
            "Take partial profit at 2x and 3x, stop loss at 30% below entry.",
            "One to six weeks.",
            "Review every few days; rotate out of tokens with fading social traction.",
        ),
        RiskTolerance::Aggressive => (
            "Enter early on meme momentum with full position sizes on top picks.",
            "Scale out at 3x and 5x, hard stop at 40% below entry.",
            "Days to two weeks.",
            "Review daily; recycle profits into new trending memes.",
        ),
        RiskTolerance::VeryAggressive => (
            "Ape early on the strongest meme correlations; accept full loss on any single position.",
            "Recover the initial stake at 2x and let the rest ride with a trailing stop.",
            "Hours to days.",
            "Monitor continuously; exit immediately on liquidity pulls or authority changes.",
        ),
    };
    Strategy {
        entry: entry.to_string(),
        exit: exit.to_string(),
        time_horizon: time_horizon.to_string(),
        rebalancing: rebalancing.to_string(),
    }
}

fn floor_cents(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    (value * 100.0 + 1e-9).floor() / 100.0
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
