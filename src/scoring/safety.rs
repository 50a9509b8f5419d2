use serde::{Deserialize, Serialize};

use crate::RiskTier;

const MINT_AUTHORITY_PENALTY: f64 = 20.0;
const FREEZE_AUTHORITY_PENALTY: f64 = 10.0;
const NO_LIQUIDITY_PENALTY: f64 = 30.0;
const CONCENTRATION_THRESHOLD: f64 = 50.0;
const CONCENTRATION_PENALTY_CAP: f64 = 40.0;
const MIN_HOLDERS: f64 = 100.0;
const HOLDER_PENALTY_CAP: f64 = 20.0;
const SCAM_WARNING_THRESHOLD: f64 = 30.0;

pub const RISK_DISCLAIMER: &str = "Memecoins are extremely volatile and can lose all value. \
This analysis is heuristic and not financial advice; never invest more than you can afford to lose.";

/// On-chain facts the contract safety score is computed from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SafetyMetrics {
    pub mint_authority_present: bool,
    pub freeze_authority_present: bool,
    pub top_holder_percentage: f64,
    pub holder_count: u64,
    pub has_liquidity: bool,
}

impl SafetyMetrics {
    pub fn pessimistic() -> Self {
        Self {
            mint_authority_present: true,
            freeze_authority_present: true,
            top_holder_percentage: 100.0,
            holder_count: 0,
            has_liquidity: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyAssessment {
    pub contract_safety_score: f64,
    pub scam_similarity_score: f64,
    pub safety_score: f64,
    pub risk_level: RiskTier,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

fn concentration_penalty(top_holder_percentage: f64) -> f64 {
    if top_holder_percentage > CONCENTRATION_THRESHOLD {
        (top_holder_percentage - CONCENTRATION_THRESHOLD).min(CONCENTRATION_PENALTY_CAP)
    } else {
        0.0
    }
}

fn holder_penalty(holder_count: u64) -> f64 {
    let holders = holder_count as f64;
    if holders < MIN_HOLDERS {
        ((MIN_HOLDERS - holders) / 5.0).min(HOLDER_PENALTY_CAP)
    } else {
        0.0
    }
}

/// Contract safety score in 0..=100, independent of scam similarity.
pub fn contract_safety_score(metrics: &SafetyMetrics) -> f64 {
    let mut score = 100.0;
    if metrics.mint_authority_present {
        score -= MINT_AUTHORITY_PENALTY;
    }
    if metrics.freeze_authority_present {
        score -= FREEZE_AUTHORITY_PENALTY;
    }
    let top_holder = if metrics.top_holder_percentage.is_nan() {
        100.0
    } else {
        metrics.top_holder_percentage
    };
    score -= concentration_penalty(top_holder);
    score -= holder_penalty(metrics.holder_count);
    if !metrics.has_liquidity {
        score -= NO_LIQUIDITY_PENALTY;
    }
    score.clamp(0.0, 100.0)
}

/// Blend of contract safety (70%) and dissimilarity to known scams (30%),
/// rounded to an integer value in 0..=100.
pub fn combined_safety_score(contract_score: f64, scam_similarity_score: f64) -> f64 {
    let scam = scam_similarity_score.clamp(0.0, 100.0);
    (contract_score * 0.7 + (100.0 - scam) * 0.3)
        .round()
        .clamp(0.0, 100.0)
}

pub fn safety_warnings(metrics: &SafetyMetrics, scam_similarity_score: f64) -> Vec<String> {
    let mut warnings = Vec::new();
    if metrics.mint_authority_present {
        warnings.push("Mint authority is still active: new supply can be minted at any time.".to_string());
    }
    if metrics.freeze_authority_present {
        warnings.push("Freeze authority is still active: holder accounts can be frozen.".to_string());
    }
    if metrics.top_holder_percentage > CONCENTRATION_THRESHOLD {
        warnings.push(format!(
            "Top holder controls {:.1}% of supply.",
            metrics.top_holder_percentage
        ));
    }
    if (metrics.holder_count as f64) < MIN_HOLDERS {
        warnings.push(format!("Only {} holders found.", metrics.holder_count));
    }
    if !metrics.has_liquidity {
        warnings.push("No liquidity pool detected.".to_string());
    }
    if scam_similarity_score > SCAM_WARNING_THRESHOLD {
        warnings.push(format!(
            "Token resembles known scam patterns ({:.0}% similarity).",
            scam_similarity_score
        ));
    }
    warnings
}

pub fn safety_recommendations(
    tier: RiskTier,
    metrics: &SafetyMetrics,
    scam_similarity_score: f64,
) -> Vec<String> {
    let mut recommendations = vec![match tier {
        RiskTier::Low => "Contract setup looks reasonable; still size positions conservatively.",
        RiskTier::Medium => "Some risk factors present; use small positions and set stop losses.",
        RiskTier::High => "Significant rugpull indicators; only consider with funds you can lose entirely.",
        RiskTier::Extreme => "Extreme risk: avoid this token.",
    }
    .to_string()];

    if metrics.mint_authority_present {
        recommendations.push("- Wait for the mint authority to be revoked before buying.".to_string());
    }
    if metrics.freeze_authority_present {
        recommendations.push("- Be aware your tokens could be frozen by the freeze authority.".to_string());
    }
    if metrics.top_holder_percentage > CONCENTRATION_THRESHOLD {
        recommendations.push("- Watch the top holder wallet; a single sale could crash the price.".to_string());
    }
    if (metrics.holder_count as f64) < MIN_HOLDERS {
        recommendations.push("- Low holder count: expect thin markets and high slippage.".to_string());
    }
    if !metrics.has_liquidity {
        recommendations.push("- Without liquidity you may be unable to sell.".to_string());
    }
    if scam_similarity_score > SCAM_WARNING_THRESHOLD {
        recommendations.push("- Verify the project team and socials independently.".to_string());
    }

    recommendations.push(RISK_DISCLAIMER.to_string());
    recommendations
}

pub fn assess_safety(metrics: &SafetyMetrics, scam_similarity_score: f64) -> SafetyAssessment {
    let scam = if scam_similarity_score.is_finite() {
        scam_similarity_score.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let contract = contract_safety_score(metrics);
    let combined = combined_safety_score(contract, scam);
    let risk_level = RiskTier::from_score(combined);

    SafetyAssessment {
        contract_safety_score: contract,
        scam_similarity_score: scam,
        safety_score: combined,
        risk_level,
        warnings: safety_warnings(metrics, scam),
        recommendations: safety_recommendations(risk_level, metrics, scam),
    }
}

/// Result substituted when the on-chain lookup fails: nothing is trusted.
pub fn pessimistic_assessment(scam_similarity_score: f64) -> SafetyAssessment {
    let metrics = SafetyMetrics::pessimistic();
    let scam = if scam_similarity_score.is_finite() {
        scam_similarity_score.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let mut warnings = vec!["On-chain data unavailable; assuming worst case.".to_string()];
    warnings.extend(safety_warnings(&metrics, scam));

    SafetyAssessment {
        contract_safety_score: 0.0,
        scam_similarity_score: scam,
        safety_score: 0.0,
        risk_level: RiskTier::Extreme,
        warnings,
        recommendations: safety_recommendations(RiskTier::Extreme, &metrics, scam),
    }
}
