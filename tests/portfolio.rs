use meme_scout::scoring::{allocate_portfolio, PortfolioCandidate, RiskPreset};
use meme_scout::{AllocationCategory, RiskTolerance};

fn candidate(address: &str, safety: f64, opportunity: f64) -> PortfolioCandidate {
    PortfolioCandidate {
        address: address.to_string(),
        name: format!("{} token", address),
        symbol: address.to_uppercase(),
        safety_score: safety,
        opportunity_score: opportunity,
    }
}

fn mixed_candidates() -> Vec<PortfolioCandidate> {
    vec![
        candidate("est-a", 95.0, 0.9),
        candidate("est-b", 90.0, 0.8),
        candidate("est-c", 85.0, 0.7),
        candidate("new-a", 65.0, 0.75),
        candidate("new-b", 60.0, 0.55),
        candidate("risky-a", 20.0, 0.95),
        candidate("risky-b", 10.0, 0.4),
    ]
}

const TOLERANCES: [RiskTolerance; 4] = [
    RiskTolerance::Conservative,
    RiskTolerance::Moderate,
    RiskTolerance::Aggressive,
    RiskTolerance::VeryAggressive,
];

#[test]
fn never_allocates_more_than_the_investment() {
    for tolerance in TOLERANCES {
        for investment in [1.0, 99.99, 1000.0, 12345.67] {
            let plan = allocate_portfolio(&mixed_candidates(), investment, tolerance, &[]);
            let sum: f64 = plan.allocations.iter().map(|entry| entry.amount_usd).sum();
            assert!(sum <= investment + 1e-9, "{:?} {}", tolerance, investment);
            assert!(plan.unallocated >= 0.0);
            assert!((plan.total_allocated + plan.unallocated - investment).abs() < 0.011);
        }
    }
}

#[test]
fn conservative_has_no_speculative_positions() {
    let plan = allocate_portfolio(&mixed_candidates(), 1000.0, RiskTolerance::Conservative, &[]);
    assert!(!plan.allocations.is_empty());
    assert!(plan
        .allocations
        .iter()
        .all(|entry| entry.category != AllocationCategory::Speculative));
}

#[test]
fn categories_follow_the_preset_minimum() {
    let preset = RiskPreset::for_tolerance(RiskTolerance::Moderate);
    assert_eq!(preset.category_for(70.0), AllocationCategory::Established);
    assert_eq!(preset.category_for(49.0), AllocationCategory::New);
    assert_eq!(preset.category_for(48.9), AllocationCategory::Speculative);
}

#[test]
fn top_pick_gets_full_weight_rounded_down() {
    let plan = allocate_portfolio(&mixed_candidates(), 1000.0, RiskTolerance::Moderate, &[]);
    let first = &plan.allocations[0];
    assert_eq!(first.token, "est-a");
    assert_eq!(first.category, AllocationCategory::Established);
    // 500 established budget / 3 positions, weight 1.0
    assert!((first.amount_usd - 166.66).abs() < 1e-9);
}

#[test]
fn existing_holdings_are_never_reallocated() {
    let existing = vec!["est-a".to_string(), "risky-a".to_string()];
    let plan = allocate_portfolio(&mixed_candidates(), 1000.0, RiskTolerance::Aggressive, &existing);
    assert!(plan
        .allocations
        .iter()
        .all(|entry| !existing.contains(&entry.token)));
}

#[test]
fn bucket_limits_keep_the_best_candidates() {
    let candidates: Vec<PortfolioCandidate> = (0..10)
        .map(|i| candidate(&format!("est-{}", i), 90.0, i as f64 / 10.0))
        .collect();
    let plan = allocate_portfolio(&candidates, 1000.0, RiskTolerance::Moderate, &[]);

    // floor(8 * 0.4)
    assert_eq!(plan.allocations.len(), 3);
    let tokens: Vec<&str> = plan.allocations.iter().map(|entry| entry.token.as_str()).collect();
    assert_eq!(tokens, vec!["est-9", "est-8", "est-7"]);
}

#[test]
fn duplicate_candidates_count_once() {
    let candidates = vec![candidate("dup", 90.0, 0.9), candidate("dup", 90.0, 0.9)];
    let plan = allocate_portfolio(&candidates, 500.0, RiskTolerance::Moderate, &[]);
    assert_eq!(plan.allocations.len(), 1);
}

#[test]
fn plan_carries_strategy_and_disclaimers() {
    let plan = allocate_portfolio(&mixed_candidates(), 1000.0, RiskTolerance::VeryAggressive, &[]);
    assert_eq!(plan.disclaimers.len(), 4);
    assert!(!plan.strategy.exit.is_empty());
    assert!(plan
        .allocations
        .iter()
        .any(|entry| entry.category == AllocationCategory::Speculative));
}
