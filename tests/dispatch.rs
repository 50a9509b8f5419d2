use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

use meme_scout::analysis::Collaborators;
use meme_scout::dispatch::{dispatch, CallEnvelope};
use meme_scout::providers::{StaticChainProvider, StaticMarketProvider, StaticMemeFeed, StaticSocialProvider};
use meme_scout::scoring::CorrelationConfig;
use meme_scout::store::{record_id, AuditStore, PersistenceSink, SocialSignalRecord};
use meme_scout::{
    Analyzer, MarketListing, MarketMetrics, Platform, ScoutError, SocialSignal, SocialSnapshot,
    TokenFacts, TrendingMeme,
};

const PEPE: &str = "PepeMint1111111111111111111111111111111111";
const QUIET: &str = "QuietMint111111111111111111111111111111111";
const RISKY: &str = "RiskyMint111111111111111111111111111111111";

fn facts(address: &str, name: &str, symbol: &str) -> TokenFacts {
    TokenFacts {
        address: address.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        supply: 1_000_000_000.0,
        decimals: 6,
        created_at: Some(Utc::now() - Duration::days(3)),
        mint_authority_present: false,
        freeze_authority_present: false,
        holder_count: 500,
        top_holder_percentage: 20.0,
    }
}

fn listing(liquidity: f64) -> MarketListing {
    MarketListing {
        metrics: MarketMetrics {
            price: 0.0001,
            volume_24h: 250_000.0,
            liquidity,
            market_cap: 2_000_000.0,
            price_change_24h: 25.0,
        },
        name: None,
        symbol: None,
        pair_created_at: None,
    }
}

fn meme(name: &str) -> TrendingMeme {
    TrendingMeme {
        name: name.to_string(),
        source: "reddit".to_string(),
        observed_at: Utc::now(),
    }
}

fn setup() -> (Analyzer, Arc<AuditStore>) {
    let risky = TokenFacts {
        mint_authority_present: true,
        freeze_authority_present: true,
        top_holder_percentage: 90.0,
        holder_count: 12,
        ..facts(RISKY, "Rug Dog", "RDOG")
    };
    let chain = StaticChainProvider::new(vec![
        facts(PEPE, "Pepe Frog", "PEPE"),
        facts(QUIET, "Quiet Owl", "QUIET"),
        risky,
    ]);
    let market = StaticMarketProvider::new(vec![
        (PEPE.to_string(), listing(80_000.0)),
        (QUIET.to_string(), listing(15_000.0)),
    ]);
    let social = StaticSocialProvider::new(vec![(
        "PEPE".to_string(),
        SocialSnapshot {
            twitter: SocialSignal {
                count: 420,
                sentiment: 0.6,
                engagement: 12_000.0,
            },
            reddit: SocialSignal {
                count: 35,
                sentiment: 0.2,
                engagement: 900.0,
            },
            telegram: SocialSignal::default(),
        },
    )]);
    let memes = StaticMemeFeed::new(vec![meme("pepe frog"), meme("this is fine"), meme("moo deng")]);
    let store = Arc::new(AuditStore::in_memory(100));

    let analyzer = Analyzer::new(
        Collaborators {
            chain: Arc::new(chain),
            market: Arc::new(market),
            social: Arc::new(social),
            memes: Arc::new(memes),
            sink: store.clone(),
        },
        CorrelationConfig::default(),
    );
    (analyzer, store)
}

async fn call(analyzer: &Analyzer, name: &str, parameters: Value) -> Result<Value, ScoutError> {
    dispatch(
        analyzer,
        CallEnvelope {
            name: name.to_string(),
            parameters,
        },
    )
    .await
}

#[tokio::test]
async fn unknown_function_is_a_client_error() {
    let (analyzer, _) = setup();
    let err = call(&analyzer, "launch_rocket", json!({})).await.unwrap_err();
    assert!(matches!(err, ScoutError::UnknownFunction(_)));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_address_is_invalid_input() {
    let (analyzer, store) = setup();
    for name in ["scan_rugpull", "calculate_hype_score", "score_opportunity"] {
        let err = call(&analyzer, name, json!({})).await.unwrap_err();
        assert!(matches!(err, ScoutError::InvalidInput(_)), "{}", name);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
    let err = call(&analyzer, "scan_rugpull", json!({ "token_address": "   " }))
        .await
        .unwrap_err();
    assert!(matches!(err, ScoutError::InvalidInput(_)));
    assert!(store.snapshot().await.safety_checks.is_empty());
}

#[tokio::test]
async fn rugpull_scan_of_clean_token_is_low_risk() {
    let (analyzer, store) = setup();
    let result = call(&analyzer, "scan_rugpull", json!({ "token_address": PEPE }))
        .await
        .unwrap();
    assert_eq!(result["risk_level"], "Low");
    assert_eq!(result["safety_score"].as_f64(), Some(100.0));
    assert_eq!(result["name"], "Pepe Frog");
    assert_eq!(result["availability"]["chain"], true);

    let log = store.snapshot().await;
    assert_eq!(log.safety_checks.len(), 1);
    assert!(log.safety_checks[0].data_available);
}

#[tokio::test]
async fn rugpull_scan_without_liquidity_or_safe_contract() {
    let (analyzer, _) = setup();
    let result = call(
        &analyzer,
        "scan_rugpull",
        json!({ "tokenAddress": RISKY, "scamSimilarityScore": 40 }),
    )
    .await
    .unwrap();
    // 100 - 20 - 10 - 40 - 17.6 - 30, floored at zero
    assert_eq!(result["contract_safety_score"].as_f64(), Some(0.0));
    assert_eq!(result["safety_score"].as_f64(), Some(18.0));
    assert_eq!(result["risk_level"], "Extreme");
    assert_eq!(result["availability"]["market"], false);
}

#[tokio::test]
async fn unavailable_chain_data_is_pessimistic() {
    let (analyzer, store) = setup();
    let result = call(&analyzer, "scan_rugpull", json!({ "token_address": "GhostMint" }))
        .await
        .unwrap();
    assert_eq!(result["safety_score"].as_f64(), Some(0.0));
    assert_eq!(result["risk_level"], "Extreme");
    assert_eq!(result["availability"]["chain"], false);
    assert!(!result["data_warnings"].as_array().unwrap().is_empty());

    let log = store.snapshot().await;
    assert!(!log.safety_checks[0].data_available);
}

#[tokio::test]
async fn hype_score_persists_only_the_twitter_signal() {
    let (analyzer, store) = setup();
    let result = call(&analyzer, "calculate_hype_score", json!({ "token_address": PEPE }))
        .await
        .unwrap();
    let score = result["hype_score"].as_u64().unwrap();
    assert!(score > 0 && score <= 100);
    assert_eq!(result["symbol"], "PEPE");
    assert_eq!(result["availability"]["social"], true);

    let log = store.snapshot().await;
    assert_eq!(log.hype_scores.len(), 1);
    assert_eq!(log.hype_scores[0].score as u64, score);
    assert_eq!(log.social_signals.len(), 1);
    assert_eq!(log.social_signals[0].platform, Platform::Twitter);
    assert_eq!(log.social_signals[0].mentions, 420);
}

#[tokio::test]
async fn hype_score_without_social_data_still_scores() {
    let (analyzer, store) = setup();
    let result = call(&analyzer, "calculate_hype_score", json!({ "token_address": QUIET }))
        .await
        .unwrap();
    assert_eq!(result["availability"]["social"], false);
    assert!(result["hype_score"].as_u64().is_some());
    assert!(store.snapshot().await.social_signals.is_empty());
}

#[tokio::test]
async fn correlation_resolves_identity_from_the_address() {
    let (analyzer, store) = setup();
    let result = call(&analyzer, "correlate_memes", json!({ "token_address": PEPE }))
        .await
        .unwrap();
    assert_eq!(result["name"], "Pepe Frog");
    assert_eq!(result["top_match"]["meme_name"], "pepe frog");
    assert_eq!(result["predicted_opportunity"], true);
    assert_eq!(result["memes_considered"], 3);

    let log = store.snapshot().await;
    assert_eq!(log.correlations.len(), 1);
    assert!(log.correlations[0].correlation_score >= 0.3);
}

#[tokio::test]
async fn correlation_needs_a_name_or_symbol() {
    let (analyzer, _) = setup();
    let err = call(&analyzer, "correlate_memes", json!({})).await.unwrap_err();
    assert!(matches!(err, ScoutError::InvalidInput(_)));
}

fn opportunity_names(result: &Value) -> Vec<String> {
    result["opportunities"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["meme_name"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn meme_opportunities_exclude_correlated_tokens() {
    let (analyzer, _) = setup();
    call(&analyzer, "correlate_memes", json!({ "token_address": PEPE }))
        .await
        .unwrap();
    let result = call(&analyzer, "find_meme_opportunities", Value::Null).await.unwrap();
    assert_eq!(opportunity_names(&result), vec!["this is fine", "moo deng"]);
    assert_eq!(result["known_tokens"], 1);
}

#[tokio::test]
async fn hype_scored_tokens_do_not_hide_memes() {
    let (analyzer, store) = setup();
    call(&analyzer, "calculate_hype_score", json!({ "token_address": QUIET, "token_name": "moo deng" }))
        .await
        .unwrap();
    assert_eq!(store.snapshot().await.hype_scores[0].token_name, "moo deng");

    let result = call(&analyzer, "find_meme_opportunities", json!({})).await.unwrap();
    assert_eq!(opportunity_names(&result), vec!["pepe frog", "this is fine", "moo deng"]);
    assert_eq!(result["known_tokens"], 0);
}

#[tokio::test]
async fn opportunity_score_falls_back_to_stored_social_history() {
    let (analyzer, store) = setup();
    let now = Utc::now();
    for (mentions, age_days) in [(100u64, 1), (300u64, 2), (900u64, 30)] {
        let recorded_at = now - Duration::days(age_days);
        store
            .record_social_signal(SocialSignalRecord {
                id: record_id(&["social", QUIET, &recorded_at.to_rfc3339()]),
                token_address: QUIET.to_string(),
                platform: Platform::Twitter,
                mentions,
                sentiment: 0.5,
                engagement: 1000.0,
                recorded_at,
            })
            .await
            .unwrap();
    }

    let result = call(&analyzer, "score_opportunity", json!({ "token_address": QUIET }))
        .await
        .unwrap();
    assert_eq!(result["social_source"], "history");
    // mean of the two recent records: 200 mentions, 1000 engagement, 0.5 sentiment
    let expected = (201f64.log10() / 3.0) * 0.4 + (1001f64.log10() / 4.0) * 0.3 + 0.75 * 0.3;
    assert!((result["social_score"].as_f64().unwrap() - expected).abs() < 1e-9);

    let live = call(&analyzer, "score_opportunity", json!({ "token_address": PEPE }))
        .await
        .unwrap();
    assert_eq!(live["social_source"], "live");
    assert!(live["meme_score"].as_f64().unwrap() > 0.2);
}

#[tokio::test]
async fn opportunity_score_uses_prior_without_any_social_data() {
    let (analyzer, _) = setup();
    let result = call(&analyzer, "score_opportunity", json!({ "token_address": RISKY }))
        .await
        .unwrap();
    assert_eq!(result["social_source"], "prior");
    assert!((result["social_score"].as_f64().unwrap() - 0.3).abs() < 1e-9);
}

#[tokio::test]
async fn portfolio_skips_tokens_that_cannot_be_assessed() {
    let (analyzer, store) = setup();
    let result = call(
        &analyzer,
        "build_portfolio",
        json!({
            "candidate_tokens": [PEPE, QUIET, RISKY, "GhostMint", "   "],
            "investment_size": 1000.0,
            "risk_tolerance": "aggressive"
        }),
    )
    .await
    .unwrap();

    assert_eq!(result["evaluated"].as_array().unwrap().len(), 3);
    assert_eq!(result["skipped"].as_array().unwrap().len(), 2);
    let total: f64 = result["allocations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["amount_usd"].as_f64().unwrap())
        .sum();
    assert!(total > 0.0 && total <= 1000.0 + 1e-9);
    assert_eq!(result["risk_tolerance"], "aggressive");
    assert_eq!(store.snapshot().await.allocations.len(), 1);
}

#[tokio::test]
async fn portfolio_rejects_bad_inputs() {
    let (analyzer, _) = setup();
    for params in [
        json!({ "candidate_tokens": [], "investment_size": 100.0 }),
        json!({ "candidate_tokens": [PEPE], "investment_size": 0.0 }),
        json!({ "candidate_tokens": [PEPE], "investment_size": -5.0 }),
        json!({ "candidate_tokens": [PEPE], "investment_size": 100.0, "risk_tolerance": "yolo" }),
        json!({ "investment_size": 100.0 }),
    ] {
        let err = call(&analyzer, "build_portfolio", params).await.unwrap_err();
        assert!(matches!(err, ScoutError::InvalidInput(_)));
    }
}

#[tokio::test]
async fn trending_memes_lists_the_feed() {
    let (analyzer, _) = setup();
    let result = call(&analyzer, "get_trending_memes", json!({})).await.unwrap();
    assert_eq!(result["available"], true);
    assert_eq!(result["memes"].as_array().unwrap().len(), 3);
}
