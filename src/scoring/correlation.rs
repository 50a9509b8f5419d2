use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::TrendingMeme;

const SYMBOL_BONUS: f64 = 0.3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Entries at or below this correlation are dropped.
    pub min_correlation: f64,
    /// Entries at or above this correlation are written to the audit store.
    pub persist_threshold: f64,
    /// Any entry at or above this marks the token as a predicted opportunity.
    pub opportunity_threshold: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            min_correlation: 0.1,
            persist_threshold: 0.3,
            opportunity_threshold: 0.6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrelationEntry {
    pub meme_name: String,
    pub correlation_score: f64,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct MemeCorrelator {
    config: CorrelationConfig,
}

impl MemeCorrelator {
    pub fn new(config: CorrelationConfig) -> Self {
        Self { config }
    }

    /// Correlates a token against every meme, keeping entries above the
    /// minimum and ordering them strongest first. Ties keep feed order.
    pub fn correlate(&self, name: &str, symbol: &str, memes: &[TrendingMeme]) -> Vec<CorrelationEntry> {
        let name_words = word_set(name);
        let mut entries: Vec<CorrelationEntry> = memes
            .iter()
            .map(|meme| CorrelationEntry {
                meme_name: meme.name.clone(),
                correlation_score: correlation_with_words(&name_words, symbol, &meme.name),
                source: meme.source.clone(),
            })
            .filter(|entry| entry.correlation_score > self.config.min_correlation)
            .collect();

        entries.sort_by(|a, b| {
            b.correlation_score
                .partial_cmp(&a.correlation_score)
                .unwrap_or(Ordering::Equal)
        });
        entries
    }

    pub fn persistable<'a>(&self, entries: &'a [CorrelationEntry]) -> Vec<&'a CorrelationEntry> {
        entries
            .iter()
            .filter(|entry| entry.correlation_score >= self.config.persist_threshold)
            .collect()
    }

    pub fn is_predicted_opportunity(&self, entries: &[CorrelationEntry]) -> bool {
        entries
            .iter()
            .any(|entry| entry.correlation_score >= self.config.opportunity_threshold)
    }
}

/// Lowercased words of `text`, split on anything that is not alphanumeric
/// or an underscore.
pub fn word_set(text: &str) -> HashSet<String> {
    text.split(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .collect()
}

pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    if intersection == 0 {
        return 0.0;
    }
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Lexical correlation of a token (name + symbol) with a meme name, in 0..=1.
pub fn correlation(name: &str, symbol: &str, meme_name: &str) -> f64 {
    correlation_with_words(&word_set(name), symbol, meme_name)
}

fn correlation_with_words(name_words: &HashSet<String>, symbol: &str, meme_name: &str) -> f64 {
    let mut score = jaccard(name_words, &word_set(meme_name));
    let symbol = symbol.trim().to_lowercase();
    if !symbol.is_empty() && meme_name.to_lowercase().contains(&symbol) {
        score += SYMBOL_BONUS;
    }
    score.min(1.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingMemeOpportunity {
    pub meme_name: String,
    pub source: String,
    pub observed_at: DateTime<Utc>,
    pub candidate_names: Vec<String>,
}

/// Trending memes that no known token is named after (case-insensitive exact
/// match), each with suggested token-name themes.
pub fn find_missing_memes(memes: &[TrendingMeme], known_token_names: &[String]) -> Vec<MissingMemeOpportunity> {
    let known: HashSet<String> = known_token_names
        .iter()
        .map(|name| name.trim().to_lowercase())
        .collect();
    let mut seen = HashSet::new();

    memes
        .iter()
        .filter(|meme| {
            let key = meme.name.trim().to_lowercase();
            !key.is_empty() && !known.contains(&key) && seen.insert(key)
        })
        .map(|meme| MissingMemeOpportunity {
            meme_name: meme.name.clone(),
            source: meme.source.clone(),
            observed_at: meme.observed_at,
            candidate_names: candidate_token_names(&meme.name),
        })
        .collect()
}

pub fn candidate_token_names(meme_name: &str) -> Vec<String> {
    let meme = meme_name.trim();
    let words: Vec<&str> = meme.split_whitespace().collect();
    let mut candidates = vec![format!("{} Coin", meme), format!("{} Token", meme)];

    if words.len() > 1 {
        let acronym: String = words
            .iter()
            .filter_map(|word| word.chars().find(|ch| ch.is_alphanumeric()))
            .flat_map(|ch| ch.to_uppercase())
            .collect();
        if !acronym.is_empty() {
            candidates.push(acronym);
        }
        candidates.push(format!("{} Coin", words[0]));
    }

    let mut seen = HashSet::new();
    candidates.retain(|candidate| seen.insert(candidate.to_lowercase()));
    candidates
}
