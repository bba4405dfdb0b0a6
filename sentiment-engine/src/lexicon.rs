//! Word lists driving the comment scorer.
//!
//! Sentiment and negation words are matched against whole lower-cased
//! tokens. Pain-point phrases are matched as substrings and are scanned in
//! the order they appear in [`PAIN_POINT_PHRASES`].

use std::collections::HashSet;

pub const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "amazing",
    "awesome",
    "love",
    "like",
    "best",
    "fantastic",
    "wonderful",
    "perfect",
    "happy",
    "helpful",
    "nice",
    "recommend",
    "useful",
    "easy",
    "fast",
    "beautiful",
    "brilliant",
    "enjoy",
    "impressive",
    "reliable",
    "solid",
    "smooth",
    "favorite",
    "glad",
    "thanks",
    "cool",
    "works",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "horrible",
    "hate",
    "worst",
    "poor",
    "broken",
    "useless",
    "slow",
    "buggy",
    "annoying",
    "frustrating",
    "disappointing",
    "disappointed",
    "sucks",
    "garbage",
    "trash",
    "wrong",
    "fail",
    "failed",
    "fails",
    "problem",
    "issue",
    "error",
    "crash",
    "expensive",
    "difficult",
    "confusing",
    "ugly",
    "angry",
    "waste",
];

pub const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "isn't", "wasn't", "aren't", "won't", "can't",
    "cannot", "didn't", "shouldn't", "wouldn't", "couldn't", "nothing", "neither", "nor",
    "hardly",
];

pub const PAIN_POINT_PHRASES: &[&str] = &[
    "bug",
    "crash",
    "broken",
    "error",
    "terrible",
    "awful",
    "doesn't work",
    "not working",
    "stopped working",
    "issue",
    "problem",
    "slow",
    "laggy",
    "freeze",
    "glitch",
    "overpriced",
    "too expensive",
    "refund",
    "frustrating",
    "annoying",
    "confusing",
    "difficult",
    "useless",
    "unusable",
    "waste of",
    "disappointed",
    "missing",
    "complaint",
];

/// Phrases that weigh 2 towards severity instead of 1.
pub const HIGH_SEVERITY_PHRASES: &[&str] = &["broken", "crash", "error", "bug", "terrible", "awful"];

#[derive(Debug, Clone)]
pub struct Lexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
    negations: HashSet<String>,
    pain_points: Vec<String>,
    high_severity: HashSet<String>,
}

impl Lexicon {
    pub fn new(
        positive: &[&str],
        negative: &[&str],
        negations: &[&str],
        pain_points: &[&str],
        high_severity: &[&str],
    ) -> Self {
        let set = |words: &[&str]| words.iter().map(|w| w.to_lowercase()).collect();
        Self {
            positive: set(positive),
            negative: set(negative),
            negations: set(negations),
            pain_points: pain_points.iter().map(|p| p.to_lowercase()).collect(),
            high_severity: set(high_severity),
        }
    }

    pub fn is_positive(&self, token: &str) -> bool {
        self.positive.contains(token)
    }

    pub fn is_negative(&self, token: &str) -> bool {
        self.negative.contains(token)
    }

    pub fn is_negation(&self, token: &str) -> bool {
        self.negations.contains(token)
    }

    pub fn pain_points(&self) -> &[String] {
        &self.pain_points
    }

    pub fn severity_of(&self, phrase: &str) -> u32 {
        if self.high_severity.contains(phrase) {
            2
        } else {
            1
        }
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(
            POSITIVE_WORDS,
            NEGATIVE_WORDS,
            NEGATION_WORDS,
            PAIN_POINT_PHRASES,
            HIGH_SEVERITY_PHRASES,
        )
    }
}
