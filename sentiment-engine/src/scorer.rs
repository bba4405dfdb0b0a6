use crate::lexicon::Lexicon;
use threadpulse_core::{ScoredComment, SentimentLabel};

/// How many tokens after a negation word have their polarity flipped.
const NEGATION_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentScore {
    pub score: f64,
    pub label: SentimentLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PainPointMatch {
    pub is_pain_point: bool,
    pub keywords: Vec<String>,
    pub severity: u32,
}

/// Deterministic lexicon scorer. Holds no state besides its word lists.
#[derive(Debug, Clone, Default)]
pub struct TextScorer {
    lexicon: Lexicon,
}

impl TextScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn score(&self, text: &str) -> SentimentScore {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();

        let mut raw: i64 = 0;
        for token in &tokens {
            if self.lexicon.is_positive(token) {
                raw += 1;
            }
            if self.lexicon.is_negative(token) {
                raw -= 1;
            }
        }

        // Overlapping windows are applied once per covering negation.
        for (i, token) in tokens.iter().enumerate() {
            if !self.lexicon.is_negation(token) {
                continue;
            }
            for following in tokens.iter().skip(i + 1).take(NEGATION_WINDOW) {
                if self.lexicon.is_positive(following) {
                    raw -= 2;
                }
                if self.lexicon.is_negative(following) {
                    raw += 2;
                }
            }
        }

        let token_count = tokens.len().max(1) as f64;
        let score = raw as f64 / (token_count / 10.0).max(1.0);

        SentimentScore {
            score,
            label: SentimentLabel::from_score(score),
        }
    }

    pub fn detect_pain_points(&self, text: &str) -> PainPointMatch {
        let lowered = text.to_lowercase();

        let keywords: Vec<String> = self
            .lexicon
            .pain_points()
            .iter()
            .filter(|phrase| lowered.contains(phrase.as_str()))
            .cloned()
            .collect();
        let severity = keywords
            .iter()
            .map(|keyword| self.lexicon.severity_of(keyword))
            .sum();

        PainPointMatch {
            is_pain_point: !keywords.is_empty(),
            keywords,
            severity,
        }
    }

    pub fn score_comment(&self, text: &str) -> ScoredComment {
        let sentiment = self.score(text);
        let pain = self.detect_pain_points(text);

        ScoredComment {
            text: text.to_string(),
            sentiment_label: sentiment.label,
            sentiment_score: sentiment.score,
            is_pain_point: pain.is_pain_point,
            pain_point_keywords: pain.keywords,
            pain_point_severity: pain.severity,
        }
    }
}
