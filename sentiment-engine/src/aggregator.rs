use threadpulse_core::{
    AnalysisError, AnalysisSummary, PainPoint, RecommendedAction, ScoredComment,
    SentimentBreakdown, SentimentLabel, Theme,
};
use tracing::debug;

pub const MAX_PAIN_POINTS: usize = 20;
pub const MAX_THEMES: usize = 10;
pub const MAX_PAIN_POINT_TEXT: usize = 200;

/// Comments scoring below this are pain points even when labelled neutral.
const PAIN_POINT_SCORE_CUTOFF: f64 = -0.05;

#[derive(Debug, Clone, Default)]
pub struct CommentAggregator;

impl CommentAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, comments: &[ScoredComment]) -> Result<AnalysisSummary, AnalysisError> {
        if comments.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        let total = comments.len();

        let mut pain_points: Vec<&ScoredComment> =
            comments.iter().filter(|c| is_pain_point(c)).collect();
        pain_points.sort_by(|a, b| {
            b.pain_point_severity
                .cmp(&a.pain_point_severity)
                .then_with(|| a.sentiment_score.total_cmp(&b.sentiment_score))
        });

        let themes = tally_themes(&pain_points);

        let count = |label: SentimentLabel| {
            comments
                .iter()
                .filter(|c| c.sentiment_label == label)
                .count()
        };
        let positive = count(SentimentLabel::Positive);
        let negative = count(SentimentLabel::Negative);
        let neutral = count(SentimentLabel::Neutral);

        let mean = comments.iter().map(|c| c.sentiment_score).sum::<f64>() / total as f64;
        let average_sentiment = round_to(mean, 3);

        debug!(
            "Summarized {} comments: {} pain points, {} themes, average {}",
            total,
            pain_points.len(),
            themes.len(),
            average_sentiment
        );

        Ok(AnalysisSummary {
            total_comments: total,
            sentiment_breakdown: SentimentBreakdown {
                positive,
                negative,
                neutral,
                positive_percentage: percentage(positive, total),
                negative_percentage: percentage(negative, total),
                neutral_percentage: percentage(neutral, total),
            },
            average_sentiment,
            overall_sentiment: SentimentLabel::from_score(average_sentiment),
            pain_point_count: pain_points.len(),
            pain_point_percentage: percentage(pain_points.len(), total),
            top_pain_point_themes: themes,
            top_pain_points: pain_points
                .iter()
                .take(MAX_PAIN_POINTS)
                .map(|c| PainPoint {
                    text: truncate(&c.text, MAX_PAIN_POINT_TEXT),
                    sentiment_score: c.sentiment_score,
                    severity: c.pain_point_severity,
                    keywords: c.pain_point_keywords.clone(),
                })
                .collect(),
            recommended_action: RecommendedAction::from_average(average_sentiment),
        })
    }
}

fn is_pain_point(comment: &ScoredComment) -> bool {
    comment.sentiment_label == SentimentLabel::Negative
        || comment.is_pain_point
        || comment.sentiment_score < PAIN_POINT_SCORE_CUTOFF
}

/// Counts keywords in first-seen order; the stable sort keeps that order for ties.
fn tally_themes(pain_points: &[&ScoredComment]) -> Vec<Theme> {
    let mut themes: Vec<Theme> = Vec::new();
    for keyword in pain_points.iter().flat_map(|c| &c.pain_point_keywords) {
        match themes.iter_mut().find(|t| &t.keyword == keyword) {
            Some(theme) => theme.count += 1,
            None => themes.push(Theme {
                keyword: keyword.clone(),
                count: 1,
            }),
        }
    }
    themes.sort_by(|a, b| b.count.cmp(&a.count));
    themes.truncate(MAX_THEMES);
    themes
}

fn percentage(count: usize, total: usize) -> u32 {
    round_half_up(count as f64 / total as f64 * 100.0) as u32
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    round_half_up(value * factor) / factor
}

// Halves round towards positive infinity, so -0.5 becomes 0.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
