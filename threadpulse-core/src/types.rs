use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAX_TOPIC_LENGTH: usize = 100;

/// Normalized Reddit post as surfaced to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub external_id: String,
    pub title: String,
    pub author: String,
    pub subreddit: String,
    pub upvotes: i64,
    pub comment_count: i64,
    pub permalink: String,
    pub created_at: i64,
    pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Hot,
    New,
    Top,
    Rising,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Hot => "hot",
            SortBy::New => "new",
            SortBy::Top => "top",
            SortBy::Rising => "rising",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(SortBy::Hot),
            "new" => Ok(SortBy::New),
            "top" => Ok(SortBy::Top),
            "rising" => Ok(SortBy::Rising),
            other => Err(CoreError::Validation {
                field: "sortBy".to_string(),
                message: format!("unsupported sort '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    #[default]
    All,
    Year,
    Month,
    Week,
    Day,
    Hour,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::All => "all",
            TimeFilter::Year => "year",
            TimeFilter::Month => "month",
            TimeFilter::Week => "week",
            TimeFilter::Day => "day",
            TimeFilter::Hour => "hour",
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TimeFilter::All),
            "year" => Ok(TimeFilter::Year),
            "month" => Ok(TimeFilter::Month),
            "week" => Ok(TimeFilter::Week),
            "day" => Ok(TimeFilter::Day),
            "hour" => Ok(TimeFilter::Hour),
            other => Err(CoreError::Validation {
                field: "timeFilter".to_string(),
                message: format!("unsupported time filter '{}'", other),
            }),
        }
    }
}

/// A validated search. Construct through [`SearchRequest::new`] so the topic
/// bounds always hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    topic: String,
    pub sort_by: SortBy,
    pub time_filter: TimeFilter,
}

impl SearchRequest {
    pub fn new(
        topic: impl Into<String>,
        sort_by: SortBy,
        time_filter: TimeFilter,
    ) -> Result<Self, CoreError> {
        let topic = topic.into();
        if topic.is_empty() {
            return Err(CoreError::Validation {
                field: "topic".to_string(),
                message: "Topic is required".to_string(),
            });
        }
        if topic.chars().count() > MAX_TOPIC_LENGTH {
            return Err(CoreError::Validation {
                field: "topic".to_string(),
                message: format!("Topic must be less than {} characters", MAX_TOPIC_LENGTH),
            });
        }

        Ok(Self {
            topic,
            sort_by,
            time_filter,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the subreddit name when the topic is written as `r/<name>`.
    /// The prefix matches in any case, like the cache key.
    pub fn channel(&self) -> Option<&str> {
        let prefix = self.topic.get(..2)?;
        if !prefix.eq_ignore_ascii_case("r/") {
            return None;
        }
        Some(self.topic[2..].trim()).filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const THRESHOLD: f64 = 0.1;

    pub fn from_score(score: f64) -> Self {
        if score > Self::THRESHOLD {
            SentimentLabel::Positive
        } else if score < -Self::THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comment after scoring. Derived on demand and never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredComment {
    pub text: String,
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
    pub is_pain_point: bool,
    pub pain_point_keywords: Vec<String>,
    pub pain_point_severity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub positive_percentage: u32,
    pub negative_percentage: u32,
    pub neutral_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PainPoint {
    pub text: String,
    pub sentiment_score: f64,
    pub severity: u32,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendedAction {
    #[serde(rename = "Immediate attention needed")]
    ImmediateAttention,
    #[serde(rename = "Monitor closely")]
    MonitorClosely,
    #[serde(rename = "Generally positive feedback")]
    GenerallyPositive,
}

impl RecommendedAction {
    pub fn from_average(average: f64) -> Self {
        if average < -0.2 {
            RecommendedAction::ImmediateAttention
        } else if average < 0.0 {
            RecommendedAction::MonitorClosely
        } else {
            RecommendedAction::GenerallyPositive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::ImmediateAttention => "Immediate attention needed",
            RecommendedAction::MonitorClosely => "Monitor closely",
            RecommendedAction::GenerallyPositive => "Generally positive feedback",
        }
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_comments: usize,
    pub sentiment_breakdown: SentimentBreakdown,
    pub average_sentiment: f64,
    pub overall_sentiment: SentimentLabel,
    pub pain_point_count: usize,
    pub pain_point_percentage: u32,
    pub top_pain_point_themes: Vec<Theme>,
    pub top_pain_points: Vec<PainPoint>,
    pub recommended_action: RecommendedAction,
}
