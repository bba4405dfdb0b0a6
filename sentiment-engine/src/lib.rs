pub mod aggregator;
pub mod lexicon;
pub mod scorer;

pub use aggregator::CommentAggregator;
pub use lexicon::Lexicon;
pub use scorer::{PainPointMatch, SentimentScore, TextScorer};
