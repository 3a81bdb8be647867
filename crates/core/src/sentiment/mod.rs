pub mod cache;
pub mod lexicon;
pub mod scorer;

pub use cache::ScoreCache;
pub use lexicon::Lexicon;
pub use scorer::SentimentScorer;
