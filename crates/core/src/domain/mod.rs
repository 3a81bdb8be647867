pub mod analytics;
pub mod news;
pub mod outcome;
pub mod sentiment;
