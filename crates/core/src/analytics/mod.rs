//! Pure aggregation pipeline: merge → filter → group → summarize.

pub mod aggregate;
pub mod group;
pub mod merge;
pub mod topics;

pub use aggregate::{aggregate, Aggregator};
pub use group::{filter_by_window, group_by_label, LabelGroups};
pub use merge::merge;
pub use topics::extract_topics;
