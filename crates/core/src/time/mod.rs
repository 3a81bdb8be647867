pub mod lookback;

pub use lookback::{Lookback, TimeWindow};
