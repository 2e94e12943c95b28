pub mod aggregator;
pub mod recorder;

pub use aggregator::SubscriptionPointsAggregator;
pub use recorder::ScoreRecorder;
