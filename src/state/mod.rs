pub mod coverage;
pub mod feed;
pub mod reactivity;

pub use coverage::{classify, MenuCoverage, SubscriptionStatus};
pub use feed::{now_iso, BatchOutcome, Feed, FeedBatch, FeedRecord};
pub use reactivity::ReactiveState;
