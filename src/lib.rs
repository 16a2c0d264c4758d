//! Spaced-repetition tracking of vocabulary mastery.
//!
//! [`Scheduler`] turns one answer into the next review state. [`Reviewer`] drives it against a
//! [`ProgressStore`], re-reading and recomputing when a concurrent writer wins the race.

pub mod clock;
pub mod config;
pub mod jitter;
pub mod review;
pub mod schedule;
pub mod state;
pub mod stats;
pub mod store;
mod timestamp;

pub use clock::Clock;
pub use clock::UtcClock;
pub use config::Config;
pub use jitter::Jitter;
pub use jitter::NoJitter;
pub use jitter::RandomJitter;
pub use review::Reviewer;
pub use schedule::Scheduler;
pub use state::Answer;
pub use state::Difficulty;
pub use state::ItemKey;
pub use state::Outcome;
pub use state::ReviewState;
pub use stats::ProgressStats;
pub use store::DueQuery;
pub use store::ProgressStore;
pub use store::SqliteStore;
pub use store::StoreError;
