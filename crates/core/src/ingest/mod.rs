pub mod error;
pub mod leaderboard;
pub mod provider;
pub mod types;

pub use error::FetchError;
pub use leaderboard::LeaderboardFetcher;
pub use provider::{HttpRatingProvider, RatingProviderClient};
