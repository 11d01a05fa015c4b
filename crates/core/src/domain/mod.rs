pub mod rating;
pub mod series;

pub use rating::{Entity, RankedEntity, RatingCategory, RatingObservation};
pub use series::{DailyRatingSeries, RatingWindow, WINDOW_DAYS};
