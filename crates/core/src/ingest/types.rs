use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub users: Vec<LeaderboardUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// One rating discipline in a user's rating history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingHistoryCategory {
    pub name: String,
    #[serde(default)]
    pub points: Vec<RawRatingPoint>,
}

/// `[year, zero_based_month, day, rating]` as sent on the wire.
///
/// Kept as a raw JSON value so one malformed point can be discarded during
/// reconstruction without failing the whole history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRatingPoint(pub Value);

impl RawRatingPoint {
    pub fn new(year: i64, zero_based_month: i64, day: i64, rating: i64) -> Self {
        Self(Value::from(vec![year, zero_based_month, day, rating]))
    }

    /// The four integer components, or `None` when the point is not an
    /// array of exactly four integers.
    pub fn components(&self) -> Option<[i64; 4]> {
        let arr = self.0.as_array()?;
        if arr.len() != 4 {
            return None;
        }
        let mut out = [0i64; 4];
        for (slot, v) in out.iter_mut().zip(arr) {
            *slot = v.as_i64()?;
        }
        Some(out)
    }
}
