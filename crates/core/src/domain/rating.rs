use anyhow::ensure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A leaderboard participant, identified by the remote service's username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
}

impl Entity {
    pub fn try_new(id: impl Into<String>) -> anyhow::Result<Self> {
        let id = id.into().trim().to_string();
        ensure!(!id.is_empty(), "entity id must be non-empty");
        Ok(Self { id })
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// An entity together with its 1-based position on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntity {
    pub rank: usize,
    pub entity: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingObservation {
    pub date: NaiveDate,
    pub rating: i32,
}

/// The rating discipline a run is configured for.
///
/// The key is sent to the leaderboard endpoint exactly as configured
/// (`classical`, `ultraBullet`), so its casing must match the service's.
/// Rating history entries are named in capitalized form (`Classical`,
/// `UltraBullet`, `King of the Hill`) and are matched loosely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RatingCategory(String);

impl RatingCategory {
    pub fn try_new(raw: &str) -> anyhow::Result<Self> {
        let key = raw.trim().to_string();
        ensure!(!key.is_empty(), "rating category must be non-empty");
        ensure!(
            key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
            "rating category contains unsupported characters: {raw}"
        );
        Ok(Self(key))
    }

    pub fn leaderboard_key(&self) -> &str {
        &self.0
    }

    pub fn history_name(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }

    /// Case-insensitive, ignoring spaces and punctuation, so `threeCheck`
    /// matches `Three-check` and `kingOfTheHill` matches `King of the Hill`.
    pub fn matches_history_name(&self, name: &str) -> bool {
        let folded = |s: &str| -> String {
            s.chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_lowercase())
                .collect()
        };
        folded(name) == folded(&self.0)
    }
}

impl fmt::Display for RatingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
