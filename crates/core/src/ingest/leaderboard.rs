use crate::domain::{Entity, RankedEntity, RatingCategory};
use crate::ingest::error::FetchError;
use crate::ingest::provider::RatingProviderClient;
use crate::ingest::types::LeaderboardUser;
use std::collections::HashSet;

pub struct LeaderboardFetcher<'a> {
    provider: &'a dyn RatingProviderClient,
}

impl<'a> LeaderboardFetcher<'a> {
    pub fn new(provider: &'a dyn RatingProviderClient) -> Self {
        Self { provider }
    }

    /// Top `n` entities in remote rank order. Never fails: transport, format
    /// and empty-leaderboard problems are logged and yield an empty list.
    pub async fn fetch(&self, n: usize, category: &RatingCategory) -> Vec<RankedEntity> {
        match self.try_fetch(n, category).await {
            Ok(entities) => entities,
            Err(err) => {
                tracing::error!(
                    provider = self.provider.provider_name(),
                    %category,
                    n,
                    error_kind = err.kind(),
                    error = %err,
                    "leaderboard fetch failed"
                );
                Vec::new()
            }
        }
    }

    pub async fn try_fetch(
        &self,
        n: usize,
        category: &RatingCategory,
    ) -> Result<Vec<RankedEntity>, FetchError> {
        let users = self.provider.fetch_leaderboard(n, category).await?;
        let entities = validate_users(users, n);
        if entities.is_empty() {
            return Err(FetchError::no_data(
                format!("leaderboard/{category}"),
                "leaderboard has no usable entries",
            ));
        }

        tracing::info!(%category, requested = n, received = entities.len(), "fetched leaderboard");
        Ok(entities)
    }
}

fn validate_users(users: Vec<LeaderboardUser>, n: usize) -> Vec<RankedEntity> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(users.len().min(n));

    for (idx, user) in users.into_iter().take(n).enumerate() {
        let rank = idx + 1;
        let entity = match Entity::try_new(user.username) {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(rank, id = ?user.id, error = %err, "dropping leaderboard entry");
                continue;
            }
        };

        if !seen.insert(entity.id.to_ascii_lowercase()) {
            tracing::warn!(rank, entity = %entity, "dropping duplicate leaderboard entry");
            continue;
        }

        out.push(RankedEntity { rank, entity });
    }

    out
}
