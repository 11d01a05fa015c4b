use crate::domain::{DailyRatingSeries, Entity, RankedEntity, RatingCategory, RatingWindow};
use crate::ingest::provider::RatingProviderClient;
use crate::reconstruct::reconstruct_history;
use crate::report::{AggregatedReport, ReportRow, RowStatus};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Fans history fetch + reconstruction out over a leaderboard with at most
/// `concurrency` requests in flight.
pub struct ConcurrentAggregator {
    provider: Arc<dyn RatingProviderClient>,
    category: RatingCategory,
    concurrency: usize,
}

impl ConcurrentAggregator {
    pub fn new(
        provider: Arc<dyn RatingProviderClient>,
        category: RatingCategory,
        concurrency: usize,
    ) -> Self {
        Self {
            provider,
            category,
            concurrency: concurrency.max(1),
        }
    }

    /// Waits for every entity to resolve, then orders rows by rating on the
    /// reference date (descending, unknown last) and leaderboard rank.
    pub async fn aggregate(
        &self,
        entities: &[RankedEntity],
        reference_date: NaiveDate,
    ) -> AggregatedReport {
        let window = RatingWindow::ending_at(reference_date);
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (slot, ranked) in entities.iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let category = self.category.clone();
            let entity = ranked.entity.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                // The semaphore is never closed, so this only waits.
                let _permit = semaphore.acquire_owned().await;
                let outcome =
                    fetch_series(provider.as_ref(), &category, &entity, reference_date).await;
                (slot, outcome)
            });
        }

        // One slot per leaderboard position; each task fills only its own.
        let mut slots: Vec<Option<(DailyRatingSeries, RowStatus)>> = vec![None; entities.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, outcome)) => slots[slot] = Some(outcome),
                Err(err) => tracing::error!(error = %err, "rating history task aborted"),
            }
        }

        let mut rows: Vec<ReportRow> = entities
            .iter()
            .zip(slots)
            .map(|(ranked, slot)| {
                let (series, status) = slot
                    .unwrap_or_else(|| (DailyRatingSeries::unknown(window), RowStatus::FetchFailed));
                ReportRow {
                    rank: ranked.rank,
                    entity: ranked.entity.clone(),
                    series,
                    status,
                }
            })
            .collect();

        sort_rows(&mut rows);

        AggregatedReport { window, rows }
    }

    /// Series for a single entity, with the same failure absorption as
    /// `aggregate`.
    pub async fn series_for(
        &self,
        entity: &Entity,
        reference_date: NaiveDate,
    ) -> (DailyRatingSeries, RowStatus) {
        fetch_series(self.provider.as_ref(), &self.category, entity, reference_date).await
    }
}

async fn fetch_series(
    provider: &dyn RatingProviderClient,
    category: &RatingCategory,
    entity: &Entity,
    reference_date: NaiveDate,
) -> (DailyRatingSeries, RowStatus) {
    let result = match provider.fetch_rating_history(entity).await {
        Ok(history) => reconstruct_history(reference_date, &history, category, entity),
        Err(err) => Err(err),
    };

    match result {
        Ok(series) => (series, RowStatus::Complete),
        Err(err) if err.is_no_data() => {
            tracing::debug!(%entity, %category, error = %err, "no rating history in category");
            (
                DailyRatingSeries::unknown(RatingWindow::ending_at(reference_date)),
                RowStatus::NoHistory,
            )
        }
        Err(err) => {
            tracing::warn!(
                %entity,
                error_kind = err.kind(),
                error = %err,
                "rating history fetch failed; row will be unknown"
            );
            (
                DailyRatingSeries::unknown(RatingWindow::ending_at(reference_date)),
                RowStatus::FetchFailed,
            )
        }
    }
}

/// Rating on the reference date descending with unknown lowest, then rank
/// ascending.
pub fn sort_rows(rows: &mut [ReportRow]) {
    rows.sort_by(|a, b| {
        b.series
            .latest()
            .cmp(&a.series.latest())
            .then_with(|| a.rank.cmp(&b.rank))
    });
}
