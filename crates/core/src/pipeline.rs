use crate::aggregate::ConcurrentAggregator;
use crate::config::Settings;
use crate::domain::{DailyRatingSeries, RankedEntity, RatingCategory};
use crate::ingest::leaderboard::LeaderboardFetcher;
use crate::ingest::provider::RatingProviderClient;
use crate::report::{ReportSink, RowStatus};
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub category: RatingCategory,
    pub leaderboard_size: usize,
    pub concurrency: usize,
}

impl RunOptions {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        settings.validate()?;
        Ok(Self {
            category: RatingCategory::try_new(&settings.rating_category)?,
            leaderboard_size: settings.leaderboard_size,
            concurrency: settings.fetch_concurrency,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub reference_date: NaiveDate,
    pub rows: usize,
    pub fetch_failures: usize,
    pub no_history: usize,
    pub all_unknown: usize,
}

impl RunSummary {
    fn empty(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            rows: 0,
            fetch_failures: 0,
            no_history: 0,
            all_unknown: 0,
        }
    }
}

/// Leaderboard → per-entity reconstruction → sink. An empty leaderboard ends
/// the run with zero rows and leaves the sink untouched.
pub async fn generate_report(
    provider: Arc<dyn RatingProviderClient>,
    sink: &mut dyn ReportSink,
    options: &RunOptions,
    reference_date: NaiveDate,
) -> anyhow::Result<RunSummary> {
    let entities = LeaderboardFetcher::new(provider.as_ref())
        .fetch(options.leaderboard_size, &options.category)
        .await;

    if entities.is_empty() {
        tracing::error!(
            category = %options.category,
            %reference_date,
            "no leaderboard entries; skipping report"
        );
        return Ok(RunSummary::empty(reference_date));
    }

    let aggregator =
        ConcurrentAggregator::new(provider, options.category.clone(), options.concurrency);
    let report = aggregator.aggregate(&entities, reference_date).await;

    report.write_to(sink)?;

    let summary = RunSummary {
        reference_date,
        rows: report.rows.len(),
        fetch_failures: report.count_status(RowStatus::FetchFailed),
        no_history: report.count_status(RowStatus::NoHistory),
        all_unknown: report
            .rows
            .iter()
            .filter(|r| r.series.is_all_unknown())
            .count(),
    };

    tracing::info!(
        %reference_date,
        rows = summary.rows,
        fetch_failures = summary.fetch_failures,
        no_history = summary.no_history,
        all_unknown = summary.all_unknown,
        "rating report written"
    );

    Ok(summary)
}

pub async fn top_players(
    provider: &dyn RatingProviderClient,
    options: &RunOptions,
) -> Vec<RankedEntity> {
    LeaderboardFetcher::new(provider)
        .fetch(options.leaderboard_size, &options.category)
        .await
}

/// The rank-1 entity and its series, or `None` when the leaderboard is empty.
pub async fn top_player_series(
    provider: Arc<dyn RatingProviderClient>,
    options: &RunOptions,
    reference_date: NaiveDate,
) -> Option<(RankedEntity, DailyRatingSeries)> {
    let top = LeaderboardFetcher::new(provider.as_ref())
        .fetch(1, &options.category)
        .await
        .into_iter()
        .next()?;

    let aggregator = ConcurrentAggregator::new(provider, options.category.clone(), 1);
    let (series, _status) = aggregator.series_for(&top.entity, reference_date).await;
    Some((top, series))
}
