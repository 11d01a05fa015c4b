pub mod csv_sink;

use crate::domain::{DailyRatingSeries, Entity, RatingWindow};
use chrono::NaiveDate;
use serde::Serialize;

pub use csv_sink::CsvReportSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Complete,
    /// History fetched, but the entity never played the configured category.
    NoHistory,
    FetchFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub rank: usize,
    pub entity: Entity,
    pub series: DailyRatingSeries,
    pub status: RowStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregatedReport {
    pub window: RatingWindow,
    pub rows: Vec<ReportRow>,
}

impl AggregatedReport {
    /// Column dates, oldest first. Every row's values are aligned to these.
    pub fn header(&self) -> Vec<NaiveDate> {
        self.window.dates().collect()
    }

    pub fn count_status(&self, status: RowStatus) -> usize {
        self.rows.iter().filter(|r| r.status == status).count()
    }

    pub fn write_to(&self, sink: &mut dyn ReportSink) -> anyhow::Result<()> {
        sink.write(&self.header(), &self.rows)
    }
}

/// Destination for a finished report. Implementations only serialize; rows
/// arrive already ordered and aligned to `header`.
pub trait ReportSink {
    fn write(&mut self, header: &[NaiveDate], rows: &[ReportRow]) -> anyhow::Result<()>;
}

/// `today-N: value` lines for one series, oldest first.
pub fn relative_lines(series: &DailyRatingSeries) -> Vec<String> {
    let window = series.window();
    series
        .iter()
        .map(|(date, value)| {
            let days_back = window.days_before_end(date).unwrap_or_default();
            match value {
                Some(rating) => format!("today-{days_back}: {rating}"),
                None => format!("today-{days_back}: no rating found"),
            }
        })
        .collect()
}
