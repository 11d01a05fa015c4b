use crate::report::{ReportRow, ReportSink};
use anyhow::Context;
use chrono::NaiveDate;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const ID_COLUMN: &str = "username";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Writes the report as CSV: a header of `username` and ISO dates, then one
/// line per entity with empty cells for unknown ratings.
pub struct CsvReportSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvReportSink<File> {
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let writer = csv::Writer::from_path(path)
            .with_context(|| format!("failed to create report file {}", path.display()))?;
        Ok(Self { writer })
    }
}

impl<W: Write> CsvReportSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    pub fn into_inner(self) -> anyhow::Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| anyhow::anyhow!("failed to flush report: {}", err.error()))
    }
}

impl<W: Write> ReportSink for CsvReportSink<W> {
    fn write(&mut self, header: &[NaiveDate], rows: &[ReportRow]) -> anyhow::Result<()> {
        let mut record = Vec::with_capacity(header.len() + 1);
        record.push(ID_COLUMN.to_string());
        record.extend(header.iter().map(|d| d.format(DATE_FORMAT).to_string()));
        self.writer
            .write_record(&record)
            .context("failed to write report header")?;

        for row in rows {
            anyhow::ensure!(
                row.series.values().len() == header.len(),
                "row for {} has {} values, header has {}",
                row.entity,
                row.series.values().len(),
                header.len()
            );

            record.clear();
            record.push(row.entity.id.clone());
            record.extend(
                row.series
                    .values()
                    .iter()
                    .map(|v| v.map(|r| r.to_string()).unwrap_or_default()),
            );
            self.writer
                .write_record(&record)
                .with_context(|| format!("failed to write report row for {}", row.entity))?;
        }

        self.writer.flush().context("failed to flush report")?;
        Ok(())
    }
}
