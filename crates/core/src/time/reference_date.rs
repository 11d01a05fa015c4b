use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};

/// The run's "today". An explicit `YYYY-MM-DD` argument wins; otherwise the
/// current UTC calendar date, which is how the rating service stamps history
/// points.
pub fn resolve_reference_date(
    reference_date_arg: Option<&str>,
    now_utc: DateTime<Utc>,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = reference_date_arg.map(str::trim).filter(|s| !s.is_empty()) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid reference date (expected YYYY-MM-DD): {s}"));
    }

    Ok(now_utc.date_naive())
}
