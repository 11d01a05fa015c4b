//! Rebuilds a dense daily rating series from a sparse rating history.
//!
//! The remote history only records days on which the rating changed, so the
//! window is filled forward from the latest observation at or before each
//! date. The seed value may come from any point in the entity's history before
//! the window; dates preceding the first observation stay unknown.

use crate::domain::{DailyRatingSeries, Entity, RatingCategory, RatingObservation, RatingWindow};
use crate::ingest::error::FetchError;
use crate::ingest::types::{RatingHistoryCategory, RawRatingPoint};
use chrono::NaiveDate;

/// Picks the history entry for `category`. A missing entry means the entity
/// has never played the discipline.
pub fn select_category<'a>(
    history: &'a [RatingHistoryCategory],
    category: &RatingCategory,
    entity: &Entity,
) -> Result<&'a RatingHistoryCategory, FetchError> {
    history
        .iter()
        .find(|c| category.matches_history_name(&c.name))
        .ok_or_else(|| {
            FetchError::no_data(
                entity.id.as_str(),
                format!("no '{}' rating history", category.history_name()),
            )
        })
}

/// Converts wire points to dated observations, shifting the zero-based month.
/// Points that are not four integers or name no real calendar date are
/// dropped. Input order is preserved.
pub fn normalize_points(raw: &[RawRatingPoint]) -> Vec<RatingObservation> {
    raw.iter()
        .filter_map(|point| {
            let parsed = normalize_point(point);
            if parsed.is_none() {
                tracing::debug!(point = %point.0, "discarding malformed rating point");
            }
            parsed
        })
        .collect()
}

fn normalize_point(point: &RawRatingPoint) -> Option<RatingObservation> {
    let [year, month0, day, rating] = point.components()?;
    let year = i32::try_from(year).ok()?;
    let month = u32::try_from(month0.checked_add(1)?).ok()?;
    let day = u32::try_from(day).ok()?;
    let rating = i32::try_from(rating).ok()?;

    Some(RatingObservation {
        date: NaiveDate::from_ymd_opt(year, month, day)?,
        rating,
    })
}

/// Dense series for the window ending at `reference_date`.
pub fn reconstruct(reference_date: NaiveDate, raw: &[RawRatingPoint]) -> DailyRatingSeries {
    reconstruct_observations(reference_date, normalize_points(raw))
}

pub fn reconstruct_observations(
    reference_date: NaiveDate,
    mut observations: Vec<RatingObservation>,
) -> DailyRatingSeries {
    let window = RatingWindow::ending_at(reference_date);

    // Stable: for equal dates the entry that came later on the wire stays
    // later and therefore wins the forward fill.
    observations.sort_by_key(|o| o.date);

    let mut pending = observations.iter().peekable();
    let mut last_known: Option<i32> = None;

    while let Some(obs) = pending.next_if(|o| o.date < window.start()) {
        last_known = Some(obs.rating);
    }

    DailyRatingSeries::from_fn(window, |date| {
        while let Some(obs) = pending.next_if(|o| o.date <= date) {
            last_known = Some(obs.rating);
        }
        last_known
    })
}

/// Series for `entity` in `category`; `NoData` when the discipline is absent.
pub fn reconstruct_history(
    reference_date: NaiveDate,
    history: &[RatingHistoryCategory],
    category: &RatingCategory,
    entity: &Entity,
) -> Result<DailyRatingSeries, FetchError> {
    let selected = select_category(history, category, entity)?;
    Ok(reconstruct(reference_date, &selected.points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WINDOW_DAYS;
    use chrono::Duration;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Builds a wire point from a calendar (one-based) month.
    fn p(y: i64, m: i64, day: i64, rating: i64) -> RawRatingPoint {
        RawRatingPoint::new(y, m - 1, day, rating)
    }

    #[test]
    fn forward_fills_from_pre_window_observation() {
        let raw = vec![p(2023, 8, 1, 2400), p(2023, 8, 4, 2430), p(2023, 8, 11, 2480)];
        let s = reconstruct(d(2023, 9, 7), &raw);

        assert_eq!(s.window().start(), d(2023, 8, 9));
        assert_eq!(s.get(d(2023, 8, 9)), Some(2430));
        assert_eq!(s.get(d(2023, 8, 10)), Some(2430));
        for (date, value) in s.iter().filter(|(date, _)| *date >= d(2023, 8, 11)) {
            assert_eq!(value, Some(2480), "{date}");
        }
    }

    #[test]
    fn matches_relative_day_expectations_on_dense_history() {
        let raw: Vec<_> = [
            (9, 1, 2400),
            (9, 2, 2410),
            (9, 3, 2420),
            (9, 4, 2430),
            (9, 8, 2470),
            (9, 9, 2480),
            (9, 12, 2510),
            (9, 13, 2520),
            (9, 14, 2524),
            (9, 16, 2520),
            (9, 20, 2520),
            (9, 21, 2300),
            (9, 22, 2400),
            (9, 24, 2510),
            (9, 25, 2520),
            (9, 26, 2519),
            (9, 27, 2522),
            (9, 29, 2518),
            (10, 3, 2520),
        ]
        .into_iter()
        .map(|(m0, day, r)| RawRatingPoint::new(2023, m0, day, r))
        .collect();

        let today = d(2023, 11, 5);
        let s = reconstruct(today, &raw);
        let back = |n: i64| s.get(today - Duration::days(n));

        assert_eq!(back(0), Some(2520));
        assert_eq!(back(1), Some(2520));
        assert_eq!(back(3), Some(2518));
        assert_eq!(back(4), Some(2518));
        assert_eq!(back(29), Some(2430));
    }

    #[test]
    fn empty_history_is_all_unknown() {
        let s = reconstruct(d(2023, 9, 7), &[]);
        assert_eq!(s.values().len(), WINDOW_DAYS);
        assert!(s.is_all_unknown());
    }

    #[test]
    fn history_after_window_is_all_unknown() {
        let raw = vec![p(2023, 9, 8, 2500), p(2024, 1, 1, 2550)];
        let s = reconstruct(d(2023, 9, 7), &raw);
        assert!(s.is_all_unknown());
    }

    #[test]
    fn stays_unknown_until_first_observation() {
        let raw = vec![p(2023, 9, 1, 2500)];
        let s = reconstruct(d(2023, 9, 7), &raw);
        for (date, value) in s.iter() {
            if date < d(2023, 9, 1) {
                assert_eq!(value, None, "{date}");
            } else {
                assert_eq!(value, Some(2500), "{date}");
            }
        }
    }

    #[test]
    fn sorts_unordered_input_and_later_duplicate_wins() {
        let raw = vec![
            p(2023, 9, 5, 2600),
            p(2023, 7, 1, 2100),
            p(2023, 9, 5, 2650),
            p(2023, 8, 20, 2300),
        ];
        let s = reconstruct(d(2023, 9, 7), &raw);
        assert_eq!(s.get(d(2023, 8, 9)), Some(2100));
        assert_eq!(s.get(d(2023, 8, 20)), Some(2300));
        assert_eq!(s.get(d(2023, 9, 4)), Some(2300));
        assert_eq!(s.get(d(2023, 9, 5)), Some(2650));
        assert_eq!(s.latest(), Some(2650));
    }

    #[test]
    fn latest_pre_window_observation_seeds_the_window() {
        let raw = vec![p(2022, 1, 1, 1800), p(2023, 6, 30, 2200), p(2023, 3, 1, 2000)];
        let s = reconstruct(d(2023, 9, 7), &raw);
        assert_eq!(s.values()[0], Some(2200));
        assert!(s.values().iter().all(|v| *v == Some(2200)));
    }

    #[test]
    fn discards_malformed_points() {
        let raw = vec![
            RawRatingPoint(json!([2023, 7, 1])),
            RawRatingPoint::new(2023, 12, 1, 9999),
            RawRatingPoint::new(2023, 1, 30, 9999),
            RawRatingPoint::new(2023, -1, 10, 9999),
            p(2023, 8, 20, 2300),
        ];
        let s = reconstruct(d(2023, 9, 7), &raw);
        assert_eq!(s.get(d(2023, 8, 19)), None);
        assert_eq!(s.get(d(2023, 8, 20)), Some(2300));
        assert_eq!(s.latest(), Some(2300));
    }

    #[test]
    fn normalizes_zero_based_month() {
        let obs = normalize_points(&[RawRatingPoint::new(2023, 0, 31, 1500)]);
        assert_eq!(
            obs,
            vec![RatingObservation {
                date: d(2023, 1, 31),
                rating: 1500
            }]
        );
    }

    #[test]
    fn forward_fill_is_constant_between_observations() {
        let raw = vec![p(2023, 8, 12, 2400), p(2023, 8, 25, 2410), p(2023, 9, 2, 2390)];
        let change_dates = [d(2023, 8, 12), d(2023, 8, 25), d(2023, 9, 2)];
        let s = reconstruct(d(2023, 9, 7), &raw);

        let entries: Vec<_> = s.iter().collect();
        for pair in entries.windows(2) {
            let (_, prev) = pair[0];
            let (date, cur) = pair[1];
            if !change_dates.contains(&date) {
                assert_eq!(prev, cur, "{date}");
            }
        }
    }

    #[test]
    fn selects_category_case_insensitively() {
        let history = vec![
            RatingHistoryCategory {
                name: "Blitz".to_string(),
                points: vec![p(2023, 9, 1, 3000)],
            },
            RatingHistoryCategory {
                name: "classical".to_string(),
                points: vec![p(2023, 9, 1, 2700)],
            },
        ];
        let entity = Entity::try_new("someone").unwrap();
        let classical = RatingCategory::try_new("classical").unwrap();

        let s = reconstruct_history(d(2023, 9, 7), &history, &classical, &entity).unwrap();
        assert_eq!(s.latest(), Some(2700));

        let rapid = RatingCategory::try_new("rapid").unwrap();
        let err = reconstruct_history(d(2023, 9, 7), &history, &rapid, &entity).unwrap_err();
        assert!(err.is_no_data());
    }
}
