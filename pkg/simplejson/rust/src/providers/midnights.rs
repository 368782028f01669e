// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::model::{Point, ProviderResult, Series};
use crate::time_range::TimeRange;

pub const NAME: &str = "midnights";
pub const TITLE: &str = "Text for annotation - midnight";

/// Marks every UTC midnight from the day of `from` through the day of `to`.
/// The query is ignored.
pub fn read(_query: &str, range: &TimeRange) -> anyhow::Result<ProviderResult> {
    let mut points = Vec::new();
    let mut day = Some(range.from.date());
    while let Some(date) = day.filter(|d| *d <= range.to.date()) {
        points.push(Point::new(date.midnight().assume_utc(), TITLE));
        day = date.next_day();
    }
    Ok(Series::unnamed(points).into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::indexing_slicing)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn points(range: TimeRange) -> Vec<Point> {
        match read("", &range).unwrap() {
            ProviderResult::Series(series) => series.points,
            other => panic!("expected a series, got {}", other.shape()),
        }
    }

    #[test]
    fn test_one_mark_per_day() {
        let points = points(TimeRange::new(
            datetime!(2020-01-01 05:00:00 UTC),
            datetime!(2020-01-03 01:00:00 UTC),
        ));
        let times: Vec<_> = points.iter().map(|p| p.time).collect();
        assert_eq!(
            times,
            vec![
                datetime!(2020-01-01 00:00:00 UTC),
                datetime!(2020-01-02 00:00:00 UTC),
                datetime!(2020-01-03 00:00:00 UTC),
            ]
        );
        assert!(points.iter().all(|p| p.value == json!(TITLE)));
    }

    #[test]
    fn test_range_within_a_day() {
        let points = points(TimeRange::new(
            datetime!(2020-01-01 05:00:00 UTC),
            datetime!(2020-01-01 06:00:00 UTC),
        ));
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let points = points(TimeRange::new(
            datetime!(2020-01-02 00:00:00 UTC),
            datetime!(2020-01-01 00:00:00 UTC),
        ));
        assert!(points.is_empty());
    }
}
