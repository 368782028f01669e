// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::f64::consts::PI;

use anyhow::{Context, bail};

use crate::model::{Point, ProviderResult, Series};
use crate::time_range::TimeRange;

pub const NAME: &str = "sine_wave";

/// About eleven years of hourly samples.
pub const MAX_POINTS: i64 = 100_000;

/// `sine_wave:<n>` draws `n` full periods over hourly samples spanning
/// the range, both ends included.
pub fn read(query: &str, range: &TimeRange) -> anyhow::Result<ProviderResult> {
    let periods: i64 = query
        .trim()
        .parse()
        .with_context(|| format!("sine_wave query must be an integer, got {query:?}"))?;

    let hours = (range.to - range.from).whole_hours();
    if hours >= MAX_POINTS {
        bail!("sine_wave range spans {hours} hours, at most {} points are drawn", MAX_POINTS);
    }

    let mut instants = Vec::new();
    let mut next = Some(range.from);
    while let Some(t) = next.filter(|t| *t <= range.to) {
        instants.push(t);
        next = t.checked_add(time::Duration::HOUR);
    }

    let len = instants.len() as f64;
    let points = instants
        .into_iter()
        .enumerate()
        .map(|(i, t)| Point::number(t, (i as f64 * PI * periods as f64 * 2.0 / len).sin()))
        .collect();

    Ok(Series::named("value", points).into())
}
