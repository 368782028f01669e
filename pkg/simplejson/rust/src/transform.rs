// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Conversion of provider results into the JSON shapes the dashboard reads.
//!
//! - `series`: `{"target": name, "datapoints": [[value, epochMillis], ...]}`
//! - `table`: `{"type": "table", "columns": [{"text": name}], "rows": [...]}`
//! - `annotation`: `{"annotation", "time", "title", "text"?, "tags"?}`

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::errors::{Error, Result};
use crate::model::{AnnotationRecord, Point, ProviderResult, Series, Table};
use crate::time_range::unix_millis;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireSeries {
    pub target: String,
    pub datapoints: Vec<(Value, i64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireColumn {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireTable {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub columns: Vec<WireColumn>,
    pub rows: Vec<Vec<Value>>,
}

/// One element of a `/query` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireResult {
    Series(WireSeries),
    Table(WireTable),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireAnnotation {
    pub annotation: String,
    pub time: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

/// Shapes one series. Missing values are dropped, points are ordered by
/// time (stable, so duplicates keep their order) and, when `resample` is
/// set, averaged into right-closed, right-labeled buckets.
///
/// An empty series always reports the requested `name`; a provider-given
/// name only applies once there are points.
pub fn to_series_response(name: &str, series: &Series, resample: Option<Duration>) -> WireSeries {
    if series.points.is_empty() {
        return WireSeries {
            target: name.to_string(),
            datapoints: vec![],
        };
    }
    let target = series.name.clone().unwrap_or_else(|| name.to_string());

    let mut points: Vec<&Point> = series.points.iter().filter(|p| !p.is_missing()).collect();
    points.sort_by_key(|p| p.time);

    let points = match resample.and_then(bucket_width_nanos) {
        Some(width) => resample_mean(&points, width),
        None => points.into_iter().cloned().collect(),
    };

    WireSeries {
        target,
        datapoints: points
            .into_iter()
            .map(|p| (p.value, unix_millis(p.time)))
            .collect(),
    }
}

/// Expands a series or series collection into one wire entry per series.
pub fn to_timeseries_response(
    provider: &str,
    name: &str,
    result: &ProviderResult,
    resample: Option<Duration>,
) -> Result<Vec<WireSeries>> {
    match result {
        ProviderResult::Series(series) => Ok(vec![to_series_response(name, series, resample)]),
        ProviderResult::SeriesCollection(collection) => Ok(collection
            .iter()
            .map(|series| to_series_response(name, series, resample))
            .collect()),
        other => Err(unsupported(provider, other, "series or series collection")),
    }
}

/// An empty table produces no entry at all rather than a zero-row table.
pub fn to_table_response(table: &Table) -> Vec<WireTable> {
    if table.is_empty() {
        return vec![];
    }
    vec![WireTable {
        kind: "table",
        columns: table
            .columns
            .iter()
            .map(|text| WireColumn { text: text.clone() })
            .collect(),
        rows: table.rows.clone(),
    }]
}

pub fn to_table_result(provider: &str, result: &ProviderResult) -> Result<Vec<WireTable>> {
    match result {
        ProviderResult::Table(table) => Ok(to_table_response(table)),
        other => Err(unsupported(provider, other, "table")),
    }
}

/// `label` is the annotation query exactly as the dashboard sent it.
pub fn to_annotation_response(
    provider: &str,
    label: &str,
    result: &ProviderResult,
) -> Result<Vec<WireAnnotation>> {
    match result {
        ProviderResult::Series(series) => Ok(series
            .points
            .iter()
            .map(|point| WireAnnotation {
                annotation: label.to_string(),
                time: unix_millis(point.time),
                title: render(&point.value),
                text: None,
                tags: None,
            })
            .collect()),
        ProviderResult::AnnotationRecords(records) => Ok(records
            .iter()
            .map(|record| record_to_wire(label, record))
            .collect()),
        other => Err(unsupported(provider, other, "series or annotation records")),
    }
}

fn record_to_wire(label: &str, record: &AnnotationRecord) -> WireAnnotation {
    WireAnnotation {
        annotation: label.to_string(),
        time: unix_millis(record.time),
        title: record.title.clone().unwrap_or_default(),
        text: record.text.as_ref().map(render),
        tags: record.tags.as_ref().map(render),
    }
}

/// Strings render bare, everything else as its JSON text.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn unsupported(provider: &str, found: &ProviderResult, expected: &'static str) -> Error {
    Error::UnsupportedResultShape {
        provider: provider.to_string(),
        found: found.shape(),
        expected,
    }
}

fn bucket_width_nanos(width: Duration) -> Option<i128> {
    i128::try_from(width.as_nanos()).ok().filter(|w| *w > 0)
}

/// Buckets are `(k*w, (k+1)*w]` on a grid anchored at the Unix epoch and
/// labeled with their right edge. Buckets without numeric values are
/// omitted. Labels keep the offset of the first input point.
fn resample_mean(points: &[&Point], width: i128) -> Vec<Point> {
    let Some(first) = points.first() else {
        return vec![];
    };
    let offset = first.time.offset();

    let mut buckets: Vec<(i128, f64, u32)> = Vec::new();
    for point in points {
        let Some(value) = point.value.as_f64() else {
            continue;
        };
        let nanos = point.time.unix_timestamp_nanos();
        // ceil(nanos / width) for a positive width
        let right_edge = -((-nanos).div_euclid(width)) * width;
        match buckets.last_mut() {
            Some((edge, sum, count)) if *edge == right_edge => {
                *sum += value;
                *count += 1;
            }
            _ => buckets.push((right_edge, value, 1)),
        }
    }

    buckets
        .into_iter()
        .filter_map(|(edge, sum, count)| {
            let label = OffsetDateTime::from_unix_timestamp_nanos(edge).ok()?;
            Some(Point::number(label.to_offset(offset), sum / f64::from(count)))
        })
        .collect()
}
