// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Values handed back by providers, before they are shaped for the wire.

use serde_json::Value;
use time::OffsetDateTime;

/// A single `(timestamp, value)` sample. `Value::Null` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub time: OffsetDateTime,
    pub value: Value,
}

impl Point {
    pub fn new(time: OffsetDateTime, value: impl Into<Value>) -> Self {
        Point {
            time,
            value: value.into(),
        }
    }

    /// Builds a numeric point; non-finite numbers become missing values.
    pub fn number(time: OffsetDateTime, value: f64) -> Self {
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        Point { time, value }
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_null()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    /// Falls back to the requested target when absent.
    pub name: Option<String>,
    pub points: Vec<Point>,
}

impl Series {
    pub fn named(name: impl Into<String>, points: Vec<Point>) -> Self {
        Series {
            name: Some(name.into()),
            points,
        }
    }

    pub fn unnamed(points: Vec<Point>) -> Self {
        Series { name: None, points }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    /// Each row is aligned to `columns`; `Value::Null` cells are allowed.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub time: OffsetDateTime,
    pub title: Option<String>,
    pub text: Option<Value>,
    pub tags: Option<Value>,
}

impl AnnotationRecord {
    pub fn new(time: OffsetDateTime, title: impl Into<String>) -> Self {
        AnnotationRecord {
            time,
            title: Some(title.into()),
            text: None,
            tags: None,
        }
    }
}

/// Everything a reader or annotation reader may return.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResult {
    Series(Series),
    SeriesCollection(Vec<Series>),
    Table(Table),
    AnnotationRecords(Vec<AnnotationRecord>),
}

impl ProviderResult {
    pub fn shape(&self) -> &'static str {
        match self {
            ProviderResult::Series(_) => "series",
            ProviderResult::SeriesCollection(_) => "series collection",
            ProviderResult::Table(_) => "table",
            ProviderResult::AnnotationRecords(_) => "annotation records",
        }
    }
}

impl From<Series> for ProviderResult {
    fn from(series: Series) -> Self {
        ProviderResult::Series(series)
    }
}

impl From<Table> for ProviderResult {
    fn from(table: Table) -> Self {
        ProviderResult::Table(table)
    }
}

/// Opaque panel payload, sent back as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub content_type: String,
    pub body: String,
}

impl Panel {
    pub fn html(body: impl Into<String>) -> Self {
        Panel {
            content_type: "text/html; charset=utf-8".to_string(),
            body: body.into(),
        }
    }
}
