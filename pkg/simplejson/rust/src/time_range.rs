// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Normalization of the `from`/`to` bounds sent by the dashboard.
//!
//! Bounds arrive either as ISO-8601 strings (query, annotation and search
//! bodies) or as epoch milliseconds (panel query strings). Both become UTC
//! instants; naive strings are read as UTC.

use serde::Deserialize;
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::errors::{Error, Result};

const NANOS_PER_MILLI: i128 = 1_000_000;

/// One bound as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RangeBound {
    Millis(i64),
    Text(String),
}

impl RangeBound {
    pub fn to_instant(&self) -> Result<OffsetDateTime> {
        match self {
            RangeBound::Millis(millis) => from_unix_millis(*millis).ok_or_else(|| Error::InvalidRange {
                bound: millis.to_string(),
                reason: "epoch milliseconds out of range".to_string(),
            }),
            RangeBound::Text(text) => parse_instant(text),
        }
    }
}

/// The interval `(from, to]` a provider is asked to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: OffsetDateTime,
    pub to: OffsetDateTime,
}

impl TimeRange {
    pub fn new(from: OffsetDateTime, to: OffsetDateTime) -> Self {
        TimeRange {
            from: from.to_offset(UtcOffset::UTC),
            to: to.to_offset(UtcOffset::UTC),
        }
    }

    pub fn from_bounds(from: &RangeBound, to: &RangeBound) -> Result<Self> {
        Ok(TimeRange::new(from.to_instant()?, to.to_instant()?))
    }

    /// Exclusive lower bound, inclusive upper bound.
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.from < instant && instant <= self.to
    }
}

/// Parses a single bound: epoch milliseconds, RFC 3339, ISO-8601 with or
/// without offset, or a bare date.
pub fn parse_instant(raw: &str) -> Result<OffsetDateTime> {
    let text = raw.trim();
    let invalid = |reason: String| Error::InvalidRange {
        bound: raw.to_string(),
        reason,
    };

    if let Ok(millis) = text.parse::<i64>() {
        return from_unix_millis(millis)
            .ok_or_else(|| invalid("epoch milliseconds out of range".to_string()));
    }
    if let Ok(instant) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(instant.to_offset(UtcOffset::UTC));
    }
    if let Ok(instant) = OffsetDateTime::parse(text, &Iso8601::DEFAULT) {
        return Ok(instant.to_offset(UtcOffset::UTC));
    }
    if let Ok(naive) = PrimitiveDateTime::parse(text, &Iso8601::DEFAULT) {
        return Ok(naive.assume_utc());
    }
    Date::parse(text, &Iso8601::DEFAULT)
        .map(|date| date.midnight().assume_utc())
        .map_err(|e| invalid(e.to_string()))
}

pub fn from_unix_millis(millis: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * NANOS_PER_MILLI).ok()
}

/// Milliseconds since the epoch, rounded towards negative infinity.
pub fn unix_millis(instant: OffsetDateTime) -> i64 {
    let millis = instant.unix_timestamp_nanos().div_euclid(NANOS_PER_MILLI);
    i64::try_from(millis).unwrap_or(if millis < 0 { i64::MIN } else { i64::MAX })
}
