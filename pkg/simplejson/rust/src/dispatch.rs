// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Request orchestration for the four dashboard operations.
//!
//! Each operation parses its target, resolves the provider in the sealed
//! registry, runs the provider on the blocking pool under a timeout and
//! shapes the result for the wire. Nothing is kept between requests.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use crate::errors::{Error, Result};
use crate::model::Panel;
use crate::registry::Registry;
use crate::target::{Target, has_separator};
use crate::time_range::{RangeBound, TimeRange};
use crate::transform::{
    WireAnnotation, WireResult, to_annotation_response, to_table_result, to_timeseries_response,
};

pub const WILDCARD: &str = "*";

fn wildcard() -> String {
    WILDCARD.to_string()
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default = "wildcard")]
    pub target: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRange {
    pub from: RangeBound,
    pub to: RangeBound,
}

impl RawRange {
    pub fn normalize(&self) -> Result<TimeRange> {
        TimeRange::from_bounds(&self.from, &self.to)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub range: RawRange,
    #[serde(default)]
    pub interval_ms: Option<u64>,
    #[serde(default)]
    pub targets: Vec<QueryTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Timeserie,
    Table,
}

#[derive(Debug, Deserialize)]
pub struct QueryTarget {
    #[serde(default)]
    pub target: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl QueryTarget {
    /// Anything other than `table` is treated as a time series.
    pub fn kind(&self) -> TargetKind {
        match self.kind.as_deref() {
            Some("table") => TargetKind::Table,
            _ => TargetKind::Timeserie,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnnotationRequest {
    pub range: RawRange,
    pub annotation: AnnotationQuery,
}

#[derive(Debug, Deserialize)]
pub struct AnnotationQuery {
    #[serde(default)]
    pub query: String,
}

pub struct Dispatcher {
    registry: Arc<Registry>,
    timeout: Option<Duration>,
}

impl Dispatcher {
    /// `timeout` bounds every provider call; `None` waits indefinitely.
    pub fn new(registry: Arc<Registry>, timeout: Option<Duration>) -> Self {
        Dispatcher { registry, timeout }
    }

    /// `finder:query` asks the finder, `*` lists every finder and reader,
    /// anything else is echoed back as a literal metric name.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<String>> {
        let raw = request.target.as_str();
        if !has_separator(raw) {
            if raw == WILDCARD {
                return Ok(self.registry.metric_provider_names());
            }
            return Ok(vec![raw.to_string()]);
        }

        let target = Target::parse(raw)?;
        let finder = self.registry.finder(target.provider)?;
        let query = target.query.to_string();
        self.invoke(target.provider, move || finder.find(&query)).await
    }

    /// Runs every target in request order and concatenates the results.
    pub async fn query(&self, request: &QueryRequest) -> Result<Vec<WireResult>> {
        let range = request.range.normalize()?;
        let interval = request
            .interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let mut results = Vec::new();
        for query_target in &request.targets {
            let raw = query_target.target.as_str();
            let target = Target::parse(raw)?;
            let reader = self.registry.reader(target.provider)?;
            let resample = interval.filter(|_| reader.resamples());

            debug!(
                "reading {raw} over ({}, {}] resample={resample:?}",
                range.from, range.to
            );
            let query = target.query.to_string();
            let result = self
                .invoke(target.provider, move || reader.read(&query, &range))
                .await?;

            match query_target.kind() {
                TargetKind::Table => results.extend(
                    to_table_result(target.provider, &result)?
                        .into_iter()
                        .map(WireResult::Table),
                ),
                TargetKind::Timeserie => results.extend(
                    to_timeseries_response(target.provider, raw, &result, resample)?
                        .into_iter()
                        .map(WireResult::Series),
                ),
            }
        }
        Ok(results)
    }

    pub async fn annotations(&self, request: &AnnotationRequest) -> Result<Vec<WireAnnotation>> {
        let raw = request.annotation.query.as_str();
        let target = Target::parse(raw)?;
        let range = request.range.normalize()?;
        let reader = self.registry.annotation_reader(target.provider)?;

        let query = target.query.to_string();
        let result = self
            .invoke(target.provider, move || reader.read_annotations(&query, &range))
            .await?;
        to_annotation_response(target.provider, raw, &result)
    }

    /// The panel payload is passed through untouched.
    pub async fn panel(&self, raw: &str, range: TimeRange) -> Result<Panel> {
        let target = Target::parse(raw)?;
        let reader = self.registry.panel_reader(target.provider)?;

        let query = target.query.to_string();
        self.invoke(target.provider, move || reader.read_panel(&query, &range))
            .await
    }

    async fn invoke<T, F>(&self, provider: &str, call: F) -> Result<T>
    where
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::task::spawn_blocking(call);
        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!("provider {provider} timed out after {limit:?}");
                    return Err(Error::ProviderTimeout {
                        provider: provider.to_string(),
                        timeout: limit,
                    });
                }
            },
            None => task.await,
        };

        match joined {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!("provider {provider} failed: {err:#}");
                Err(Error::provider_failure(provider, &err))
            }
            Err(join_err) => {
                warn!("provider {provider} did not complete: {join_err}");
                Err(Error::ProviderFailure {
                    provider: provider.to_string(),
                    message: join_err.to_string(),
                })
            }
        }
    }
}
