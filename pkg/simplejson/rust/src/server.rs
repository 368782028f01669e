// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! HTTP surface of the adapter.
//!
//! - `GET|POST /` identification string
//! - `POST /search`, `POST /query`, `POST /annotations` (JSON bodies)
//! - `GET|POST /panels?from=..&to=..&query=..` raw panel payload

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{info, warn};
use serde::Deserialize;
use tokio::signal::unix::{SignalKind, signal};
use tower_http::cors::CorsLayer;

use crate::dispatch::{AnnotationRequest, Dispatcher, QueryRequest, SearchRequest};
use crate::errors::Error;
use crate::time_range::{TimeRange, parse_instant};
use crate::transform::{WireAnnotation, WireResult};

const IDENTIFICATION: &str =
    "Grafana simple JSON datasource, used for rendering HTML panels and timeseries data.";

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MalformedTarget { .. }
            | Error::UnknownProvider { .. }
            | Error::InvalidRange { .. }
            | Error::UnsupportedResultShape { .. } => StatusCode::NOT_FOUND,
            Error::ProviderFailure { .. } => StatusCode::BAD_GATEWAY,
            Error::ProviderTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            // registration errors never reach a handler
            Error::InvalidProviderName { .. } | Error::DuplicateProvider { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PanelParams {
    pub from: String,
    pub to: String,
    pub query: String,
}

/// Builds the router; the dispatcher is the only shared state.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/", get(index_handler).post(index_handler))
        .route("/search", post(search_handler))
        .route("/query", post(query_handler))
        .route("/annotations", post(annotations_handler))
        .route("/panels", get(panel_handler).post(panel_handler))
        .layer(CorsLayer::permissive())
        .with_state(dispatcher)
}

pub async fn run_server(dispatcher: Arc<Dispatcher>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(dispatcher);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{addr}");

    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                _ = sigint.recv() => info!("Received SIGINT, shutting down"),
            }
        })
        .await
        .context("server error")?;

    Ok(())
}

async fn index_handler() -> &'static str {
    IDENTIFICATION
}

async fn search_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<String>>, Error> {
    info!("Handling /search request for {}", request.target);
    let names = dispatcher.search(&request).await.inspect_err(log_failure)?;
    Ok(Json(names))
}

async fn query_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Vec<WireResult>>, Error> {
    let targets: Vec<&str> = request.targets.iter().map(|t| t.target.as_str()).collect();
    info!("Handling /query request for {targets:?}");
    let results = dispatcher.query(&request).await.inspect_err(log_failure)?;
    Ok(Json(results))
}

async fn annotations_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    Json(request): Json<AnnotationRequest>,
) -> Result<Json<Vec<WireAnnotation>>, Error> {
    info!("Handling /annotations request for {}", request.annotation.query);
    let annotations = dispatcher
        .annotations(&request)
        .await
        .inspect_err(log_failure)?;
    Ok(Json(annotations))
}

async fn panel_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    Query(params): Query<PanelParams>,
) -> Result<Response, Error> {
    info!("Handling /panels request for {}", params.query);
    let range = TimeRange::new(parse_instant(&params.from)?, parse_instant(&params.to)?);
    let panel = dispatcher
        .panel(&params.query, range)
        .await
        .inspect_err(log_failure)?;
    Ok(([(header::CONTENT_TYPE, panel.content_type)], panel.body).into_response())
}

fn log_failure(err: &Error) {
    warn!("Request failed with {}: {err}", err.status_code());
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::registry::ProviderKind;
    use std::time::Duration;

    #[test]
    fn test_request_errors_map_to_not_found() {
        let errors = [
            Error::MalformedTarget {
                target: "x".to_string(),
            },
            Error::UnknownProvider {
                kind: ProviderKind::MetricReader,
                name: "nope".to_string(),
            },
            Error::InvalidRange {
                bound: "x".to_string(),
                reason: "bad".to_string(),
            },
            Error::UnsupportedResultShape {
                provider: "p".to_string(),
                found: "table",
                expected: "series",
            },
        ];
        for err in errors {
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND, "{err}");
        }
    }

    #[test]
    fn test_provider_errors_map_to_gateway_statuses() {
        let failure = Error::ProviderFailure {
            provider: "p".to_string(),
            message: "boom".to_string(),
        };
        let timeout = Error::ProviderTimeout {
            provider: "p".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(failure.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_error_response_carries_message() {
        let response = Error::MalformedTarget {
            target: "sine_wave".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
