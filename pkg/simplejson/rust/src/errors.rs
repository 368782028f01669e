// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::time::Duration;

use thiserror::Error;

use crate::registry::ProviderKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("target must be of type: <finder>:<metric_query>, got instead: {target}")]
    MalformedTarget { target: String },

    #[error("no {kind} registered under the name {name:?}")]
    UnknownProvider { kind: ProviderKind, name: String },

    #[error("{kind} name {name:?} must be non-empty and free of ':'")]
    InvalidProviderName { kind: ProviderKind, name: String },

    #[error("a {kind} named {name:?} is already registered")]
    DuplicateProvider { kind: ProviderKind, name: String },

    #[error("invalid time range bound {bound:?}: {reason}")]
    InvalidRange { bound: String, reason: String },

    #[error("{provider} returned a {found} result, expected {expected}")]
    UnsupportedResultShape {
        provider: String,
        found: &'static str,
        expected: &'static str,
    },

    #[error("provider {provider} failed: {message}")]
    ProviderFailure { provider: String, message: String },

    #[error("provider {provider} did not answer within {timeout:?}")]
    ProviderTimeout { provider: String, timeout: Duration },
}

impl Error {
    /// Wraps a provider-side failure, keeping the whole context chain.
    pub(crate) fn provider_failure(provider: &str, err: &anyhow::Error) -> Self {
        Error::ProviderFailure {
            provider: provider.to_string(),
            message: format!("{err:#}"),
        }
    }
}
