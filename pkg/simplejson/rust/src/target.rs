// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::errors::{Error, Result};

pub const SEPARATOR: char = ':';

/// A `provider:query` string split on its first separator.
///
/// The query half is opaque here and may itself contain separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target<'a> {
    pub provider: &'a str,
    pub query: &'a str,
}

impl<'a> Target<'a> {
    pub fn parse(raw: &'a str) -> Result<Self> {
        raw.split_once(SEPARATOR)
            .map(|(provider, query)| Target { provider, query })
            .ok_or_else(|| Error::MalformedTarget {
                target: raw.to_string(),
            })
    }
}

pub fn has_separator(raw: &str) -> bool {
    raw.contains(SEPARATOR)
}
