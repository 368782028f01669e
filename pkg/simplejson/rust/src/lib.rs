// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::undocumented_unsafe_blocks)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

//! Grafana "simple JSON" datasource adapter.
//!
//! Dashboard requests name a provider and a query in one `provider:query`
//! target. Providers are registered by name at startup, the registry is
//! sealed, and the [`dispatch::Dispatcher`] routes every request to the
//! matching provider before shaping its result for the wire.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod model;
pub mod providers;
pub mod registry;
pub mod server;
pub mod target;
pub mod time_range;
pub mod transform;

pub use dispatch::Dispatcher;
pub use errors::{Error, Result};
pub use registry::{AnnotationReader, Finder, PanelReader, Reader, Registry, RegistryBuilder};
