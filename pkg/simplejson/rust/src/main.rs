// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use simplejson_adapter::cli::Args;
use simplejson_adapter::registry::ProviderKind;
use simplejson_adapter::{Dispatcher, RegistryBuilder, config, providers, server};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (mut config, source) = config::load_config(args.config.as_deref())?;
    args.apply(&mut config);

    let log_level = config::get_log_level(&config);
    simple_logger::init_with_level(log_level)?;
    info!(
        "simplejson-adapter starting (version {})",
        env!("CARGO_PKG_VERSION")
    );
    info!("Log level set to: {:?}", log_level);
    source.log();

    let mut builder = RegistryBuilder::new();
    providers::register_builtin(&mut builder, &config).context("registering providers")?;
    let registry = Arc::new(builder.seal());
    for kind in ProviderKind::ALL {
        info!("Registered {kind}s: {:?}", registry.names(kind));
    }

    let timeout = config.provider_timeout();
    match timeout {
        Some(limit) => info!("Provider calls time out after {limit:?}"),
        None => info!("Provider timeout disabled"),
    }
    let dispatcher = Arc::new(Dispatcher::new(registry, timeout));

    let addr = SocketAddr::new(config.listen_address, config.port);
    server::run_server(dispatcher, addr).await?;

    info!("simplejson-adapter shutting down");
    Ok(())
}
