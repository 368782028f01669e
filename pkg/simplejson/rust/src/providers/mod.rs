// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Providers shipped with the adapter.

use anyhow::Context;
use log::info;

use crate::config::Config;
use crate::registry::RegistryBuilder;

pub mod appliance;
pub mod midnights;
pub mod sine;

/// Registers `sine_wave` and `midnights`, plus `machine_details` when an
/// appliance base URL is configured.
pub fn register_builtin(builder: &mut RegistryBuilder, config: &Config) -> anyhow::Result<()> {
    builder
        .register_reader(sine::NAME, sine::read)?
        .register_annotation_reader(midnights::NAME, midnights::read)?;

    match &config.appliance.base_url {
        Some(base_url) => {
            let reader = appliance::ApplianceReader::new(base_url, &config.appliance)
                .context("configuring machine_details reader")?;
            builder.register_reader(appliance::NAME, reader)?;
            info!("Registered {} reader for {base_url}", appliance::NAME);
        }
        None => info!("No appliance base_url configured, {} disabled", appliance::NAME),
    }
    Ok(())
}
