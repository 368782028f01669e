// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Parser, Debug, Default)]
#[command(name = "simplejson-adapter")]
#[command(about = "Grafana simple JSON datasource backed by named providers")]
#[command(version)]
pub struct Args {
    /// Path to the YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port to listen on, overrides the config file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind, overrides the config file
    #[arg(long)]
    pub listen_address: Option<IpAddr>,
}

impl Args {
    /// Command-line values win over the file.
    pub fn apply(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(addr) = self.listen_address {
            config.listen_address = addr;
        }
    }
}
