// SPDX-FileCopyrightText: 2023 Jade Lovelace
//
// SPDX-License-Identifier: MPL-2.0

//! Runs a capture with dumpcap, falling back to tshark.
use clap::Parser;
use libcapshim::{
    config::{DEFAULT_FALLBACK, DEFAULT_FAST_PATH},
    ShimConfig,
};
use tracing::metadata::LevelFilter;

use std::process::ExitCode;

use tracing_subscriber::prelude::*;

#[derive(clap::Parser, Debug)]
// Capture tools have their own -h and -V, so those must reach them untouched.
#[clap(about, disable_version_flag = true, disable_help_flag = true)]
struct Args {
    /// Print help.
    #[clap(long, action = clap::ArgAction::Help)]
    help: Option<bool>,

    /// Capture tool to try first.
    #[clap(long, env = "CAPSHIM_DUMPCAP", default_value = DEFAULT_FAST_PATH)]
    dumpcap: String,

    /// Capture tool to become if the first one fails. Looked up on PATH.
    #[clap(long, env = "CAPSHIM_TSHARK", default_value = DEFAULT_FALLBACK)]
    tshark: String,

    /// Pass /dev/fd/N through as-is instead of moving it onto stdin. Setting
    /// CAPSHIM_REPLACE_DEVFD=0 does the same.
    #[clap(long)]
    no_replace_devfd: bool,

    /// Arguments for the capture tool, passed through verbatim. Anything
    /// from the first unrecognised argument on belongs to the tool; use `--`
    /// to pass arguments that collide with the options above.
    #[clap(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl Args {
    fn config(&self, replace_devfd_env: bool) -> ShimConfig {
        ShimConfig::new(&self.dumpcap, &self.tshark)
            .with_replace_devfd(replace_devfd_env && !self.no_replace_devfd)
    }
}

fn main() -> ExitCode {
    // stdout belongs to the capture tool
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::Layer::new()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();
    let config = args.config(ShimConfig::replace_devfd_from_env());
    let mut capture_args = args.args;

    match libcapshim::dumpcap_ext(&config, &mut capture_args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("No capture tool could be started: {e}");
            ExitCode::FAILURE
        }
    }
}
