// SPDX-FileCopyrightText: 2023 Jade Lovelace
//
// SPDX-License-Identifier: MPL-2.0

//! Running the fast-path tool.

use std::{
    io,
    process::{Command, Stdio},
};

use crate::host::{ChildExit, Host};

/// Spawns `program` sharing our stdin, stdout and stderr, and blocks until it
/// exits. Nothing is captured.
pub fn run_inherited(program: &str, args: &[String]) -> io::Result<ChildExit> {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;
    Ok(status.into())
}

/// Runs the fast path once. Failing to start it counts the same as it exiting
/// unsuccessfully.
pub fn run_fast_path<H: Host>(host: &mut H, program: &str, args: &[String]) -> bool {
    tracing::info!("Starting {program} command {args:?}");

    match host.run(program, args) {
        Ok(exit) if exit.success => true,
        Ok(exit) => {
            tracing::info!("{program} failed with {exit}");
            false
        }
        Err(e) => {
            tracing::warn!("Could not start {program}: {e}");
            false
        }
    }
}
