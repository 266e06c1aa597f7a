// SPDX-FileCopyrightText: 2023 Jade Lovelace
//
// SPDX-License-Identifier: MPL-2.0

//! Replacing `/dev/fd/N` with `-`.
//!
//! If argument 1 is `/dev/fd/N`, the process should have descriptor N open
//! and the tool is expected to read packet data from it. `tshark` on FreeBSD
//! cannot open `/dev/fd/N`, so that something like
//!
//! ```text
//! cat foo.pcap | tshark -r /dev/fd/0
//! ```
//!
//! fails there. Instead we dup N onto 0 before starting either tool and pass
//! `-`, which both tools read as stdin.

use std::{io, num::ParseIntError};

use lazy_static::lazy_static;
use regex::Regex;

use crate::host::{Descriptor, Host};

/// What the tools read as "standard input".
pub const STDIN_ARG: &'static str = "-";

#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("Unexpected error parsing {arg}: {source}")]
    Parse {
        arg: String,
        #[source]
        source: ParseIntError,
    },
    #[error("Problem duplicating fd {fd} to 0: {source}")]
    Duplicate {
        fd: Descriptor,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
pub enum Rewrite {
    /// Too few arguments, disabled, or argument 1 is not a descriptor path.
    NotAttempted,
    /// Descriptor N is now also fd 0 and argument 1 is `-`.
    Replaced(Descriptor),
    /// Looked like a descriptor path, but the arguments were left alone.
    Skipped(RewriteError),
}

fn devfd_number(arg: &str) -> Option<&str> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r#"^/dev/fd/([0-9]+)$"#).unwrap();
    }

    let digits = RE.captures(arg)?.get(1)?;
    Some(digits.as_str())
}

/// Moves a `/dev/fd/N` in `args[1]` onto stdin. Never fails the capture: any
/// problem is logged and the arguments are left as they were.
pub fn replace_devfd<H: Host>(host: &mut H, enabled: bool, args: &mut [String]) -> Rewrite {
    if !enabled || args.len() < 2 {
        return Rewrite::NotAttempted;
    }

    let Some(digits) = devfd_number(&args[1]) else {
        return Rewrite::NotAttempted;
    };

    let fd: Descriptor = match digits.parse() {
        Ok(fd) => fd,
        Err(source) => {
            let e = RewriteError::Parse {
                arg: args[1].clone(),
                source,
            };
            tracing::warn!("{e}");
            return Rewrite::Skipped(e);
        }
    };

    if let Err(source) = host.dup_onto_stdin(fd) {
        let e = RewriteError::Duplicate { fd, source };
        tracing::warn!("{e}");
        tracing::warn!("Will not try to replace argument {} to tshark", args[1]);
        return Rewrite::Skipped(e);
    }

    tracing::info!(
        "Replacing argument {} with {STDIN_ARG} for tshark compatibility",
        args[1]
    );
    args[1] = STDIN_ARG.to_string();
    Rewrite::Replaced(fd)
}
