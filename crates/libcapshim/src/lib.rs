// SPDX-FileCopyrightText: 2023 Jade Lovelace
//
// SPDX-License-Identifier: MPL-2.0

//! Runs `dumpcap` first, and if it fails, becomes `tshark` instead.
//!
//! `dumpcap` is more efficient than `tshark` at just capturing and will drop
//! fewer packets, but `tshark` supports extcap interfaces and other sources
//! that `dumpcap` refuses. The caller asks for one logical capture and gets
//! whichever tool manages to run it.

use std::convert::Infallible;

pub mod config;
pub mod fallback;
pub mod host;
pub mod launch;
pub mod rewrite;


pub use config::ShimConfig;
pub use host::{ChildExit, Descriptor, Host, OsHost};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not find {name} on the search path: {source}")]
    Lookup {
        name: String,
        #[source]
        source: which::Error,
    },
    #[cfg(unix)]
    #[error("{0}: {1}")]
    Exec(&'static str, nix::errno::Errno),
    #[cfg(not(unix))]
    #[error("{0}: {1}")]
    Spawn(&'static str, std::io::Error),
    #[error("{0}")]
    InvalidArgument(String),
}

/// Runs the capture described by `args` against the real OS.
///
/// Returns `Ok(())` if the fast path succeeded. If the fallback could be
/// started, this never returns: the process has become the fallback tool.
pub fn dumpcap_ext(config: &ShimConfig, args: &mut [String]) -> Result<(), Error> {
    dumpcap_ext_with(&mut OsHost, config, args)
}

/// [`dumpcap_ext`] over an arbitrary [`Host`].
pub fn dumpcap_ext_with<H: Host>(
    host: &mut H,
    config: &ShimConfig,
    args: &mut [String],
) -> Result<(), Error> {
    // Must happen before anything is spawned: both tools inherit fd 0.
    rewrite::replace_devfd(host, config.replace_devfd, args);

    if launch::run_fast_path(host, &config.fast_path, args) {
        return Ok(());
    }

    let never: Infallible = fallback::exec_fallback(host, &config.fallback, args)?;
    match never {}
}
