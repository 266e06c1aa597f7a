// SPDX-FileCopyrightText: 2023 Jade Lovelace
//
// SPDX-License-Identifier: MPL-2.0

//! Which tools to run and whether to rewrite `/dev/fd/N` arguments.

/// Set to `0` to keep `/dev/fd/N` arguments as they are.
pub const REPLACE_DEVFD_ENVVAR: &'static str = "CAPSHIM_REPLACE_DEVFD";

pub const DEFAULT_FAST_PATH: &'static str = "dumpcap";
pub const DEFAULT_FALLBACK: &'static str = "tshark";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShimConfig {
    /// Tool tried first. Spawned as given, so either a name on `PATH` or a
    /// path.
    pub fast_path: String,
    /// Tool the process becomes if the fast path fails. Looked up on `PATH`.
    pub fallback: String,
    /// Whether `/dev/fd/N` in argument 1 may be moved onto stdin.
    pub replace_devfd: bool,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FAST_PATH, DEFAULT_FALLBACK)
    }
}

impl ShimConfig {
    pub fn new(fast_path: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            fast_path: fast_path.into(),
            fallback: fallback.into(),
            replace_devfd: true,
        }
    }

    pub fn with_replace_devfd(self, replace_devfd: bool) -> Self {
        Self {
            replace_devfd,
            ..self
        }
    }

    /// Reads [`REPLACE_DEVFD_ENVVAR`] from the environment right now.
    pub fn replace_devfd_from_env() -> bool {
        let value = std::env::var_os(REPLACE_DEVFD_ENVVAR);
        replace_devfd_from(value.as_ref().and_then(|v| v.to_str()))
    }
}

/// Only the literal `"0"` turns the rewrite off.
pub fn replace_devfd_from(value: Option<&str>) -> bool {
    value != Some("0")
}
