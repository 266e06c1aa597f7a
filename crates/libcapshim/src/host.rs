// SPDX-FileCopyrightText: 2023 Jade Lovelace
//
// SPDX-License-Identifier: MPL-2.0

//! Everything the shim asks of the operating system.

use std::{
    convert::Infallible,
    fmt, io,
    path::{Path, PathBuf},
    process::ExitStatus,
};

use crate::{fallback, launch, Error};

/// A file descriptor number as it appears in `/dev/fd/N`.
pub type Descriptor = i32;

/// How a child process finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildExit {
    pub success: bool,
    /// `None` if the child was killed by a signal.
    pub code: Option<i32>,
}

impl From<ExitStatus> for ChildExit {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

impl fmt::Display for ChildExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

pub trait Host {
    /// Makes descriptor 0 refer to the same open stream as `fd`.
    fn dup_onto_stdin(&mut self, fd: Descriptor) -> io::Result<()>;

    /// Runs `program` with inherited stdio and waits for it.
    fn run(&mut self, program: &str, args: &[String]) -> io::Result<ChildExit>;

    /// Finds `name` on the executable search path.
    fn lookup(&mut self, name: &str) -> Result<PathBuf, which::Error>;

    /// Replaces the current process with `program`. Only returns on failure.
    fn replace(&mut self, program: &Path, args: &[String]) -> Result<Infallible, Error>;
}

/// The real thing.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsHost;

impl Host for OsHost {
    #[cfg(unix)]
    fn dup_onto_stdin(&mut self, fd: Descriptor) -> io::Result<()> {
        nix::unistd::dup2(fd, nix::libc::STDIN_FILENO)?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn dup_onto_stdin(&mut self, _fd: Descriptor) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "descriptor duplication is not available on this platform",
        ))
    }

    fn run(&mut self, program: &str, args: &[String]) -> io::Result<ChildExit> {
        launch::run_inherited(program, args)
    }

    fn lookup(&mut self, name: &str) -> Result<PathBuf, which::Error> {
        which::which(name)
    }

    fn replace(&mut self, program: &Path, args: &[String]) -> Result<Infallible, Error> {
        fallback::replace_image(program, args)
    }
}
