// SPDX-FileCopyrightText: 2023 Jade Lovelace
//
// SPDX-License-Identifier: MPL-2.0

//! Becoming the fallback tool after the fast path failed.

use std::{convert::Infallible, path::Path};

use crate::{host::Host, Error};

/// Looks up `name` and replaces this process with it, passing `args`
/// through. Only returns if that could not be done.
pub fn exec_fallback<H: Host>(
    host: &mut H,
    name: &str,
    args: &[String],
) -> Result<Infallible, Error> {
    let path = host.lookup(name).map_err(|source| Error::Lookup {
        name: name.to_string(),
        source,
    })?;

    tracing::info!(
        "Retrying with {name} command {} {args:?}",
        path.display()
    );

    host.replace(&path, args)
}

#[cfg(unix)]
fn to_cstring(bytes: &[u8]) -> Result<std::ffi::CString, Error> {
    std::ffi::CString::new(bytes).map_err(|_| {
        Error::InvalidArgument(format!(
            "{:?} contains a NUL byte",
            String::from_utf8_lossy(bytes)
        ))
    })
}

/// `execve` into `program` with argv `[program, args...]` and our whole
/// environment. Open descriptors without close-on-exec, including whatever is
/// on fd 0 now, carry over.
#[cfg(unix)]
pub fn replace_image(program: &Path, args: &[String]) -> Result<Infallible, Error> {
    use std::os::unix::ffi::OsStrExt;

    let program_c = to_cstring(program.as_os_str().as_bytes())?;

    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push(program_c.clone());
    for arg in args {
        argv.push(to_cstring(arg.as_bytes())?);
    }

    let envp = std::env::vars_os()
        .map(|(k, v)| {
            let mut entry = k.as_bytes().to_vec();
            entry.push(b'=');
            entry.extend_from_slice(v.as_bytes());
            to_cstring(&entry)
        })
        .collect::<Result<Vec<_>, _>>()?;

    nix::unistd::execve(&program_c, &argv, &envp).map_err(|e| Error::Exec("execve fallback", e))
}

/// There is no exec here, so run the fallback as a child and exit with its
/// code once it is done. The PID changes, the exit code does not.
#[cfg(not(unix))]
pub fn replace_image(program: &Path, args: &[String]) -> Result<Infallible, Error> {
    use std::process::{Command, Stdio};

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| Error::Spawn("spawn fallback", e))?;

    std::process::exit(status.code().unwrap_or(1))
}
