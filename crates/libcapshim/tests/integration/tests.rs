// SPDX-FileCopyrightText: 2023 Jade Lovelace
//
// SPDX-License-Identifier: MPL-2.0

use std::{io::Read, os::fd::AsRawFd};

use libcapshim::{
    config::REPLACE_DEVFD_ENVVAR,
    dumpcap_ext,
    rewrite::{replace_devfd, Rewrite, RewriteError},
    Error, OsHost, ShimConfig,
};

use crate::case;
use crate::support::*;

fn test_devfd_moved_onto_stdin() {
    let payload = open_payload(b"pretend this is a pcap");
    let fd = payload.as_raw_fd();
    let mut a = args(&["-r", &format!("/dev/fd/{fd}")]);

    let outcome = replace_devfd(&mut OsHost, true, &mut a);

    assert!(matches!(outcome, Rewrite::Replaced(n) if n == fd), "{outcome:?}");
    assert_eq!(a, args(&["-r", "-"]));

    let mut stdin = String::new();
    std::io::stdin().read_to_string(&mut stdin).unwrap();
    assert_eq!(stdin, "pretend this is a pcap");
}
case!(test_devfd_moved_onto_stdin);

fn test_closed_devfd_is_left_alone() {
    let mut a = args(&["-r", "/dev/fd/987654"]);

    let outcome = replace_devfd(&mut OsHost, true, &mut a);

    assert!(
        matches!(outcome, Rewrite::Skipped(RewriteError::Duplicate { .. })),
        "{outcome:?}"
    );
    assert_eq!(a, args(&["-r", "/dev/fd/987654"]));
}
case!(test_closed_devfd_is_left_alone);

fn test_fast_path_success_returns() {
    let config = ShimConfig::new("sh", MISSING_FALLBACK);
    let mut a = args(&["-c", "exit 0"]);

    dumpcap_ext(&config, &mut a).unwrap();
}
case!(test_fast_path_success_returns);

fn test_missing_fallback_is_an_error() {
    let config = ShimConfig::new(MISSING_FAST_PATH, MISSING_FALLBACK);
    let mut a = args(&["-c", "exit 0"]);

    let err = dumpcap_ext(&config, &mut a).unwrap_err();

    match err {
        Error::Lookup { name, .. } => assert_eq!(name, MISSING_FALLBACK),
        other => panic!("unexpected error {other:?}"),
    }
}
case!(test_missing_fallback_is_an_error);

fn test_failing_fast_path_becomes_fallback() {
    let config = ShimConfig::new(MISSING_FAST_PATH, "sh");
    let mut a = args(&["-c", "exit 7"]);

    let res = dumpcap_ext(&config, &mut a);
    panic!("fallback exec returned: {res:?}");
}
case!(test_failing_fast_path_becomes_fallback, exits_with = 7);

fn test_fallback_reads_rewritten_stdin() {
    // `sh -s -` takes its script from stdin, so the exit code only comes out
    // as 5 if the payload really landed on fd 0 across the exec.
    let payload = open_payload(b"exit 5\n");
    let fd = payload.as_raw_fd();
    let config = ShimConfig::new(MISSING_FAST_PATH, "sh");
    let mut a = args(&["-s", &format!("/dev/fd/{fd}")]);

    let res = dumpcap_ext(&config, &mut a);
    panic!("fallback exec returned: {res:?}");
}
case!(test_fallback_reads_rewritten_stdin, exits_with = 5);

fn test_disabled_rewrite_keeps_devfd() {
    let payload = open_payload(b"exit 5\n");
    let fd = payload.as_raw_fd();
    let config = ShimConfig::new(MISSING_FAST_PATH, "sh").with_replace_devfd(false);
    // stdin is /dev/null from the harness, so the script is empty
    let mut a = args(&["-s", &format!("/dev/fd/{fd}")]);

    let res = dumpcap_ext(&config, &mut a);
    panic!("fallback exec returned: {res:?}");
}
case!(test_disabled_rewrite_keeps_devfd, exits_with = 0);

fn test_nonzero_fast_path_becomes_fallback() {
    // false ignores its arguments and exits 1
    let config = ShimConfig::new("false", "sh");
    let mut a = args(&["-c", "exit 9"]);

    let res = dumpcap_ext(&config, &mut a);
    panic!("fallback exec returned: {res:?}");
}
case!(test_nonzero_fast_path_becomes_fallback, exits_with = 9);

fn test_replace_devfd_envvar_is_read() {
    std::env::remove_var(REPLACE_DEVFD_ENVVAR);
    assert!(ShimConfig::replace_devfd_from_env());

    std::env::set_var(REPLACE_DEVFD_ENVVAR, "1");
    assert!(ShimConfig::replace_devfd_from_env());

    std::env::set_var(REPLACE_DEVFD_ENVVAR, "0");
    assert!(!ShimConfig::replace_devfd_from_env());
}
case!(test_replace_devfd_envvar_is_read);

fn test_replace_devfd_envvar_zero_keeps_devfd() {
    // Same setup as test_fallback_reads_rewritten_stdin: exit code 5 would
    // mean the rewrite happened anyway.
    std::env::set_var(REPLACE_DEVFD_ENVVAR, "0");
    let payload = open_payload(b"exit 5\n");
    let fd = payload.as_raw_fd();
    let config = ShimConfig::new(MISSING_FAST_PATH, "sh")
        .with_replace_devfd(ShimConfig::replace_devfd_from_env());
    let mut a = args(&["-s", &format!("/dev/fd/{fd}")]);

    let res = dumpcap_ext(&config, &mut a);
    panic!("fallback exec returned: {res:?}");
}
case!(test_replace_devfd_envvar_zero_keeps_devfd, exits_with = 0);
