// SPDX-License-Identifier: MIT OR Apache-2.0

//! Small workloads with a known syscall footprint, run under the tracer by
//! the integration tests. Workloads issue raw syscalls so the trace is not
//! at the mercy of libc wrappers picking a different call.

use std::ffi::c_void;

use anyhow::bail;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args();

    // Ignore the binary name
    let _ = args.next();

    if let Some(name) = args.next() {
        match name.as_str() {
            "exit-only" => exit_only(),
            "three-writes" => three_writes(),
            name => bail!("Unknown workload name: {name}"),
        }
    } else {
        bail!("Need a workload name as the first argument, nothing provided.")
    }
}

/// Terminates immediately with a recognizable status. exit_group never
/// returns, so its trace line has no return value.
fn exit_only() -> ! {
    unsafe {
        libc::syscall(libc::SYS_exit_group, 7);
    }
    unreachable!()
}

/// Three writes to stdout with distinct, increasing lengths so the trace
/// lines can be matched in order.
fn three_writes() -> ! {
    let chunks: [&[u8]; 3] = [b"aaaaa", b"bbbbbb", b"ccccccc"];

    unsafe {
        for chunk in chunks {
            libc::write(1, chunk.as_ptr() as *const c_void, chunk.len());
        }
        libc::syscall(libc::SYS_exit_group, 0);
    }
    unreachable!()
}
