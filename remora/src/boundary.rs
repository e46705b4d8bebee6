// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of syscall-stop details via `PTRACE_GET_SYSCALL_INFO`.
//!
//! The kernel tells us which side of a syscall a stop is on, so the tracer
//! never has to guess from stop parity. The request and its result layout
//! are mirrored here; the layout matches `struct ptrace_syscall_info` from
//! the kernel UAPI headers (Linux 5.3+).

use nix::{errno::Errno, unistd::Pid};
use remora_common::SYSCALL_ARG_COUNT;

use crate::error::TraceError;

const PTRACE_GET_SYSCALL_INFO: libc::c_uint = 0x420e;

const SYSCALL_INFO_NONE: u8 = 0;
const SYSCALL_INFO_ENTRY: u8 = 1;
const SYSCALL_INFO_EXIT: u8 = 2;
const SYSCALL_INFO_SECCOMP: u8 = 3;

#[repr(C)]
#[derive(Clone, Copy)]
struct RawEntry {
    nr: u64,
    args: [u64; SYSCALL_ARG_COUNT],
}

#[repr(C)]
#[derive(Clone, Copy)]
struct RawExit {
    rval: i64,
    is_error: u8,
}

#[repr(C)]
#[derive(Clone, Copy)]
struct RawSeccomp {
    nr: u64,
    args: [u64; SYSCALL_ARG_COUNT],
    ret_data: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
union RawData {
    entry: RawEntry,
    exit: RawExit,
    seccomp: RawSeccomp,
}

#[repr(C)]
#[derive(Clone, Copy)]
struct RawSyscallInfo {
    op: u8,
    pad: [u8; 3],
    arch: u32,
    instruction_pointer: u64,
    stack_pointer: u64,
    data: RawData,
}

/// Which side of a syscall a trace stop landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyscallBoundary {
    /// Entering the kernel: the syscall number and raw argument registers.
    Entry {
        nr: u64,
        args: [u64; SYSCALL_ARG_COUNT],
    },

    /// Returning to userspace: the raw return value (negative errno on
    /// failure, as the kernel reports it).
    Exit { retval: i64 },
}

/// Asks the kernel which boundary the stopped tracee is at.
pub fn syscall_boundary(pid: Pid) -> Result<SyscallBoundary, TraceError> {
    let mut info: RawSyscallInfo = unsafe { std::mem::zeroed() };

    let res = unsafe {
        libc::ptrace(
            PTRACE_GET_SYSCALL_INFO,
            pid.as_raw(),
            std::mem::size_of::<RawSyscallInfo>(),
            &mut info as *mut RawSyscallInfo,
        )
    };
    if res < 0 {
        return Err(TraceError::Ptrace(Errno::last()));
    }

    match info.op {
        SYSCALL_INFO_ENTRY => {
            let entry = unsafe { info.data.entry };
            Ok(SyscallBoundary::Entry {
                nr: entry.nr,
                args: entry.args,
            })
        }
        SYSCALL_INFO_EXIT => {
            let exit = unsafe { info.data.exit };
            Ok(SyscallBoundary::Exit { retval: exit.rval })
        }
        SYSCALL_INFO_NONE | SYSCALL_INFO_SECCOMP => Err(TraceError::Protocol(format!(
            "unexpected syscall info op {} at a syscall stop",
            info.op
        ))),
        other => Err(TraceError::Protocol(format!(
            "unknown syscall info op {other}"
        ))),
    }
}
