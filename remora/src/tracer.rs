// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spawning and driving the tracee process.
//!
//! The tracee is forked, marks itself with `PTRACE_TRACEME`, and execs the
//! requested program; the exec delivers the initial stop. From then on the
//! child only ever runs between `PTRACE_SYSCALL` restarts, so every syscall
//! produces an entry stop and an exit stop that [`TracedChild`] surfaces
//! through the [`StopSource`] trait.

use std::ffi::CString;

use log::debug;
use nix::{
    sys::{
        ptrace,
        signal::Signal,
        wait::{waitpid, WaitStatus},
    },
    unistd::{execvp, fork, ForkResult, Pid},
};

use crate::{
    boundary::syscall_boundary,
    error::TraceError,
    tracing::{StopSource, TraceStop},
};

/// A child process stopped under ptrace, ready to be traced.
pub struct TracedChild {
    pid: Pid,
}

impl TracedChild {
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Waits for the stop the exec delivers, then enables
    /// `PTRACE_O_TRACESYSGOOD` so later syscall stops are unambiguous.
    fn await_initial_stop(&self) -> Result<(), TraceError> {
        match waitpid(self.pid, None).map_err(TraceError::Ptrace)? {
            WaitStatus::Stopped(_, _) => {}
            WaitStatus::Exited(_, code) => {
                return Err(TraceError::Launch(format!(
                    "tracee exited with status {code} before its first stop"
                )))
            }
            other => {
                return Err(TraceError::Launch(format!(
                    "unexpected initial wait status: {other:?}"
                )))
            }
        }

        ptrace::setoptions(self.pid, ptrace::Options::PTRACE_O_TRACESYSGOOD)
            .map_err(TraceError::Ptrace)?;

        Ok(())
    }
}

/// Forks and execs `program` with `args`, stopped at its first instruction.
pub fn spawn_traced(program: &str, args: &[String]) -> Result<TracedChild, TraceError> {
    let program = CString::new(program)
        .map_err(|_| TraceError::Launch("program name contains a NUL byte".to_string()))?;

    let mut argv = vec![program.clone()];
    for arg in args {
        argv.push(
            CString::new(arg.as_str())
                .map_err(|_| TraceError::Launch("argument contains a NUL byte".to_string()))?,
        );
    }

    match unsafe { fork() }.map_err(TraceError::Spawn)? {
        ForkResult::Child => child_exec(&program, &argv),
        ForkResult::Parent { child } => {
            debug!("spawned tracee pid {child}");
            let traced = TracedChild { pid: child };
            traced.await_initial_stop()?;
            Ok(traced)
        }
    }
}

/// Child side of the fork. Never returns: either the exec replaces the
/// process image or the child exits reporting the failure.
fn child_exec(program: &CString, argv: &[CString]) -> ! {
    if let Err(errno) = ptrace::traceme() {
        eprintln!("remora: failed to enable tracing: {errno}");
        unsafe { libc::_exit(1) }
    }

    match execvp(program, argv) {
        Ok(infallible) => match infallible {},
        Err(errno) => {
            eprintln!(
                "remora: failed to execute {}: {errno}",
                program.to_string_lossy()
            );
            unsafe { libc::_exit(1) }
        }
    }
}

impl StopSource for TracedChild {
    fn next_stop(&mut self) -> Result<TraceStop, TraceError> {
        let mut deliver: Option<Signal> = None;

        loop {
            ptrace::syscall(self.pid, deliver.take()).map_err(TraceError::Ptrace)?;

            match waitpid(self.pid, None).map_err(TraceError::Ptrace)? {
                WaitStatus::PtraceSyscall(_) => {
                    return syscall_boundary(self.pid).map(TraceStop::Boundary)
                }
                WaitStatus::Exited(_, code) => return Ok(TraceStop::Exited(code)),
                WaitStatus::Signaled(_, signal, _) => return Ok(TraceStop::Signaled(signal)),
                // Ordinary signal delivery; pass the signal along on restart.
                WaitStatus::Stopped(_, signal) => deliver = Some(signal),
                other => {
                    return Ok(TraceStop::Other(format!(
                        "unexpected wait status: {other:?}"
                    )))
                }
            }
        }
    }
}
