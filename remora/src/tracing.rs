// SPDX-License-Identifier: MIT OR Apache-2.0

//! The trace loop: turning a stream of tracee stops into trace lines.
//!
//! The loop is written against the [`StopSource`] trait rather than ptrace
//! directly, so the state machine can be driven by a scripted sequence of
//! stops in tests. Exactly one syscall is in flight at a time: an entry
//! opens a line, the matching exit completes it. Termination while a call
//! is in flight emits the entry half on its own before the notice.

use std::io::Write;

use log::debug;
use nix::sys::signal::Signal;
use remora_common::SyscallTable;

use crate::{boundary::SyscallBoundary, error::TraceError, formatting::TraceLine};

/// One observed stop of the tracee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceStop {
    /// A syscall entry or exit stop.
    Boundary(SyscallBoundary),

    /// The tracee exited with this status code.
    Exited(i32),

    /// The tracee was killed by this signal.
    Signaled(Signal),

    /// A stop of a kind the source could not interpret.
    Other(String),
}

/// Produces the tracee's stops in order. Implemented over ptrace for real
/// traces and over a scripted queue in tests.
pub trait StopSource {
    fn next_stop(&mut self) -> Result<TraceStop, TraceError>;
}

/// How the tracee ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOutcome {
    Exited(i32),
    Signaled(Signal),
}

enum State {
    AwaitingEntry,
    AwaitingExit(TraceLine),
}

/// Runs the trace loop to completion, writing one line per syscall.
pub fn run<S, W>(
    source: &mut S,
    table: &SyscallTable,
    out: &mut W,
) -> Result<TraceOutcome, TraceError>
where
    S: StopSource,
    W: Write,
{
    let mut state = State::AwaitingEntry;

    loop {
        let stop = source.next_stop()?;

        state = match (state, stop) {
            (State::AwaitingEntry, TraceStop::Boundary(SyscallBoundary::Entry { nr, args })) => {
                let descriptor = table.lookup(nr);
                State::AwaitingExit(TraceLine::begin(descriptor, &args))
            }
            (State::AwaitingExit(line), TraceStop::Boundary(SyscallBoundary::Exit { retval })) => {
                writeln!(out, "{}", line.finish(retval))?;
                State::AwaitingEntry
            }
            (State::AwaitingEntry, TraceStop::Exited(code)) => {
                debug!("tracee exited with {code}");
                writeln!(out, "+++ exited with {code} +++")?;
                return Ok(TraceOutcome::Exited(code));
            }
            (State::AwaitingEntry, TraceStop::Signaled(signal)) => {
                debug!("tracee killed by {signal}");
                writeln!(out, "+++ killed by {signal} +++")?;
                return Ok(TraceOutcome::Signaled(signal));
            }
            (State::AwaitingExit(line), TraceStop::Exited(code)) => {
                // The call in flight never returned; exit_group ends this way.
                writeln!(out, "{}", line.interrupted())?;
                writeln!(out, "+++ exited with {code} +++")?;
                return Ok(TraceOutcome::Exited(code));
            }
            (State::AwaitingExit(line), TraceStop::Signaled(signal)) => {
                writeln!(out, "{}", line.interrupted())?;
                writeln!(out, "+++ killed by {signal} +++")?;
                return Ok(TraceOutcome::Signaled(signal));
            }
            (State::AwaitingEntry, TraceStop::Boundary(SyscallBoundary::Exit { .. })) => {
                return Err(TraceError::Protocol(
                    "syscall exit without a matching entry".to_string(),
                ));
            }
            (State::AwaitingExit(_), TraceStop::Boundary(SyscallBoundary::Entry { nr, .. })) => {
                return Err(TraceError::Protocol(format!(
                    "syscall {nr} entered while another call was in flight"
                )));
            }
            (_, TraceStop::Other(description)) => {
                return Err(TraceError::Protocol(description));
            }
        };
    }
}
