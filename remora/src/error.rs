// SPDX-License-Identifier: MIT OR Apache-2.0

use nix::errno::Errno;
use thiserror::Error;

/// Things that can go wrong while a trace is running.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The tracee process could not be created.
    #[error("failed to spawn tracee: {0}")]
    Spawn(Errno),

    /// The tracee was created but never reached its first trace stop.
    #[error("tracee failed to launch: {0}")]
    Launch(String),

    /// A ptrace request or wait on the tracee failed.
    #[error("ptrace operation failed: {0}")]
    Ptrace(Errno),

    /// The kernel reported stops in an order the tracer cannot reconcile,
    /// e.g. two syscall entries without an exit between them.
    #[error("trace protocol violated: {0}")]
    Protocol(String),

    /// Writing a trace line to the output sink failed.
    #[error("failed to write trace output: {0}")]
    Output(#[from] std::io::Error),
}
