// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of individual trace lines.
//!
//! A line is built in two steps mirroring the two stops of a syscall: the
//! entry stop produces `name(args)` and the exit stop appends ` = retval`.
//! When the tracee dies between the two stops the entry half is emitted on
//! its own, with no ` = `, so the reader can tell the call never returned.

use remora_common::{Arity, SyscallDescriptor, SYSCALL_ARG_COUNT};

/// A trace line under construction, opened at syscall entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    text: String,
}

impl TraceLine {
    /// Opens a line from the entry-side descriptor and raw argument words.
    pub fn begin(descriptor: &SyscallDescriptor, args: &[u64; SYSCALL_ARG_COUNT]) -> Self {
        let text = format!("{}({})", descriptor.name, render_args(descriptor, args));
        TraceLine { text }
    }

    /// Completes the line with the return value seen at syscall exit.
    pub fn finish(self, retval: i64) -> String {
        format!("{} = {retval}", self.text)
    }

    /// The entry half on its own, for calls that never returned.
    pub fn interrupted(self) -> String {
        self.text
    }
}

fn render_args(descriptor: &SyscallDescriptor, args: &[u64; SYSCALL_ARG_COUNT]) -> String {
    match descriptor.arity {
        Arity::Variadic => "...".to_string(),
        Arity::Fixed(0) => String::new(),
        Arity::Fixed(n) => descriptor.format.expand(&args[..n as usize]),
    }
}
