// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{fs, io::Write as _, path::PathBuf};

use anyhow::Context as _;
use clap::Parser;
use log::debug;
use remora_common::SyscallTable;

mod boundary;
mod error;
mod formatting;
mod tracer;
mod tracing;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(
    name = "remora",
    version,
    about = "Run a program and print every system call it makes"
)]
struct Cli {
    /// Load syscall descriptors from FILE instead of the built-in table
    #[arg(long, value_name = "FILE")]
    syscall_table: Option<PathBuf>,

    /// Program to run under the tracer
    #[arg(required = true)]
    program: String,

    /// Arguments passed to the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let table = match &cli.syscall_table {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading syscall table {}", path.display()))?;
            SyscallTable::build(text.lines())
                .with_context(|| format!("parsing syscall table {}", path.display()))?
        }
        None => SyscallTable::builtin().context("parsing built-in syscall table")?,
    };
    debug!("syscall table covers numbers up to {}", table.max_number());

    let mut child = tracer::spawn_traced(&cli.program, &cli.args)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = tracing::run(&mut child, &table, &mut out)?;
    out.flush()?;

    debug!("trace complete: {outcome:?}");

    // The tracee's own status is part of the trace output; reaching the end
    // of a trace is success for the tracer no matter how the tracee ended.
    Ok(())
}
