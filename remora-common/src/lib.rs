// SPDX-License-Identifier: MIT OR Apache-2.0

//! Syscall descriptors and the number-to-descriptor catalog shared by the
//! tracer.
//!
//! A descriptor records how one syscall is displayed: its name, how many of
//! its argument registers are meaningful, and a positional template used to
//! render them. Descriptors are parsed once, at startup, from a text table
//! with one `<number> <name> <arity> <format>` entry per line, and stored in
//! a dense array indexed by syscall number so that lookups during tracing
//! are a bounds check away. The table is immutable after construction.

use thiserror::Error;

pub mod template;

mod tables;

use template::{Template, TemplateError};

/// Maximum number of argument registers a syscall can use on Linux.
pub const SYSCALL_ARG_COUNT: usize = 6;

/// How many arguments of a syscall are meaningful for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many leading argument registers carry arguments.
    Fixed(u8),

    /// Variadic or unspecified; arguments are rendered as `...`.
    Variadic,
}

/// Display metadata for a single syscall number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyscallDescriptor {
    /// Name shown in trace output.
    pub name: String,

    /// How many argument words the format template consumes.
    pub arity: Arity,

    /// Argument template with one substitution site per fixed argument.
    pub format: Template,
}

impl SyscallDescriptor {
    /// The fallback descriptor used for numbers the table does not cover.
    fn unknown() -> Self {
        SyscallDescriptor {
            name: "unknown_syscall".to_string(),
            arity: Arity::Variadic,
            format: Template::empty(),
        }
    }
}

/// A descriptor table entry failed to parse, or the table as a whole is
/// unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// The input contained no descriptor entries at all.
    #[error("syscall table is empty")]
    Empty,

    /// A line did not have the `<number> <name> <arity> <format>` shape.
    #[error("line {line}: expected \"<number> <name> <arity> <format>\", got {entry:?}")]
    Malformed { line: usize, entry: String },

    /// The number field did not parse as a non-negative integer.
    #[error("line {line}: invalid syscall number {value:?}")]
    BadNumber { line: usize, value: String },

    /// The arity field was not an integer in 0-6 or the -1 sentinel.
    #[error("line {line}: invalid arity {value:?} (expected 0-6 or -1)")]
    BadArity { line: usize, value: String },

    /// The format template did not parse.
    #[error("line {line}: bad format template: {source}")]
    BadTemplate {
        line: usize,
        #[source]
        source: TemplateError,
    },

    /// A fixed arity disagreed with the template's substitution sites.
    #[error(
        "line {line}: {name} declares arity {arity} but its format has {placeholders} placeholder(s)"
    )]
    ArityMismatch {
        line: usize,
        name: String,
        arity: u8,
        placeholders: usize,
    },
}

/// Dense syscall-number-to-descriptor table.
///
/// Built once from descriptor text; numbers outside the table (negative, or
/// past the highest entry) resolve to the `unknown_syscall` descriptor
/// instead of failing, so the tracer never aborts over a number the kernel
/// knows and the table does not.
#[derive(Debug, Clone)]
pub struct SyscallTable {
    entries: Vec<SyscallDescriptor>,
    unknown: SyscallDescriptor,
}

impl SyscallTable {
    /// Builds the table from descriptor lines. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn build<'a, I>(lines: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut parsed = Vec::new();

        for (index, raw) in lines.into_iter().enumerate() {
            let line = index + 1;
            let entry = raw.trim_end();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }

            parsed.push(parse_entry(line, entry)?);
        }

        if parsed.is_empty() {
            return Err(TableError::Empty);
        }

        // Dense table sized by the largest number seen; everything not
        // explicitly listed renders as unknown_syscall.
        let unknown = SyscallDescriptor::unknown();
        let max = parsed.iter().map(|(number, _)| *number).max().unwrap_or(0);
        let mut entries = vec![unknown.clone(); max + 1];
        for (number, descriptor) in parsed {
            entries[number] = descriptor;
        }

        Ok(SyscallTable { entries, unknown })
    }

    /// Builds the table embedded for the target architecture.
    pub fn builtin() -> Result<Self, TableError> {
        Self::build(tables::RAW_TABLE.lines())
    }

    /// Looks up the descriptor for a syscall number. Numbers the table does
    /// not cover, including negative ones, resolve to `unknown_syscall`.
    pub fn lookup<N>(&self, number: N) -> &SyscallDescriptor
    where
        N: TryInto<usize>,
    {
        number
            .try_into()
            .ok()
            .and_then(|index| self.entries.get(index))
            .unwrap_or(&self.unknown)
    }

    /// The highest syscall number the table covers.
    pub fn max_number(&self) -> usize {
        self.entries.len() - 1
    }
}

fn parse_entry(line: usize, entry: &str) -> Result<(usize, SyscallDescriptor), TableError> {
    let mut fields = entry.splitn(4, ' ');

    let number = fields.next().unwrap_or_default();
    let (name, arity) = match (fields.next(), fields.next()) {
        (Some(name), Some(arity)) => (name, arity),
        _ => {
            return Err(TableError::Malformed {
                line,
                entry: entry.to_string(),
            })
        }
    };
    let format = fields.next().unwrap_or_default();

    let number: usize = number.parse().map_err(|_| TableError::BadNumber {
        line,
        value: number.to_string(),
    })?;

    let arity = match arity {
        "-1" => Arity::Variadic,
        value => match value.parse::<u8>() {
            Ok(n) if n as usize <= SYSCALL_ARG_COUNT => Arity::Fixed(n),
            _ => {
                return Err(TableError::BadArity {
                    line,
                    value: value.to_string(),
                })
            }
        },
    };

    let format = Template::parse(format).map_err(|source| TableError::BadTemplate { line, source })?;

    // Authoring mistakes surface here instead of as garbled trace output.
    if let Arity::Fixed(n) = arity {
        let placeholders = format.placeholders();
        if placeholders != n as usize {
            return Err(TableError::ArityMismatch {
                line,
                name: name.to_string(),
                arity: n,
                placeholders,
            });
        }
    }

    Ok((
        number,
        SyscallDescriptor {
            name: name.to_string(),
            arity,
            format,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SyscallTable {
        SyscallTable::build([
            "0 read 3 fd={}, buf={:#x}, count={}",
            "1 write 3 fd={}, buf={:#x}, count={}",
            "16 ioctl -1 ...",
            "39 getpid 0",
            "60 exit 1 status={}",
        ])
        .unwrap()
    }

    #[test]
    fn listed_numbers_resolve_exactly() {
        let table = sample();

        let read = table.lookup(0usize);
        assert_eq!(read.name, "read");
        assert_eq!(read.arity, Arity::Fixed(3));

        let exit = table.lookup(60usize);
        assert_eq!(exit.name, "exit");
        assert_eq!(exit.arity, Arity::Fixed(1));
        assert_eq!(exit.format.expand(&[42]), "status=42");

        let ioctl = table.lookup(16usize);
        assert_eq!(ioctl.arity, Arity::Variadic);
    }

    #[test]
    fn unlisted_numbers_resolve_to_unknown() {
        let table = sample();

        for number in [2i64, 59, 61, 100_000] {
            let descriptor = table.lookup(number);
            assert_eq!(descriptor.name, "unknown_syscall");
            assert_eq!(descriptor.arity, Arity::Variadic);
        }
    }

    #[test]
    fn negative_numbers_resolve_to_unknown() {
        let table = sample();
        assert_eq!(table.lookup(-1i64).name, "unknown_syscall");
        assert_eq!(table.lookup(i64::MIN).name, "unknown_syscall");
    }

    #[test]
    fn table_is_dense_up_to_the_maximum() {
        let table = sample();
        assert_eq!(table.max_number(), 60);
    }

    #[test]
    fn arity_zero_entry_without_format_field() {
        let table = SyscallTable::build(["39 getpid 0"]).unwrap();
        let getpid = table.lookup(39usize);
        assert_eq!(getpid.arity, Arity::Fixed(0));
        assert_eq!(getpid.format, Template::empty());
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let table = SyscallTable::build(["# header", "", "60 exit 1 status={}"]).unwrap();
        assert_eq!(table.lookup(60usize).name, "exit");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            SyscallTable::build(std::iter::empty::<&str>()),
            Err(TableError::Empty)
        ));
        assert!(matches!(
            SyscallTable::build(["# comments only", ""]),
            Err(TableError::Empty)
        ));
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(matches!(
            SyscallTable::build(["60 exit"]),
            Err(TableError::Malformed { line: 1, .. })
        ));
    }

    #[test]
    fn bad_number_is_rejected() {
        assert!(matches!(
            SyscallTable::build(["sixty exit 1 status={}"]),
            Err(TableError::BadNumber { line: 1, .. })
        ));
    }

    #[test]
    fn arity_out_of_range_is_rejected() {
        assert!(matches!(
            SyscallTable::build(["60 exit 7 a={} b={} c={} d={} e={} f={} g={}"]),
            Err(TableError::BadArity { line: 1, .. })
        ));
        assert!(matches!(
            SyscallTable::build(["60 exit -2 ..."]),
            Err(TableError::BadArity { line: 1, .. })
        ));
    }

    #[test]
    fn arity_template_mismatch_is_rejected() {
        assert!(matches!(
            SyscallTable::build(["60 exit 2 status={}"]),
            Err(TableError::ArityMismatch {
                line: 1,
                arity: 2,
                placeholders: 1,
                ..
            })
        ));
    }

    #[test]
    fn builtin_table_parses() {
        let table = SyscallTable::builtin().unwrap();
        assert!(table.max_number() >= 439);
    }
}
