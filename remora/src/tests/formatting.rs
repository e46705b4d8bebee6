// SPDX-License-Identifier: MIT OR Apache-2.0

use remora_common::{template::Template, Arity, SyscallDescriptor};

use crate::formatting::TraceLine;

fn descriptor(name: &str, arity: Arity, format: &str) -> SyscallDescriptor {
    SyscallDescriptor {
        name: name.to_string(),
        arity,
        format: Template::parse(format).unwrap(),
    }
}

#[test]
fn fixed_arity_line() {
    let write = descriptor("write", Arity::Fixed(3), "fd={}, buf={:#x}, count={}");
    let line = TraceLine::begin(&write, &[1, 0x7f001000, 5, 0, 0, 0]);
    assert_eq!(
        line.finish(5),
        "write(fd=1, buf=0x7f001000, count=5) = 5"
    );
}

#[test]
fn zero_arity_line_has_empty_parens() {
    let getpid = descriptor("getpid", Arity::Fixed(0), "");
    let line = TraceLine::begin(&getpid, &[9, 9, 9, 9, 9, 9]);
    assert_eq!(line.finish(1234), "getpid() = 1234");
}

#[test]
fn variadic_line_elides_arguments() {
    let ioctl = descriptor("ioctl", Arity::Variadic, "...");
    let line = TraceLine::begin(&ioctl, &[3, 0x5401, 0, 0, 0, 0]);
    assert_eq!(line.finish(0), "ioctl(...) = 0");
}

#[test]
fn negative_return_value() {
    let close = descriptor("close", Arity::Fixed(1), "fd={}");
    let line = TraceLine::begin(&close, &[99, 0, 0, 0, 0, 0]);
    assert_eq!(line.finish(-9), "close(fd=99) = -9");
}

#[test]
fn interrupted_line_has_no_return_value() {
    let exit_group = descriptor("exit_group", Arity::Fixed(1), "status={}");
    let line = TraceLine::begin(&exit_group, &[7, 0, 0, 0, 0, 0]);
    assert_eq!(line.interrupted(), "exit_group(status=7)");
}

#[test]
fn extra_argument_registers_are_ignored() {
    let exit = descriptor("exit", Arity::Fixed(1), "status={}");
    let line = TraceLine::begin(&exit, &[42, 1, 2, 3, 4, 5]);
    assert_eq!(line.finish(0), "exit(status=42) = 0");
}
