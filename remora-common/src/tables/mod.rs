// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in per-architecture descriptor tables, generated from the kernel's
//! syscall table and the section 2 man pages.

#[cfg(target_arch = "x86_64")]
pub(crate) const RAW_TABLE: &str = include_str!("x86_64.syscalls");

#[cfg(target_arch = "aarch64")]
pub(crate) const RAW_TABLE: &str = include_str!("aarch64.syscalls");

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
compile_error!("Unsupported architecture. Currently only aarch64 and x86_64 are supported.");
