//! Purpose: Library crate behind the `yakshaver` CLI, the C ABI, and tests.
//! Exports: `api` (Rust surface), `abi` (C surface), `notice` (CLI diagnostics).
//! Role: Owns the one component, `YakShaver`, and its injectable shave effect.
//! Invariants: A shaver's count moves only on a successful shave, by exactly one.
//! Invariants: Failures are returned as values; reported error paths never panic.
pub mod abi;
pub mod api;
mod core;
pub mod notice;
