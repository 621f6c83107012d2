//! Purpose: Define the stable public Rust API boundary for yakshaver.
//! Exports: The shaver, its effects, and the error model.
//! Role: Public, additive-only surface; hides internal module layout.
//! Invariants: This module is the only public path to core types.

pub use crate::core::effect::{Effect, FailEvery, Script, Trim};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind, STATUS_OK, to_status_code};
pub use crate::core::shaver::{Handle, YakShaver};
