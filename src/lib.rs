// Allow unwrap/expect and unreadable literals in tests (test code is not
// production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! dcvm: an educational accumulator-machine simulator.
//!
//! The DC is a small fixed-width CPU: 13-bit words (6 opcode bits, 7
//! address bits), 128 cells of RAM, seven registers and an accumulator
//! architecture with stack- and base-pointer addressing modes. This crate
//! provides the full toolchain around it:
//!
//! ```text
//! source text --(asm)--> assembled text --(loader)--> RAM --(Machine)--> I/O
//! ```
//!
//! The machine talks to the outside world only through the two-method
//! [`vm::Interface`] trait; everything else (CLI, TUI) is a driver on
//! top.

pub mod asm;
pub mod error;
pub mod isa;
pub mod loader;
pub mod vm;

pub use error::{DcError, DcResult};
pub use isa::{Config, Opcode};
pub use vm::{Interface, Machine, QueueInterface, Ram, Register};
