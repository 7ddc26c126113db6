//! Virtual machine components: registers, RAM, the I/O seam and the
//! machine that ties them together.

pub mod interface;
pub mod machine;
pub mod memory;
pub mod register;

pub use interface::{Interface, QueueInterface};
pub use machine::Machine;
pub use memory::Ram;
pub use register::Register;
