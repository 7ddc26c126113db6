//! The machine's only window to the outside world.

use std::collections::VecDeque;

use crate::error::{DcError, DcResult};

/// Input/output contract consumed by the machine.
///
/// `INM`, `INS` and `INB` pull values through [`Interface::get_input`];
/// `OUT`, `OUTS` and `OUTB` push the signed value of DR through
/// [`Interface::show_output`]. Both calls are synchronous and may block;
/// the implementation decides whether to wait for a value or fail
/// immediately with [`DcError::NoInput`].
pub trait Interface {
    /// Fetch the next input value.
    ///
    /// # Errors
    ///
    /// Returns [`DcError::NoInput`] if no value is available.
    fn get_input(&mut self) -> DcResult<i32>;

    /// Emit an output value.
    fn show_output(&mut self, value: i32);
}

/// A queue-backed [`Interface`] for batch runs and tests.
///
/// Inputs are consumed front to back; outputs are collected in order.
/// An exhausted input queue reports [`DcError::NoInput`], which is the
/// normal end-of-input condition for `INM`-driven programs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueInterface {
    inputs: VecDeque<i32>,
    outputs: Vec<i32>,
}

impl QueueInterface {
    /// An interface with no queued inputs.
    #[must_use]
    pub fn new() -> Self {
        QueueInterface::default()
    }

    /// An interface pre-seeded with input values.
    #[must_use]
    pub fn with_inputs(inputs: impl IntoIterator<Item = i32>) -> Self {
        QueueInterface {
            inputs: inputs.into_iter().collect(),
            outputs: Vec::new(),
        }
    }

    /// Append a value to the input queue.
    pub fn push_input(&mut self, value: i32) {
        self.inputs.push_back(value);
    }

    /// Inputs not yet consumed by the machine.
    #[must_use]
    pub fn remaining_inputs(&self) -> impl ExactSizeIterator<Item = i32> + '_ {
        self.inputs.iter().copied()
    }

    /// Everything the machine has output so far.
    #[must_use]
    pub fn outputs(&self) -> &[i32] {
        &self.outputs
    }
}

impl Interface for QueueInterface {
    fn get_input(&mut self) -> DcResult<i32> {
        self.inputs.pop_front().ok_or(DcError::NoInput)
    }

    fn show_output(&mut self, value: i32) {
        self.outputs.push(value);
    }
}
