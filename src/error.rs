//! Error types for the DC machine, assembler and loader.

use std::fmt;

/// Everything that can go wrong inside the simulator core.
///
/// Load- and assemble-time variants carry the offending source line as a
/// 0-based index (handy for editor highlighting); [`fmt::Display`] renders
/// it 1-based, which is what a human expects in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DcError {
    /// Malformed load source line or bad integer in a program text.
    Script {
        /// Human-readable description of the problem.
        msg: String,
        /// 0-based source line index, if known.
        line: Option<usize>,
    },
    /// Assembler failure: duplicate label, unresolved reference,
    /// missing EQUAL operand.
    Assemble {
        /// Human-readable description of the problem.
        msg: String,
        /// 0-based source line index, if known.
        line: Option<usize>,
    },
    /// Address outside `[0, max_address]`. A specialisation of
    /// [`DcError::Script`] in spirit, kept separate so runtime faults
    /// can be told apart from parse problems.
    InvalidAddress {
        /// Human-readable description of the problem.
        msg: String,
    },
    /// An arithmetic result fell outside the accumulator's signed range.
    /// The instruction left the accumulator untouched.
    Overflow,
    /// The interface had no input value available.
    NoInput,
    /// Execution reached a configured breakpoint. A control-flow signal,
    /// not a fault: machine state is intact and re-running from this PC
    /// resumes normally.
    Breakpoint {
        /// The program counter at which execution paused.
        addr: u16,
    },
}

impl DcError {
    /// A [`DcError::Script`] without a line number.
    pub fn script(msg: impl Into<String>) -> Self {
        DcError::Script {
            msg: msg.into(),
            line: None,
        }
    }

    /// A [`DcError::Script`] pinned to a 0-based source line.
    pub fn script_at(msg: impl Into<String>, line: usize) -> Self {
        DcError::Script {
            msg: msg.into(),
            line: Some(line),
        }
    }

    /// An [`DcError::Assemble`] pinned to a 0-based source line.
    pub fn assemble_at(msg: impl Into<String>, line: usize) -> Self {
        DcError::Assemble {
            msg: msg.into(),
            line: Some(line),
        }
    }

    /// An [`DcError::InvalidAddress`] with a formatted message.
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        DcError::InvalidAddress { msg: msg.into() }
    }

    /// The 0-based source line this error points at, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            DcError::Script { line, .. } | DcError::Assemble { line, .. } => *line,
            _ => None,
        }
    }
}

fn write_with_line(
    f: &mut fmt::Formatter<'_>,
    kind: &str,
    msg: &str,
    line: Option<usize>,
) -> fmt::Result {
    match line {
        Some(line) => write!(f, "{kind}: {msg} (line {})", line + 1),
        None => write!(f, "{kind}: {msg}"),
    }
}

impl fmt::Display for DcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DcError::Script { msg, line } => write_with_line(f, "script error", msg, *line),
            DcError::Assemble { msg, line } => write_with_line(f, "assemble error", msg, *line),
            DcError::InvalidAddress { msg } => write!(f, "invalid address: {msg}"),
            DcError::Overflow => write!(f, "arithmetic overflow"),
            DcError::NoInput => write!(f, "no input value available"),
            DcError::Breakpoint { addr } => write!(f, "breakpoint reached at address {addr}"),
        }
    }
}

impl std::error::Error for DcError {}

/// Result type used throughout the simulator core.
pub type DcResult<T> = Result<T, DcError>;
