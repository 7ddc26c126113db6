//! Output formatting utilities for CLI.

use dcvm::Machine;
use serde::Serialize;

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum StopReason {
    /// The program cleared the running flag (`END`, or `INM` with no
    /// input left).
    Halted,
    /// Execution paused at a breakpoint address.
    Breakpoint(u16),
    /// The cycle budget ran out before the program halted.
    CycleLimit,
    /// A runtime fault (overflow, invalid address, missing input).
    Fault(String),
}

impl StopReason {
    fn describe(&self) -> String {
        match self {
            StopReason::Halted => "halted".to_string(),
            StopReason::Breakpoint(addr) => format!("breakpoint at {addr}"),
            StopReason::CycleLimit => "cycle limit reached".to_string(),
            StopReason::Fault(msg) => format!("fault: {msg}"),
        }
    }
}

/// Result of a batch run.
#[derive(Debug)]
pub(super) struct RunReport {
    /// Cycles executed.
    pub(super) cycles: u64,
    /// Values the program emitted.
    pub(super) outputs: Vec<i32>,
    /// Inputs never consumed.
    pub(super) unconsumed_inputs: Vec<i32>,
    /// Why execution stopped.
    pub(super) stop: StopReason,
}

/// JSON-serializable run report.
#[derive(Debug, Serialize)]
pub(super) struct JsonRunReport {
    /// Why execution stopped.
    stopped: String,
    /// Cycles executed.
    cycles: u64,
    /// Values the program emitted.
    outputs: Vec<i32>,
    /// Inputs never consumed.
    unconsumed_inputs: Vec<i32>,
    /// Final register state.
    registers: Vec<JsonRegister>,
}

/// JSON-serializable register snapshot.
#[derive(Debug, Serialize)]
struct JsonRegister {
    /// Register name.
    name: String,
    /// Raw (unsigned) value.
    value: u16,
    /// Two's-complement interpretation.
    signed: i32,
}

impl JsonRunReport {
    /// Build the JSON view of a finished run.
    pub(super) fn new(report: &RunReport, machine: &Machine) -> Self {
        let registers = all_registers(machine)
            .iter()
            .map(|reg| JsonRegister {
                name: reg.name().to_string(),
                value: reg.value(),
                signed: reg.signed_value(),
            })
            .collect();
        JsonRunReport {
            stopped: report.stop.describe(),
            cycles: report.cycles,
            outputs: report.outputs.clone(),
            unconsumed_inputs: report.unconsumed_inputs.clone(),
            registers,
        }
    }
}

/// Format a run report as human-readable text, register dump included.
pub(super) fn format_text(report: &RunReport, machine: &Machine) -> String {
    let mut out = String::new();

    for value in &report.outputs {
        out.push_str(&format!("Output: {value}\n"));
    }
    out.push_str(&format!(
        "Stopped after {} cycles: {}\n",
        report.cycles,
        report.stop.describe()
    ));
    if !report.unconsumed_inputs.is_empty() {
        let rest: Vec<String> = report
            .unconsumed_inputs
            .iter()
            .map(ToString::to_string)
            .collect();
        out.push_str(&format!("Unconsumed inputs: {}\n", rest.join(", ")));
    }

    out.push_str("Registers:\n");
    let width = machine.config().cell_width() as usize;
    for reg in all_registers(machine) {
        out.push_str(&format!(
            "    {:<2} {:0>width$b} ({})\n",
            reg.name(),
            reg.value(),
            reg.signed_value(),
            width = width,
        ));
    }
    out
}

/// The seven registers in their customary display order.
pub(super) fn all_registers(machine: &Machine) -> [&dcvm::Register; 7] {
    [
        machine.ir(),
        machine.dr(),
        machine.pc(),
        machine.ac(),
        machine.ar(),
        machine.sp(),
        machine.bp(),
    ]
}
