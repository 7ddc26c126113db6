//! Run command implementation.

use super::output::{JsonRunReport, RunReport, StopReason, format_text};
use super::{CliError, OutputFormat};
use dcvm::{Config, DcError, Machine, QueueInterface, loader};
use std::fs;
use std::path::PathBuf;

/// Execute the run command.
///
/// Loads a program (assembling it first with `--source`), feeds it the
/// queued inputs and cycles until it halts, faults, hits a breakpoint or
/// exhausts the cycle budget.
///
/// # Errors
///
/// Returns an error if the program cannot be read, assembled or loaded.
/// Runtime faults are reported in the run report, not as CLI errors.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn execute(
    program: PathBuf,
    source: bool,
    inputs: Vec<i32>,
    breakpoints: Vec<u16>,
    max_cycles: u64,
    format: OutputFormat,
) -> Result<(), CliError> {
    let text = fs::read_to_string(&program)
        .map_err(|e| CliError::new(format!("failed to read {}: {e}", program.display())))?;
    let lines: Vec<&str> = text.lines().collect();

    let mut machine = Machine::new(Config::default());
    if source {
        let assembled = dcvm::asm::assemble(&lines)?;
        loader::load(&mut machine, &assembled, true)?;
    } else {
        loader::load(&mut machine, &lines, true)?;
    }
    for addr in breakpoints {
        machine.add_breakpoint(addr);
    }

    let mut io = QueueInterface::with_inputs(inputs);
    let report = drive(&mut machine, &mut io, max_cycles);

    match format {
        OutputFormat::Text => print!("{}", format_text(&report, &machine)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonRunReport::new(&report, &machine))
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Cycle the machine until it stops, with a budget so runaway programs
/// terminate.
fn drive(machine: &mut Machine, io: &mut QueueInterface, max_cycles: u64) -> RunReport {
    machine.set_running(true);
    let mut cycles = 0u64;

    let stop = loop {
        if !machine.is_running() {
            break StopReason::Halted;
        }
        if cycles >= max_cycles {
            break StopReason::CycleLimit;
        }
        match machine.cycle(io) {
            Ok(()) => cycles += 1,
            Err(DcError::Breakpoint { addr }) => {
                cycles += 1;
                break StopReason::Breakpoint(addr);
            }
            Err(fault) => break StopReason::Fault(fault.to_string()),
        }
    };

    RunReport {
        cycles,
        outputs: io.outputs().to_vec(),
        unconsumed_inputs: io.remaining_inputs().collect(),
        stop,
    }
}
