//! dcvm CLI - Command-line interface for assembling and running DC programs.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

/// dcvm - An accumulator-machine simulator and assembler
#[derive(Parser, Debug)]
#[command(name = "dcvm")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble a source file into loadable program text
    Assemble {
        /// Assembly source file
        #[arg(required = true)]
        source: std::path::PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Load a program and run it to completion
    Run {
        /// Program file (assembled, or assembly source with --source)
        #[arg(required = true)]
        program: std::path::PathBuf,

        /// Treat the program file as assembly source and assemble it first
        #[arg(short, long)]
        source: bool,

        /// Input values for INM/INS/INB, comma-separated
        #[arg(short, long, value_delimiter = ',')]
        input: Vec<i32>,

        /// Pause before executing these addresses
        #[arg(short, long, value_delimiter = ',')]
        breakpoint: Vec<u16>,

        /// Cycle budget before the run is cut off (default: 100000)
        #[arg(short, long, default_value = "100000")]
        max_cycles: u64,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Interactive TUI to step through a program
    Watch {
        /// Program file (assembled, or assembly source with --source)
        #[arg(required = true)]
        program: std::path::PathBuf,

        /// Treat the program file as assembly source and assemble it first
        #[arg(short, long)]
        source: bool,

        /// Input values for INM/INS/INB, comma-separated
        #[arg(short, long, value_delimiter = ',')]
        input: Vec<i32>,

        /// Step delay in milliseconds (default: 500)
        #[arg(long, default_value = "500")]
        speed: u64,

        /// Pause before executing these addresses
        #[arg(short, long, value_delimiter = ',')]
        breakpoint: Vec<u16>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args.command {
        Commands::Assemble { source, output } => cli::assemble::execute(source, output),

        Commands::Run {
            program,
            source,
            input,
            breakpoint,
            max_cycles,
            format,
        } => cli::run::execute(program, source, input, breakpoint, max_cycles, format),

        Commands::Watch {
            program,
            source,
            input,
            speed,
            breakpoint,
        } => cli::watch::execute(program, source, input, speed, breakpoint),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
