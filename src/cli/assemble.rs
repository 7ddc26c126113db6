//! Assemble command implementation.

use super::CliError;
use std::fs;
use std::path::PathBuf;

/// Execute the assemble command.
///
/// Reads a DC source file, assembles it and writes the loadable program
/// text to `output` (or stdout).
///
/// # Errors
///
/// Returns an error if the file cannot be read or the program does not
/// assemble.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn execute(source: PathBuf, output: Option<PathBuf>) -> Result<(), CliError> {
    let text = fs::read_to_string(&source)
        .map_err(|e| CliError::new(format!("failed to read {}: {e}", source.display())))?;
    let lines: Vec<&str> = text.lines().collect();

    let assembled = dcvm::asm::assemble(&lines)?;
    let mut body = assembled.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }

    match output {
        Some(path) => {
            fs::write(&path, body)
                .map_err(|e| CliError::new(format!("failed to write {}: {e}", path.display())))?;
        }
        None => print!("{body}"),
    }
    Ok(())
}
