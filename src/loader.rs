//! Loader for already-assembled program text.
//!
//! Input lines look like `"<address> <MNEMONIC> [<immediate>]"` or
//! `"<address> DEF <literal>"`. The loader packs each line into a machine
//! word with the same encoding the CPU decodes and writes it into RAM.

use crate::asm::strip_comment;
use crate::error::{DcError, DcResult};
use crate::isa::Opcode;
use crate::vm::Machine;

/// Legacy DOS end-of-file marker some old assembled files carry.
const LEGACY_EOF: &str = "\x1a";

/// Load assembled lines into the machine's RAM.
///
/// With `clear` the machine is fully reset first; without it the lines
/// overlay whatever is already in memory, which is how single-line
/// patches from a debug shell work. Blank lines, comments and the legacy
/// `\x1a` sentinel are ignored.
///
/// # Errors
///
/// Returns [`DcError::Script`] (with the 0-based line) for malformed
/// lines, unknown mnemonics and unparsable integers, and
/// [`DcError::InvalidAddress`] for addresses or arguments outside memory.
/// Any error aborts the load; earlier lines may already be in RAM.
pub fn load<S: AsRef<str>>(machine: &mut Machine, lines: &[S], clear: bool) -> DcResult<()> {
    if clear {
        machine.reset();
    }
    let config = *machine.config();

    for (index, raw) in lines.iter().enumerate() {
        let line = strip_comment(raw.as_ref());
        if line == LEGACY_EOF {
            continue;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 || fields.len() > 3 {
            return Err(DcError::script_at(format!("invalid line: {line}"), index));
        }

        let addr = fields[0].parse::<u16>().map_err(|_| {
            DcError::script_at(format!("not a valid address: {}", fields[0]), index)
        })?;
        if addr > config.max_address() {
            return Err(DcError::invalid_address(format!(
                "address {addr} is outside memory (line {})",
                index + 1
            )));
        }

        let command = fields[1];
        let argument = fields.get(2).copied().unwrap_or("0");

        let word = if command.eq_ignore_ascii_case("DEF") {
            let value = argument.parse::<i32>().map_err(|_| {
                DcError::script_at(format!("not a valid integer: {argument}"), index)
            })?;
            let mask = i32::from(config.cell_mask());
            if value > mask || value < -(1 << (config.cell_width() - 1)) {
                return Err(DcError::script_at(
                    format!("literal {value} does not fit a {} bit cell", config.cell_width()),
                    index,
                ));
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let word = (value & mask) as u16;
            word
        } else if let Some(opcode) = Opcode::from_mnemonic(command) {
            let arg = argument.parse::<u16>().map_err(|_| {
                DcError::script_at(format!("not a valid address: {argument}"), index)
            })?;
            if arg > config.max_address() {
                return Err(DcError::invalid_address(format!(
                    "argument {arg} is outside memory (line {})",
                    index + 1
                )));
            }
            config.pack(opcode, arg)
        } else {
            return Err(DcError::script_at(
                format!("invalid instruction: {command}"),
                index,
            ));
        };

        machine.ram_mut().set(addr, word)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::Config;

    fn machine() -> Machine {
        Machine::new(Config::default())
    }

    #[test]
    fn test_load_packs_exact_words() {
        let mut machine = machine();
        load(&mut machine, &["0 JMP 15", "1 OUT 3"], true).expect("loads");
        assert_eq!(machine.ram().get(0), Ok(0b0_0010_0000_1111));
        assert_eq!(machine.ram().get(1), Ok(0b0_0101_0000_0011));
    }

    #[test]
    fn test_load_two_field_line_gets_zero_argument() {
        let mut machine = machine();
        load(&mut machine, &["3 INC"], true).expect("loads");
        assert_eq!(machine.ram().get(3), Ok(0b0_1001_0000_0000));
    }

    #[test]
    fn test_load_skips_blanks_comments_and_legacy_eof() {
        let mut machine = machine();
        let lines = ["", "   ", "; note", "\x1a", "2 NOP 0 ; padding"];
        load(&mut machine, &lines, true).expect("loads");
        assert_eq!(machine.ram().get(2), Ok(0b0_1000_0000_0000));
    }

    #[test]
    fn test_load_def_literal_and_negative() {
        let mut machine = machine();
        load(&mut machine, &["0 DEF 42", "1 DEF -1"], true).expect("loads");
        assert_eq!(machine.ram().get(0), Ok(42));
        assert_eq!(machine.ram().get(1), Ok(0b1_1111_1111_1111));
    }

    #[test]
    fn test_load_rejects_oversized_literal() {
        let mut machine = machine();
        assert!(load(&mut machine, &["0 DEF 8192"], true).is_err());
    }

    #[test]
    fn test_load_rejects_unknown_instruction() {
        let mut machine = machine();
        let err = load(&mut machine, &["0 FROB 1"], true).expect_err("bad opcode");
        assert!(matches!(err, DcError::Script { .. }));
        assert_eq!(err.line(), Some(0));
    }

    #[test]
    fn test_load_rejects_out_of_range_address_and_argument() {
        let mut machine = machine();
        assert!(matches!(
            load(&mut machine, &["128 NOP"], true),
            Err(DcError::InvalidAddress { .. })
        ));
        assert!(matches!(
            load(&mut machine, &["0 JMP 128"], true),
            Err(DcError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_load_rejects_malformed_lines() {
        let mut machine = machine();
        assert!(load(&mut machine, &["12"], true).is_err());
        assert!(load(&mut machine, &["0 LDA 1 2"], true).is_err());
        assert!(load(&mut machine, &["x LDA 1"], true).is_err());
    }

    #[test]
    fn test_patch_mode_overlays_without_reset() {
        let mut machine = machine();
        load(&mut machine, &["0 DEF 1", "1 DEF 2"], true).expect("loads");
        machine.set_pc(9);

        load(&mut machine, &["1 DEF 99"], false).expect("patches");
        assert_eq!(machine.ram().get(0), Ok(1));
        assert_eq!(machine.ram().get(1), Ok(99));
        // No reset happened.
        assert_eq!(machine.pc().value(), 9);
    }

    #[test]
    fn test_clear_resets_machine_state() {
        let mut machine = machine();
        load(&mut machine, &["0 DEF 1"], true).expect("loads");
        machine.set_pc(5);
        machine.set_running(true);

        load(&mut machine, &["2 DEF 3"], true).expect("reloads");
        assert_eq!(machine.pc().value(), 0);
        assert!(!machine.is_running());
        assert_eq!(machine.ram().get(0), Ok(0));
        assert_eq!(machine.ram().get(2), Ok(3));
    }
}
