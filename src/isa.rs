//! DC instruction set definitions: opcode table, machine geometry and
//! the textual command codec shared by the loader and the debug shells.

mod config;
mod opcode;

pub use config::Config;
pub use opcode::Opcode;

use crate::error::{DcError, DcResult};

/// The mnemonic a memory cell disassembles to.
///
/// Cells whose opcode field matches no known instruction are reported as
/// `"DEF"`, the pseudo-opcode for raw literal data.
#[must_use]
pub fn command_name(config: &Config, cell: u16) -> &'static str {
    let (code, _) = config.split(cell);
    Opcode::from_code(code).map_or("DEF", Opcode::mnemonic)
}

/// Parse a textual command like `"JMP 15"` or `"DEF 42"` into a packed
/// machine word.
///
/// # Errors
///
/// Returns [`DcError::Script`] for an unknown mnemonic, a missing `DEF`
/// parameter or an unparsable integer.
pub fn parse_command(config: &Config, command: &str) -> DcResult<u16> {
    let mut parts = command.split_whitespace();
    let head = parts
        .next()
        .ok_or_else(|| DcError::script("empty command"))?;

    let word = if let Some(opcode) = Opcode::from_mnemonic(head) {
        let addr = match parts.next() {
            Some(token) => parse_int(token)? & i32::from(config.max_address()),
            None => 0,
        };
        i32::from(config.pack(opcode, 0)) | addr
    } else if head.eq_ignore_ascii_case("DEF") {
        let token = parts
            .next()
            .ok_or_else(|| DcError::script("DEF requires a parameter"))?;
        parse_int(token)?
    } else {
        return Err(DcError::script(format!("invalid instruction: {head}")));
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok((word & i32::from(config.cell_mask())) as u16)
}

/// Parse a decimal integer, mapping failure to a script error.
fn parse_int(token: &str) -> DcResult<i32> {
    token
        .parse::<i32>()
        .map_err(|_| DcError::script(format!("invalid int: {token}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_jmp() {
        let config = Config::default();
        assert_eq!(parse_command(&config, "JMP 15"), Ok(0b0_0010_0000_1111));
    }

    #[test]
    fn test_parse_command_case_insensitive() {
        let config = Config::default();
        assert_eq!(
            parse_command(&config, "lda 3"),
            parse_command(&config, "LDA 3")
        );
    }

    #[test]
    fn test_parse_command_def_literal() {
        let config = Config::default();
        assert_eq!(parse_command(&config, "DEF 42"), Ok(42));
        // Negative literals wrap into the cell width (two's complement).
        assert_eq!(parse_command(&config, "DEF -1"), Ok(0b1_1111_1111_1111));
    }

    #[test]
    fn test_parse_command_errors() {
        let config = Config::default();
        assert!(parse_command(&config, "FROB 1").is_err());
        assert!(parse_command(&config, "DEF").is_err());
        assert!(parse_command(&config, "JMP x").is_err());
    }

    #[test]
    fn test_command_name_round_trip() {
        let config = Config::default();
        for op in Opcode::ALL {
            let line = if op.has_operand() {
                format!("{} 5", op.mnemonic())
            } else {
                op.mnemonic().to_string()
            };
            let cell = parse_command(&config, &line).expect("valid command");
            assert_eq!(command_name(&config, cell), op.mnemonic());
        }
    }

    #[test]
    fn test_command_name_unknown_code_is_def() {
        let config = Config::default();
        // Opcode field 63 is unassigned.
        assert_eq!(command_name(&config, 63 << 7), "DEF");
    }
}
