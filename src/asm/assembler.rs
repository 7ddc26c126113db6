//! The label-resolving assembler.
//!
//! Single pass with deferred label binding: labels pile up in a pending
//! queue until an instruction (or an `EQUAL` constant definition) claims
//! them, then a resolution pass replaces symbolic arguments with the
//! collected values.

use std::collections::HashMap;

use crate::asm::tokenizer::{Token, tokenize};
use crate::error::{DcError, DcResult};
use crate::isa::Opcode;

/// What a label resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelValue {
    /// Index of the instruction the label precedes.
    Instruction(usize),
    /// Explicit constant bound via `EQUAL`.
    Constant(i32),
}

/// A decoded instruction awaiting argument resolution.
#[derive(Debug, Clone)]
struct Instruction {
    /// Position in the assembled program; doubles as the load address.
    number: usize,
    /// Canonical mnemonic, or `"DEF"`.
    opcode: &'static str,
    /// Unresolved argument token, if the opcode consumed one.
    arg: Option<Token>,
}

/// Assemble source lines into loadable `"<index> <OPCODE> [<arg>]"` lines.
///
/// Label names are case-insensitive. A label may be bound at most once,
/// either to the instruction it precedes or, via `LABEL EQUAL <int>`, to
/// an explicit constant. Several consecutive bare labels all bind to the
/// same following instruction.
///
/// # Errors
///
/// Returns [`DcError::Assemble`] (carrying the 0-based source line) for a
/// duplicate label, an `EQUAL` without a pending label or value, or an
/// argument that is neither a known label nor an integer. Any error
/// aborts the whole assembly; there is no partial output.
pub fn assemble<S: AsRef<str>>(lines: &[S]) -> DcResult<Vec<String>> {
    let mut labels: HashMap<String, LabelValue> = HashMap::new();
    let mut pending: Vec<Token> = Vec::new();
    let mut instructions: Vec<Instruction> = Vec::new();

    let mut tokens = tokenize(lines).into_iter();
    while let Some(token) = tokens.next() {
        if token.text.eq_ignore_ascii_case("EQUAL") {
            let label = pending.pop().ok_or_else(|| {
                DcError::assemble_at("EQUAL without a preceding label", token.line - 1)
            })?;
            let value_token = tokens.next().ok_or_else(|| {
                DcError::assemble_at("EQUAL requires a value", token.line - 1)
            })?;
            let value = value_token.text.parse::<i32>().map_err(|_| {
                DcError::assemble_at(
                    format!("invalid int: {}", value_token.text),
                    value_token.line - 1,
                )
            })?;
            bind(&mut labels, &label, LabelValue::Constant(value))?;
        } else if let Some(opcode) = Opcode::from_mnemonic(&token.text) {
            let arg = if opcode.has_operand() {
                tokens.next()
            } else {
                None
            };
            record(&mut labels, &mut pending, &mut instructions, opcode.mnemonic(), arg)?;
        } else if token.text.eq_ignore_ascii_case("DEF") {
            let arg = tokens.next();
            record(&mut labels, &mut pending, &mut instructions, "DEF", arg)?;
        } else {
            // Candidate label; it stays pending until something claims it.
            pending.push(token);
        }
    }

    resolve(&labels, &instructions)
}

/// Record an instruction and bind every pending label to its index.
fn record(
    labels: &mut HashMap<String, LabelValue>,
    pending: &mut Vec<Token>,
    instructions: &mut Vec<Instruction>,
    opcode: &'static str,
    arg: Option<Token>,
) -> DcResult<()> {
    let number = instructions.len();
    for label in pending.drain(..) {
        bind(labels, &label, LabelValue::Instruction(number))?;
    }
    instructions.push(Instruction {
        number,
        opcode,
        arg,
    });
    Ok(())
}

/// Bind a label, rejecting redefinition.
fn bind(
    labels: &mut HashMap<String, LabelValue>,
    label: &Token,
    value: LabelValue,
) -> DcResult<()> {
    let key = label.text.to_lowercase();
    if labels.contains_key(&key) {
        return Err(DcError::assemble_at(
            format!("label {} already defined", label.text),
            label.line - 1,
        ));
    }
    labels.insert(key, value);
    Ok(())
}

/// Replace symbolic arguments with label values or literal integers.
fn resolve(
    labels: &HashMap<String, LabelValue>,
    instructions: &[Instruction],
) -> DcResult<Vec<String>> {
    let mut result = Vec::with_capacity(instructions.len());
    for inst in instructions {
        match &inst.arg {
            Some(arg) => {
                let value: i64 = match labels.get(&arg.text.to_lowercase()) {
                    Some(LabelValue::Instruction(index)) => *index as i64,
                    Some(LabelValue::Constant(value)) => i64::from(*value),
                    None => arg.text.parse::<i64>().map_err(|_| {
                        DcError::assemble_at(
                            format!("invalid label: {}", arg.text),
                            arg.line - 1,
                        )
                    })?,
                };
                result.push(format!("{} {} {}", inst.number, inst.opcode, value));
            }
            None => result.push(format!("{} {}", inst.number, inst.opcode)),
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_counter_program() {
        let program = [
            "NUM: DEF 0",
            "LOOP:     ",
            "INM NUM   ",
            "LDA NUM   ",
            "INC       ",
            "STA NUM   ",
            "OUT NUM   ",
            "JMP LOOP  ",
        ];
        let expected = [
            "0 DEF 0",
            "1 INM 0",
            "2 LDA 0",
            "3 INC",
            "4 STA 0",
            "5 OUT 0",
            "6 JMP 1",
        ];
        assert_eq!(assemble(&program), Ok(expected.map(String::from).to_vec()));
    }

    #[test]
    fn test_assemble_simple_io() {
        assert_eq!(
            assemble(&["INM 20", "OUT 20"]),
            Ok(vec!["0 INM 20".to_string(), "1 OUT 20".to_string()])
        );
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let program = ["loop: NOP", "JMP LOOP"];
        assert_eq!(
            assemble(&program),
            Ok(vec!["0 NOP".to_string(), "1 JMP 0".to_string()])
        );
    }

    #[test]
    fn test_consecutive_labels_share_an_instruction() {
        let program = ["here", "there:", "NOP", "JMP here", "JMP there"];
        assert_eq!(
            assemble(&program),
            Ok(vec![
                "0 NOP".to_string(),
                "1 JMP 0".to_string(),
                "2 JMP 0".to_string(),
            ])
        );
    }

    #[test]
    fn test_equal_binds_a_constant() {
        let program = ["size EQUAL 42", "LDA size"];
        assert_eq!(assemble(&program), Ok(vec!["0 LDA 42".to_string()]));
    }

    #[test]
    fn test_equal_binds_most_recent_pending_label() {
        // `target` stays pending and binds to the NOP; `size` is consumed
        // by EQUAL.
        let program = ["target size EQUAL 9", "NOP", "JMP target", "LDA size"];
        assert_eq!(
            assemble(&program),
            Ok(vec![
                "0 NOP".to_string(),
                "1 JMP 0".to_string(),
                "2 LDA 9".to_string(),
            ])
        );
    }

    #[test]
    fn test_duplicate_label_fails() {
        let err = assemble(&["x: NOP", "x: NOP"]).expect_err("duplicate");
        assert!(matches!(err, DcError::Assemble { .. }));
        assert_eq!(err.line(), Some(1));
        assert!(err.to_string().contains("x already defined"));
    }

    #[test]
    fn test_equal_redefinition_fails() {
        let err = assemble(&["x EQUAL 1", "x EQUAL 2"]).expect_err("duplicate");
        assert!(matches!(err, DcError::Assemble { .. }));
    }

    #[test]
    fn test_equal_without_label_fails() {
        let err = assemble(&["EQUAL 3"]).expect_err("no pending label");
        assert_eq!(err.line(), Some(0));
    }

    #[test]
    fn test_equal_without_value_fails() {
        assert!(assemble(&["x EQUAL"]).is_err());
    }

    #[test]
    fn test_equal_with_bad_value_fails() {
        let err = assemble(&["x EQUAL banana"]).expect_err("bad int");
        assert!(err.to_string().contains("banana"));
    }

    #[test]
    fn test_unresolved_argument_names_label_and_line() {
        let program = ["NOP", "JMP nowhere"];
        let err = assemble(&program).expect_err("unresolved");
        assert!(err.to_string().contains("nowhere"));
        // 0-based line 1, displayed as line 2.
        assert_eq!(err.line(), Some(1));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_numeric_arguments_pass_through() {
        assert_eq!(assemble(&["JMP 15"]), Ok(vec!["0 JMP 15".to_string()]));
    }

    #[test]
    fn test_empty_source_assembles_to_nothing() {
        let lines: [&str; 2] = ["; just a comment", ""];
        assert_eq!(assemble(&lines), Ok(Vec::new()));
    }
}
