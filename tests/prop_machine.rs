//! Property-based tests for registers, the command codec and arithmetic.
//!
//! Run with: cargo test --release prop_machine

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use dcvm::{Config, DcError, Machine, QueueInterface, Register, isa, loader};

fn machine_with(program: &[String]) -> Machine {
    let mut machine = Machine::new(Config::default());
    loader::load(&mut machine, program, true).unwrap();
    machine
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        // prop_command_codec_round_trip rejects the ~37.5% of cells whose
        // opcode field is unassigned; 2000 cases need ~1200 rejects, above
        // proptest's default cap of 1024.
        max_global_rejects: 8192,
        ..ProptestConfig::default()
    })]

    /// Storing any in-range signed value reads back exactly, and the raw
    /// value is its two's-complement bit pattern.
    #[test]
    fn prop_register_signed_round_trip(value in -4096i32..=4095) {
        let mut reg = Register::new("AC", 13);
        reg.set(value);
        prop_assert_eq!(reg.signed_value(), value);
        prop_assert_eq!(i32::from(reg.value()), value & 0x1FFF);
    }

    /// Any input at all masks to the register width and lands inside the
    /// signed range.
    #[test]
    fn prop_register_set_always_masks(value in any::<i32>()) {
        let mut reg = Register::new("AC", 13);
        reg.set(value);
        prop_assert_eq!(i32::from(reg.value()), value & 0x1FFF);
        prop_assert!(reg.signed_value() <= reg.max_signed());
        prop_assert!(reg.signed_value() >= reg.min_signed());
    }

    /// Every cell that disassembles to a real mnemonic reassembles to the
    /// identical word.
    #[test]
    fn prop_command_codec_round_trip(cell in 0u16..8192) {
        let config = Config::default();
        let name = isa::command_name(&config, cell);
        prop_assume!(name != "DEF");

        let (_, arg) = config.split(cell);
        let line = format!("{name} {arg}");
        prop_assert_eq!(isa::parse_command(&config, &line), Ok(cell));
    }

    /// ADD is exact inside the accumulator's range and traps outside it,
    /// leaving the accumulator untouched.
    #[test]
    fn prop_add_exact_or_trapped(a in -4096i32..=4095, b in -4096i32..=4095) {
        let program = vec![
            "0 LDA 3".to_string(),
            "1 ADD 4".to_string(),
            "2 END".to_string(),
            format!("3 DEF {a}"),
            format!("4 DEF {b}"),
        ];
        let mut machine = machine_with(&program);
        let mut io = QueueInterface::new();

        let result = machine.run(&mut io);
        let sum = a + b;
        if (-4096..=4095).contains(&sum) {
            prop_assert_eq!(result, Ok(()));
            prop_assert_eq!(machine.ac().signed_value(), sum);
        } else {
            prop_assert_eq!(result, Err(DcError::Overflow));
            prop_assert_eq!(machine.ac().signed_value(), a);
        }
    }

    /// SUB mirrors ADD: exact inside the range, trapped outside it.
    #[test]
    fn prop_sub_exact_or_trapped(a in -4096i32..=4095, b in -4096i32..=4095) {
        let program = vec![
            "0 LDA 3".to_string(),
            "1 SUB 4".to_string(),
            "2 END".to_string(),
            format!("3 DEF {a}"),
            format!("4 DEF {b}"),
        ];
        let mut machine = machine_with(&program);
        let mut io = QueueInterface::new();

        let result = machine.run(&mut io);
        let diff = a - b;
        if (-4096..=4095).contains(&diff) {
            prop_assert_eq!(result, Ok(()));
            prop_assert_eq!(machine.ac().signed_value(), diff);
        } else {
            prop_assert_eq!(result, Err(DcError::Overflow));
            prop_assert_eq!(machine.ac().signed_value(), a);
        }
    }

    /// PSH then POP restores both the accumulator and the stack pointer
    /// for every representable value.
    #[test]
    fn prop_push_pop_is_identity(value in -4096i32..=4095) {
        let program = vec![
            "0 LDA 4".to_string(),
            "1 PSH".to_string(),
            "2 POP".to_string(),
            "3 END".to_string(),
            format!("4 DEF {value}"),
        ];
        let mut machine = machine_with(&program);
        let mut io = QueueInterface::new();

        machine.run(&mut io).unwrap();
        prop_assert_eq!(machine.ac().signed_value(), value);
        prop_assert_eq!(machine.sp().value(), 127);
    }

    /// NEG is an involution except at the signed minimum, which wraps
    /// onto itself.
    #[test]
    fn prop_neg_twice_is_identity(value in -4096i32..=4095) {
        let mut reg = Register::new("AC", 13);
        reg.set(value);
        reg.neg();
        if value == -4096 {
            prop_assert_eq!(reg.signed_value(), -4096);
        } else {
            prop_assert_eq!(reg.signed_value(), -value);
        }
        reg.neg();
        prop_assert_eq!(reg.signed_value(), value);
    }

    /// Values a program stores are the values it outputs: OUT reports the
    /// signed view of what STA wrote.
    #[test]
    fn prop_store_then_out_round_trips(value in -4096i32..=4095) {
        let program = vec![
            "0 LDA 4".to_string(),
            "1 STA 5".to_string(),
            "2 OUT 5".to_string(),
            "3 END".to_string(),
            format!("4 DEF {value}"),
        ];
        let mut machine = machine_with(&program);
        let mut io = QueueInterface::new();

        machine.run(&mut io).unwrap();
        prop_assert_eq!(io.outputs(), &[value]);
    }
}
