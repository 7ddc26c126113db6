//! The DC opcode table.

/// One of the machine's 40 instructions.
///
/// A memory cell whose opcode field matches none of these is not a fault:
/// it is treated as a raw literal data word (`DEF`) by the decoder and as
/// a no-op by the execution cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Load accumulator from memory.
    Lda,
    /// Store accumulator to memory.
    Sta,
    /// Add memory to accumulator.
    Add,
    /// Subtract memory from accumulator.
    Sub,
    /// Unconditional jump.
    Jmp,
    /// Jump if the accumulator is negative.
    Jms,
    /// Jump to subroutine.
    Jsr,
    /// Return from subroutine.
    Rtn,
    /// Jump if the accumulator is positive.
    Jpl,
    /// Jump if the accumulator is zero.
    Jze,
    /// Output a memory cell.
    Out,
    /// Halt execution.
    End,
    /// Push the accumulator onto the stack.
    Psh,
    /// Pop the stack into the accumulator.
    Pop,
    /// Push a memory cell onto the stack.
    Pshm,
    /// Pop the stack into a memory cell.
    Popm,
    /// No operation.
    Nop,
    /// Two's-complement negate the accumulator.
    Neg,
    /// Increment the accumulator.
    Inc,
    /// Decrement the accumulator.
    Dec,
    /// Jump if the accumulator is non-zero.
    Jnz,
    /// Load accumulator from `SP + x`.
    Ldas,
    /// Store accumulator to `SP + x`.
    Stas,
    /// Add `SP + x` to the accumulator.
    Adds,
    /// Subtract `SP + x` from the accumulator.
    Subs,
    /// Jump if the accumulator is not negative.
    Jnm,
    /// Jump if the accumulator is not positive.
    Jnp,
    /// Output the cell at `SP + x`.
    Outs,
    /// Input a value into a memory cell; halts gracefully on missing input.
    Inm,
    /// Input a value into `SP + x`.
    Ins,
    /// Load accumulator from `BP + x`.
    Ldab,
    /// Store accumulator to `BP + x`.
    Stab,
    /// Add `BP + x` to the accumulator.
    Addb,
    /// Subtract `BP + x` from the accumulator.
    Subb,
    /// Output the cell at `BP + x`.
    Outb,
    /// Input a value into `BP + x`.
    Inb,
    /// Pop the stack into the base pointer.
    Popb,
    /// Push the base pointer onto the stack.
    Pshb,
    /// Transfer BP to SP.
    Bpsp,
    /// Transfer SP to BP.
    Spbp,
}

impl Opcode {
    /// Every opcode, in numeric-code order where codes are contiguous.
    pub const ALL: [Opcode; 40] = [
        Opcode::Lda,
        Opcode::Sta,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Jmp,
        Opcode::Jms,
        Opcode::Jsr,
        Opcode::Rtn,
        Opcode::Jpl,
        Opcode::Jze,
        Opcode::Out,
        Opcode::End,
        Opcode::Psh,
        Opcode::Pop,
        Opcode::Pshm,
        Opcode::Popm,
        Opcode::Nop,
        Opcode::Neg,
        Opcode::Inc,
        Opcode::Dec,
        Opcode::Jnz,
        Opcode::Ldas,
        Opcode::Stas,
        Opcode::Adds,
        Opcode::Subs,
        Opcode::Jnm,
        Opcode::Jnp,
        Opcode::Outs,
        Opcode::Inm,
        Opcode::Ins,
        Opcode::Ldab,
        Opcode::Stab,
        Opcode::Addb,
        Opcode::Subb,
        Opcode::Outb,
        Opcode::Inb,
        Opcode::Popb,
        Opcode::Pshb,
        Opcode::Bpsp,
        Opcode::Spbp,
    ];

    /// The 6-bit numeric code of this opcode.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Opcode::Lda => 0,
            Opcode::Sta => 1,
            Opcode::Add => 2,
            Opcode::Sub => 3,
            Opcode::Jmp => 4,
            Opcode::Jms => 5,
            Opcode::Jsr => 6,
            Opcode::Rtn => 7,
            Opcode::Jpl => 8,
            Opcode::Jze => 9,
            Opcode::Out => 10,
            Opcode::End => 11,
            Opcode::Psh => 12,
            Opcode::Pop => 13,
            Opcode::Pshm => 14,
            Opcode::Popm => 15,
            Opcode::Nop => 16,
            Opcode::Neg => 17,
            Opcode::Inc => 18,
            Opcode::Dec => 19,
            Opcode::Jnz => 20,
            Opcode::Ldas => 21,
            Opcode::Stas => 22,
            Opcode::Adds => 23,
            Opcode::Subs => 24,
            Opcode::Jnm => 25,
            Opcode::Jnp => 26,
            Opcode::Outs => 27,
            Opcode::Inm => 28,
            Opcode::Ins => 29,
            Opcode::Ldab => 30,
            Opcode::Stab => 31,
            Opcode::Addb => 32,
            Opcode::Subb => 33,
            Opcode::Outb => 34,
            Opcode::Inb => 35,
            Opcode::Popb => 36,
            Opcode::Pshb => 37,
            Opcode::Bpsp => 38,
            Opcode::Spbp => 39,
        }
    }

    /// Look an opcode up by its numeric code.
    ///
    /// Returns `None` for codes with no assigned mnemonic; the caller
    /// treats those cells as `DEF` literals.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Opcode> {
        match code {
            0 => Some(Opcode::Lda),
            1 => Some(Opcode::Sta),
            2 => Some(Opcode::Add),
            3 => Some(Opcode::Sub),
            4 => Some(Opcode::Jmp),
            5 => Some(Opcode::Jms),
            6 => Some(Opcode::Jsr),
            7 => Some(Opcode::Rtn),
            8 => Some(Opcode::Jpl),
            9 => Some(Opcode::Jze),
            10 => Some(Opcode::Out),
            11 => Some(Opcode::End),
            12 => Some(Opcode::Psh),
            13 => Some(Opcode::Pop),
            14 => Some(Opcode::Pshm),
            15 => Some(Opcode::Popm),
            16 => Some(Opcode::Nop),
            17 => Some(Opcode::Neg),
            18 => Some(Opcode::Inc),
            19 => Some(Opcode::Dec),
            20 => Some(Opcode::Jnz),
            21 => Some(Opcode::Ldas),
            22 => Some(Opcode::Stas),
            23 => Some(Opcode::Adds),
            24 => Some(Opcode::Subs),
            25 => Some(Opcode::Jnm),
            26 => Some(Opcode::Jnp),
            27 => Some(Opcode::Outs),
            28 => Some(Opcode::Inm),
            29 => Some(Opcode::Ins),
            30 => Some(Opcode::Ldab),
            31 => Some(Opcode::Stab),
            32 => Some(Opcode::Addb),
            33 => Some(Opcode::Subb),
            34 => Some(Opcode::Outb),
            35 => Some(Opcode::Inb),
            36 => Some(Opcode::Popb),
            37 => Some(Opcode::Pshb),
            38 => Some(Opcode::Bpsp),
            39 => Some(Opcode::Spbp),
            _ => None,
        }
    }

    /// Look an opcode up by its mnemonic, case-insensitively.
    #[must_use]
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(mnemonic))
    }

    /// The canonical (uppercase) mnemonic of this opcode.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Lda => "LDA",
            Opcode::Sta => "STA",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Jmp => "JMP",
            Opcode::Jms => "JMS",
            Opcode::Jsr => "JSR",
            Opcode::Rtn => "RTN",
            Opcode::Jpl => "JPL",
            Opcode::Jze => "JZE",
            Opcode::Out => "OUT",
            Opcode::End => "END",
            Opcode::Psh => "PSH",
            Opcode::Pop => "POP",
            Opcode::Pshm => "PSHM",
            Opcode::Popm => "POPM",
            Opcode::Nop => "NOP",
            Opcode::Neg => "NEG",
            Opcode::Inc => "INC",
            Opcode::Dec => "DEC",
            Opcode::Jnz => "JNZ",
            Opcode::Ldas => "LDAS",
            Opcode::Stas => "STAS",
            Opcode::Adds => "ADDS",
            Opcode::Subs => "SUBS",
            Opcode::Jnm => "JNM",
            Opcode::Jnp => "JNP",
            Opcode::Outs => "OUTS",
            Opcode::Inm => "INM",
            Opcode::Ins => "INS",
            Opcode::Ldab => "LDAB",
            Opcode::Stab => "STAB",
            Opcode::Addb => "ADDB",
            Opcode::Subb => "SUBB",
            Opcode::Outb => "OUTB",
            Opcode::Inb => "INB",
            Opcode::Popb => "POPB",
            Opcode::Pshb => "PSHB",
            Opcode::Bpsp => "BPSP",
            Opcode::Spbp => "SPBP",
        }
    }

    /// Whether the assembler consumes an argument token for this opcode.
    #[must_use]
    pub const fn has_operand(self) -> bool {
        !matches!(
            self,
            Opcode::Rtn
                | Opcode::Psh
                | Opcode::Pop
                | Opcode::Spbp
                | Opcode::Bpsp
                | Opcode::Popb
                | Opcode::Pshb
                | Opcode::Nop
                | Opcode::Neg
                | Opcode::Inc
                | Opcode::Dec
                | Opcode::End
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_code(op.code()), Some(op));
        }
    }

    #[test]
    fn test_mnemonic_round_trip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_mnemonic(op.mnemonic()), Some(op));
            assert_eq!(
                Opcode::from_mnemonic(&op.mnemonic().to_ascii_lowercase()),
                Some(op)
            );
        }
    }

    #[test]
    fn test_fixed_codes() {
        // Spot checks against the published opcode table.
        assert_eq!(Opcode::Lda.code(), 0);
        assert_eq!(Opcode::Jmp.code(), 4);
        assert_eq!(Opcode::End.code(), 11);
        assert_eq!(Opcode::Jnz.code(), 20);
        assert_eq!(Opcode::Inb.code(), 35);
        assert_eq!(Opcode::Spbp.code(), 39);
    }

    #[test]
    fn test_unassigned_codes_have_no_mnemonic() {
        for code in 40..=63u8 {
            assert_eq!(Opcode::from_code(code), None);
        }
    }

    #[test]
    fn test_zero_operand_instructions() {
        for op in [
            Opcode::Rtn,
            Opcode::Psh,
            Opcode::Pop,
            Opcode::Spbp,
            Opcode::Bpsp,
            Opcode::Popb,
            Opcode::Pshb,
            Opcode::Nop,
            Opcode::Neg,
            Opcode::Inc,
            Opcode::Dec,
            Opcode::End,
        ] {
            assert!(!op.has_operand(), "{op:?} takes no operand");
        }
        assert!(Opcode::Lda.has_operand());
        assert!(Opcode::Pshm.has_operand());
        assert!(Opcode::Outs.has_operand());
    }
}
