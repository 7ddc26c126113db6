//! Fixed-width two's-complement register cells.
//!
//! The cast allowances below are intentional: register semantics are all
//! about deliberate signed/unsigned reinterpretation of masked values.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

/// A fixed-width register.
///
/// The stored value is always truncated to `bits` width; every mutation
/// goes through [`Register::set`], which masks. The signed view, the sign
/// bit and the overflow predicate are derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    name: &'static str,
    bits: u32,
    value: u16,
}

impl Register {
    /// Create a register holding zero.
    #[must_use]
    pub const fn new(name: &'static str, bits: u32) -> Self {
        Register {
            name,
            bits,
            value: 0,
        }
    }

    /// Create a register with an initial value (masked to width).
    #[must_use]
    pub const fn with_value(name: &'static str, bits: u32, value: u16) -> Self {
        Register {
            name,
            bits,
            value: value & ((1 << bits) - 1),
        }
    }

    /// The diagnostic name of this register.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The width of this register in bits.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// The raw (unsigned) value.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.value
    }

    /// Mask covering this register's width.
    #[must_use]
    pub const fn mask(&self) -> u16 {
        (1 << self.bits) - 1
    }

    /// Largest representable signed value.
    #[must_use]
    pub const fn max_signed(&self) -> i32 {
        (1 << (self.bits - 1)) - 1
    }

    /// Smallest representable signed value.
    #[must_use]
    pub const fn min_signed(&self) -> i32 {
        -(1 << (self.bits - 1))
    }

    /// Set the value, truncating to the register width.
    ///
    /// Accepts a signed argument so negative inputs store their
    /// two's-complement bit pattern directly.
    pub const fn set(&mut self, value: i32) {
        self.value = (value & self.mask() as i32) as u16;
    }

    /// Add one, wrapping within the register width. Overflow trapping is
    /// the caller's job via [`Register::will_overflow`].
    pub const fn inc(&mut self) {
        self.set(self.value as i32 + 1);
    }

    /// Subtract one, wrapping within the register width.
    pub const fn dec(&mut self) {
        self.set(self.value as i32 - 1);
    }

    /// Two's-complement negate in place.
    pub const fn neg(&mut self) {
        self.value = (!self.value).wrapping_add(1) & self.mask();
    }

    /// Copy this register's raw value into another register, truncating
    /// or zero-extending to the destination width.
    pub const fn to(&self, other: &mut Register) {
        other.set(self.value as i32);
    }

    /// The two's-complement interpretation of the stored value.
    #[must_use]
    pub const fn signed_value(&self) -> i32 {
        if self.leftmost() {
            self.value as i32 - (1 << self.bits)
        } else {
            self.value as i32
        }
    }

    /// The sign bit.
    #[must_use]
    pub const fn leftmost(&self) -> bool {
        (self.value >> (self.bits - 1)) & 1 == 1
    }

    /// The lowest-order bit.
    #[must_use]
    pub const fn rightmost(&self) -> bool {
        self.value & 1 == 1
    }

    /// Whether committing `candidate` would leave this register's signed
    /// range. Callers check this *before* writing an arithmetic result so
    /// a trapped instruction leaves the register unmodified.
    #[must_use]
    pub const fn will_overflow(&self, candidate: i32) -> bool {
        candidate > self.max_signed() || candidate < self.min_signed()
    }

    /// A copy of this register holding `value` (masked).
    const fn derive(&self, value: i32) -> Register {
        let mut reg = *self;
        reg.set(value);
        reg
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<Register {} {:0width$b} ({})>",
            self.name,
            self.value,
            self.value,
            width = self.bits as usize
        )
    }
}

// The operators produce a new register of the same name and width holding
// the masked result. They never trap; only the machine's ADD/SUB/INC/DEC
// handlers check for overflow.

impl std::ops::Add for Register {
    type Output = Register;

    fn add(self, rhs: Register) -> Register {
        self.derive(self.value as i32 + rhs.value as i32)
    }
}

impl std::ops::Sub for Register {
    type Output = Register;

    fn sub(self, rhs: Register) -> Register {
        self.derive(self.value as i32 - rhs.value as i32)
    }
}

impl std::ops::BitAnd for Register {
    type Output = Register;

    fn bitand(self, rhs: Register) -> Register {
        self.derive((self.value & rhs.value) as i32)
    }
}

impl std::ops::BitOr for Register {
    type Output = Register;

    fn bitor(self, rhs: Register) -> Register {
        self.derive((self.value | rhs.value) as i32)
    }
}

impl std::ops::BitXor for Register {
    type Output = Register;

    fn bitxor(self, rhs: Register) -> Register {
        self.derive((self.value ^ rhs.value) as i32)
    }
}

impl std::ops::Shl<u32> for Register {
    type Output = Register;

    fn shl(self, rhs: u32) -> Register {
        self.derive(((self.value as i32) << rhs) & self.mask() as i32)
    }
}

impl std::ops::Shr<u32> for Register {
    type Output = Register;

    fn shr(self, rhs: u32) -> Register {
        self.derive((self.value >> rhs) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_masks_to_width() {
        let mut reg = Register::new("AC", 4);
        reg.set(0b1_0110);
        assert_eq!(reg.value(), 0b0110);
    }

    #[test]
    fn test_set_negative_stores_twos_complement() {
        let mut reg = Register::new("AC", 4);
        reg.set(-5);
        assert_eq!(reg.value(), 0b1011);
        assert_eq!(reg.signed_value(), -5);
    }

    #[test]
    fn test_signed_value_range() {
        let mut reg = Register::new("AC", 4);
        for raw in 0..16i32 {
            reg.set(raw);
            let expected = if raw < 8 { raw } else { raw - 16 };
            assert_eq!(reg.signed_value(), expected);
            // Re-setting the signed view is a fixed point.
            reg.set(reg.signed_value());
            assert_eq!(reg.signed_value(), expected);
        }
    }

    #[test]
    fn test_inc_dec_wrap() {
        let mut reg = Register::new("PC", 4);
        reg.set(15);
        reg.inc();
        assert_eq!(reg.value(), 0);
        reg.dec();
        assert_eq!(reg.value(), 15);
    }

    #[test]
    fn test_neg() {
        let mut reg = Register::new("AC", 4);
        reg.set(5);
        reg.neg();
        assert_eq!(reg.signed_value(), -5);
        reg.neg();
        assert_eq!(reg.signed_value(), 5);

        // Negating the minimum wraps back onto itself, as two's
        // complement dictates.
        reg.set(-8);
        reg.neg();
        assert_eq!(reg.signed_value(), -8);
    }

    #[test]
    fn test_to_truncates_to_destination_width() {
        let ir = Register::with_value("IR", 13, 0b0_0010_0000_1111);
        let mut ar = Register::new("AR", 7);
        ir.to(&mut ar);
        assert_eq!(ar.value(), 0b000_1111);
    }

    #[test]
    fn test_will_overflow_bounds() {
        let reg = Register::new("AC", 13);
        assert_eq!(reg.max_signed(), 4095);
        assert_eq!(reg.min_signed(), -4096);
        assert!(!reg.will_overflow(4095));
        assert!(reg.will_overflow(4096));
        assert!(!reg.will_overflow(-4096));
        assert!(reg.will_overflow(-4097));
    }

    #[test]
    fn test_operators_mask_and_keep_width() {
        let a = Register::with_value("AC", 4, 12);
        let b = Register::with_value("AC", 4, 7);
        assert_eq!((a + b).value(), 3); // 19 & 0xF
        assert_eq!((a - b).value(), 5);
        assert_eq!((a & b).value(), 4);
        assert_eq!((a | b).value(), 15);
        assert_eq!((a ^ b).value(), 11);
        assert_eq!((a << 1).value(), 8);
        assert_eq!((a >> 2).value(), 3);
        assert_eq!((a + b).bits(), 4);
        assert_eq!((a + b).name(), "AC");
    }

    #[test]
    fn test_display() {
        let reg = Register::with_value("AC", 4, 5);
        assert_eq!(reg.to_string(), "<Register AC 0101 (5)>");
    }
}
