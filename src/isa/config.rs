//! Machine geometry: bit widths and instruction-word packing.

use super::Opcode;

/// Bit widths of the machine.
///
/// A memory cell holds `control_bits` opcode bits followed by
/// `address_width` immediate bits. The default (and only exercised)
/// configuration is 7 address bits and 6 control bits, i.e. 13-bit words
/// and 128 cells of RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Width of the immediate/address field in bits.
    pub address_width: u32,
    /// Width of the opcode field in bits.
    pub control_bits: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            address_width: 7,
            control_bits: 6,
        }
    }
}

impl Config {
    /// Create a configuration with explicit widths.
    #[must_use]
    pub const fn new(address_width: u32, control_bits: u32) -> Self {
        Config {
            address_width,
            control_bits,
        }
    }

    /// Total width of a memory cell in bits.
    #[must_use]
    pub const fn cell_width(&self) -> u32 {
        self.address_width + self.control_bits
    }

    /// Highest valid memory address.
    #[must_use]
    pub const fn max_address(&self) -> u16 {
        (1 << self.address_width) - 1
    }

    /// Mask covering a full memory cell.
    #[must_use]
    pub const fn cell_mask(&self) -> u16 {
        (1 << self.cell_width()) - 1
    }

    /// Number of RAM cells.
    #[must_use]
    pub const fn ram_len(&self) -> usize {
        1 << self.address_width
    }

    /// Pack an opcode and an immediate into a machine word.
    ///
    /// The immediate is truncated to the address field.
    #[must_use]
    pub fn pack(&self, opcode: Opcode, addr: u16) -> u16 {
        (u16::from(opcode.code()) << self.address_width) | (addr & self.max_address())
    }

    /// Split a machine word into its opcode field and immediate field.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // opcode field is at most 6 bits
    pub fn split(&self, cell: u16) -> (u8, u16) {
        ((cell >> self.address_width) as u8, cell & self.max_address())
    }
}
