//! The machine's RAM: a fixed-capacity array of machine words.

use crate::error::{DcError, DcResult};

/// Fixed-size word memory.
///
/// Capacity is set at construction and never changes; there is no way to
/// append, insert or remove cells. Out-of-range indices fail with
/// [`DcError::InvalidAddress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ram {
    cells: Vec<u16>,
    fill: u16,
}

impl Ram {
    /// Allocate `len` cells, all holding the fill value `0`.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Ram::with_fill(len, 0)
    }

    /// Allocate `len` cells, all holding `fill`.
    #[must_use]
    pub fn with_fill(len: usize, fill: u16) -> Self {
        Ram {
            cells: vec![fill; len],
            fill,
        }
    }

    /// Number of cells. Immutable for the lifetime of the RAM.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the RAM has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reset every cell to the fill value.
    pub fn clear(&mut self) {
        self.cells.fill(self.fill);
    }

    /// Read the cell at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`DcError::InvalidAddress`] if `addr` is out of range.
    pub fn get(&self, addr: u16) -> DcResult<u16> {
        self.cells
            .get(usize::from(addr))
            .copied()
            .ok_or_else(|| DcError::invalid_address(format!("no memory cell at {addr}")))
    }

    /// Write the cell at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`DcError::InvalidAddress`] if `addr` is out of range.
    pub fn set(&mut self, addr: u16, value: u16) -> DcResult<()> {
        match self.cells.get_mut(usize::from(addr)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(DcError::invalid_address(format!(
                "no memory cell at {addr}"
            ))),
        }
    }

    /// Iterate over all cells in address order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.cells.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero_filled() {
        let ram = Ram::new(128);
        assert_eq!(ram.len(), 128);
        assert!(ram.iter().all(|cell| cell == 0));
    }

    #[test]
    fn test_get_set() {
        let mut ram = Ram::new(128);
        ram.set(10, 0b0_0010_0000_1111).expect("in range");
        assert_eq!(ram.get(10), Ok(0b0_0010_0000_1111));
        assert_eq!(ram.get(11), Ok(0));
    }

    #[test]
    fn test_out_of_range_fails() {
        let mut ram = Ram::new(128);
        assert!(matches!(ram.get(128), Err(DcError::InvalidAddress { .. })));
        assert!(ram.set(128, 1).is_err());
    }

    #[test]
    fn test_clear_restores_fill() {
        let mut ram = Ram::with_fill(8, 7);
        ram.set(3, 99).expect("in range");
        ram.clear();
        assert!(ram.iter().all(|cell| cell == 7));
        assert_eq!(ram.len(), 8);
    }
}
