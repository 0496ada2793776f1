use crate::memory::{new_address_space, ADDRESS_SPACE_BYTES};
use crate::Fault;

/// Zero-initialised 64 KiB data array; writes are visible to the next read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStore {
    cells: Box<[u8]>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self {
            cells: new_address_space(),
        }
    }
}

impl DataStore {
    /// Creates a store seeded with `image` at address zero; the rest stays zero.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::DataImageTooLarge`] when the image exceeds 64 KiB.
    pub fn with_image(image: &[u8]) -> Result<Self, Fault> {
        if image.len() > ADDRESS_SPACE_BYTES {
            return Err(Fault::DataImageTooLarge { len: image.len() });
        }
        let mut store = Self::default();
        store.cells[..image.len()].copy_from_slice(image);
        Ok(store)
    }

    /// Reads the cell at `addr`.
    #[must_use]
    pub fn read(&self, addr: u16) -> u8 {
        self.cells[usize::from(addr)]
    }

    /// Writes `value` to the cell at `addr`.
    pub fn write(&mut self, addr: u16, value: u8) {
        self.cells[usize::from(addr)] = value;
    }

    /// Zeroes every cell.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Full backing array.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }
}
