//! Program and data stores backing the addressed bus.

/// Read-only program image.
pub mod program;
/// Mutable 64 KiB data array.
pub mod data;

pub use data::DataStore;
pub use program::ProgramStore;

/// Size in bytes of the flat 16-bit address space (64 KiB).
pub const ADDRESS_SPACE_BYTES: usize = u16::MAX as usize + 1;

/// Zeroed backing array covering every address.
#[must_use]
pub fn new_address_space() -> Box<[u8]> {
    vec![0; ADDRESS_SPACE_BYTES].into_boxed_slice()
}

