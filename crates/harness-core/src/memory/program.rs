use crate::memory::ADDRESS_SPACE_BYTES;
use crate::Fault;

/// Immutable program bytes fixed at load time.
///
/// Reads beyond the loaded length return zero, which is how a DUT discovers
/// the end of its program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramStore {
    bytes: Box<[u8]>,
}

impl ProgramStore {
    /// Loads a program image.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::ProgramTooLarge`] when the image exceeds 64 KiB.
    pub fn new(bytes: &[u8]) -> Result<Self, Fault> {
        if bytes.len() > ADDRESS_SPACE_BYTES {
            return Err(Fault::ProgramTooLarge { len: bytes.len() });
        }
        Ok(Self {
            bytes: bytes.into(),
        })
    }

    /// Reads the program byte at `addr`, or `0` past the end of the image.
    #[must_use]
    pub fn read(&self, addr: u16) -> u8 {
        self.bytes.get(usize::from(addr)).copied().unwrap_or(0)
    }

    /// Number of loaded bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` for an empty image.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Loaded bytes in address order.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
