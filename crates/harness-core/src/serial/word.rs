/// Host-driven input register: `enable[9] | op_done[8] | bus_in[7:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InputWord {
    /// Run enable.
    pub enable: bool,
    /// Host finished servicing the current `Execute` phase.
    pub op_done: bool,
    /// Value returned for a read.
    pub bus_in: u8,
}

impl InputWord {
    /// Packs the register into its 10-bit wire form.
    #[must_use]
    pub fn to_bits(self) -> u16 {
        (u16::from(self.enable) << 9) | (u16::from(self.op_done) << 8) | u16::from(self.bus_in)
    }

    /// Unpacks a wire word; bits above 9 are ignored.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self {
            enable: bits & 0x200 != 0,
            op_done: bits & 0x100 != 0,
            bus_in: (bits & 0xFF) as u8,
        }
    }
}

/// Device-driven output register: `halted[11] | state[10:8] | bus_out[7:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OutputWord {
    /// Byte presented by the device.
    pub bus_out: u8,
    /// Raw 3-bit phase code.
    pub state: u8,
    /// Device reached its stop instruction.
    pub halted: bool,
}

impl OutputWord {
    /// Unpacks the 12-bit wire word.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self {
            bus_out: (bits & 0x0FF) as u8,
            state: ((bits & 0x700) >> 8) as u8,
            halted: bits & 0x800 != 0,
        }
    }

    /// Packs the register into its wire form.
    #[must_use]
    pub fn to_bits(self) -> u16 {
        (u16::from(self.halted) << 11)
            | (u16::from(self.state & 0x7) << 8)
            | u16::from(self.bus_out)
    }
}
