//! Bus operation codes shared by every encoding.

/// Raw 3-bit code for [`BusOp::None`].
pub const BUS_NONE: u8 = 0b000;
/// Raw 3-bit code for [`BusOp::ReadProgram`].
pub const BUS_READ_PROGRAM: u8 = 0b010;
/// Raw 3-bit code for [`BusOp::ReadData`].
pub const BUS_READ_DATA: u8 = 0b100;
/// Raw 3-bit code for [`BusOp::WriteData`].
pub const BUS_WRITE_DATA: u8 = 0b101;
/// Raw 3-bit code for [`BusOp::ReadIo`].
pub const BUS_READ_IO: u8 = 0b110;
/// Raw 3-bit code for [`BusOp::WriteIo`].
pub const BUS_WRITE_IO: u8 = 0b111;

/// Operation the DUT requests from its environment for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BusOp {
    /// No request this cycle.
    #[default]
    None,
    /// Read one program byte.
    ReadProgram,
    /// Read one data cell.
    ReadData,
    /// Write one data cell.
    WriteData,
    /// Pop one byte from the input stream.
    ReadIo,
    /// Append one byte to the output stream.
    WriteIo,
}

impl BusOp {
    /// Every active operation in code order.
    pub const ACTIVE: [Self; 5] = [
        Self::ReadProgram,
        Self::ReadData,
        Self::WriteData,
        Self::ReadIo,
        Self::WriteIo,
    ];

    /// Decodes a raw bus code. Codes outside the five active values are no-ops.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            BUS_READ_PROGRAM => Self::ReadProgram,
            BUS_READ_DATA => Self::ReadData,
            BUS_WRITE_DATA => Self::WriteData,
            BUS_READ_IO => Self::ReadIo,
            BUS_WRITE_IO => Self::WriteIo,
            _ => Self::None,
        }
    }

    /// Returns the raw 3-bit code driven on the `bus_op` pins.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::None => BUS_NONE,
            Self::ReadProgram => BUS_READ_PROGRAM,
            Self::ReadData => BUS_READ_DATA,
            Self::WriteData => BUS_WRITE_DATA,
            Self::ReadIo => BUS_READ_IO,
            Self::WriteIo => BUS_WRITE_IO,
        }
    }

    /// Returns `true` when the DUT expects a value back on its input pins.
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::ReadProgram | Self::ReadData | Self::ReadIo)
    }

    /// Returns `true` when the operation carries an outgoing value.
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::WriteData | Self::WriteIo)
    }

    /// Dense index used for per-operation counters.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::None => 0,
            Self::ReadProgram => 1,
            Self::ReadData => 2,
            Self::WriteData => 3,
            Self::ReadIo => 4,
            Self::WriteIo => 5,
        }
    }
}

/// One bus request as sampled from the DUT before the edge that consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BusRequest {
    /// Requested operation.
    pub op: BusOp,
    /// Target address.
    pub addr: u16,
    /// Outgoing value, meaningful for writes only.
    pub value: u8,
}

impl BusRequest {
    /// An idle request.
    pub const IDLE: Self = Self {
        op: BusOp::None,
        addr: 0,
        value: 0,
    };

    /// Creates a request.
    #[must_use]
    pub const fn new(op: BusOp, addr: u16, value: u8) -> Self {
        Self { op, addr, value }
    }
}

#[cfg(test)]
mod tests {
    use super::{BusOp, BusRequest, BUS_NONE};

    #[test]
    fn code_roundtrip_is_stable_for_active_ops() {
        for op in BusOp::ACTIVE {
            assert_eq!(BusOp::from_code(op.code()), op);
        }
        assert_eq!(BusOp::from_code(BUS_NONE), BusOp::None);
    }

    #[test]
    fn unassigned_codes_decode_as_no_op() {
        assert_eq!(BusOp::from_code(0b001), BusOp::None);
        assert_eq!(BusOp::from_code(0b011), BusOp::None);
        assert_eq!(BusOp::from_code(0xFF), BusOp::None);
    }

    #[test]
    fn read_and_write_classes_are_disjoint() {
        for op in BusOp::ACTIVE {
            assert!(op.is_read() != op.is_write());
        }
        assert!(!BusOp::None.is_read());
        assert!(!BusOp::None.is_write());
    }

    #[test]
    fn counter_indices_are_unique() {
        let mut seen = [false; 6];
        for op in [BusOp::None].into_iter().chain(BusOp::ACTIVE) {
            assert!(!seen[op.index()]);
            seen[op.index()] = true;
        }
        assert_eq!(BusRequest::default(), BusRequest::IDLE);
    }
}
