use crate::ProtocolViolation;

/// Link `state` code for [`Phase::Idle`].
pub const STATE_NONE: u8 = 0b000;
/// Link `state` code for [`Phase::Opcode`].
pub const STATE_OPCODE: u8 = 0b001;
/// Link `state` code for [`Phase::AddressHigh`].
pub const STATE_ADDR_HI: u8 = 0b010;
/// Link `state` code for [`Phase::AddressLow`].
pub const STATE_ADDR_LO: u8 = 0b011;
/// Link `state` code for [`Phase::Execute`].
pub const STATE_READ_WRITE: u8 = 0b100;

/// Phase of one phase-multiplexed bus transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Phase {
    /// No transaction in flight.
    #[default]
    Idle,
    /// `bus_out` carries the operation code.
    Opcode,
    /// `bus_out` carries the address high byte.
    AddressHigh,
    /// `bus_out` carries the address low byte.
    AddressLow,
    /// The transaction commits; `bus_out` carries the write value.
    Execute,
}

/// Result of observing a phase after the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Same phase observed again; nothing new to do.
    Held,
    /// A new phase was entered.
    Entered,
}

impl Phase {
    /// Decodes the 3-bit `state` field.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::UnknownState`] for codes 5..=7.
    pub const fn from_state(code: u8) -> Result<Self, ProtocolViolation> {
        match code {
            STATE_NONE => Ok(Self::Idle),
            STATE_OPCODE => Ok(Self::Opcode),
            STATE_ADDR_HI => Ok(Self::AddressHigh),
            STATE_ADDR_LO => Ok(Self::AddressLow),
            STATE_READ_WRITE => Ok(Self::Execute),
            other => Err(ProtocolViolation::UnknownState(other)),
        }
    }

    /// Returns the 3-bit `state` code.
    #[must_use]
    pub const fn state_code(self) -> u8 {
        match self {
            Self::Idle => STATE_NONE,
            Self::Opcode => STATE_OPCODE,
            Self::AddressHigh => STATE_ADDR_HI,
            Self::AddressLow => STATE_ADDR_LO,
            Self::Execute => STATE_READ_WRITE,
        }
    }

    /// Checks `next` against the transition table.
    ///
    /// | from \ to   | Idle  | Opcode | AddrHi | AddrLo | Execute |
    /// |-------------|-------|--------|--------|--------|---------|
    /// | Idle        | held  | enter  |        |        |         |
    /// | Opcode      |       | held   | enter  |        |         |
    /// | AddressHigh |       |        | held   | enter  |         |
    /// | AddressLow  |       |        |        | held   | enter   |
    /// | Execute     | enter | enter  |        |        | held    |
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::IllegalTransition`] for blank cells.
    pub fn transition(self, next: Self) -> Result<Transition, ProtocolViolation> {
        match (self, next) {
            (from, to) if from == to => Ok(Transition::Held),
            (Self::Idle | Self::Execute, Self::Opcode)
            | (Self::Opcode, Self::AddressHigh)
            | (Self::AddressHigh, Self::AddressLow)
            | (Self::AddressLow, Self::Execute)
            | (Self::Execute, Self::Idle) => Ok(Transition::Entered),
            (from, to) => Err(ProtocolViolation::IllegalTransition { from, to }),
        }
    }
}
