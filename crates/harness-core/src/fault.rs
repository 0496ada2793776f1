use thiserror::Error;

use crate::api::LinkError;
use crate::serial::Phase;

/// Fault classes used for run reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// DUT drove a state or sequence the peripheral cannot service.
    Protocol,
    /// Input stream ran dry with no fallback configured.
    Input,
    /// Collected output differs from the expected bytes.
    Output,
    /// Cycle budget ran out before `halted`.
    Timeout,
    /// Run never got past reset, or the case itself is malformed.
    Setup,
    /// Physical transport failure.
    Link,
}

/// Specific reason a DUT broke the bus protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ProtocolViolation {
    /// Observed phase cannot follow the previous one.
    #[error("illegal phase transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// Phase latched by the previous poll.
        from: Phase,
        /// Phase reported by the current poll.
        to: Phase,
    },
    /// The `state` field held a code outside the phase domain.
    #[error("unknown link state code {0:#05b}")]
    UnknownState(u8),
}

/// Terminal reason a conformance run did not pass. No fault is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// DUT asserted an operation or state the peripheral cannot service.
    #[error("protocol violation: {0}")]
    ProtocolViolation(#[from] ProtocolViolation),
    /// `ReadIo` on an empty input queue with no fallback byte.
    #[error("read on exhausted input after {consumed} byte(s)")]
    InputExhausted {
        /// Bytes already consumed from the input stream.
        consumed: usize,
    },
    /// Collected output differs from the expected output.
    #[error("output mismatch: expected {expected:?}, got {actual:?}")]
    OutputMismatch {
        /// Expected output bytes.
        expected: Vec<u8>,
        /// Bytes the DUT actually emitted.
        actual: Vec<u8>,
    },
    /// Budget exhausted without observing `halted`.
    #[error("no halt within {cycles} cycles")]
    Timeout {
        /// Cycles executed before giving up.
        cycles: u64,
    },
    /// `halted` was already asserted before the first cycle.
    #[error("dut reported halted before executing a cycle")]
    ZeroCycle,
    /// Program image does not fit the 16-bit address space.
    #[error("program image of {len} bytes exceeds the address space")]
    ProgramTooLarge {
        /// Offending image length.
        len: usize,
    },
    /// Initial data image does not fit the data store.
    #[error("data image of {len} bytes exceeds the address space")]
    DataImageTooLarge {
        /// Offending image length.
        len: usize,
    },
    /// Serial transport failed.
    #[error(transparent)]
    Link(#[from] LinkError),
}

impl Fault {
    /// Returns the reporting class for this fault.
    #[must_use]
    pub const fn class(&self) -> FaultClass {
        match self {
            Self::ProtocolViolation(_) => FaultClass::Protocol,
            Self::InputExhausted { .. } => FaultClass::Input,
            Self::OutputMismatch { .. } => FaultClass::Output,
            Self::Timeout { .. } => FaultClass::Timeout,
            Self::ZeroCycle | Self::ProgramTooLarge { .. } | Self::DataImageTooLarge { .. } => {
                FaultClass::Setup
            }
            Self::Link(_) => FaultClass::Link,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Fault, FaultClass, ProtocolViolation};
    use crate::api::LinkError;
    use crate::serial::Phase;

    #[test]
    fn class_mapping_matches_fault_taxonomy() {
        assert_eq!(
            Fault::from(ProtocolViolation::UnknownState(7)).class(),
            FaultClass::Protocol
        );
        assert_eq!(
            Fault::InputExhausted { consumed: 0 }.class(),
            FaultClass::Input
        );
        assert_eq!(
            Fault::OutputMismatch {
                expected: b"a".to_vec(),
                actual: Vec::new(),
            }
            .class(),
            FaultClass::Output
        );
        assert_eq!(Fault::Timeout { cycles: 10 }.class(), FaultClass::Timeout);
        assert_eq!(Fault::ZeroCycle.class(), FaultClass::Setup);
        assert_eq!(
            Fault::ProgramTooLarge { len: 70_000 }.class(),
            FaultClass::Setup
        );
        assert_eq!(
            Fault::from(LinkError::Disconnected).class(),
            FaultClass::Link
        );
    }

    #[test]
    fn messages_carry_diagnostic_payloads() {
        let violation = ProtocolViolation::IllegalTransition {
            from: Phase::Idle,
            to: Phase::Execute,
        };
        assert_eq!(
            Fault::from(violation).to_string(),
            "protocol violation: illegal phase transition Idle -> Execute"
        );
        assert_eq!(
            Fault::Timeout { cycles: 42 }.to_string(),
            "no halt within 42 cycles"
        );
        let mismatch = Fault::OutputMismatch {
            expected: b"H\n".to_vec(),
            actual: b"H".to_vec(),
        };
        assert_eq!(
            mismatch.to_string(),
            "output mismatch: expected [72, 10], got [72]"
        );
    }
}
