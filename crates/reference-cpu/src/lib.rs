//! Behavioral stand-ins for the Brainfuck CPU under test.
//!
//! Each device exposes one pin encoding the harness drives. All three share
//! [`BfCore`], a clocked micro-sequencer that issues at most one bus request
//! per cycle and consumes read results one cycle later.

/// Shared micro-sequencer.
pub mod sequencer;
pub use sequencer::{BfCore, CellUse, ScanDirection, Stage};

/// Multiplexed address/data bus device.
pub mod addressed;
pub use addressed::AddressedBusCpu;

/// Device with on-chip memories and IO-only pins.
pub mod separate_pin;
pub use separate_pin::SeparatePinCpu;

/// Device behind the serial register link.
pub mod serial;
pub use serial::SerialChip;

#[cfg(test)]
use fern as _;
#[cfg(test)]
use proptest as _;
