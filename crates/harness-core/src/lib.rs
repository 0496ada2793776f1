//! Conformance harness and bus/IO peripheral emulator for a hardware
//! Brainfuck CPU.
//!
//! The harness plays the environment around a device under test: it serves
//! program, data and IO transactions, steps the clock, detects `halted`, and
//! grades the produced output. Three pin encodings are supported: a single
//! multiplexed addressed bus, separate IO-only pins, and a phase-multiplexed
//! serial register link.

/// Bus operation codes and request snapshots.
pub mod bus;
pub use bus::{
    BusOp, BusRequest, BUS_NONE, BUS_READ_DATA, BUS_READ_IO, BUS_READ_PROGRAM, BUS_WRITE_DATA,
    BUS_WRITE_IO,
};

/// Fault taxonomy shared by every run.
pub mod fault;
pub use fault::{Fault, FaultClass, ProtocolViolation};

/// Program and data stores over the 16-bit address space.
pub mod memory;
pub use memory::{new_address_space, DataStore, ProgramStore, ADDRESS_SPACE_BYTES};

/// Input queue and output capture.
pub mod io;
pub use io::{InputExhaustion, IoChannel};

/// Transaction resolution against the stores.
pub mod peripheral;
pub use peripheral::{BusPeripheral, TransactionCounts};

/// DUT pin traits, serial transport trait, configuration and tracing.
pub mod api;
pub use api::{
    AddressedBusDut, ClockedDut, HarnessConfig, LinkError, NullTrace, SeparatePinDut, SerialLink,
    TraceEvent, TraceSink, DEFAULT_CYCLE_BUDGET, DEFAULT_RESET_WINDOW_NS, DEFAULT_SERIAL_RESET_HOLD,
    DEFAULT_SETTLE_NS,
};

/// Two-phase clock driver for the addressed bus.
pub mod clock;
pub use clock::{ClockDriver, ClockPhase};

/// Clock driver for the separate-pin encoding.
pub mod separate_pin;
pub use separate_pin::{IoPins, SeparatePinDriver};

/// Serial link adapter and register layouts.
pub mod serial;
pub use serial::{
    InputWord, OutputWord, Phase, PollOutcome, SerialLinkAdapter, Transition, STATE_ADDR_HI,
    STATE_ADDR_LO, STATE_NONE, STATE_OPCODE, STATE_READ_WRITE,
};

/// End-to-end runs and grading.
pub mod harness;
pub use harness::{ConformanceHarness, RunReport, TestCase};

/// Built-in conformance programs and the suite runner.
pub mod suite;
pub use suite::{
    builtin_cases, run_suite, CaseOutcome, CaseResult, SuiteCase, SuiteResult, SuiteSummary,
};
