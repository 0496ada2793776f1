//! Phase-multiplexed bus over a polled serial register link.
//!
//! The host never sees a clock edge. It polls the packed output register,
//! classifies `state` into a [`Phase`], and steps the external clock after
//! every exchange. The adapter is level-triggered: latches are refreshed on
//! every observation, but a transaction commits only when `Execute` is
//! entered, so a slow device may report the same phase for any number of
//! polls.

/// Phase decoding and transition table.
pub mod phase;
/// Packed register layouts.
pub mod word;

pub use phase::{
    Phase, Transition, STATE_ADDR_HI, STATE_ADDR_LO, STATE_NONE, STATE_OPCODE, STATE_READ_WRITE,
};
pub use word::{InputWord, OutputWord};

use crate::{BusOp, BusPeripheral, Fault, SerialLink, TraceEvent, TraceSink};

/// Result of one poll/step exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollOutcome {
    /// Device still running; the clock was stepped.
    Running(Phase),
    /// Device reported `halted`; the clock was not stepped.
    Halted,
}

/// Host side of the serial transport, translating phases into bus transactions.
#[derive(Debug, Clone, Default)]
pub struct SerialLinkAdapter {
    phase: Phase,
    opcode: u8,
    addr_hi: u8,
    addr_lo: u8,
    inputs: InputWord,
    steps: u64,
    commits: u64,
}

impl SerialLinkAdapter {
    /// Creates an adapter in the idle phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last phase observed.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// External clock steps issued.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Transactions committed.
    #[must_use]
    pub const fn commits(&self) -> u64 {
        self.commits
    }

    /// Input register as last written.
    #[must_use]
    pub const fn inputs(&self) -> InputWord {
        self.inputs
    }

    /// Asserts `enable` in the input register.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::Link`] when the transport fails.
    pub fn enable<L>(&mut self, link: &mut L) -> Result<(), Fault>
    where
        L: SerialLink + ?Sized,
    {
        self.inputs.enable = true;
        link.set_all_inputs(self.inputs.to_bits())?;
        Ok(())
    }

    /// Polls the device once, services the observed phase, and steps the clock.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::ProtocolViolation`] for unknown states or illegal phase
    /// sequences, [`Fault::InputExhausted`] from the peripheral, and
    /// [`Fault::Link`] on transport failure.
    pub fn poll<L, T>(
        &mut self,
        link: &mut L,
        bus: &mut BusPeripheral,
        trace: &mut T,
    ) -> Result<PollOutcome, Fault>
    where
        L: SerialLink + ?Sized,
        T: TraceSink + ?Sized,
    {
        let outputs = OutputWord::from_bits(link.get_all_outputs()?);
        if outputs.halted {
            return Ok(PollOutcome::Halted);
        }

        let observed = Phase::from_state(outputs.state)?;
        let transition = self.phase.transition(observed)?;
        match observed {
            Phase::Opcode => self.opcode = outputs.bus_out,
            Phase::AddressHigh => self.addr_hi = outputs.bus_out,
            Phase::AddressLow => self.addr_lo = outputs.bus_out,
            Phase::Idle | Phase::Execute => {}
        }

        if transition == Transition::Entered {
            match observed {
                Phase::Execute => self.execute(outputs.bus_out, bus, trace)?,
                Phase::Idle | Phase::Opcode => self.inputs.op_done = false,
                Phase::AddressHigh | Phase::AddressLow => {}
            }
            link.set_all_inputs(self.inputs.to_bits())?;
        }
        self.phase = observed;

        link.step_clock()?;
        self.steps += 1;
        Ok(PollOutcome::Running(observed))
    }

    fn execute<T>(
        &mut self,
        bus_out: u8,
        bus: &mut BusPeripheral,
        trace: &mut T,
    ) -> Result<(), Fault>
    where
        T: TraceSink + ?Sized,
    {
        let op = BusOp::from_code(self.opcode);
        let addr = u16::from_be_bytes([self.addr_hi, self.addr_lo]);
        if op == BusOp::ReadIo && bus.io().next_read_falls_back() {
            trace.on_event(TraceEvent::InputFallback { cycle: self.steps });
        }
        let value_in = bus.resolve(op, addr, bus_out)?;
        if op.is_read() {
            self.inputs.bus_in = value_in;
        }
        self.inputs.op_done = true;
        self.commits += 1;
        trace.on_event(TraceEvent::Transaction {
            cycle: self.steps,
            op,
            addr,
            value_out: bus_out,
            value_in,
        });
        Ok(())
    }
}
