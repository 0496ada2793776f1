//! Clock driver for DUTs that own their memories and expose IO-only pins.

use crate::{
    BusOp, Fault, IoChannel, ProgramStore, SeparatePinDut, TraceEvent, TraceSink,
    TransactionCounts,
};

/// IO pins sampled just before a rising edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IoPins {
    /// `out_enable` level.
    pub out_enable: bool,
    /// `out_val` byte.
    pub out_val: u8,
    /// `in_reading` level.
    pub in_reading: bool,
}

/// Two-phase stepper servicing `out_enable`/`in_reading` once per cycle.
#[derive(Debug, Clone, Default)]
pub struct SeparatePinDriver {
    settle_ns: u32,
    cycles: u64,
    counts: TransactionCounts,
}

impl SeparatePinDriver {
    /// Creates a driver that holds for `settle_ns` after every transition.
    #[must_use]
    pub const fn new(settle_ns: u32) -> Self {
        Self {
            settle_ns,
            cycles: 0,
            counts: TransactionCounts::ZERO,
        }
    }

    /// Full cycles completed.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// IO transactions serviced so far.
    #[must_use]
    pub const fn counts(&self) -> TransactionCounts {
        self.counts
    }

    /// Writes `program` into the DUT's instruction memory through its load port.
    pub fn load_program<D>(&self, dut: &mut D, program: &ProgramStore)
    where
        D: SeparatePinDut + ?Sized,
    {
        for (addr, byte) in (0..=u16::MAX).zip(program.as_bytes()) {
            dut.set_instr_addr(addr);
            dut.set_instr_in(*byte);
            dut.set_instr_write(true);
            dut.hold(self.settle_ns);
            dut.set_instr_write(false);
            dut.hold(self.settle_ns);
        }
        dut.set_instr_addr(0);
        dut.set_instr_in(0);
        log::debug!("loaded {} program byte(s) over the load port", program.len());
    }

    /// Runs one full cycle: sample on the rising edge, service on the falling edge.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InputExhausted`] when `in_reading` finds no input and
    /// the channel policy is [`crate::InputExhaustion::Fail`].
    pub fn cycle<D, T>(
        &mut self,
        dut: &mut D,
        io: &mut IoChannel,
        trace: &mut T,
    ) -> Result<(), Fault>
    where
        D: SeparatePinDut + ?Sized,
        T: TraceSink + ?Sized,
    {
        dut.set_clock(true);
        let pins = IoPins {
            out_enable: dut.out_enable(),
            out_val: dut.out_val(),
            in_reading: dut.in_reading(),
        };
        dut.hold(self.settle_ns);

        dut.set_clock(false);
        if pins.out_enable {
            io.write(pins.out_val);
            self.counts.record(BusOp::WriteIo);
            trace.on_event(TraceEvent::Transaction {
                cycle: self.cycles,
                op: BusOp::WriteIo,
                addr: 0,
                value_out: pins.out_val,
                value_in: 0,
            });
        }
        if pins.in_reading {
            if io.next_read_falls_back() {
                trace.on_event(TraceEvent::InputFallback { cycle: self.cycles });
            }
            let byte = io.read()?;
            dut.set_in_val(byte);
            self.counts.record(BusOp::ReadIo);
            trace.on_event(TraceEvent::Transaction {
                cycle: self.cycles,
                op: BusOp::ReadIo,
                addr: 0,
                value_out: 0,
                value_in: byte,
            });
        }
        dut.hold(self.settle_ns);
        self.cycles += 1;
        Ok(())
    }
}
