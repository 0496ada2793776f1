//! Two-phase clock stepper for the single-cycle multiplexed bus.
//!
//! A cycle is `Low -> High -> Low`. Entering `High` drives the clock up and
//! snapshots `bus_op`/`addr`/`val_out` before the DUT is allowed to settle, so
//! the request made by the previous combinational settle is never lost.
//! Entering `Low` drives the clock down and resolves the snapshot, driving
//! `val_in` for reads before the DUT settles again.

use crate::{AddressedBusDut, BusOp, BusPeripheral, BusRequest, Fault, TraceEvent, TraceSink};

/// Visible clock phase and the request latched on the last rising edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClockPhase {
    /// Clock low; nothing pending.
    #[default]
    Low,
    /// Clock high; request sampled just before the edge.
    High(BusRequest),
}

/// Clock driver for [`AddressedBusDut`] implementations.
#[derive(Debug, Clone, Default)]
pub struct ClockDriver {
    phase: ClockPhase,
    settle_ns: u32,
    cycles: u64,
}

impl ClockDriver {
    /// Creates a driver that holds for `settle_ns` after every transition.
    #[must_use]
    pub const fn new(settle_ns: u32) -> Self {
        Self {
            phase: ClockPhase::Low,
            settle_ns,
            cycles: 0,
        }
    }

    /// Current clock phase.
    #[must_use]
    pub const fn phase(&self) -> ClockPhase {
        self.phase
    }

    /// Full cycles completed.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Performs one half-cycle transition and returns the new phase.
    ///
    /// # Errors
    ///
    /// Propagates [`Fault::InputExhausted`] from the peripheral.
    pub fn advance<D, T>(
        &mut self,
        dut: &mut D,
        bus: &mut BusPeripheral,
        trace: &mut T,
    ) -> Result<ClockPhase, Fault>
    where
        D: AddressedBusDut + ?Sized,
        T: TraceSink + ?Sized,
    {
        self.phase = match self.phase {
            ClockPhase::Low => {
                dut.set_clock(true);
                let request =
                    BusRequest::new(BusOp::from_code(dut.bus_op()), dut.addr(), dut.val_out());
                dut.hold(self.settle_ns);
                ClockPhase::High(request)
            }
            ClockPhase::High(request) => {
                dut.set_clock(false);
                self.commit(dut, bus, trace, request)?;
                dut.hold(self.settle_ns);
                self.cycles += 1;
                ClockPhase::Low
            }
        };
        Ok(self.phase)
    }

    /// Runs one full cycle from `Low` back to `Low`.
    ///
    /// # Errors
    ///
    /// Propagates [`Fault::InputExhausted`] from the peripheral.
    pub fn cycle<D, T>(
        &mut self,
        dut: &mut D,
        bus: &mut BusPeripheral,
        trace: &mut T,
    ) -> Result<(), Fault>
    where
        D: AddressedBusDut + ?Sized,
        T: TraceSink + ?Sized,
    {
        while self.advance(dut, bus, trace)? != ClockPhase::Low {}
        Ok(())
    }

    fn commit<D, T>(
        &self,
        dut: &mut D,
        bus: &mut BusPeripheral,
        trace: &mut T,
        request: BusRequest,
    ) -> Result<(), Fault>
    where
        D: AddressedBusDut + ?Sized,
        T: TraceSink + ?Sized,
    {
        if request.op == BusOp::None {
            return Ok(());
        }
        let fallback = request.op == BusOp::ReadIo && bus.io().next_read_falls_back();
        let value_in = bus.resolve(request.op, request.addr, request.value)?;
        if request.op.is_read() {
            dut.set_val_in(value_in);
        }
        if fallback {
            trace.on_event(TraceEvent::InputFallback { cycle: self.cycles });
        }
        trace.on_event(TraceEvent::Transaction {
            cycle: self.cycles,
            op: request.op,
            addr: request.addr,
            value_out: request.value,
            value_in,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ClockDriver, ClockPhase};
    use crate::{
        AddressedBusDut, BusOp, BusPeripheral, BusRequest, ClockedDut, DataStore, Fault,
        InputExhaustion, IoChannel, NullTrace, ProgramStore, TraceEvent,
    };

    /// Replays a fixed request per cycle and records what it observes.
    #[derive(Default)]
    struct ScriptedDut {
        script: Vec<BusRequest>,
        position: usize,
        clock: bool,
        last_clock: bool,
        val_in: u8,
        seen_at_edge: Vec<u8>,
    }

    impl ScriptedDut {
        fn current(&self) -> BusRequest {
            self.script
                .get(self.position)
                .copied()
                .unwrap_or(BusRequest::IDLE)
        }
    }

    impl ClockedDut for ScriptedDut {
        fn set_clock(&mut self, high: bool) {
            self.clock = high;
        }
        fn set_reset(&mut self, _high: bool) {}
        fn set_enable(&mut self, _high: bool) {}
        fn halted(&self) -> bool {
            self.position >= self.script.len()
        }
        fn hold(&mut self, _settle_ns: u32) {
            if self.clock && !self.last_clock {
                self.seen_at_edge.push(self.val_in);
                self.position += 1;
            }
            self.last_clock = self.clock;
        }
    }

    impl AddressedBusDut for ScriptedDut {
        fn bus_op(&self) -> u8 {
            self.current().op.code()
        }
        fn addr(&self) -> u16 {
            self.current().addr
        }
        fn val_out(&self) -> u8 {
            self.current().value
        }
        fn set_val_in(&mut self, value: u8) {
            self.val_in = value;
        }
    }

    fn bus(program: &[u8], input: &[u8]) -> BusPeripheral {
        BusPeripheral::new(
            ProgramStore::new(program).expect("program fits"),
            DataStore::default(),
            IoChannel::new(input, InputExhaustion::Fail),
        )
    }

    #[test]
    fn rising_edge_snapshots_request_before_dut_advances() {
        let mut dut = ScriptedDut {
            script: vec![
                BusRequest::new(BusOp::ReadProgram, 1, 0),
                BusRequest::new(BusOp::WriteIo, 0, b'z'),
            ],
            ..ScriptedDut::default()
        };
        let mut driver = ClockDriver::new(10);
        let mut peripheral = bus(b"ab", b"");

        let phase = driver
            .advance(&mut dut, &mut peripheral, &mut NullTrace)
            .expect("rising edge");
        assert_eq!(
            phase,
            ClockPhase::High(BusRequest::new(BusOp::ReadProgram, 1, 0))
        );
        assert_eq!(dut.position, 1);
        assert_eq!(driver.cycles(), 0);

        driver
            .advance(&mut dut, &mut peripheral, &mut NullTrace)
            .expect("falling edge");
        assert_eq!(driver.phase(), ClockPhase::Low);
        assert_eq!(dut.val_in, b'b');
        assert_eq!(driver.cycles(), 1);
    }

    #[test]
    fn read_result_is_visible_at_following_rising_edge() {
        let mut dut = ScriptedDut {
            script: vec![
                BusRequest::new(BusOp::ReadData, 0, 0),
                BusRequest::IDLE,
                BusRequest::IDLE,
            ],
            ..ScriptedDut::default()
        };
        let mut peripheral = bus(b"", b"");
        peripheral
            .resolve(BusOp::WriteData, 0, 0x5A)
            .expect("seed cell");
        let mut driver = ClockDriver::new(10);

        for _ in 0..3 {
            driver
                .cycle(&mut dut, &mut peripheral, &mut NullTrace)
                .expect("cycle");
        }
        assert_eq!(dut.seen_at_edge, vec![0, 0x5A, 0x5A]);
    }

    #[test]
    fn writes_leave_val_in_untouched() {
        let mut dut = ScriptedDut {
            script: vec![BusRequest::new(BusOp::WriteData, 7, 0x11)],
            val_in: 0xEE,
            ..ScriptedDut::default()
        };
        let mut peripheral = bus(b"", b"");
        let mut trace = Vec::new();
        let mut driver = ClockDriver::new(10);

        driver
            .cycle(&mut dut, &mut peripheral, &mut trace)
            .expect("cycle");

        assert_eq!(dut.val_in, 0xEE);
        assert_eq!(peripheral.data().read(7), 0x11);
        assert_eq!(
            trace,
            vec![TraceEvent::Transaction {
                cycle: 0,
                op: BusOp::WriteData,
                addr: 7,
                value_out: 0x11,
                value_in: 0,
            }]
        );
    }

    #[test]
    fn exhausted_input_aborts_the_cycle() {
        let mut dut = ScriptedDut {
            script: vec![BusRequest::new(BusOp::ReadIo, 0, 0)],
            ..ScriptedDut::default()
        };
        let mut peripheral = bus(b"", b"");
        let mut driver = ClockDriver::new(10);

        assert_eq!(
            driver.cycle(&mut dut, &mut peripheral, &mut NullTrace),
            Err(Fault::InputExhausted { consumed: 0 })
        );
    }
}
