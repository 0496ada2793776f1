//! Pin-level contracts the DUT exposes and host-facing run configuration.

use std::time::Duration;

use thiserror::Error;

use crate::{BusOp, InputExhaustion};

/// Default cycle budget per run.
pub const DEFAULT_CYCLE_BUDGET: u64 = 10_000_000;

/// Default settle interval between clock transitions, in nanoseconds.
pub const DEFAULT_SETTLE_NS: u32 = 10;

/// Default time reset is held asserted, in nanoseconds.
pub const DEFAULT_RESET_WINDOW_NS: u32 = 10;

/// Default wall-clock reset hold for the serial transport.
pub const DEFAULT_SERIAL_RESET_HOLD: Duration = Duration::from_millis(5);

/// Control pins shared by every clocked DUT variant.
///
/// Setters only change the level seen at the pin; the DUT evaluates edges and
/// propagates combinational outputs inside [`ClockedDut::hold`].
pub trait ClockedDut {
    /// Drives the clock line.
    fn set_clock(&mut self, high: bool);
    /// Drives the active-high reset line.
    fn set_reset(&mut self, high: bool);
    /// Drives the run-enable line.
    fn set_enable(&mut self, high: bool);
    /// Samples the `halted` output.
    fn halted(&self) -> bool;
    /// Lets `settle_ns` of simulated time elapse.
    fn hold(&mut self, settle_ns: u32);
}

/// DUT with a single multiplexed address/data bus.
pub trait AddressedBusDut: ClockedDut {
    /// Raw 3-bit operation code currently requested.
    fn bus_op(&self) -> u8;
    /// Current target address.
    fn addr(&self) -> u16;
    /// Value being written.
    fn val_out(&self) -> u8;
    /// Drives the value returned for a pending read.
    fn set_val_in(&mut self, value: u8);
}

/// DUT that owns its memories and only needs IO service.
pub trait SeparatePinDut: ClockedDut {
    /// `true` when `out_val` carries a byte to emit this cycle.
    fn out_enable(&self) -> bool;
    /// Byte being emitted.
    fn out_val(&self) -> u8;
    /// `true` when the environment must advance the input stream.
    fn in_reading(&self) -> bool;
    /// Drives the next input byte.
    fn set_in_val(&mut self, value: u8);
    /// Drives the instruction-load address.
    fn set_instr_addr(&mut self, addr: u16);
    /// Drives the instruction-load data byte.
    fn set_instr_in(&mut self, value: u8);
    /// Drives the instruction-load write strobe.
    fn set_instr_write(&mut self, high: bool);
}

/// Transport failure on the serial link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum LinkError {
    /// The device stopped answering.
    #[error("serial link disconnected")]
    Disconnected,
    /// The transport reported an I/O error.
    #[error("serial link i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LinkError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Point-to-point register link to a physical DUT.
///
/// Inputs are packed as `enable[9] | op_done[8] | bus_in[7:0]`; outputs as
/// `halted[11] | state[10:8] | bus_out[7:0]`.
pub trait SerialLink {
    /// Drives the reset line.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkError`] when the transport fails.
    fn set_reset(&mut self, high: bool) -> Result<(), LinkError>;

    /// Writes the packed input register.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkError`] when the transport fails.
    fn set_all_inputs(&mut self, word: u16) -> Result<(), LinkError>;

    /// Reads the packed output register.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkError`] when the transport fails.
    fn get_all_outputs(&mut self) -> Result<u16, LinkError>;

    /// Pulses the external clock line once.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkError`] when the transport fails.
    fn step_clock(&mut self) -> Result<(), LinkError>;

    /// Waits `duration` of wall-clock time.
    fn hold(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Immutable configuration for one harness instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct HarnessConfig {
    /// Cycles (or serial clock steps) allowed before a run times out.
    pub cycle_budget: u64,
    /// Simulated settle interval after each clock transition.
    pub settle_ns: u32,
    /// Simulated time reset is held asserted.
    pub reset_window_ns: u32,
    /// Wall-clock reset hold for the serial transport.
    pub serial_reset_hold: Duration,
    /// Policy for reads on exhausted input; cases may override it. `None`
    /// uses the encoding's own behavior: addressed and serial runs fail,
    /// separate-pin runs zero-fill.
    pub input_exhaustion: Option<InputExhaustion>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            cycle_budget: DEFAULT_CYCLE_BUDGET,
            settle_ns: DEFAULT_SETTLE_NS,
            reset_window_ns: DEFAULT_RESET_WINDOW_NS,
            serial_reset_hold: DEFAULT_SERIAL_RESET_HOLD,
            input_exhaustion: None,
        }
    }
}

impl HarnessConfig {
    /// Preset pinning the separate-pin zero-fill policy for every encoding.
    #[must_use]
    pub fn separate_pin() -> Self {
        Self {
            input_exhaustion: Some(InputExhaustion::SEPARATE_PIN),
            ..Self::default()
        }
    }

    /// Returns a copy with a different cycle budget.
    #[must_use]
    pub const fn with_cycle_budget(mut self, cycle_budget: u64) -> Self {
        self.cycle_budget = cycle_budget;
        self
    }
}

/// Trace events emitted in commit order when a sink is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// One transaction was resolved.
    Transaction {
        /// Cycle (or serial clock step) in which the transaction committed.
        cycle: u64,
        /// Resolved operation.
        op: BusOp,
        /// Target address.
        addr: u16,
        /// Outgoing value sampled from the DUT.
        value_out: u8,
        /// Value handed back to the DUT.
        value_in: u8,
    },
    /// Exhausted input was served from the fallback byte.
    InputFallback {
        /// Cycle in which the fallback was used.
        cycle: u64,
    },
    /// `halted` was observed.
    Halted {
        /// Cycles executed before the halt.
        cycles: u64,
    },
}

/// Sink trait for harness trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn on_event(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::{
        HarnessConfig, LinkError, NullTrace, TraceEvent, TraceSink, DEFAULT_CYCLE_BUDGET,
        DEFAULT_RESET_WINDOW_NS, DEFAULT_SETTLE_NS,
    };
    use crate::InputExhaustion;

    #[test]
    fn default_config_defers_exhaustion_to_the_encoding() {
        let config = HarnessConfig::default();
        assert_eq!(config.cycle_budget, DEFAULT_CYCLE_BUDGET);
        assert_eq!(config.settle_ns, DEFAULT_SETTLE_NS);
        assert_eq!(config.reset_window_ns, DEFAULT_RESET_WINDOW_NS);
        assert_eq!(config.input_exhaustion, None);
    }

    #[test]
    fn separate_pin_preset_zero_fills() {
        let config = HarnessConfig::separate_pin().with_cycle_budget(12);
        assert_eq!(config.input_exhaustion, Some(InputExhaustion::ReturnByte(0)));
        assert_eq!(config.cycle_budget, 12);
    }

    #[test]
    fn io_errors_convert_into_link_errors() {
        let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "no reply");
        assert_eq!(LinkError::from(err), LinkError::Io("no reply".to_string()));
    }

    #[test]
    fn vec_sink_records_in_order() {
        let mut sink = Vec::new();
        sink.on_event(TraceEvent::InputFallback { cycle: 1 });
        sink.on_event(TraceEvent::Halted { cycles: 2 });
        assert_eq!(
            sink,
            vec![
                TraceEvent::InputFallback { cycle: 1 },
                TraceEvent::Halted { cycles: 2 }
            ]
        );
        NullTrace.on_event(TraceEvent::Halted { cycles: 0 });
    }
}
