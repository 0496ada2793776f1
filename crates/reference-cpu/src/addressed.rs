//! Reference device with a single multiplexed address/data bus.

use harness_core::{AddressedBusDut, ClockedDut};

use crate::BfCore;

/// Pin-level model of a CPU that keeps every memory outside the chip.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default)]
pub struct AddressedBusCpu {
    core: BfCore,
    clock: bool,
    last_clock: bool,
    reset: bool,
    enable: bool,
    val_in: u8,
    edges: u64,
}

impl AddressedBusCpu {
    /// Creates a device at power-on; the harness resets it before running.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequencer state.
    #[must_use]
    pub const fn core(&self) -> &BfCore {
        &self.core
    }

    /// Rising edges evaluated while enabled.
    #[must_use]
    pub const fn edges(&self) -> u64 {
        self.edges
    }
}

impl ClockedDut for AddressedBusCpu {
    fn set_clock(&mut self, high: bool) {
        self.clock = high;
    }

    fn set_reset(&mut self, high: bool) {
        self.reset = high;
    }

    fn set_enable(&mut self, high: bool) {
        self.enable = high;
    }

    fn halted(&self) -> bool {
        self.core.halted()
    }

    fn hold(&mut self, _settle_ns: u32) {
        if self.reset {
            self.core.reset();
            self.edges = 0;
        } else if self.clock && !self.last_clock && self.enable {
            self.core.clock(self.val_in);
            self.edges += 1;
        }
        self.last_clock = self.clock;
    }
}

impl AddressedBusDut for AddressedBusCpu {
    fn bus_op(&self) -> u8 {
        self.core.request().op.code()
    }

    fn addr(&self) -> u16 {
        self.core.request().addr
    }

    fn val_out(&self) -> u8 {
        self.core.request().value
    }

    fn set_val_in(&mut self, value: u8) {
        self.val_in = value;
    }
}
