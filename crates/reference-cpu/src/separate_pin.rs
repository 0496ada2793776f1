//! Reference device that owns its program and data memories.
//!
//! Only IO leaves the chip. Program bytes arrive through the instruction-load
//! port before reset; data memory is cleared on reset.

use harness_core::{new_address_space, BusOp, ClockedDut, SeparatePinDut};

use crate::BfCore;

/// Source of the value the core consumes on the next rising edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    /// Served from on-chip memory.
    Value(u8),
    /// Taken from the `in_val` pin.
    FromPin,
}

/// Pin-level model of a CPU with on-chip memories and an IO-only interface.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone)]
pub struct SeparatePinCpu {
    core: BfCore,
    program: Box<[u8]>,
    data: Box<[u8]>,
    pending: Pending,
    clock: bool,
    last_clock: bool,
    reset: bool,
    enable: bool,
    in_val: u8,
    instr_addr: u16,
    instr_in: u8,
    instr_write: bool,
}

impl Default for SeparatePinCpu {
    fn default() -> Self {
        Self {
            core: BfCore::default(),
            program: new_address_space(),
            data: new_address_space(),
            pending: Pending::Value(0),
            clock: false,
            last_clock: false,
            reset: false,
            enable: false,
            in_val: 0,
            instr_addr: 0,
            instr_in: 0,
            instr_write: false,
        }
    }
}

impl SeparatePinCpu {
    /// Creates a device with empty memories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequencer state.
    #[must_use]
    pub const fn core(&self) -> &BfCore {
        &self.core
    }

    /// Instruction memory as loaded.
    #[must_use]
    pub fn program(&self) -> &[u8] {
        &self.program
    }

    fn rising_edge(&mut self) {
        let value = match self.pending {
            Pending::Value(value) => value,
            Pending::FromPin => self.in_val,
        };
        let request = self.core.request();
        self.core.clock(value);
        let addr = usize::from(request.addr);
        self.pending = match request.op {
            BusOp::ReadProgram => Pending::Value(self.program[addr]),
            BusOp::ReadData => Pending::Value(self.data[addr]),
            BusOp::WriteData => {
                self.data[addr] = request.value;
                Pending::Value(0)
            }
            BusOp::ReadIo => Pending::FromPin,
            BusOp::None | BusOp::WriteIo => Pending::Value(0),
        };
    }
}

impl ClockedDut for SeparatePinCpu {
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
        if self.instr_write {
            self.program[usize::from(self.instr_addr)] = self.instr_in;
        }
        if self.reset {
            self.core.reset();
            self.data.fill(0);
            self.pending = Pending::Value(0);
        } else if self.clock && !self.last_clock && self.enable {
            self.rising_edge();
        }
        self.last_clock = self.clock;
    }
}

impl SeparatePinDut for SeparatePinCpu {
    fn out_enable(&self) -> bool {
        self.core.request().op == BusOp::WriteIo
    }

    fn out_val(&self) -> u8 {
        let request = self.core.request();
        if request.op == BusOp::WriteIo {
            request.value
        } else {
            0
        }
    }

    fn in_reading(&self) -> bool {
        self.core.request().op == BusOp::ReadIo
    }

    fn set_in_val(&mut self, value: u8) {
        self.in_val = value;
    }

    fn set_instr_addr(&mut self, addr: u16) {
        self.instr_addr = addr;
    }

    fn set_instr_in(&mut self, value: u8) {
        self.instr_in = value;
    }

    fn set_instr_write(&mut self, high: bool) {
        self.instr_write = high;
    }
}
