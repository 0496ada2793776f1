//! Reference device behind a polled serial register link.
//!
//! Every non-idle core request is spelled out over four phases: opcode,
//! address high byte, address low byte, then read/write. The chip waits in the
//! read/write phase until the host raises `op_done`, latches `bus_in`, and
//! only then lets the core take its edge.

use std::time::Duration;

use harness_core::{BusOp, InputWord, LinkError, OutputWord, Phase, SerialLink};

use crate::BfCore;

/// Register-level model of the CPU as seen through the serial transport.
#[derive(Debug, Clone)]
pub struct SerialChip {
    core: BfCore,
    phase: Phase,
    latched: u8,
    inputs: InputWord,
    reset: bool,
    divider: u32,
    prescale: u32,
    ticks: u64,
}

impl Default for SerialChip {
    fn default() -> Self {
        Self::with_divider(1)
    }
}

impl SerialChip {
    /// Creates a chip whose internal logic advances on every external step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chip that advances once per `divider` external steps, so the
    /// host observes each phase several times. A divider of zero is treated
    /// as one.
    #[must_use]
    pub fn with_divider(divider: u32) -> Self {
        Self {
            core: BfCore::new(),
            phase: Phase::Idle,
            latched: 0,
            inputs: InputWord::default(),
            reset: false,
            divider: divider.max(1),
            prescale: 0,
            ticks: 0,
        }
    }

    /// Sequencer state.
    #[must_use]
    pub const fn core(&self) -> &BfCore {
        &self.core
    }

    /// Internal clock ticks taken since reset.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    fn tick(&mut self) {
        let request = self.core.request();
        self.phase = match self.phase {
            Phase::Idle if request.op == BusOp::None => {
                self.core.clock(self.latched);
                Phase::Idle
            }
            Phase::Idle => Phase::Opcode,
            Phase::Opcode => Phase::AddressHigh,
            Phase::AddressHigh => Phase::AddressLow,
            Phase::AddressLow => Phase::Execute,
            Phase::Execute if self.inputs.op_done => {
                if request.op.is_read() {
                    self.latched = self.inputs.bus_in;
                }
                self.core.clock(self.latched);
                Phase::Idle
            }
            Phase::Execute => Phase::Execute,
        };
        self.ticks += 1;
    }

    fn outputs(&self) -> OutputWord {
        let request = self.core.request();
        let bus_out = match self.phase {
            Phase::Idle => 0,
            Phase::Opcode => request.op.code(),
            Phase::AddressHigh => request.addr.to_be_bytes()[0],
            Phase::AddressLow => request.addr.to_be_bytes()[1],
            Phase::Execute => request.value,
        };
        OutputWord {
            bus_out,
            state: self.phase.state_code(),
            halted: self.core.halted(),
        }
    }
}

impl SerialLink for SerialChip {
    fn set_reset(&mut self, high: bool) -> Result<(), LinkError> {
        self.reset = high;
        if high {
            self.core.reset();
            self.phase = Phase::Idle;
            self.latched = 0;
            self.prescale = 0;
            self.ticks = 0;
        }
        Ok(())
    }

    fn set_all_inputs(&mut self, word: u16) -> Result<(), LinkError> {
        self.inputs = InputWord::from_bits(word);
        Ok(())
    }

    fn get_all_outputs(&mut self) -> Result<u16, LinkError> {
        Ok(self.outputs().to_bits())
    }

    fn step_clock(&mut self) -> Result<(), LinkError> {
        if self.reset || !self.inputs.enable || self.core.halted() {
            return Ok(());
        }
        self.prescale += 1;
        if self.prescale >= self.divider {
            self.prescale = 0;
            self.tick();
        }
        Ok(())
    }

    fn hold(&mut self, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
    use harness_core::{BusOp, InputWord, OutputWord, Phase, SerialLink};

    use super::SerialChip;

    fn observe(chip: &mut SerialChip) -> OutputWord {
        OutputWord::from_bits(chip.get_all_outputs().expect("read outputs"))
    }

    fn enable(chip: &mut SerialChip, op_done: bool, bus_in: u8) {
        let word = InputWord {
            enable: true,
            op_done,
            bus_in,
        };
        chip.set_all_inputs(word.to_bits()).expect("write inputs");
    }

    #[test]
    fn fetch_is_spelled_out_over_four_phases() {
        let mut chip = SerialChip::new();
        chip.set_reset(true).expect("reset");
        chip.set_reset(false).expect("release");
        enable(&mut chip, false, 0);

        assert_eq!(observe(&mut chip).state, Phase::Idle.state_code());
        chip.step_clock().expect("step");
        let opcode = observe(&mut chip);
        assert_eq!(opcode.state, Phase::Opcode.state_code());
        assert_eq!(opcode.bus_out, BusOp::ReadProgram.code());

        for phase in [Phase::AddressHigh, Phase::AddressLow, Phase::Execute] {
            chip.step_clock().expect("step");
            assert_eq!(observe(&mut chip).state, phase.state_code());
        }
    }

    #[test]
    fn execute_waits_for_op_done() {
        let mut chip = SerialChip::new();
        enable(&mut chip, false, 0);
        for _ in 0..4 {
            chip.step_clock().expect("step");
        }
        for _ in 0..3 {
            chip.step_clock().expect("step");
            assert_eq!(observe(&mut chip).state, Phase::Execute.state_code());
        }

        enable(&mut chip, true, 0);
        chip.step_clock().expect("step");
        let word = observe(&mut chip);
        assert_eq!(word.state, Phase::Idle.state_code());
        assert!(!word.halted);

        // The fetched zero is decoded on the following idle tick.
        chip.step_clock().expect("step");
        assert!(observe(&mut chip).halted);
    }

    #[test]
    fn divider_repeats_each_phase() {
        let mut chip = SerialChip::with_divider(3);
        enable(&mut chip, false, 0);
        let mut states = Vec::new();
        for _ in 0..6 {
            chip.step_clock().expect("step");
            states.push(observe(&mut chip).state);
        }
        assert_eq!(states, vec![0, 0, 1, 1, 1, 2]);
    }

    #[test]
    fn disabled_chip_ignores_steps() {
        let mut chip = SerialChip::new();
        chip.step_clock().expect("step");
        assert_eq!(chip.ticks(), 0);
    }
}
