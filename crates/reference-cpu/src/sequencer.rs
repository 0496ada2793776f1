//! Clocked micro-sequencer shared by every reference device.
//!
//! The sequencer never touches memory itself. Each stage presents one
//! [`BusRequest`] combinationally; a stage that follows a read consumes the
//! value returned for that read on its own exit edge, one cycle after the
//! request was made.

use harness_core::{BusOp, BusRequest};

/// Direction of a bracket scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanDirection {
    /// Looking for the `]` matching a skipped `[`.
    Forward,
    /// Looking for the `[` matching a repeating `]`.
    Backward,
}

/// What a loaded cell value is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellUse {
    /// `+`
    Increment,
    /// `-`
    Decrement,
    /// `.`
    Emit,
    /// `[`
    LoopOpen,
    /// `]`
    LoopClose,
}

/// Sequencer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    /// Reading the instruction at `pc`.
    #[default]
    Fetch,
    /// Consuming the fetched instruction.
    Decode,
    /// Reading the cell at `ptr`.
    LoadCell(CellUse),
    /// Consuming the loaded cell.
    Apply(CellUse),
    /// Writing a cell value back.
    Store(u8),
    /// Writing a byte to the output port.
    Emit(u8),
    /// Reading a byte from the input port.
    ReadInput,
    /// Consuming the input byte.
    AcceptInput,
    /// Reading the program byte under a bracket scan.
    Scan {
        /// Scan direction.
        direction: ScanDirection,
        /// Unmatched brackets still open.
        depth: u16,
    },
    /// Consuming the scanned byte.
    ScanDecode {
        /// Scan direction.
        direction: ScanDirection,
        /// Unmatched brackets still open.
        depth: u16,
    },
    /// Stop instruction reached.
    Halted,
}

/// Program counter, cell pointer and the current stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BfCore {
    pc: u16,
    ptr: u16,
    stage: Stage,
}

impl BfCore {
    /// Creates a core at the reset state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns to the reset state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Program counter.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Cell pointer.
    #[must_use]
    pub const fn ptr(&self) -> u16 {
        self.ptr
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// `true` once a zero byte was decoded.
    #[must_use]
    pub const fn halted(&self) -> bool {
        matches!(self.stage, Stage::Halted)
    }

    /// Request presented by the current stage.
    #[must_use]
    pub const fn request(&self) -> BusRequest {
        match self.stage {
            Stage::Fetch | Stage::Scan { .. } => BusRequest::new(BusOp::ReadProgram, self.pc, 0),
            Stage::LoadCell(_) => BusRequest::new(BusOp::ReadData, self.ptr, 0),
            Stage::Store(value) => BusRequest::new(BusOp::WriteData, self.ptr, value),
            Stage::Emit(value) => BusRequest::new(BusOp::WriteIo, self.ptr, value),
            Stage::ReadInput => BusRequest::new(BusOp::ReadIo, self.ptr, 0),
            Stage::Decode
            | Stage::Apply(_)
            | Stage::AcceptInput
            | Stage::ScanDecode { .. }
            | Stage::Halted => BusRequest::IDLE,
        }
    }

    /// Advances one rising edge. `val_in` is the value returned for the
    /// previous cycle's read; stages that did not follow a read ignore it.
    pub fn clock(&mut self, val_in: u8) {
        let was_halted = self.halted();
        self.stage = match self.stage {
            Stage::Fetch => Stage::Decode,
            Stage::Decode => self.decode(val_in),
            Stage::LoadCell(usage) => Stage::Apply(usage),
            Stage::Apply(usage) => self.apply(usage, val_in),
            Stage::Store(_) | Stage::Emit(_) => self.next_instruction(),
            Stage::ReadInput => Stage::AcceptInput,
            Stage::AcceptInput => Stage::Store(val_in),
            Stage::Scan { direction, depth } => Stage::ScanDecode { direction, depth },
            Stage::ScanDecode { direction, depth } => self.scan(direction, depth, val_in),
            Stage::Halted => Stage::Halted,
        };
        if self.halted() && !was_halted {
            log::debug!("core halted at pc={:#06x}", self.pc);
        }
    }

    const fn next_instruction(&mut self) -> Stage {
        self.pc = self.pc.wrapping_add(1);
        Stage::Fetch
    }

    const fn decode(&mut self, instruction: u8) -> Stage {
        match instruction {
            0 => Stage::Halted,
            b'>' => {
                self.ptr = self.ptr.wrapping_add(1);
                self.next_instruction()
            }
            b'<' => {
                self.ptr = self.ptr.wrapping_sub(1);
                self.next_instruction()
            }
            b'+' => Stage::LoadCell(CellUse::Increment),
            b'-' => Stage::LoadCell(CellUse::Decrement),
            b'.' => Stage::LoadCell(CellUse::Emit),
            b'[' => Stage::LoadCell(CellUse::LoopOpen),
            b']' => Stage::LoadCell(CellUse::LoopClose),
            b',' => Stage::ReadInput,
            _ => self.next_instruction(),
        }
    }

    const fn apply(&mut self, usage: CellUse, cell: u8) -> Stage {
        match usage {
            CellUse::Increment => Stage::Store(cell.wrapping_add(1)),
            CellUse::Decrement => Stage::Store(cell.wrapping_sub(1)),
            CellUse::Emit => Stage::Emit(cell),
            CellUse::LoopOpen if cell == 0 => {
                self.pc = self.pc.wrapping_add(1);
                Stage::Scan {
                    direction: ScanDirection::Forward,
                    depth: 1,
                }
            }
            CellUse::LoopClose if cell != 0 => {
                self.pc = self.pc.wrapping_sub(1);
                Stage::Scan {
                    direction: ScanDirection::Backward,
                    depth: 1,
                }
            }
            CellUse::LoopOpen | CellUse::LoopClose => self.next_instruction(),
        }
    }

    const fn scan(&mut self, direction: ScanDirection, depth: u16, byte: u8) -> Stage {
        let depth = match (direction, byte) {
            // Unmatched bracket ran off the program.
            (_, 0) => return Stage::Halted,
            (ScanDirection::Forward, b'[') | (ScanDirection::Backward, b']') => {
                match depth.checked_add(1) {
                    Some(next) => next,
                    // Nesting deeper than the counter can track.
                    None => return Stage::Halted,
                }
            }
            (ScanDirection::Forward, b']') | (ScanDirection::Backward, b'[') => depth - 1,
            _ => depth,
        };
        if depth == 0 {
            return self.next_instruction();
        }
        self.pc = match direction {
            ScanDirection::Forward => self.pc.wrapping_add(1),
            ScanDirection::Backward => self.pc.wrapping_sub(1),
        };
        Stage::Scan { direction, depth }
    }
}
