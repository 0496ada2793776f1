//! Bus peripheral resolving one transaction against the stores it owns.

use crate::{BusOp, DataStore, Fault, IoChannel, ProgramStore};

/// Committed transaction counts per bus operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransactionCounts {
    counts: [u64; 6],
}

impl TransactionCounts {
    /// Counts with every entry at zero.
    pub const ZERO: Self = Self { counts: [0; 6] };

    /// Number of committed transactions for `op`.
    #[must_use]
    pub const fn get(&self, op: BusOp) -> u64 {
        self.counts[op.index()]
    }

    /// Total committed transactions excluding no-ops.
    #[must_use]
    pub fn total_effects(&self) -> u64 {
        BusOp::ACTIVE.iter().map(|op| self.get(*op)).sum()
    }

    pub(crate) const fn record(&mut self, op: BusOp) {
        self.counts[op.index()] += 1;
    }
}

/// Environment side of the bus: program, data and IO stores for one run.
#[derive(Debug, Clone)]
pub struct BusPeripheral {
    program: ProgramStore,
    data: DataStore,
    io: IoChannel,
    counts: TransactionCounts,
}

impl BusPeripheral {
    /// Assembles a peripheral from freshly loaded stores.
    #[must_use]
    pub fn new(program: ProgramStore, data: DataStore, io: IoChannel) -> Self {
        Self {
            program,
            data,
            io,
            counts: TransactionCounts::default(),
        }
    }

    /// Performs the single effect `op` names and returns the value the DUT
    /// should observe. Writes and no-ops return `0`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InputExhausted`] when `ReadIo` finds no input and no
    /// fallback byte is configured.
    pub fn resolve(&mut self, op: BusOp, addr: u16, value_out: u8) -> Result<u8, Fault> {
        let value_in = match op {
            BusOp::None => 0,
            BusOp::ReadProgram => self.program.read(addr),
            BusOp::ReadData => self.data.read(addr),
            BusOp::WriteData => {
                self.data.write(addr, value_out);
                0
            }
            BusOp::ReadIo => self.io.read()?,
            BusOp::WriteIo => {
                self.io.write(value_out);
                0
            }
        };
        self.counts.record(op);
        log::trace!("{op:?} addr={addr:#06x} out={value_out:#04x} in={value_in:#04x}");
        Ok(value_in)
    }

    /// Program store.
    #[must_use]
    pub const fn program(&self) -> &ProgramStore {
        &self.program
    }

    /// Data store.
    #[must_use]
    pub const fn data(&self) -> &DataStore {
        &self.data
    }

    /// IO channel.
    #[must_use]
    pub const fn io(&self) -> &IoChannel {
        &self.io
    }

    /// Transactions committed so far.
    #[must_use]
    pub const fn counts(&self) -> TransactionCounts {
        self.counts
    }

    /// Consumes the peripheral, returning collected output and counts.
    #[must_use]
    pub fn finish(self) -> (Vec<u8>, TransactionCounts) {
        (self.io.into_output(), self.counts)
    }
}
