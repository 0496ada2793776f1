//! End-to-end conformance runs: load, reset, step until halt, compare output.

use std::fmt;

use crate::{
    AddressedBusDut, BusPeripheral, ClockDriver, ClockedDut, DataStore, Fault, HarnessConfig,
    InputExhaustion, IoChannel, NullTrace, PollOutcome, ProgramStore, SeparatePinDriver,
    SeparatePinDut, SerialLink, SerialLinkAdapter, TraceEvent, TraceSink, TransactionCounts,
};

/// One conformance case: program, inputs and the exact expected output.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TestCase {
    /// Case name used in reports.
    pub name: String,
    /// Program image, served from address zero.
    pub program: Vec<u8>,
    /// Initial data image, loaded at address zero.
    pub data_image: Vec<u8>,
    /// Input stream.
    pub input: Vec<u8>,
    /// Expected output, compared byte for byte including length.
    pub expected_output: Vec<u8>,
    /// Overrides the configured exhaustion policy when set.
    pub input_exhaustion: Option<InputExhaustion>,
}

impl TestCase {
    /// Creates a case with empty input and no data image.
    #[must_use]
    pub fn new(name: &str, program: impl AsRef<[u8]>, expected_output: impl AsRef<[u8]>) -> Self {
        Self {
            name: name.to_string(),
            program: program.as_ref().to_vec(),
            data_image: Vec::new(),
            input: Vec::new(),
            expected_output: expected_output.as_ref().to_vec(),
            input_exhaustion: None,
        }
    }

    /// Sets the input stream.
    #[must_use]
    pub fn with_input(mut self, input: impl AsRef<[u8]>) -> Self {
        self.input = input.as_ref().to_vec();
        self
    }

    /// Serves `byte` for reads past the end of input.
    #[must_use]
    pub const fn with_fallback(mut self, byte: u8) -> Self {
        self.input_exhaustion = Some(InputExhaustion::ReturnByte(byte));
        self
    }

    /// Sets the initial data image.
    #[must_use]
    pub fn with_data_image(mut self, image: impl AsRef<[u8]>) -> Self {
        self.data_image = image.as_ref().to_vec();
        self
    }
}

/// Outcome of a passing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Cycles (or serial clock steps) executed before `halted`.
    pub cycles: u64,
    /// Output the DUT emitted.
    pub output: Vec<u8>,
    /// Committed transactions per operation.
    pub transactions: TransactionCounts,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cycles, {} output byte(s), {} transaction(s)",
            self.cycles,
            self.output.len(),
            self.transactions.total_effects()
        )
    }
}

/// Orchestrates single-shot runs against any DUT encoding.
#[derive(Debug, Clone, Default)]
pub struct ConformanceHarness {
    config: HarnessConfig,
}

impl ConformanceHarness {
    /// Creates a harness with the given configuration.
    #[must_use]
    pub const fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Runs `case` against a multiplexed-bus DUT.
    ///
    /// # Errors
    ///
    /// Returns the [`Fault`] that ended the run.
    pub fn run_addressed<D>(&self, dut: &mut D, case: &TestCase) -> Result<RunReport, Fault>
    where
        D: AddressedBusDut + ?Sized,
    {
        self.run_addressed_traced(dut, case, &mut NullTrace)
    }

    /// [`Self::run_addressed`] with a trace sink attached.
    ///
    /// # Errors
    ///
    /// Returns the [`Fault`] that ended the run.
    pub fn run_addressed_traced<D, T>(
        &self,
        dut: &mut D,
        case: &TestCase,
        trace: &mut T,
    ) -> Result<RunReport, Fault>
    where
        D: AddressedBusDut + ?Sized,
        T: TraceSink + ?Sized,
    {
        log::debug!("{}: addressed-bus run", case.name);
        let mut bus = self.prepare(case)?;
        dut.set_val_in(0);
        self.reset(dut);

        let mut driver = ClockDriver::new(self.config.settle_ns);
        if dut.halted() {
            return Err(Fault::ZeroCycle);
        }
        while !dut.halted() {
            if driver.cycles() >= self.config.cycle_budget {
                return Err(Fault::Timeout {
                    cycles: driver.cycles(),
                });
            }
            driver.cycle(dut, &mut bus, trace)?;
        }

        let cycles = driver.cycles();
        trace.on_event(TraceEvent::Halted { cycles });
        let (output, transactions) = bus.finish();
        grade(case, cycles, output, transactions)
    }

    /// Runs `case` against a separate-pin DUT, loading the program over its
    /// instruction port first.
    ///
    /// # Errors
    ///
    /// Returns the [`Fault`] that ended the run.
    pub fn run_separate_pin<D>(&self, dut: &mut D, case: &TestCase) -> Result<RunReport, Fault>
    where
        D: SeparatePinDut + ?Sized,
    {
        self.run_separate_pin_traced(dut, case, &mut NullTrace)
    }

    /// [`Self::run_separate_pin`] with a trace sink attached.
    ///
    /// # Errors
    ///
    /// Returns the [`Fault`] that ended the run.
    pub fn run_separate_pin_traced<D, T>(
        &self,
        dut: &mut D,
        case: &TestCase,
        trace: &mut T,
    ) -> Result<RunReport, Fault>
    where
        D: SeparatePinDut + ?Sized,
        T: TraceSink + ?Sized,
    {
        log::debug!("{}: separate-pin run", case.name);
        let program = ProgramStore::new(&case.program)?;
        if !case.data_image.is_empty() {
            log::warn!(
                "{}: separate-pin DUT owns its data memory, ignoring {} byte data image",
                case.name,
                case.data_image.len()
            );
        }
        let policy = self.exhaustion_for(case, InputExhaustion::SEPARATE_PIN);
        let mut io = IoChannel::new(&case.input, policy);
        let mut driver = SeparatePinDriver::new(self.config.settle_ns);

        dut.set_clock(false);
        driver.load_program(dut, &program);
        dut.set_in_val(0);
        self.reset(dut);

        if dut.halted() {
            return Err(Fault::ZeroCycle);
        }
        while !dut.halted() {
            if driver.cycles() >= self.config.cycle_budget {
                return Err(Fault::Timeout {
                    cycles: driver.cycles(),
                });
            }
            driver.cycle(dut, &mut io, trace)?;
        }

        let cycles = driver.cycles();
        trace.on_event(TraceEvent::Halted { cycles });
        grade(case, cycles, io.into_output(), driver.counts())
    }

    /// Runs `case` against a device behind a polled serial link.
    ///
    /// # Errors
    ///
    /// Returns the [`Fault`] that ended the run.
    pub fn run_serial<L>(&self, link: &mut L, case: &TestCase) -> Result<RunReport, Fault>
    where
        L: SerialLink + ?Sized,
    {
        self.run_serial_traced(link, case, &mut NullTrace)
    }

    /// [`Self::run_serial`] with a trace sink attached.
    ///
    /// # Errors
    ///
    /// Returns the [`Fault`] that ended the run.
    pub fn run_serial_traced<L, T>(
        &self,
        link: &mut L,
        case: &TestCase,
        trace: &mut T,
    ) -> Result<RunReport, Fault>
    where
        L: SerialLink + ?Sized,
        T: TraceSink + ?Sized,
    {
        log::debug!("{}: serial-link run", case.name);
        let mut bus = self.prepare(case)?;

        link.set_reset(true)?;
        link.hold(self.config.serial_reset_hold);
        link.set_reset(false)?;

        let mut adapter = SerialLinkAdapter::new();
        adapter.enable(link)?;
        loop {
            if adapter.poll(link, &mut bus, trace)? == PollOutcome::Halted {
                break;
            }
            if adapter.steps() >= self.config.cycle_budget {
                return Err(Fault::Timeout {
                    cycles: adapter.steps(),
                });
            }
        }
        if adapter.steps() == 0 {
            return Err(Fault::ZeroCycle);
        }

        let cycles = adapter.steps();
        trace.on_event(TraceEvent::Halted { cycles });
        let (output, transactions) = bus.finish();
        grade(case, cycles, output, transactions)
    }

    fn exhaustion_for(&self, case: &TestCase, fallback: InputExhaustion) -> InputExhaustion {
        case.input_exhaustion
            .or(self.config.input_exhaustion)
            .unwrap_or(fallback)
    }

    fn prepare(&self, case: &TestCase) -> Result<BusPeripheral, Fault> {
        Ok(BusPeripheral::new(
            ProgramStore::new(&case.program)?,
            DataStore::with_image(&case.data_image)?,
            IoChannel::new(
                &case.input,
                self.exhaustion_for(case, InputExhaustion::ADDRESSED),
            ),
        ))
    }

    fn reset<D>(&self, dut: &mut D)
    where
        D: ClockedDut + ?Sized,
    {
        dut.set_clock(false);
        dut.set_reset(true);
        dut.hold(self.config.reset_window_ns);
        dut.set_reset(false);
        dut.set_enable(true);
        dut.hold(self.config.reset_window_ns);
    }
}

fn grade(
    case: &TestCase,
    cycles: u64,
    output: Vec<u8>,
    transactions: TransactionCounts,
) -> Result<RunReport, Fault> {
    if output != case.expected_output {
        log::debug!("{}: output mismatch after {cycles} cycles", case.name);
        return Err(Fault::OutputMismatch {
            expected: case.expected_output.clone(),
            actual: output,
        });
    }
    log::debug!("{}: passed in {cycles} cycles", case.name);
    Ok(RunReport {
        cycles,
        output,
        transactions,
    })
}
