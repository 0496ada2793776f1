//! Shared helpers for the reference device integration tests.

use std::sync::Once;

use harness_core::{ConformanceHarness, Fault, HarnessConfig, RunReport, TestCase};
use reference_cpu::{AddressedBusCpu, SeparatePinCpu, SerialChip};

/// Bus encoding under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Addressed,
    SeparatePin,
    Serial,
}

impl Encoding {
    /// Configuration each encoding is normally driven with.
    pub fn config(self) -> HarnessConfig {
        match self {
            Self::SeparatePin => HarnessConfig::separate_pin(),
            Self::Addressed | Self::Serial => HarnessConfig::default(),
        }
    }
}

/// Runs `case` on a fresh reference device for `encoding`.
pub fn run(encoding: Encoding, config: HarnessConfig, case: &TestCase) -> Result<RunReport, Fault> {
    let harness = ConformanceHarness::new(config);
    match encoding {
        Encoding::Addressed => harness.run_addressed(&mut AddressedBusCpu::new(), case),
        Encoding::SeparatePin => harness.run_separate_pin(&mut SeparatePinCpu::new(), case),
        Encoding::Serial => harness.run_serial(&mut SerialChip::new(), case),
    }
}

/// Installs a stderr logger when `BF_DEBUG` is set.
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if std::env::var_os("BF_DEBUG").is_none() {
            return;
        }
        let installed = fern::Dispatch::new()
            .level(log::LevelFilter::Trace)
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{target}:{level}] {message}",
                    target = record.target(),
                    level = record.level(),
                ));
            })
            .chain(std::io::stderr())
            .apply();
        if installed.is_err() {
            eprintln!("logger already installed");
        }
    });
}
