//! Built-in conformance programs run end to end against every reference
//! device encoding.

#![allow(
    clippy::pedantic,
    clippy::nursery,
    clippy::cast_possible_truncation,
    clippy::too_many_lines
)]

mod common;

use common::{init_logging, run, Encoding};
use harness_core::{
    builtin_cases, run_suite, BusOp, ConformanceHarness, Fault, HarnessConfig, InputExhaustion,
    SuiteCase, TestCase, TraceEvent,
};
use proptest::prelude::*;
use reference_cpu::{AddressedBusCpu, SerialChip};
use rstest::rstest;

fn builtin(name: &str) -> TestCase {
    builtin_cases()
        .into_iter()
        .find(|entry| entry.case.name == name)
        .map(|entry| entry.case)
        .expect("builtin case exists")
}

#[rstest]
fn builtin_program_passes(
    #[values(
        "hello_world",
        "cristofani_word_count",
        "cristofani_h",
        "cristofani_rot13",
        "cristofani_lb"
    )]
    name: &str,
    #[values(Encoding::Addressed, Encoding::SeparatePin, Encoding::Serial)] encoding: Encoding,
) {
    init_logging();
    let case = builtin(name);

    let report = run(encoding, encoding.config(), &case)
        .unwrap_or_else(|fault| panic!("{name} on {encoding:?}: {fault}"));

    assert_eq!(report.output, case.expected_output);
    assert!(report.cycles > 0);
}

#[rstest]
#[case(Encoding::Addressed)]
#[case(Encoding::SeparatePin)]
#[case(Encoding::Serial)]
fn suite_summary_per_encoding(#[case] encoding: Encoding) {
    init_logging();
    let result = run_suite(&builtin_cases(), |case| {
        run(encoding, encoding.config(), case)
    });

    let summary = result.summary();
    assert!(result.all_ok(), "{:?}", result.cases);
    assert_eq!(summary.passed, 5);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.total(), 6);
}

#[test]
#[ignore = "takes millions of cycles"]
fn bosman_quine_reproduces_itself() {
    init_logging();
    let case = builtin("bosman_quine");
    let report = run(Encoding::Addressed, HarnessConfig::default(), &case).expect("quine passes");
    assert_eq!(report.output, case.program);
}

#[rstest]
#[case(Encoding::Addressed)]
#[case(Encoding::SeparatePin)]
#[case(Encoding::Serial)]
fn endless_loop_times_out_at_budget(#[case] encoding: Encoding) {
    init_logging();
    let case = TestCase::new("spin", "+[]", "");
    let config = encoding.config().with_cycle_budget(10_000);

    assert_eq!(
        run(encoding, config, &case),
        Err(Fault::Timeout { cycles: 10_000 })
    );
}

#[rstest]
#[case(Encoding::Addressed)]
#[case(Encoding::Serial)]
fn default_config_faults_on_empty_input(#[case] encoding: Encoding) {
    init_logging();
    let case = TestCase::new("read", ",.", "");

    assert_eq!(
        run(encoding, HarnessConfig::default(), &case),
        Err(Fault::InputExhausted { consumed: 0 })
    );
}

#[test]
fn default_config_zero_fills_separate_pin_input() {
    init_logging();
    let case = TestCase::new("read", ",+.", "\x01");

    let report = run(Encoding::SeparatePin, HarnessConfig::default(), &case)
        .expect("zero-filled read");
    assert_eq!(report.output, b"\x01");
}

#[rstest]
#[case(Encoding::Addressed)]
#[case(Encoding::SeparatePin)]
#[case(Encoding::Serial)]
fn explicit_fail_policy_faults_on_every_encoding(#[case] encoding: Encoding) {
    init_logging();
    let config = HarnessConfig {
        input_exhaustion: Some(InputExhaustion::Fail),
        ..HarnessConfig::default()
    };

    assert_eq!(
        run(encoding, config, &TestCase::new("read", ",.", "")),
        Err(Fault::InputExhausted { consumed: 0 })
    );
}

#[test]
fn separate_pin_preset_zero_fills_input() {
    init_logging();
    let case = TestCase::new("read", ",+.", "\x01");

    let report = run(Encoding::SeparatePin, HarnessConfig::separate_pin(), &case)
        .expect("zero-filled read");
    assert_eq!(report.transactions.get(BusOp::ReadIo), 1);
    assert_eq!(report.transactions.get(BusOp::WriteIo), 1);
}

#[test]
fn wrong_expectation_reports_actual_output() {
    init_logging();
    let case = TestCase::new("hello", builtin("hello_world").program, "Hello World?\n");

    assert_eq!(
        run(Encoding::Addressed, HarnessConfig::default(), &case),
        Err(Fault::OutputMismatch {
            expected: b"Hello World?\n".to_vec(),
            actual: b"Hello World!\n".to_vec(),
        })
    );
}

#[rstest]
#[case(2)]
#[case(5)]
fn slow_serial_device_still_passes(#[case] divider: u32) {
    init_logging();
    let case = builtin("hello_world");
    let harness = ConformanceHarness::new(HarnessConfig::default());

    let fast = harness
        .run_serial(&mut SerialChip::new(), &case)
        .expect("divider 1 passes");
    let slow = harness
        .run_serial(&mut SerialChip::with_divider(divider), &case)
        .expect("slow device passes");

    assert_eq!(slow.output, fast.output);
    assert_eq!(slow.transactions, fast.transactions);
    assert!(slow.cycles > fast.cycles);
}

#[test]
fn trace_records_every_output_byte_in_order() {
    init_logging();
    let case = builtin("hello_world");
    let mut trace = Vec::new();

    let report = ConformanceHarness::new(HarnessConfig::default())
        .run_addressed_traced(&mut AddressedBusCpu::new(), &case, &mut trace)
        .expect("hello world passes");

    let written: Vec<u8> = trace
        .iter()
        .filter_map(|event| match event {
            TraceEvent::Transaction {
                op: BusOp::WriteIo,
                value_out,
                ..
            } => Some(*value_out),
            _ => None,
        })
        .collect();
    assert_eq!(written, report.output);
    assert_eq!(
        trace.last(),
        Some(&TraceEvent::Halted {
            cycles: report.cycles
        })
    );
}

#[test]
fn skipped_cases_are_never_run() {
    let cases = [SuiteCase::skipped(TestCase::new("spin", "+[]", ""))];
    let result = run_suite(&cases, |case| {
        run(Encoding::Addressed, HarnessConfig::default(), case)
    });
    assert_eq!(result.summary().skipped, 1);
    assert!(result.all_ok());
}

fn program_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"+-<>.[]x".to_vec()), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn runs_are_deterministic(program in program_strategy()) {
        let case = TestCase::new("random", &program, "");
        let config = HarnessConfig::default().with_cycle_budget(5_000);

        let first = run(Encoding::Addressed, config.clone(), &case);
        let second = run(Encoding::Addressed, config, &case);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn addressed_and_separate_pin_devices_agree(program in program_strategy()) {
        let case = TestCase::new("random", &program, "");
        let config = HarnessConfig::default().with_cycle_budget(5_000);

        let addressed = run(Encoding::Addressed, config.clone(), &case);
        let separate = run(Encoding::SeparatePin, config, &case);
        match (addressed, separate) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.output, b.output);
                prop_assert_eq!(a.cycles, b.cycles);
            }
            (a, b) => prop_assert_eq!(a.err(), b.err()),
        }
    }
}
