//! Built-in conformance programs and a suite runner.
//!
//! The programs are classic Brainfuck test programs; several come from
//! Daniel B Cristofani's collection and probe edge cases such as empty
//! loops, stray non-instruction bytes and end-of-input handling.

use std::fmt;

use crate::{Fault, RunReport, TestCase};

/// Prints `Hello World!\n`.
pub const HELLO_WORLD: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

/// Counts lines, words and bytes of its input (expects EOF to read as 0).
pub const CRISTOFANI_WORD_COUNT: &str = r#"
>>>+>>>>>+>>+>>+[<<],[
    -[-[-[-[-[-[-[-[<+>-[>+<-[>-<-[-[-[<++[<++++++>-]<
        [>>[-<]<[>]<-]>>[<+>-[<->[-]]]]]]]]]]]]]]]]
    <[-<<[-]+>]<<[>>>>>>+<<<<<<-]>[>]>>>>>>>+>[
        <+[
            >+++++++++<-[>-<-]++>[<+++++++>-[<->-]+[+>>>>>>]]
            <[>+<-]>[>>>>>++>[-]]+<
        ]>[-<<<<<<]>>>>
    ],
]+<++>>>[[+++++>>>>>>]<+>+[[<++++++++>-]<.<<<<<]>>>>>>>>]
[Counts lines, words, bytes. Assumes no-change-on-EOF or EOF->0.
Daniel B Cristofani (cristofdathevanetdotcom)
http://www.hevanet.com/cristofd/brainfuck/]"#;

/// Probes empty loops, stray characters and bracket matching; prints `H\n`.
pub const CRISTOFANI_H: &str = r#"[]++++++++++[>>+>+>++++++[<<+<+++>>>-]<<<<-]
"A*$";?@![#>>+<<]>[>>]<<<<[>++<[-]]>.>."#;

/// ROT13 filter over its input (expects EOF to read as 0).
pub const CRISTOFANI_ROT13: &str = r#",
[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-
[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-
[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-
[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-
[>++++++++++++++<-
[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-
[>>+++++[<----->-]<<-
[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-
[>++++++++++++++<-
[>+<-[>+<-[>+<-[>+<-[>+<-
[>++++++++++++++<-
[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-
[>>+++++[<----->-]<<-
[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-[>+<-
[>++++++++++++++<-
[>+<-]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]
]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]]>.[-]<,]

of course any function char f(char) can be made easily on the same principle

[Daniel B Cristofani (cristofdathevanetdotcom)
http://www.hevanet.com/cristofd/brainfuck/]
"#;

/// Reads a newline then hits end-of-input; prints `LB\nLB\n` when EOF reads as 0.
pub const CRISTOFANI_LB: &str = ">,>+++++++++,>+++++++++++[<++++++<++++++<+>>>-]<<.>.<<-.>.>.<<.";

/// Prints its own source. Slow on cycle-level DUTs.
pub const BOSMAN_QUINE: &str = "-->+++>+>+>+>+++++>++>++>->+++>++>+>>>>>>>>>>>>>>>>->++++>>>>->+++>+++>+++>+++>+++>+++>+>+>>>->->>++++>+>>>>->>++++>+>+>>->->++>++>++>++++>+>++>->++>++++>+>+>++>++>->->++>++>++++>+>+>>>>>->>->>++++>++>++>++++>>>>>->>>>>+++>->++++>->->->+++>>>+>+>+++>+>++++>>+++>->>>>>->>>++++>++>++>+>+++>->++++>>->->+++>+>+++>+>++++>>>+++>->++++>>->->++>++++>++>++++>>++[-[->>+[>]++[<]<]>>+[>]<--[++>++++>]+[<]<<++]>>>[>]++++>++++[--[+>+>++++<<[-->>--<<[->-<[--->>+<<[+>+++<[+>>++<<]]]]]]>+++[>+++++++++++++++<-]>--.<<<]";

/// One entry of a conformance suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteCase {
    /// Program, input and expected output.
    pub case: TestCase,
    /// Skipped entries are reported but never run.
    pub skip: bool,
}

impl SuiteCase {
    /// Wraps a case that runs normally.
    #[must_use]
    pub const fn run(case: TestCase) -> Self {
        Self { case, skip: false }
    }

    /// Wraps a case that is listed but not run.
    #[must_use]
    pub const fn skipped(case: TestCase) -> Self {
        Self { case, skip: true }
    }
}

/// The standard conformance programs in their canonical order.
///
/// Programs that read past their input use a zero fallback byte. The quine is
/// listed as skipped because it needs far more cycles than the others.
#[must_use]
pub fn builtin_cases() -> Vec<SuiteCase> {
    vec![
        SuiteCase::run(TestCase::new("hello_world", HELLO_WORLD, "Hello World!\n")),
        SuiteCase::run(
            TestCase::new("cristofani_word_count", CRISTOFANI_WORD_COUNT, "\t1\t3\t16\n")
                .with_input("example 123\nasdf")
                .with_fallback(0),
        ),
        SuiteCase::run(TestCase::new("cristofani_h", CRISTOFANI_H, "H\n")),
        SuiteCase::run(
            TestCase::new("cristofani_rot13", CRISTOFANI_ROT13, "Guvf vf nGrfg bs gur ebg13")
                .with_input("This is aTest of the rot13")
                .with_fallback(0),
        ),
        SuiteCase::run(
            TestCase::new("cristofani_lb", CRISTOFANI_LB, "LB\nLB\n")
                .with_input("\n")
                .with_fallback(0),
        ),
        SuiteCase::skipped(TestCase::new("bosman_quine", BOSMAN_QUINE, BOSMAN_QUINE)),
    ]
}

/// How a single suite entry ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    /// Output matched and the DUT halted.
    Passed(RunReport),
    /// The run faulted.
    Failed(Fault),
    /// Not run.
    Skipped,
}

/// Outcome of one named suite entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    /// Case name.
    pub name: String,
    /// What happened.
    pub outcome: CaseOutcome,
}

impl CaseResult {
    /// True unless the case faulted.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        !matches!(self.outcome, CaseOutcome::Failed(_))
    }
}

impl fmt::Display for CaseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            CaseOutcome::Passed(report) => {
                write!(f, "PASS {} ({} cycles)", self.name, report.cycles)
            }
            CaseOutcome::Failed(fault) => write!(f, "FAIL {}: {fault}", self.name),
            CaseOutcome::Skipped => write!(f, "SKIP {}", self.name),
        }
    }
}

/// Tallies over a suite run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SuiteSummary {
    /// Cases that passed.
    pub passed: usize,
    /// Cases that faulted.
    pub failed: usize,
    /// Cases not run.
    pub skipped: usize,
}

impl SuiteSummary {
    /// Every listed case.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }
}

impl fmt::Display for SuiteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} skipped",
            self.passed, self.failed, self.skipped
        )
    }
}

/// Per-case results in suite order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuiteResult {
    /// One entry per listed case.
    pub cases: Vec<CaseResult>,
}

impl SuiteResult {
    /// Counts passes, failures and skips.
    #[must_use]
    pub fn summary(&self) -> SuiteSummary {
        self.cases
            .iter()
            .fold(SuiteSummary::default(), |mut summary, result| {
                match result.outcome {
                    CaseOutcome::Passed(_) => summary.passed += 1,
                    CaseOutcome::Failed(_) => summary.failed += 1,
                    CaseOutcome::Skipped => summary.skipped += 1,
                }
                summary
            })
    }

    /// True when no case faulted.
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.cases.iter().all(CaseResult::is_ok)
    }
}

/// Runs every non-skipped case through `run`, continuing past failures.
///
/// `run` receives the case and is expected to build a fresh DUT for it, so
/// no state leaks from one entry to the next.
pub fn run_suite<F>(cases: &[SuiteCase], mut run: F) -> SuiteResult
where
    F: FnMut(&TestCase) -> Result<RunReport, Fault>,
{
    let cases = cases
        .iter()
        .map(|entry| {
            let outcome = if entry.skip {
                CaseOutcome::Skipped
            } else {
                match run(&entry.case) {
                    Ok(report) => CaseOutcome::Passed(report),
                    Err(fault) => CaseOutcome::Failed(fault),
                }
            };
            let result = CaseResult {
                name: entry.case.name.clone(),
                outcome,
            };
            match &result.outcome {
                CaseOutcome::Failed(_) => log::warn!("{result}"),
                _ => log::info!("{result}"),
            }
            result
        })
        .collect();
    SuiteResult { cases }
}
