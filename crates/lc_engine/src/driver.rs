//! The driver owns all mutable state of a session — abbreviation table,
//! history ring, toggles, the binder-id counter — and runs one input line
//! at a time through parse → prepare → reduce-until-done.
//!
//! Everything interactive (step pauses, confirmations, progress, interrupt
//! polling) goes through the [`Console`] seam; the engine itself never
//! touches a terminal.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use smol_str::SmolStr;

use crate::history::HistoryRing;
use crate::lower::lower;
use crate::macros::MacroTable;
use crate::prepare::{prepare, Warning};
use crate::reduce::{expand_all, expand_leaf, reduce, ReductionKind};
use crate::term::{IdSource, Tree};
use crate::{command, Error};

pub const MIN_REDUCTION_LIMIT: usize = 50;
const DEFAULT_REDUCTION_LIMIT: usize = 1_000_000;

/// How often to report progress through the console. Every place value has
/// a non-zero digit, so all digits appear to change.
const PROGRESS_INTERVAL: usize = 231;

/// How often to compact the working tree's arena during long reductions.
const COLLECT_INTERVAL: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    BetaNormal,
    MaxExceeded,
    Interrupt,
    ShowMacro,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::BetaNormal => "β-normal form",
            StopReason::MaxExceeded => "too many reductions",
            StopReason::Interrupt => "user interrupt",
            StopReason::ShowMacro => "displaying macro content",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Step,
    SkipToEnd,
}

/// The engine side of the renderer boundary. The default methods make a
/// non-interactive console: never pause, never interrupt, answer yes.
pub trait Console {
    /// Transient step-count report during long reductions.
    fn progress(&mut self, steps: usize) {
        let _ = steps;
    }
    /// Announces that a stepped reduction is starting.
    fn begin_steps(&mut self) {}
    /// Pauses after one reduction in step mode.
    fn step(&mut self, kind: ReductionKind, steps: usize, term: &str) -> StepAction {
        let _ = (kind, steps, term);
        StepAction::Step
    }
    /// Asks a yes/no question.
    fn confirm(&mut self, question: &str) -> bool {
        let _ = question;
        true
    }
    /// Polled between reduction steps.
    fn interrupted(&mut self) -> bool {
        false
    }
    fn clear_screen(&mut self) {}
}

/// A console that answers nothing; handy for tests and batch loading.
pub struct Headless;

impl Console for Headless {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceReport {
    pub stop: StopReason,
    /// FUNCTION_APPLY events only; the number the user thinks of as
    /// "reductions".
    pub beta_reductions: usize,
    /// Macro, Church and history expansions, including a final
    /// full-expansion pass when that is enabled.
    pub expansions: usize,
    /// Loop iterations; what the reduction limit bounds.
    pub steps: usize,
    pub elapsed: Duration,
    pub term: String,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A blank line.
    Quiet,
    Defined { name: SmolStr, body: String, warnings: Vec<Warning> },
    Command(Vec<String>),
    Reduced(ReduceReport),
}

pub struct Runner {
    pub(crate) macros: MacroTable,
    pub(crate) history: HistoryRing,
    pub(crate) reduction_limit: Option<usize>,
    pub(crate) step_mode: bool,
    pub(crate) full_expansion: bool,
    pub(crate) ids: IdSource,
}

impl Default for Runner {
    fn default() -> Runner {
        Runner {
            macros: MacroTable::default(),
            history: HistoryRing::default(),
            reduction_limit: Some(DEFAULT_REDUCTION_LIMIT),
            step_mode: false,
            full_expansion: false,
            ids: IdSource::default(),
        }
    }
}

impl Runner {
    pub fn new() -> Runner {
        Runner::default()
    }

    /// Runs one input line. Every error this returns is recoverable: the
    /// line is abandoned and the session state is unchanged by it.
    pub fn run_line(&mut self, line: &str, console: &mut dyn Console) -> Result<Outcome, Error> {
        if line.trim().is_empty() {
            return Ok(Outcome::Quiet);
        }
        match lc_parser::parse_line(line)? {
            lc_parser::Line::Def { name, body } => self.define(name, &body),
            lc_parser::Line::Command { name, args } => {
                command::dispatch(self, &name, &args, console).map(Outcome::Command)
            }
            lc_parser::Line::Expr(expr) => self.evaluate(&expr, console).map(Outcome::Reduced),
        }
    }

    fn define(&mut self, name: SmolStr, body: &lc_parser::Expr) -> Result<Outcome, Error> {
        let mut tree = lower(body);
        let mut warnings =
            prepare(&mut tree, &mut self.ids, &self.macros, &self.history, Some(name.as_str()))?;
        let printed = tree.print(false);
        if self.macros.insert(name.clone(), tree) {
            warnings.push(Warning::Redefined(name.clone()));
        }
        log::debug!("defined macro {}", name);
        Ok(Outcome::Defined { name, body: printed, warnings })
    }

    fn evaluate(
        &mut self,
        expr: &lc_parser::Expr,
        console: &mut dyn Console,
    ) -> Result<ReduceReport, Error> {
        let mut tree = lower(expr);
        let warnings = prepare(&mut tree, &mut self.ids, &self.macros, &self.history, None)?;
        let start = Instant::now();

        // A naked abbreviation or numeral at the prompt means "show me",
        // not "reduce": expand one level and stop.
        let top = tree
            .root_child()
            .unwrap_or_else(|| panic!("a prepared tree has no body"));
        if tree.node(top).is_expandable() {
            let (_, expansion) =
                expand_leaf(&mut tree, top, &mut self.ids, &self.macros, &self.history)?;
            tree.replace(top, expansion);
            let term = tree.print(false);
            let elapsed = start.elapsed();
            self.snapshot(tree)?;
            return Ok(ReduceReport {
                stop: StopReason::ShowMacro,
                beta_reductions: 0,
                expansions: 1,
                steps: 0,
                elapsed,
                term,
                warnings,
            });
        }

        if self.step_mode {
            console.begin_steps();
        }

        let mut steps = 0;
        let mut beta_reductions = 0;
        let mut expansions = 0;
        let mut skip_to_end = false;
        let stop = loop {
            if self.reduction_limit.map_or(false, |limit| steps >= limit) {
                break StopReason::MaxExceeded;
            }
            if console.interrupted() {
                break StopReason::Interrupt;
            }
            let kind = match reduce(&mut tree, &mut self.ids, &self.macros, &self.history)? {
                None => break StopReason::BetaNormal,
                Some(kind) => kind,
            };
            steps += 1;
            match kind {
                ReductionKind::FunctionApply => beta_reductions += 1,
                _ => expansions += 1,
            }
            if steps % COLLECT_INTERVAL == 0 {
                tree.collect();
            }
            if self.step_mode && !skip_to_end {
                match console.step(kind, steps, &tree.print(false)) {
                    StepAction::Step => {}
                    StepAction::SkipToEnd => skip_to_end = true,
                }
            } else if steps % PROGRESS_INTERVAL == 0 {
                console.progress(steps);
            }
        };

        if self.full_expansion {
            expansions += expand_all(
                &mut tree,
                &mut self.ids,
                &self.macros,
                &self.history,
                self.reduction_limit,
            )?;
        }

        let term = tree.print(false);
        let elapsed = start.elapsed();
        log::debug!(
            "line done: {} after {} steps ({} β)",
            stop,
            steps,
            beta_reductions
        );
        self.snapshot(tree)?;

        Ok(ReduceReport { stop, beta_reductions, expansions, steps, elapsed, term, warnings })
    }

    /// Records a fully expanded copy of the result, so `$` keeps meaning
    /// the same term even if the macro table changes afterwards.
    fn snapshot(&mut self, mut tree: Tree) -> Result<(), Error> {
        expand_all(
            &mut tree,
            &mut self.ids,
            &self.macros,
            &self.history,
            self.reduction_limit,
        )?;
        tree.collect();
        self.history.push(tree);
        Ok(())
    }

    /// Writes the abbreviation table in the save format: one `NAME = body`
    /// line per macro, in definition order.
    pub fn save_file(&self, path: &Path) -> Result<usize, Error> {
        let mut out = String::new();
        for (name, tree) in self.macros.iter() {
            out.push_str(name);
            out.push_str(" = ");
            out.push_str(&tree.print(true));
            out.push('\n');
        }
        std::fs::write(path, out)?;
        Ok(self.macros.len())
    }

    /// Loads a macro file: blank lines and `#` comments are ignored, every
    /// other line must be a definition. Problem lines are skipped with a
    /// note; the rest of the file still loads.
    pub fn load_file(&mut self, path: &Path) -> Result<Vec<String>, Error> {
        let text = std::fs::read_to_string(path)?;
        let mut report = Vec::new();
        let mut loaded = 0;
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match lc_parser::parse_line(line) {
                Ok(lc_parser::Line::Def { name, body }) => match self.define(name, &body) {
                    Ok(Outcome::Defined { name, .. }) => {
                        loaded += 1;
                        report.push(format!("loaded {}", name));
                    }
                    Ok(_) => {}
                    Err(err) => report.push(format!("skipping line {}: {}", line_no, err)),
                },
                Ok(_) => {
                    report.push(format!("skipping line {}: not a definition", line_no));
                }
                Err(err) => report.push(format!("skipping line {}: {}", line_no, err)),
            }
        }
        report.push(format!("loaded {} definitions from {}", loaded, path.display()));
        Ok(report)
    }

    /// The defined abbreviations, in definition order, with printed bodies.
    pub fn macros(&self) -> Vec<(SmolStr, String)> {
        self.macros.iter().map(|(name, tree)| (name.clone(), tree.print(false))).collect()
    }

    pub fn reduction_limit(&self) -> Option<usize> {
        self.reduction_limit
    }

    /// `None` removes the limit entirely.
    pub fn set_reduction_limit(&mut self, limit: Option<usize>) -> Result<(), Error> {
        match limit {
            Some(n) if n < MIN_REDUCTION_LIMIT => Err(Error::BadCommandArg(format!(
                "the reduction limit must be at least {}",
                MIN_REDUCTION_LIMIT
            ))),
            other => {
                self.reduction_limit = other;
                Ok(())
            }
        }
    }

    pub fn step_mode(&self) -> bool {
        self.step_mode
    }

    pub fn set_step_mode(&mut self, on: bool) {
        self.step_mode = on;
    }

    pub fn full_expansion(&self) -> bool {
        self.full_expansion
    }

    pub fn set_full_expansion(&mut self, on: bool) {
        self.full_expansion = on;
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
