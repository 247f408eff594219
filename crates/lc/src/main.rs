//! The interactive prompt around the engine: reads lines from stdin, feeds
//! them to the driver, and renders outcomes as plain text. Ctrl-D at the
//! prompt exits; nothing is persisted unless `:save`d.

use std::io::{self, BufRead, Write};
use std::path::Path;

use flexi_logger::{Duplicate, Logger};

use lc_engine::{
    Console, Error, Outcome, ReduceReport, ReductionKind, Runner, StepAction, StopReason,
};

const PROMPT: &str = "==> ";

fn main() -> anyhow::Result<()> {
    setup_logging()?;

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print_usage();
        return Ok(());
    }
    let step = args.contains("--step");
    let expand = args.contains("--expand");
    let rlimit: Option<usize> = args.opt_value_from_str("--rlimit")?;
    let files = args.free()?;

    let mut runner = Runner::new();
    runner.set_step_mode(step);
    runner.set_full_expansion(expand);
    if let Some(limit) = rlimit {
        runner.set_reduction_limit(Some(limit))?;
    }

    println!("lc — a λ-calculus engine. Type :help for help.");

    let mut console = StdConsole;
    for file in &files {
        println!("loading {}", file);
        match runner.load_file(Path::new(file)) {
            Ok(lines) => {
                for line in lines {
                    println!("{}", line);
                }
            }
            Err(err) => println!("error: {}", err),
        }
    }

    repl(&mut runner, &mut console)
}

fn setup_logging() -> anyhow::Result<()> {
    std::env::set_var("RUST_BACKTRACE", "short");
    Logger::with_env_or_str("error").duplicate_to_stderr(Duplicate::All).start()?;
    Ok(())
}

fn print_usage() {
    println!(
        "usage: lc [--step] [--expand] [--rlimit N] [FILE...]\n\
         \n\
         An interactive engine for the untyped λ-calculus. Files named on\n\
         the command line are loaded as macro definitions before the first\n\
         prompt."
    );
}

fn repl(runner: &mut Runner, console: &mut StdConsole) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{}", PROMPT);
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!("\nGoodbye.");
            return Ok(());
        }
        let input = line.trim_end_matches('\n');

        match runner.run_line(input, console) {
            Ok(outcome) => render(runner, outcome),
            Err(err) => report_error(&err),
        }
        println!();
    }
}

fn render(runner: &Runner, outcome: Outcome) {
    match outcome {
        Outcome::Quiet => {}
        Outcome::Defined { name, body, warnings } => {
            for warning in &warnings {
                println!("warning: {}", warning);
            }
            println!("Set {} to {}", name, body);
        }
        Outcome::Command(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Outcome::Reduced(report) => render_report(runner, &report),
    }
}

fn render_report(runner: &Runner, report: &ReduceReport) {
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }

    if report.stop == StopReason::ShowMacro {
        println!("Displaying macro content");
    } else {
        if !runner.step_mode() {
            println!("Runtime: {:.3} seconds", report.elapsed.as_secs_f64());
        }
        println!("Exit reason: {}", report.stop);
        println!("Macro expansions: {}", report.expansions);
        match runner.reduction_limit() {
            Some(limit) => {
                println!("Reductions: {}\t(limit: {})", report.beta_reductions, limit)
            }
            None => println!("Reductions: {}", report.beta_reductions),
        }
    }
    if runner.full_expansion() {
        println!("All macros have been expanded");
    }
    if matches!(report.stop, StopReason::BetaNormal | StopReason::ShowMacro) {
        println!("\n    => {}", report.term);
    }
}

fn report_error(err: &Error) {
    if let Error::Parse(parse_err) = err {
        // Point at the offending character, prompt included.
        let caret = " ".repeat(PROMPT.chars().count() + parse_err.offset);
        println!("{}^", caret);
    }
    println!("error: {}", err);
}

/// Terminal implementation of the engine's console: step pauses and yes/no
/// questions read a line from stdin, progress goes to stderr.
struct StdConsole;

impl Console for StdConsole {
    fn progress(&mut self, steps: usize) {
        eprint!(" reducing... {}\r", steps);
    }

    fn begin_steps(&mut self) {
        println!("Step-by-step reduction is enabled.");
        println!("Press enter to step, ctrl-D to skip to the end.");
    }

    fn step(&mut self, kind: ReductionKind, steps: usize, term: &str) -> StepAction {
        print!("{}:{:03} {} ", kind, steps, term);
        if io::stdout().flush().is_err() {
            return StepAction::SkipToEnd;
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => {
                println!("Skipping to the end.");
                StepAction::SkipToEnd
            }
            Ok(_) => StepAction::Step,
        }
    }

    fn confirm(&mut self, question: &str) -> bool {
        print!("{} [yes/no]: ", question);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => line.trim().eq_ignore_ascii_case("yes"),
            Err(_) => false,
        }
    }

    fn clear_screen(&mut self) {
        print!("\x1b[2J\x1b[H");
        let _ = io::stdout().flush();
    }
}
