//! An interactive engine for the untyped λ-calculus.
//!
//! The pipeline per input line: `lc_parser` turns text into an AST of
//! unresolved names, `lower` builds the arena-backed term tree, `prepare`
//! binds variables and eliminates history references, and the driver runs
//! `reduce` to a fixed point (or a budget) before printing and recording
//! the result.
//!
//! The crate has no terminal of its own: rendering, key handling and
//! prompts belong to the embedding program, which talks to the engine
//! through [`Runner`] and [`Console`].

mod term;
mod walk;
mod clone;
mod lower;
mod prepare;
mod reduce;
mod print;
mod history;
mod macros;
mod driver;
mod command;

use std::fmt;

use smol_str::SmolStr;

pub use crate::driver::{
    Console, Headless, Outcome, ReduceReport, Runner, StepAction, StopReason, MIN_REDUCTION_LIMIT,
};
pub use crate::prepare::Warning;
pub use crate::reduce::ReductionKind;
pub use crate::term::{alpha_eq, Tree};

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while handling one line. All of it is
/// recoverable: the driver reports the error and the prompt continues.
#[derive(Debug)]
pub enum Error {
    Parse(lc_parser::ParseError),
    /// A λ-parameter shadows an enclosing binder of the same name.
    NameConflict(SmolStr),
    /// A macro body mentions the name being defined.
    SelfReference(SmolStr),
    /// `$` before any successful reduction.
    EmptyHistory,
    /// An abbreviation vanished between definition and expansion.
    UndefinedMacro(SmolStr),
    UndefinedCommand(SmolStr),
    BadCommandArg(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::NameConflict(name) => {
                write!(f, "bound variable name conflict: {:?}", name.as_str())
            }
            Error::SelfReference(name) => {
                write!(f, "macro {} cannot reference itself", name)
            }
            Error::EmptyHistory => write!(f, "there isn't any history to reference"),
            Error::UndefinedMacro(name) => write!(f, "macro {} is not defined", name),
            Error::UndefinedCommand(name) => write!(f, "unknown command {:?}", name.as_str()),
            Error::BadCommandArg(message) => f.write_str(message),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<lc_parser::ParseError> for Error {
    fn from(err: lc_parser::ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

/// Parses and prepares a single standalone expression against an empty
/// session: names bind to their λs, everything else comes out free. Useful
/// for tests and for embedding the engine without a driver.
pub fn parse_expr(line: &str) -> Result<Tree> {
    match lc_parser::parse_line(line)? {
        lc_parser::Line::Expr(expr) => {
            let mut tree = lower::lower(&expr);
            let mut ids = term::IdSource::default();
            prepare::prepare(
                &mut tree,
                &mut ids,
                &macros::MacroTable::default(),
                &history::HistoryRing::default(),
                None,
            )?;
            Ok(tree)
        }
        _ => Err(Error::Parse(lc_parser::ParseError {
            offset: 0,
            message: "expected an expression".to_string(),
        })),
    }
}
