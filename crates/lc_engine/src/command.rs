//! The `:` command surface. Commands receive raw whitespace-delimited
//! words; everything they print goes back to the caller as plain lines,
//! and anything interactive (confirmations, clearing) goes through the
//! console.

use std::path::Path;

use itertools::Itertools;
use once_cell::sync::Lazy;
use smol_str::SmolStr;

use crate::driver::{Console, Runner, MIN_REDUCTION_LIMIT};
use crate::Error;

const COMMANDS: &[(&str, &str)] = &[
    ("help", "print this help"),
    ("clear", "clear the screen"),
    ("macros", "list defined macros"),
    ("mdel", "delete a macro"),
    ("delmac", "delete all macros"),
    ("save", "save macros to a file"),
    ("load", "load macros from a file"),
    ("rlimit", "get or set the reduction limit"),
    ("step", "toggle step-by-step reduction"),
    ("expand", "toggle full expansion"),
];

static HELP: Lazy<String> = Lazy::new(|| {
    let commands = COMMANDS
        .iter()
        .map(|(name, text)| format!("\t:{}\t{}", name, text))
        .join("\n");
    format!(
        "Usage:\n\
         \tWrite λ-expressions with `λ` or `\\`.\n\
         \tDefine macros with `=`, as in `T = λab.a`.\n\
         \tRun commands with `:`, as in `:help`.\n\
         \t`$` expands to the result of the last reduction.\n\
         \n\
         Commands:\n{}",
        commands
    )
});

pub(crate) fn dispatch(
    runner: &mut Runner,
    name: &str,
    args: &[SmolStr],
    console: &mut dyn Console,
) -> Result<Vec<String>, Error> {
    match name {
        "help" => {
            no_args(name, args)?;
            Ok(vec![HELP.clone()])
        }
        "clear" => {
            no_args(name, args)?;
            console.clear_screen();
            Ok(Vec::new())
        }
        "macros" => {
            no_args(name, args)?;
            if runner.macros.is_empty() {
                Ok(vec!["no macros are defined".to_string()])
            } else {
                Ok(runner
                    .macros
                    .iter()
                    .map(|(name, tree)| format!("\t{}\t{}", name, tree.print(false)))
                    .collect())
            }
        }
        "mdel" => {
            let target = one_arg(name, args)?;
            if runner.macros.remove(target) {
                Ok(vec![format!("deleted macro {}", target)])
            } else {
                Ok(vec![format!("macro {} is not defined", target)])
            }
        }
        "delmac" => {
            no_args(name, args)?;
            if console.confirm("delete all macros?") {
                runner.macros.clear();
                Ok(vec!["deleted all macros".to_string()])
            } else {
                Ok(vec!["cancelled".to_string()])
            }
        }
        "save" => {
            let target = one_arg(name, args)?;
            let path = Path::new(target);
            if path.exists() && !console.confirm(&format!("{} exists, overwrite?", target)) {
                return Ok(vec!["cancelled".to_string()]);
            }
            let count = runner.save_file(path)?;
            Ok(vec![format!("wrote {} macros to {}", count, target)])
        }
        "load" => {
            let target = one_arg(name, args)?;
            runner.load_file(Path::new(target))
        }
        "rlimit" => rlimit(runner, args),
        "step" => {
            let on = flag_target(name, args, runner.step_mode())?;
            runner.set_step_mode(on);
            Ok(vec![format!(
                "{} step-by-step reduction",
                if on { "enabled" } else { "disabled" }
            )])
        }
        "expand" => {
            let on = flag_target(name, args, runner.full_expansion())?;
            runner.set_full_expansion(on);
            Ok(vec![format!(
                "{} full expansion",
                if on { "enabled" } else { "disabled" }
            )])
        }
        _ => Err(Error::UndefinedCommand(name.into())),
    }
}

fn rlimit(runner: &mut Runner, args: &[SmolStr]) -> Result<Vec<String>, Error> {
    match args {
        [] => Ok(vec![match runner.reduction_limit() {
            Some(limit) => format!("the reduction limit is {}", limit),
            None => "no reduction limit is set".to_string(),
        }]),
        [arg] => {
            if arg.as_str().eq_ignore_ascii_case("none") {
                runner.set_reduction_limit(None)?;
                return Ok(vec!["removed the reduction limit".to_string()]);
            }
            let limit: usize = arg.as_str().parse().map_err(|_| {
                Error::BadCommandArg(format!(
                    "the reduction limit must be an integer of at least {}, or `none`",
                    MIN_REDUCTION_LIMIT
                ))
            })?;
            runner.set_reduction_limit(Some(limit))?;
            Ok(vec![format!("set the reduction limit to {}", limit)])
        }
        _ => Err(Error::BadCommandArg(":rlimit takes at most one argument".to_string())),
    }
}

fn no_args(name: &str, args: &[SmolStr]) -> Result<(), Error> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(Error::BadCommandArg(format!(":{} takes no arguments", name)))
    }
}

fn one_arg<'a>(name: &str, args: &'a [SmolStr]) -> Result<&'a str, Error> {
    match args {
        [arg] => Ok(arg.as_str()),
        _ => Err(Error::BadCommandArg(format!(":{} takes exactly one argument", name))),
    }
}

/// `:step` / `:expand`: no argument toggles, `y`/`yes` and `n`/`no` set.
fn flag_target(name: &str, args: &[SmolStr], current: bool) -> Result<bool, Error> {
    match args {
        [] => Ok(!current),
        [arg] => match arg.as_str().to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            _ => Err(Error::BadCommandArg(format!("usage: :{} [yes|no]", name))),
        },
        _ => Err(Error::BadCommandArg(format!(":{} takes at most one argument", name))),
    }
}
