//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;
use crate::prompt::{self, Selection};

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal on stdin there is nobody to ask, so the action is
/// refused unless `--yes` was given.
pub fn confirm(message: &str, global: &GlobalOpts, action: &str) -> Result<bool, CliError> {
    if global.yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))?;
    Ok(confirmed)
}

/// Yes/no question asked only on an interactive terminal.
pub fn ask(message: &str) -> Result<bool, CliError> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))
}

/// Resolve a 1-based menu number, prompting on stdin when none was given.
///
/// `menu` is rendered before prompting: to stdout in table mode, to stderr
/// otherwise so structured output stays clean, and not at all with `--quiet`.
/// Returns `None` when the user quits.
pub fn pick(
    number: Option<usize>,
    len: usize,
    kind: &str,
    list_command: &str,
    menu: impl FnOnce() -> Result<String, CliError>,
    global: &GlobalOpts,
) -> Result<Option<usize>, CliError> {
    if len == 0 {
        return Err(CliError::NotFound {
            resource_type: kind.into(),
            identifier: number.map_or_else(|| "any".into(), |n| n.to_string()),
            hint: format!("The controller returned no entries for `{list_command}`."),
        });
    }

    if let Some(n) = number {
        if (1..=len).contains(&n) {
            return Ok(Some(n - 1));
        }
        return Err(CliError::NotFound {
            resource_type: kind.into(),
            identifier: n.to_string(),
            hint: format!("Valid numbers are 1-{len}; see `vmanage {list_command}`."),
        });
    }

    let rendered = menu()?;
    if output::is_table(&global.output) {
        output::print_output(&rendered, global.quiet);
    } else if !global.quiet && !rendered.is_empty() {
        eprintln!("{rendered}");
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stderr = io::stderr().lock();
    let selection = prompt::select_by_index(
        &mut input,
        &mut stderr,
        &format!("Select a {kind} number (or 'q' to quit): "),
        len,
    )?;
    Ok(match selection {
        Selection::Index(i) => Some(i),
        Selection::Quit => None,
    })
}
