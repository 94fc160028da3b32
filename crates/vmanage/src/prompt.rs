//! Line-oriented prompts over any `BufRead` / `Write` pair.
//!
//! Kept IO-generic so menu handling can be driven from tests with byte
//! buffers; the command handlers pass locked stdin and stderr.

use std::io::{self, BufRead, Write};

/// Outcome of a numbered-menu prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Zero-based index into the menu.
    Index(usize),
    Quit,
}

/// Print `prompt`, read one trimmed line. `None` on end of input.
pub fn read_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{prompt}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

/// Ask for a 1-based menu number until one in `1..=len` is given.
///
/// `q` (any case) and end of input both quit.
pub fn select_by_index<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    len: usize,
) -> io::Result<Selection> {
    loop {
        let Some(answer) = read_line(input, output, prompt)? else {
            return Ok(Selection::Quit);
        };
        if answer.eq_ignore_ascii_case("q") {
            return Ok(Selection::Quit);
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => return Ok(Selection::Index(n - 1)),
            _ => writeln!(output, "Invalid selection, try again.")?,
        }
    }
}

/// Collect `(prefix, option type)` pairs until a blank line.
///
/// The option type defaults to `global` when left empty.
pub fn read_new_prefixes<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    object_name: &str,
) -> io::Result<Vec<(String, String)>> {
    writeln!(output, "Enter new prefixes (blank to finish):")?;
    let mut out = Vec::new();
    loop {
        let prefix = read_line(input, output, &format!("New IP prefix for '{object_name}': "))?;
        let Some(prefix) = prefix.filter(|p| !p.is_empty()) else {
            break;
        };
        let option_type = read_line(input, output, "Option type (default 'global'): ")?
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| vmanage_core::prefix::GLOBAL_OPTION.to_owned());
        out.push((prefix, option_type));
    }
    Ok(out)
}

/// Parse a `CIDR[=TYPE]` flag value.
pub fn split_prefix_arg(raw: &str) -> (String, String) {
    match raw.split_once('=') {
        Some((cidr, kind)) if !kind.trim().is_empty() => {
            (cidr.trim().to_owned(), kind.trim().to_owned())
        }
        Some((cidr, _)) => (
            cidr.trim().to_owned(),
            vmanage_core::prefix::GLOBAL_OPTION.to_owned(),
        ),
        None => (
            raw.trim().to_owned(),
            vmanage_core::prefix::GLOBAL_OPTION.to_owned(),
        ),
    }
}
