use std::io::{BufRead, Write};

use anyhow::Context as _;

use crate::KubyError;

const YES: &[&str] = &["y", "Y", "yes", "Yes", "YES"];
const NO: &[&str] = &["n", "N", "no", "No", "NO"];

/// Asks `msg` until the answer is a recognizable yes or no.
///
/// There is no default answer: an empty line or running out of input is an
/// error, anything else unrecognized asks again.
pub fn ask_for_confirmation(
    msg: &str,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    loop {
        write!(out, "{msg} (y/n):")?;
        out.flush()?;

        let mut line = String::new();
        input
            .read_line(&mut line)
            .context("Reading confirmation")?;

        let answer = line.trim();
        if answer.is_empty() {
            return Err(KubyError::ConfirmationAborted.into());
        }
        if YES.contains(&answer) {
            return Ok(true);
        }
        if NO.contains(&answer) {
            return Ok(false);
        }
        writeln!(out, "Please type yes or no and then press enter:")?;
    }
}
