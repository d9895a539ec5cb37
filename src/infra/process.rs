//! External process execution
//!
//! Runs the configure/make/setup.py steps, capturing their output so a
//! failure carries the tool's own diagnostic.

use std::process::{Command, Output};

use crate::error::CommandError;

/// Lines of output kept in a failure message
const OUTPUT_TAIL_LINES: usize = 20;

/// Render a command line for messages
pub fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Run a command to completion
///
/// Fails when the program cannot be started or exits unsuccessfully; the
/// error carries the tail of stderr (or stdout when stderr is empty).
pub fn run(cmd: &mut Command) -> Result<Output, CommandError> {
    let command = describe(cmd);
    tracing::debug!("Running {command}");

    let output = cmd.output().map_err(|e| CommandError::Spawn {
        program: cmd.get_program().to_string_lossy().into_owned(),
        error: e.to_string(),
    })?;

    if output.status.success() {
        return Ok(output);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).into_owned()
    } else {
        stderr.into_owned()
    };

    Err(CommandError::Failed {
        command,
        status: output.status.to_string(),
        output: tail(&text, OUTPUT_TAIL_LINES),
    })
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}
