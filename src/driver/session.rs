//! Driver Session
//!
//! Reads JSON-lines commands and writes one JSON reply per command.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::debug;

use crate::cache::MemCache;
use crate::driver::execute;
use crate::models::{Command, Reply};

/// Counters for a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Lines that parsed as commands
    pub commands: usize,
    /// Replies with `ok: false`
    pub failures: usize,
}

/// Runs commands from `reader` until end of input.
///
/// Blank lines and lines starting with `#` are skipped. A line that is not
/// a command gets a failed reply and the session continues.
pub fn run_session<R, W>(cache: &mut MemCache, reader: R, mut writer: W) -> Result<SessionSummary>
where
    R: BufRead,
    W: Write,
{
    let mut summary = SessionSummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read input line {}", index + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let reply = match serde_json::from_str::<Command>(line) {
            Ok(command) => {
                summary.commands += 1;
                debug!(line = index + 1, op = command.op(), "executing command");
                execute(cache, command)
            }
            Err(err) => Reply::malformed(format!("line {}: {}", index + 1, err)),
        };
        if !reply.ok {
            summary.failures += 1;
        }

        let encoded = serde_json::to_string(&reply).context("failed to encode reply")?;
        writeln!(writer, "{}", encoded).context("failed to write reply")?;
    }

    writer.flush().context("failed to flush output")?;
    Ok(summary)
}
