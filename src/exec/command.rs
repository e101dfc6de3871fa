// src/exec/command.rs

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use super::backend::ToolOutput;

/// Run a process to completion, capturing stdout and stderr as one text.
///
/// Spawn and IO errors are folded into a `-1` exit code with the error text
/// as output; they are also logged via `tracing::warn!`.
pub async fn run_captured(program: OsString, args: &[OsString], cwd: Option<&Path>) -> ToolOutput {
    match run_captured_inner(&program, args, cwd).await {
        Ok(output) => output,
        Err(err) => {
            warn!(
                program = %program.to_string_lossy(),
                error = %format!("{err:#}"),
                "process could not be run"
            );
            ToolOutput::spawn_failure(&err)
        }
    }
}

async fn run_captured_inner(
    program: &OsString,
    args: &[OsString],
    cwd: Option<&Path>,
) -> Result<ToolOutput> {
    let shown = program.to_string_lossy();

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("failed to spawn `{shown}`"))?;

    let stdout = child.stdout.take().context("child stdout was not captured")?;
    let stderr = child.stderr.take().context("child stderr was not captured")?;

    // Read both pipes concurrently so neither buffer fills up, keeping lines
    // in the order they arrive. Bytes are split on '\n' and decoded lossily
    // since testbench output is not guaranteed to be UTF-8.
    let mut out_lines = BufReader::new(stdout).split(b'\n');
    let mut err_lines = BufReader::new(stderr).split(b'\n');
    let mut combined = String::new();
    let mut out_done = false;
    let mut err_done = false;

    while !(out_done && err_done) {
        tokio::select! {
            segment = out_lines.next_segment(), if !out_done => {
                match segment.with_context(|| format!("reading stdout of `{shown}`"))? {
                    Some(line) => push_line(&mut combined, &line),
                    None => out_done = true,
                }
            }
            segment = err_lines.next_segment(), if !err_done => {
                match segment.with_context(|| format!("reading stderr of `{shown}`"))? {
                    Some(line) => push_line(&mut combined, &line),
                    None => err_done = true,
                }
            }
        }
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for `{shown}`"))?;

    // Killed by a signal: no exit code.
    let exit_code = status.code().unwrap_or(-1);
    debug!(program = %shown, exit_code, "process exited");

    Ok(ToolOutput::new(combined, exit_code))
}

fn push_line(buf: &mut String, line: &[u8]) {
    buf.push_str(&String::from_utf8_lossy(line));
    buf.push('\n');
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_both_streams_and_exit_code() {
        let args = vec![
            OsString::from("-c"),
            OsString::from("echo out; echo err 1>&2; exit 3"),
        ];
        let output = run_captured(OsString::from("sh"), &args, None).await;

        assert_eq!(output.exit_code, 3);
        assert!(output.output.contains("out\n"));
        assert!(output.output.contains("err\n"));
    }

    #[tokio::test]
    async fn spawn_failure_is_exit_code_minus_one() {
        let output = run_captured(
            OsString::from("/definitely/not/a/real/program"),
            &[],
            None,
        )
        .await;

        assert_eq!(output.exit_code, -1);
        assert!(output.output.contains("failed to spawn"));
    }
}
