/*
 *   Copyright (c) 2026 rushell contributors
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

//! The binary entry point: the thinnest possible driver over the library
//! crate's pieces — terminal raw-mode toggling, the reader thread, and the
//! `-c` non-interactive path.

use std::io::{self, Write};

use clap::Parser;
use crossterm::terminal;
use miette::{IntoDiagnostic, Result};
use tokio::sync::mpsc::unbounded_channel;

use rushell::cli::Cli;
use rushell::editor::{self, keystroke, LineOutcome};
use rushell::error::ShellError;
use rushell::logging::{self, LogSink};
use rushell::parser::Tokenizer;
use rushell::repl::{self, Environment};

const PROMPT: &str = "$ ";
const CONTINUATION_PROMPT: &str = "> ";

/// Restores cooked mode on every exit path, including panics and early
/// returns, since a crashed shell must never leave the user's terminal in
/// raw mode.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let sink = if cli.log {
        LogSink::File(cli.log_dir.clone())
    } else {
        LogSink::Off
    };
    let _log_guard = logging::init(sink)?;

    let mut env = Environment::from_process().into_diagnostic()?;

    if let Some(command) = &cli.command {
        let status = run_non_interactive(command, &mut env)?;
        std::process::exit(status);
    }

    run_interactive(&mut env).await
}

/// `-c <COMMAND>`: parse and run one line without a real terminal — the
/// natural extension point for scripting and for exercising the executor
/// end to end in tests.
fn run_non_interactive(command: &str, env: &mut Environment) -> Result<i32> {
    let mut tokenizer = Tokenizer::new();
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let mut line = command.to_string();
    if !line.ends_with('\n') {
        line.push('\n');
    }

    match repl::run_line(&mut tokenizer, &line, env, &mut stdout, &mut stderr) {
        Ok(Some(status)) => Ok(status),
        Ok(None) => {
            eprintln!("rushell: unexpected end of command (unclosed quote or dangling pipe)");
            Ok(1)
        }
        Err(ShellError::ExitRequested(code)) => Ok(code),
        Err(err) => {
            eprintln!("{err}");
            Ok(1)
        }
    }
}

async fn run_interactive(env: &mut Environment) -> Result<()> {
    let _raw_guard = RawModeGuard::enable().into_diagnostic()?;

    let (tx, mut rx) = unbounded_channel();
    // Detached, not joined: a blocked `read()` on stdin has no way to be
    // woken up just because `rx` is dropped, so waiting for this thread on
    // every exit path (e.g. after `exit 0` with the terminal still open)
    // would hang the process. The OS reclaims it when we exit.
    std::thread::spawn(move || keystroke::run(io::stdin(), tx));

    let mut tokenizer = Tokenizer::new();
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let mut prompt = PROMPT;

    loop {
        let outcome = editor::read_line(prompt, &mut rx, &mut stdout, &env.path_var).await;

        let line = match outcome {
            Ok(LineOutcome::Line(line)) => line,
            Ok(LineOutcome::Eof) => break,
            Err(ShellError::SignalInterrupt) => {
                tokenizer = Tokenizer::new();
                prompt = PROMPT;
                continue;
            }
            Err(err) => {
                tracing::warn!(error = %err, "terminal I/O error during read_line");
                let _ = writeln!(stderr, "{err}");
                continue;
            }
        };

        match repl::run_line(&mut tokenizer, &line, env, &mut stdout, &mut stderr) {
            Ok(Some(_status)) => {
                prompt = PROMPT;
            }
            Ok(None) => {
                prompt = CONTINUATION_PROMPT;
            }
            Err(ShellError::ExitRequested(code)) => {
                tracing::info!(code, "exit requested, tearing down REPL");
                break;
            }
            Err(err) => {
                let _ = writeln!(stderr, "{err}");
                prompt = PROMPT;
            }
        }
    }

    tracing::info!("REPL loop exited cleanly");
    Ok(())
}
