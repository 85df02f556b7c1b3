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

//! Ties the tokeniser, pipeline builder, builtin dispatcher, and executor
//! together for one REPL iteration.
//!
//! The prompt loop that owns raw-mode toggling and the terminal lives in the
//! binary crate; this module is the glue — a single iteration of
//! read→parse→execute — driven by both the interactive line editor and the
//! `-c` non-interactive path.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use crate::builtins::{self, BuiltinStreams};
use crate::error::{ShellError, ShellResult};
use crate::exec;
use crate::exec::redirect;
use crate::parser::{build_pipeline, ParseOutcome, Pipeline, Tokenizer};

/// The shell's ambient environment collaborators — `PATH`/`HOME` lookup,
/// `PWD` — captured once per process rather than read ad hoc.
pub struct Environment {
    pub cwd: PathBuf,
    pub path_var: String,
    pub home_var: Option<String>,
}

impl Environment {
    pub fn from_process() -> std::io::Result<Self> {
        Ok(Self {
            cwd: std::env::current_dir()?,
            path_var: std::env::var("PATH").unwrap_or_default(),
            home_var: std::env::var("HOME").ok(),
        })
    }
}

/// Feeds one line into `tokenizer`.
///
/// `Ok(None)` means the parser wants more input (recoverable): the caller
/// should print the continuation prompt and feed the next line in, without
/// resetting `tokenizer`. `Ok(Some(status))` is the executed pipeline's
/// exit status. Any other `Err` is either iteration-fatal (print and keep
/// the REPL running) or `ExitRequested` (process-fatal).
pub fn run_line(
    tokenizer: &mut Tokenizer,
    line: &str,
    env: &mut Environment,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> ShellResult<Option<i32>> {
    let tokens = match tokenizer.feed(line)? {
        ParseOutcome::Complete(tokens) => tokens,
        ParseOutcome::NeedMore => return Ok(None),
    };

    if tokens.is_empty() {
        return Ok(Some(0));
    }

    let pipeline = build_pipeline(tokens, &env.path_var)?;
    run_pipeline(&pipeline, env, stdout, stderr).map(Some)
}

fn run_pipeline(
    pipeline: &Pipeline,
    env: &mut Environment,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> ShellResult<i32> {
    if pipeline.is_single_builtin() {
        run_builtin_stage(pipeline, env, stdout, stderr)
    } else {
        exec::execute(pipeline)
    }
}

fn run_builtin_stage(
    pipeline: &Pipeline,
    env: &mut Environment,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> ShellResult<i32> {
    let stage = &pipeline.stages[0];

    // Builtins only ever redirect their own stdout/stderr (fd 0/extra fds
    // on a builtin stage are accepted syntax but have no effect — a
    // builtin never reads stdin or inherits extra fds). Opened eagerly, so
    // a bad redirect target aborts before the builtin runs at all.
    let mut stdout_file: Option<File> = None;
    let mut stderr_file: Option<File> = None;
    for redirection in &stage.redirections {
        let opened = redirect::open(redirection)?;
        match opened.fd {
            1 => stdout_file = Some(opened.file),
            2 => stderr_file = Some(opened.file),
            _ => {}
        }
    }

    let mut streams = BuiltinStreams {
        stdout: stdout_file
            .as_mut()
            .map(|f| f as &mut dyn Write)
            .unwrap_or(stdout),
        stderr: stderr_file
            .as_mut()
            .map(|f| f as &mut dyn Write)
            .unwrap_or(stderr),
    };

    let result = builtins::dispatch(
        &stage.argv,
        &mut streams,
        &mut env.cwd,
        &env.path_var,
        env.home_var.as_deref(),
    );

    match result {
        Ok(()) => Ok(0),
        Err(err @ ShellError::ExitRequested(_)) => Err(err),
        // `exit`'s bad-argument and `cd`'s no-such-directory cases already
        // wrote their own message to `streams.stderr` — don't repeat it
        // in the generic failure printer.
        Err(ShellError::NotFound(_)) | Err(ShellError::FileDoesNotExist(_)) => Ok(1),
        Err(other) => Err(other),
    }
}
