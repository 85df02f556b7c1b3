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

//! Closed error taxonomy for the shell core.
//!
//! Errors are tagged variants, never ad-hoc strings; message formatting happens
//! only where an error is finally printed (see [`ShellError::user_message`]).

use thiserror::Error;

/// The distinct error kinds a REPL iteration can produce.
///
/// Only [`ShellError::UnclosedQuote`] and [`ShellError::DanglingPipe`] are
/// recoverable: the caller retains the parser's accumulator and re-prompts for
/// more input instead of discarding the iteration.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Unclosed quote")]
    UnclosedQuote,

    #[error("Pipe has no target")]
    DanglingPipe,

    #[error("Unknown operator")]
    UnknownOperator,

    #[error("Unexpected token `{0}`")]
    UnexpectedToken(String),

    #[error("Broken redirect")]
    BrokenRedirect,

    #[error("{0}: not found")]
    NotFound(String),

    #[error("{0}: File exists")]
    FileExists(String),

    #[error("{0}: No such file or directory")]
    FileDoesNotExist(String),

    #[error("{0}: Permission denied")]
    Permission(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Signal interrupt")]
    SignalInterrupt,

    /// `exit 0` was requested. Process-fatal: terminates the REPL loop.
    #[error("Exit requested")]
    ExitRequested(i32),
}

impl ShellError {
    /// True for the errors that retain parser state and re-prompt rather
    /// than discarding the current iteration's accumulator.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ShellError::UnclosedQuote | ShellError::DanglingPipe)
    }

    /// True for errors that end the REPL loop outright.
    pub fn is_process_fatal(&self) -> bool {
        matches!(self, ShellError::ExitRequested(_))
    }

}

pub type ShellResult<T> = Result<T, ShellError>;
