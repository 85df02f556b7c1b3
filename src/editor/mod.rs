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

//! The line editor: consumes [`keystroke::KeyEvent`]s from the reader
//! thread and drives the edit buffer, echoing changes through a single
//! serialised writer so prompt redraws never interleave.

pub mod buffer;
pub mod completion;
pub mod keystroke;

use std::io::{self, Write};

use crossterm::cursor;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::{ShellError, ShellResult};
use buffer::EditBuffer;
use completion::CompletionOutcome;
use keystroke::KeyEvent;

/// What a completed `read_line` call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// A submitted line, trailing LF included, ready for the tokeniser.
    Line(String),
    /// Clean end-of-stream on stdin, treated as a clean shell exit.
    Eof,
}

fn redraw(writer: &mut dyn Write, prompt: &str, buffer: &str) -> io::Result<()> {
    writer.queue(cursor::MoveToColumn(0))?;
    writer.queue(Clear(ClearType::FromCursorDown))?;
    write!(writer, "{prompt}{buffer}")?;
    writer.flush()
}

/// Drives one REPL line of input: prints `prompt`, then consumes
/// [`KeyEvent`]s from `rx` (fed by [`keystroke::run`] on its own thread)
/// until a line is submitted, the terminal hits EOF, or `SIGINT` fires.
pub async fn read_line(
    prompt: &str,
    rx: &mut UnboundedReceiver<KeyEvent>,
    writer: &mut dyn Write,
    path_var: &str,
) -> ShellResult<LineOutcome> {
    let mut buffer = EditBuffer::new();
    write!(writer, "{prompt}")?;
    writer.flush()?;

    loop {
        let event = match rx.recv().await {
            Some(event) => event,
            None => return Ok(LineOutcome::Eof),
        };

        match event {
            KeyEvent::Printable(byte) => {
                buffer.push_byte(byte);
                redraw(writer, prompt, buffer.as_str())?;
            }
            KeyEvent::Delete => {
                if buffer.pop().is_some() {
                    write!(writer, "\x1b[D \x1b[D")?;
                    writer.flush()?;
                }
            }
            KeyEvent::Submit => {
                write!(writer, "\r\n")?;
                writer.flush()?;
                let mut line = buffer.text;
                line.push('\n');
                return Ok(LineOutcome::Line(line));
            }
            KeyEvent::SigInt => {
                write!(writer, "^C\r\n")?;
                writer.flush()?;
                return Err(ShellError::SignalInterrupt);
            }
            KeyEvent::Tab => {
                let (outcome, bell_count) =
                    completion::complete(buffer.as_str(), buffer.bell_count, path_var);
                buffer.bell_count = bell_count;
                apply_completion(outcome, &mut buffer, prompt, writer)?;
            }
            KeyEvent::ArrowIgnored => {}
        }
    }
}

fn apply_completion(
    outcome: CompletionOutcome,
    buffer: &mut EditBuffer,
    prompt: &str,
    writer: &mut dyn Write,
) -> io::Result<()> {
    match outcome {
        CompletionOutcome::Unchanged => Ok(()),
        CompletionOutcome::Bell => {
            write!(writer, "\x07")?;
            writer.flush()
        }
        CompletionOutcome::Replaced(text) => {
            buffer.text = text;
            redraw(writer, prompt, buffer.as_str())
        }
        CompletionOutcome::Listed(candidates) => {
            write!(writer, "\r\n{}\r\n", candidates.join("  "))?;
            redraw(writer, prompt, buffer.as_str())
        }
    }
}
