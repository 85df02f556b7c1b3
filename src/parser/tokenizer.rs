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

//! Incremental lexical state machine.
//!
//! `Tokenizer::feed` implements the explicit `resume` contract called for in
//! the design notes: it never reaches into its own internals from outside,
//! and reports `ParseOutcome::NeedMore` rather than silently blocking when a
//! chunk ends mid-quote or mid-escape. [`ShellError::UnclosedQuote`] and
//! [`ShellError::DanglingPipe`] leave the accumulator untouched so the next
//! `feed` call picks up exactly where parsing left off; every other error
//! discards it.

use crate::error::{ShellError, ShellResult};
use crate::parser::token::{RedirectOp, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Unquoted,
    Single,
    Double,
}

/// What a `feed` call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A full logical line was parsed; here is its token stream.
    Complete(Vec<Token>),
    /// The chunk ended mid-word, mid-quote, or mid-escape; feed more input.
    NeedMore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeContinuation {
    Unquoted,
    Double,
}

#[derive(Debug)]
pub struct Tokenizer {
    tokens: Vec<Token>,
    pending: String,
    mode: ModeState,
    pipe_satisfied: bool,
    escape_continuation: Option<EscapeContinuation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ModeState(Mode);

impl Default for ModeState {
    fn default() -> Self {
        ModeState(Mode::Unquoted)
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer {
            tokens: Vec::new(),
            pending: String::new(),
            mode: ModeState::default(),
            pipe_satisfied: true,
            escape_continuation: None,
        }
    }
}

const DOUBLE_ESCAPABLE: [char; 4] = ['$', '`', '"', '\\'];

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        self.tokens.clear();
        self.pending.clear();
        self.mode = ModeState::default();
        self.pipe_satisfied = true;
        self.escape_continuation = None;
    }

    fn flush_word(&mut self) {
        if !self.pending.is_empty() {
            let word = std::mem::take(&mut self.pending);
            // A non-empty word flushed here is itself the Literal that
            // satisfies a preceding pipe, whether it was built from plain
            // characters, a quoted span, or an escape — not just the
            // unquoted "other" char class.
            self.pipe_satisfied = true;
            self.tokens.push(Token::Literal(word));
        }
    }

    /// Handles a `>`/`<` operator encountered at `chars[i]` in `Mode::Unquoted`.
    /// Returns the index to resume the outer loop at.
    fn handle_redirect(
        &mut self,
        chars: &[char],
        i: usize,
        read_variant: bool,
    ) -> ShellResult<usize> {
        let fd = if !self.pending.is_empty()
            && self.pending.chars().all(|c| c.is_ascii_digit())
        {
            let parsed: u32 = self
                .pending
                .parse()
                .map_err(|_| ShellError::UnknownOperator)?;
            self.pending.clear();
            parsed
        } else if read_variant {
            RedirectOp::Read.default_fd()
        } else {
            RedirectOp::Write.default_fd()
        };

        let (op, consumed) = if read_variant {
            (RedirectOp::Read, 1usize)
        } else {
            match chars.get(i + 1) {
                Some('|') => (RedirectOp::Clobber, 2usize),
                Some('>') => (RedirectOp::Append, 2usize),
                _ => (RedirectOp::Write, 1usize),
            }
        };

        let next_i = i + consumed;
        let tail_has_target = chars[next_i..]
            .iter()
            .any(|c| !matches!(c, ' ' | '\t' | '\n' | '\r'));
        if !tail_has_target {
            return Err(ShellError::UnexpectedToken("newline".to_string()));
        }

        self.tokens.push(Token::Redirect { op, fd });
        Ok(next_i)
    }

    /// Feed one chunk of raw input (typically one freshly-typed line,
    /// trailing LF included) into the state machine.
    pub fn feed(&mut self, chunk: &str) -> ShellResult<ParseOutcome> {
        let chars: Vec<char> = chunk.chars().collect();
        let mut i = 0usize;

        if let Some(continuation) = self.escape_continuation.take() {
            if chars.is_empty() {
                self.escape_continuation = Some(continuation);
                return Ok(ParseOutcome::NeedMore);
            }
            match continuation {
                EscapeContinuation::Unquoted => {
                    self.pending.push(chars[0]);
                    i = 1;
                }
                EscapeContinuation::Double => {
                    if DOUBLE_ESCAPABLE.contains(&chars[0]) {
                        self.pending.push(chars[0]);
                        i = 1;
                    } else {
                        self.pending.push('\\');
                        // Re-dispatch chars[0] normally; don't advance i.
                    }
                }
            }
        }

        while i < chars.len() {
            let c = chars[i];
            match self.mode.0 {
                Mode::Unquoted => match c {
                    '\\' => {
                        if let Some(&next) = chars.get(i + 1) {
                            self.pending.push(next);
                            i += 2;
                        } else {
                            self.escape_continuation = Some(EscapeContinuation::Unquoted);
                            return Ok(ParseOutcome::NeedMore);
                        }
                    }
                    '\'' => {
                        self.mode.0 = Mode::Single;
                        i += 1;
                    }
                    '"' => {
                        self.mode.0 = Mode::Double;
                        i += 1;
                    }
                    ' ' | '\t' => {
                        self.flush_word();
                        i += 1;
                    }
                    '|' => {
                        self.flush_word();
                        self.tokens.push(Token::Literal("|".to_string()));
                        self.pipe_satisfied = false;
                        i += 1;
                    }
                    '>' => match self.handle_redirect(&chars, i, false) {
                        Ok(next_i) => i = next_i,
                        Err(e) => {
                            self.reset();
                            return Err(e);
                        }
                    },
                    '<' => match self.handle_redirect(&chars, i, true) {
                        Ok(next_i) => i = next_i,
                        Err(e) => {
                            self.reset();
                            return Err(e);
                        }
                    },
                    '\n' | '\r' => {
                        self.flush_word();
                        if !self.pipe_satisfied {
                            self.reset();
                            tracing::trace!("dangling pipe at end of line");
                            return Err(ShellError::DanglingPipe);
                        }
                        if matches!(self.tokens.last(), Some(Token::Redirect { .. })) {
                            self.reset();
                            tracing::trace!("broken redirect at end of line");
                            return Err(ShellError::BrokenRedirect);
                        }
                        let tokens = std::mem::take(&mut self.tokens);
                        self.reset();
                        tracing::trace!(count = tokens.len(), "tokeniser reached a complete line");
                        return Ok(ParseOutcome::Complete(tokens));
                    }
                    other => {
                        self.pending.push(other);
                        self.pipe_satisfied = true;
                        i += 1;
                    }
                },
                Mode::Single => match c {
                    '\\' => {
                        self.pending.push('\\');
                        i += 1;
                    }
                    '\'' => {
                        self.mode.0 = Mode::Unquoted;
                        i += 1;
                    }
                    '\n' | '\r' => {
                        self.pending.push(c);
                        tracing::trace!(mode = "single", "unclosed quote, awaiting more input");
                        return Err(ShellError::UnclosedQuote);
                    }
                    other => {
                        self.pending.push(other);
                        i += 1;
                    }
                },
                Mode::Double => match c {
                    '\\' => {
                        if let Some(&next) = chars.get(i + 1) {
                            if DOUBLE_ESCAPABLE.contains(&next) {
                                self.pending.push(next);
                                i += 2;
                            } else {
                                self.pending.push('\\');
                                i += 1;
                            }
                        } else {
                            self.escape_continuation = Some(EscapeContinuation::Double);
                            return Ok(ParseOutcome::NeedMore);
                        }
                    }
                    '"' => {
                        self.mode.0 = Mode::Unquoted;
                        i += 1;
                    }
                    '\n' | '\r' => {
                        self.pending.push(c);
                        tracing::trace!(mode = "double", "unclosed quote, awaiting more input");
                        return Err(ShellError::UnclosedQuote);
                    }
                    other => {
                        self.pending.push(other);
                        i += 1;
                    }
                },
            }
        }

        Ok(ParseOutcome::NeedMore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn literals(line: &str) -> Vec<String> {
        let mut tok = Tokenizer::new();
        match tok.feed(line).unwrap() {
            ParseOutcome::Complete(tokens) => tokens
                .into_iter()
                .map(|t| t.as_literal().unwrap().to_string())
                .collect(),
            ParseOutcome::NeedMore => panic!("expected complete parse for {line:?}"),
        }
    }

    #[test]
    fn unquoted_words_round_trip_like_split() {
        let line = "echo one two three\n";
        assert_eq!(literals(line), vec!["echo", "one", "two", "three"]);
    }

    #[test]
    fn single_quotes_preserve_spaces() {
        let mut tok = Tokenizer::new();
        match tok.feed("echo 'Hello   World'\n").unwrap() {
            ParseOutcome::Complete(tokens) => {
                assert_eq!(
                    tokens,
                    vec![
                        Token::Literal("echo".to_string()),
                        Token::Literal("Hello   World".to_string()),
                    ]
                );
            }
            ParseOutcome::NeedMore => panic!("expected complete parse"),
        }
    }

    #[test]
    fn unclosed_single_quote_is_recoverable() {
        let mut tok = Tokenizer::new();
        let err = tok.feed("echo 'abc\n").unwrap_err();
        assert!(matches!(err, ShellError::UnclosedQuote));
        assert!(err.is_recoverable());
        // Resuming appends to the still-open quoted word.
        match tok.feed("def'\n").unwrap() {
            ParseOutcome::Complete(tokens) => {
                assert_eq!(
                    tokens,
                    vec![
                        Token::Literal("echo".to_string()),
                        Token::Literal("abc\ndef".to_string()),
                    ]
                );
            }
            ParseOutcome::NeedMore => panic!("expected complete parse"),
        }
    }

    #[test]
    fn unclosed_double_quote_is_recoverable() {
        let mut tok = Tokenizer::new();
        let err = tok.feed("echo \"abc\n").unwrap_err();
        assert!(matches!(err, ShellError::UnclosedQuote));
    }

    #[test]
    fn dangling_pipe_is_recoverable() {
        let mut tok = Tokenizer::new();
        let err = tok.feed("echo one | \n").unwrap_err();
        assert!(matches!(err, ShellError::DanglingPipe));
        assert!(err.is_recoverable());
    }

    #[test]
    fn pipe_cannot_lead_the_stream() {
        let mut tok = Tokenizer::new();
        match tok.feed("| echo one\n").unwrap() {
            ParseOutcome::Complete(tokens) => {
                // The tokeniser doesn't reject this shape itself (that's
                // the pipeline builder's job); it only
                // guarantees pipe-satisfaction around the operator itself.
                assert_eq!(tokens[0], Token::Literal("|".to_string()));
            }
            ParseOutcome::NeedMore => panic!("expected complete parse"),
        }
    }

    #[test]
    fn double_pipe_is_dangling() {
        let mut tok = Tokenizer::new();
        let err = tok.feed("echo one || echo two\n").unwrap_err();
        assert!(matches!(err, ShellError::DanglingPipe));
    }

    #[test]
    fn quoted_word_satisfies_a_preceding_pipe() {
        let mut tok = Tokenizer::new();
        match tok.feed("echo one | 'two'\n").unwrap() {
            ParseOutcome::Complete(tokens) => {
                assert_eq!(tokens[3], Token::Literal("two".to_string()));
            }
            ParseOutcome::NeedMore => panic!("expected complete parse"),
        }
    }

    #[test]
    fn escaped_word_satisfies_a_preceding_pipe() {
        let mut tok = Tokenizer::new();
        match tok.feed("echo one | \\x\n").unwrap() {
            ParseOutcome::Complete(tokens) => {
                assert_eq!(tokens[3], Token::Literal("x".to_string()));
            }
            ParseOutcome::NeedMore => panic!("expected complete parse"),
        }
    }

    #[test]
    fn redirect_defaults_to_fd_one_for_write() {
        let mut tok = Tokenizer::new();
        match tok.feed("echo hi > out.txt\n").unwrap() {
            ParseOutcome::Complete(tokens) => {
                assert_eq!(
                    tokens[2],
                    Token::Redirect {
                        op: RedirectOp::Write,
                        fd: 1
                    }
                );
            }
            ParseOutcome::NeedMore => panic!("expected complete parse"),
        }
    }

    #[test]
    fn explicit_fd_with_leading_zeros_normalises() {
        let mut tok = Tokenizer::new();
        match tok.feed("echo hi 002>log\n").unwrap() {
            ParseOutcome::Complete(tokens) => {
                assert_eq!(
                    tokens[2],
                    Token::Redirect {
                        op: RedirectOp::Write,
                        fd: 2
                    }
                );
            }
            ParseOutcome::NeedMore => panic!("expected complete parse"),
        }
    }

    #[test]
    fn clobber_operator_is_recognised() {
        let mut tok = Tokenizer::new();
        match tok.feed("echo hi >|out.txt\n").unwrap() {
            ParseOutcome::Complete(tokens) => {
                assert_eq!(
                    tokens[2],
                    Token::Redirect {
                        op: RedirectOp::Clobber,
                        fd: 1
                    }
                );
                assert_eq!(tokens[3], Token::Literal("out.txt".to_string()));
            }
            ParseOutcome::NeedMore => panic!("expected complete parse"),
        }
    }

    #[test]
    fn append_operator_is_recognised() {
        let mut tok = Tokenizer::new();
        match tok.feed("echo hi >>out.txt\n").unwrap() {
            ParseOutcome::Complete(tokens) => {
                assert_eq!(
                    tokens[2],
                    Token::Redirect {
                        op: RedirectOp::Append,
                        fd: 1
                    }
                );
            }
            ParseOutcome::NeedMore => panic!("expected complete parse"),
        }
    }

    #[test]
    fn unsupported_fd_amp_syntax_parses_as_literal_ampersand_target() {
        // "2>&" is not supported: it parses as an fd=2 redirect whose
        // target literal is the single character "&".
        let mut tok = Tokenizer::new();
        match tok.feed("echo 2>&\n").unwrap() {
            ParseOutcome::Complete(tokens) => {
                assert_eq!(
                    tokens[1],
                    Token::Redirect {
                        op: RedirectOp::Write,
                        fd: 2
                    }
                );
                assert_eq!(tokens[2], Token::Literal("&".to_string()));
            }
            ParseOutcome::NeedMore => panic!("expected complete parse"),
        }
    }

    #[test]
    fn redirect_with_no_target_before_newline_is_unexpected_token() {
        let mut tok = Tokenizer::new();
        let err = tok.feed("echo hi >\n").unwrap_err();
        assert!(matches!(err, ShellError::UnexpectedToken(_)));
    }

    #[test]
    fn read_redirect_defaults_to_fd_zero() {
        let mut tok = Tokenizer::new();
        match tok.feed("sort < in.txt\n").unwrap() {
            ParseOutcome::Complete(tokens) => {
                assert_eq!(
                    tokens[1],
                    Token::Redirect {
                        op: RedirectOp::Read,
                        fd: 0
                    }
                );
            }
            ParseOutcome::NeedMore => panic!("expected complete parse"),
        }
    }

    #[test]
    fn escaped_quote_in_double_quotes_is_literal() {
        let mut tok = Tokenizer::new();
        match tok.feed("echo \"say \\\"hi\\\"\"\n").unwrap() {
            ParseOutcome::Complete(tokens) => {
                assert_eq!(tokens[1], Token::Literal("say \"hi\"".to_string()));
            }
            ParseOutcome::NeedMore => panic!("expected complete parse"),
        }
    }

    #[test]
    fn backslash_in_single_quotes_is_literal() {
        let mut tok = Tokenizer::new();
        match tok.feed("echo 'a\\b'\n").unwrap() {
            ParseOutcome::Complete(tokens) => {
                assert_eq!(tokens[1], Token::Literal("a\\b".to_string()));
            }
            ParseOutcome::NeedMore => panic!("expected complete parse"),
        }
    }

    #[test]
    fn unquoted_escape_consumes_next_char_verbatim() {
        let mut tok = Tokenizer::new();
        match tok.feed("echo foo\\ bar\n").unwrap() {
            ParseOutcome::Complete(tokens) => {
                assert_eq!(tokens[1], Token::Literal("foo bar".to_string()));
            }
            ParseOutcome::NeedMore => panic!("expected complete parse"),
        }
    }
}
