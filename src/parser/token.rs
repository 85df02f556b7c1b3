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

//! The token data model.
//!
//! A token is either a plain word/operand or a redirect operator — never a
//! struct with two nullable fields relying on "exactly one of these is set"
//! by convention. The closed enum below makes "both set" or "neither set"
//! unrepresentable.

use std::fmt;

/// A redirection operator, carrying the file-descriptor it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectOp {
    /// `>`: write-only, exclusive create (fails if the target exists).
    Write,
    /// `>|`: read-write, truncate-create (clobber).
    Clobber,
    /// `>>`: write-only, append, create-if-absent.
    Append,
    /// `<`: read-only (target must exist).
    Read,
}

impl RedirectOp {
    /// The fd a redirection targets by default, absent an explicit prefix
    /// (`1` for the three output forms, `0` for input).
    pub fn default_fd(self) -> u32 {
        match self {
            RedirectOp::Write | RedirectOp::Clobber | RedirectOp::Append => 1,
            RedirectOp::Read => 0,
        }
    }
}

impl fmt::Display for RedirectOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RedirectOp::Write => ">",
            RedirectOp::Clobber => ">|",
            RedirectOp::Append => ">>",
            RedirectOp::Read => "<",
        };
        f.write_str(s)
    }
}

/// One lexical token emitted by the tokeniser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A word, operand, or the distinguished string `"|"`.
    Literal(String),
    /// A redirection operator bound to a file descriptor. Always immediately
    /// followed, in a complete token stream, by a `Literal` naming its target.
    Redirect { op: RedirectOp, fd: u32 },
}

impl Token {
    pub fn is_pipe(&self) -> bool {
        matches!(self, Token::Literal(s) if s == "|")
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Token::Literal(s) => Some(s),
            Token::Redirect { .. } => None,
        }
    }
}
