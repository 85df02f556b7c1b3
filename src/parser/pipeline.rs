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

//! Pipeline builder: turns a flat token stream into an ordered list
//! of [`Stage`]s, resolving each external stage's `argv[0]` against `PATH`.

use std::path::PathBuf;
use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString};

use crate::error::{ShellError, ShellResult};
use crate::parser::token::{RedirectOp, Token};
use crate::path;

/// The closed set of builtin commands, as a proper `strum`-derived enum
/// rather than a bag of string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Builtin {
    Exit,
    Echo,
    Type,
    Pwd,
    Cd,
}

/// The builtin names, in declaration order, for the completion engine's
/// prefix scan.
pub const BUILTINS: [&str; 5] = ["exit", "echo", "type", "pwd", "cd"];

pub fn is_builtin(name: &str) -> bool {
    Builtin::from_str(name).is_ok()
}

/// A single `(fd, op, path)` redirection directive, separable at parse time
/// from the stage's argv (redirections embedded in an
/// argument list still apply, since they were tokenised out beforehand).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub fd: u32,
    pub op: RedirectOp,
    pub path: String,
}

/// One command of a pipeline, with its argv, redirections, and (for
/// external stages) the resolved absolute/relative path to exec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub argv: Vec<String>,
    pub redirections: Vec<Redirection>,
    pub resolved_path: Option<PathBuf>,
}

impl Stage {
    pub fn is_builtin(&self) -> bool {
        self.argv.first().map(|s| is_builtin(s)).unwrap_or(false)
    }
}

/// An ordered, non-empty sequence of stages connected by pipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    /// True when this is a single stage whose head names a builtin — the
    /// only shape that skips `PATH` resolution and spawn plumbing entirely.
    pub fn is_single_builtin(&self) -> bool {
        self.stages.len() == 1 && self.stages[0].is_builtin()
    }
}

/// Splits `tokens` at Literal `"|"` boundaries and builds a [`Pipeline`],
/// resolving every external stage's `argv[0]` against `path_var`.
///
/// Builtin resolution is skipped only for a lone single-stage pipeline whose
/// argv[0] is in the builtin set; a builtin name appearing as one stage of a
/// longer pipeline is still resolved against `PATH` like any other external
/// command, and if that lookup fails, `NotFound` still hits.
pub fn build(tokens: Vec<Token>, path_var: &str) -> ShellResult<Pipeline> {
    let mut stages = Vec::new();
    let mut current: Vec<Token> = Vec::new();

    for token in tokens {
        if token.is_pipe() {
            stages.push(std::mem::take(&mut current));
        } else {
            current.push(token);
        }
    }
    stages.push(current);

    let multi_stage = stages.len() > 1;
    let mut built = Vec::with_capacity(stages.len());
    for stage_tokens in stages {
        built.push(build_stage(stage_tokens, path_var, multi_stage)?);
    }

    tracing::debug!(stages = built.len(), "pipeline built");
    Ok(Pipeline { stages: built })
}

fn build_stage(tokens: Vec<Token>, path_var: &str, multi_stage: bool) -> ShellResult<Stage> {
    let mut iter = tokens.into_iter().peekable();

    let argv0 = match iter.next() {
        Some(Token::Literal(text)) => text,
        _ => return Err(ShellError::NotFound(String::new())),
    };

    let mut argv = vec![argv0];
    let mut redirections = Vec::new();

    while let Some(token) = iter.next() {
        match token {
            Token::Literal(text) => argv.push(text),
            Token::Redirect { op, fd } => {
                let path = match iter.next() {
                    Some(Token::Literal(text)) => text,
                    _ => return Err(ShellError::BrokenRedirect),
                };
                redirections.push(Redirection { fd, op, path });
            }
        }
    }

    let skip_resolution = !multi_stage && is_builtin(&argv[0]);
    let resolved_path = if skip_resolution {
        tracing::debug!(name = %argv[0], "skipping PATH resolution for single builtin stage");
        None
    } else {
        tracing::debug!(name = %argv[0], "resolving argv[0] against PATH");
        Some(path::resolve(&argv[0], path_var).ok_or_else(|| ShellError::NotFound(argv[0].clone()))?)
    };

    Ok(Stage {
        argv,
        redirections,
        resolved_path,
    })
}
