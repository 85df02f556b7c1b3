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

//! Command-line configuration surface, built with `clap`'s derive API.
//!
//! `PATH`, `HOME`, and `PWD` remain pure environment-variable collaborators
//! — this struct never substitutes for them, only augments the process
//! with logging/scripting knobs.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "rushell", about = "An interactive POSIX-style command shell")]
pub struct Cli {
    /// Enable file logging (also settable via `RUSHELL_LOG=true`).
    #[arg(long, env = "RUSHELL_LOG")]
    pub log: bool,

    /// Directory the rolling log file is written under.
    #[arg(long, default_value = "rushell-logs")]
    pub log_dir: PathBuf,

    /// Run one command non-interactively and exit with its status, instead
    /// of starting the raw-mode line editor. Exercised by the integration
    /// test suite, which cannot drive a real terminal.
    #[arg(short = 'c', value_name = "COMMAND")]
    pub command: Option<String>,
}
