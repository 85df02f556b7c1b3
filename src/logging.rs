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

//! Structured diagnostics via `tracing` and a rolling file appender.
//! Because the shell's own stdout/stderr *are* the user's terminal, trace
//! output never goes to the display — only the rolling file, gated behind
//! `--log`/`RUSHELL_LOG`.

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Where trace spans go: a rolling log file, or nowhere. Routing trace
/// spans through the interactive prompt's own writer would corrupt the
/// line editor's redraw invariant, so stdout/stderr are never an option
/// here.
pub enum LogSink {
    File(PathBuf),
    Off,
}

/// Installs the global `tracing` subscriber. Returns the
/// [`tracing_appender::non_blocking::WorkerGuard`] the caller must keep
/// alive for the process' lifetime (dropping it stops the background
/// flush thread). `None` when logging is off.
pub fn init(sink: LogSink) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let dir = match sink {
        LogSink::Off => return Ok(None),
        LogSink::File(dir) => dir,
    };

    std::fs::create_dir_all(&dir).into_diagnostic()?;
    let appender = try_create_rolling_appender(&dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("trace"))
        .with(file_layer)
        .try_init()
        .into_diagnostic()?;

    Ok(Some(guard))
}

fn try_create_rolling_appender(dir: &Path) -> Result<tracing_appender::rolling::RollingFileAppender> {
    Ok(tracing_appender::rolling::daily(dir, "rushell.log"))
}
