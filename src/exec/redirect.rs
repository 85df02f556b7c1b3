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

//! Pre-opens redirection targets before any process is spawned.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{ShellError, ShellResult};
use crate::parser::{RedirectOp, Redirection};

/// A redirection resolved to an open file handle, still tagged with the fd
/// it targets so the executor can wire it into the right slot.
pub struct OpenRedirection {
    pub fd: u32,
    pub file: File,
}

fn map_open_err(err: std::io::Error, path: &Path) -> ShellError {
    tracing::warn!(path = %path.display(), error = %err, "redirection target failed to open");
    match err.kind() {
        std::io::ErrorKind::AlreadyExists => ShellError::FileExists(path.display().to_string()),
        std::io::ErrorKind::NotFound => {
            ShellError::FileDoesNotExist(path.display().to_string())
        }
        std::io::ErrorKind::PermissionDenied => {
            ShellError::Permission(path.display().to_string())
        }
        _ => ShellError::Io(err),
    }
}

#[cfg(unix)]
fn ensure_parent_dir(path: &Path) -> ShellResult<()> {
    use std::os::unix::fs::DirBuilderExt;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::DirBuilder::new()
                .recursive(true)
                .mode(0o750)
                .create(parent)?;
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_parent_dir(path: &Path) -> ShellResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Opens one redirection target with the flag combination its operator
/// mandates. `>`/`>|` get their created file mode 0644 and have their
/// parent directory created recursively (mode 0750) if absent; `>>` does
/// not auto-create parents.
pub fn open(redirection: &Redirection) -> ShellResult<OpenRedirection> {
    let path = PathBuf::from(&redirection.path);

    let file = match redirection.op {
        RedirectOp::Write => {
            ensure_parent_dir(&path)?;
            open_with_mode(
                OpenOptions::new().write(true).create_new(true),
                &path,
            )?
        }
        RedirectOp::Clobber => {
            ensure_parent_dir(&path)?;
            open_with_mode(
                OpenOptions::new().read(true).write(true).truncate(true).create(true),
                &path,
            )?
        }
        RedirectOp::Append => open_with_mode(
            OpenOptions::new().write(true).append(true).create(true),
            &path,
        )?,
        RedirectOp::Read => OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(|e| map_open_err(e, &path))?,
    };

    Ok(OpenRedirection {
        fd: redirection.fd,
        file,
    })
}

#[cfg(unix)]
fn open_with_mode(opts: &mut OpenOptions, path: &Path) -> ShellResult<File> {
    use std::os::unix::fs::OpenOptionsExt;
    opts.mode(0o644).open(path).map_err(|e| map_open_err(e, path))
}

#[cfg(not(unix))]
fn open_with_mode(opts: &mut OpenOptions, path: &Path) -> ShellResult<File> {
    opts.open(path).map_err(|e| map_open_err(e, path))
}
