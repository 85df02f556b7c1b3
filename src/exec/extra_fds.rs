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

//! Extra-fd (>2) redirection inheritance.
//!
//! `std::process::Command` only exposes stdin/stdout/stderr directly, so a
//! redirection targeting fd 3+ is wired with a `pre_exec` closure that
//! `dup2`s the already-open file onto its target fd number in the freshly
//! forked child, before `exec` replaces the image.

#[cfg(unix)]
pub fn inherit_extra_fd(cmd: &mut std::process::Command, target_fd: u32, source_fd: std::os::unix::io::RawFd) {
    use std::os::unix::process::CommandExt;
    let target_fd = target_fd as libc::c_int;
    unsafe {
        cmd.pre_exec(move || {
            if libc::dup2(source_fd, target_fd) < 0 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(unix))]
pub fn inherit_extra_fd(_cmd: &mut std::process::Command, _target_fd: u32, _source_fd: i32) {
    // No portable stdlib surface for fd inheritance beyond stdin/stdout/stderr.
}
