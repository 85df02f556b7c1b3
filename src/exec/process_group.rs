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

//! Foreground process-group and `SIGINT`-forwarding mechanics.
//!
//! The shell ignores `SIGINT` for the duration of a foreground pipeline so a
//! `Ctrl-C` delivered to the whole process group reaches only the children,
//! then restores default handling on every exit path via RAII.

#[cfg(unix)]
mod unix_impl {
    use std::os::unix::process::CommandExt;
    use std::process::Command;

    /// Makes `cmd`'s future child the leader of a new process group (first
    /// stage of a pipeline), or a member of `leader_pid`'s group (every
    /// subsequent stage).
    pub fn set_process_group(cmd: &mut Command, leader_pid: Option<i32>) {
        let leader_pid = leader_pid.unwrap_or(0);
        unsafe {
            cmd.pre_exec(move || {
                let rc = libc::setpgid(0, leader_pid);
                if rc != 0 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }
    }

    /// RAII guard: ignores `SIGINT` in the shell process for its lifetime,
    /// restoring the previous disposition (`SIG_DFL`) on drop — covering
    /// every exit path (normal return, early `?`, or unwind).
    pub struct SigIntGuard;

    impl SigIntGuard {
        pub fn install() -> Self {
            unsafe {
                libc::signal(libc::SIGINT, libc::SIG_IGN);
            }
            SigIntGuard
        }
    }

    impl Drop for SigIntGuard {
        fn drop(&mut self) {
            unsafe {
                libc::signal(libc::SIGINT, libc::SIG_DFL);
            }
        }
    }
}

#[cfg(not(unix))]
mod other_impl {
    use std::process::Command;

    pub fn set_process_group(_cmd: &mut Command, _leader_pid: Option<i32>) {}

    pub struct SigIntGuard;

    impl SigIntGuard {
        pub fn install() -> Self {
            SigIntGuard
        }
    }
}

#[cfg(unix)]
pub use unix_impl::{set_process_group, SigIntGuard};
#[cfg(not(unix))]
pub use other_impl::{set_process_group, SigIntGuard};
