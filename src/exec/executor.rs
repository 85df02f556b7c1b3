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

//! The executor: spawns processes for an external pipeline, wires
//! stdin/stdout/stderr and extra-fd redirections through files and pipes,
//! awaits completion in order, and propagates the last stage's exit status.

use std::process::{Child, Command, Stdio};

use crate::error::{ShellError, ShellResult};
use crate::exec::extra_fds::inherit_extra_fd;
use crate::exec::process_group::{set_process_group, SigIntGuard};
use crate::exec::redirect::{self, OpenRedirection};
use crate::parser::{Pipeline, Stage};

/// All of one stage's pre-opened redirection files, split by which fd slot
/// they target (opening happens entirely before any process spawns — every stage's
/// files are opened up front, so a later stage's open failure aborts before
/// any process exists).
struct StageFiles {
    stdin: Option<std::fs::File>,
    stdout: Option<std::fs::File>,
    stderr: Option<std::fs::File>,
    extra: Vec<OpenRedirection>,
}

fn open_stage_files(stage: &Stage) -> ShellResult<StageFiles> {
    let mut stdin = None;
    let mut stdout = None;
    let mut stderr = None;
    let mut extra = Vec::new();

    for redirection in &stage.redirections {
        let opened = redirect::open(redirection)?;
        match opened.fd {
            0 => stdin = Some(opened.file),
            1 => stdout = Some(opened.file),
            2 => stderr = Some(opened.file),
            _ => extra.push(opened),
        }
    }

    Ok(StageFiles {
        stdin,
        stdout,
        stderr,
        extra,
    })
}

/// Runs every stage's external process, wires pipes/redirections, and
/// returns the last stage's exit code. Assumes `pipeline` has already been
/// confirmed not to be a lone builtin stage.
pub fn execute(pipeline: &Pipeline) -> ShellResult<i32> {
    let n = pipeline.stages.len();

    // Step 1: pre-open every redirection target for every stage, before any
    // process is spawned — a failure here leaves zero children running.
    let mut files: Vec<StageFiles> = pipeline
        .stages
        .iter()
        .map(open_stage_files)
        .collect::<ShellResult<_>>()?;

    let _sigint_guard = SigIntGuard::install();

    let mut children: Vec<Child> = Vec::with_capacity(n);
    let mut prev_stdout: Option<std::process::ChildStdout> = None;
    let mut leader_pid: Option<i32> = None;
    let mut spawn_error: Option<ShellError> = None;

    for (i, stage) in pipeline.stages.iter().enumerate() {
        let stage_files = &mut files[i];

        let stdin_stdio = match stage_files.stdin.take() {
            Some(file) => Stdio::from(file),
            None if i > 0 => match prev_stdout.take() {
                Some(out) => Stdio::from(out),
                // The upstream stage redirected its own stdout away from
                // the pipe; this stage sees immediate EOF on stdin.
                None => Stdio::null(),
            },
            None => Stdio::inherit(),
        };

        let stdout_stdio = match stage_files.stdout.take() {
            Some(file) => Stdio::from(file),
            None if i < n - 1 => Stdio::piped(),
            None => Stdio::inherit(),
        };

        let stderr_stdio = match stage_files.stderr.take() {
            Some(file) => Stdio::from(file),
            None => Stdio::inherit(),
        };

        let resolved = stage
            .resolved_path
            .as_ref()
            .expect("external stage must carry a resolved path");

        let mut cmd = Command::new(resolved);
        cmd.args(&stage.argv[1..])
            .stdin(stdin_stdio)
            .stdout(stdout_stdio)
            .stderr(stderr_stdio);

        set_process_group(&mut cmd, leader_pid);

        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            for extra in &stage_files.extra {
                inherit_extra_fd(&mut cmd, extra.fd, extra.file.as_raw_fd());
            }
        }

        match cmd.spawn() {
            Ok(mut child) => {
                tracing::debug!(stage = i, pid = child.id(), "spawned stage");
                if leader_pid.is_none() {
                    leader_pid = Some(child.id() as i32);
                }
                // `Child::stdout` is only populated when `Stdio::piped()`
                // was actually requested above, so this is `None` both at
                // the last stage and whenever this stage redirected its
                // own stdout to a file instead.
                prev_stdout = child.stdout.take();
                children.push(child);
            }
            Err(err) => {
                tracing::warn!(stage = i, error = %err, "spawn failed");
                spawn_error = Some(ShellError::Io(err));
                break;
            }
        }

        // Drop this stage's extra-fd files now that the child has forked
        // and dup2'd them; the parent's copies are no longer needed.
        files[i].extra.clear();
    }

    if let Some(err) = spawn_error {
        // Abandon already-started stages: dropping their Stdio handles
        // already closed pipe write ends above, so downstream EOFs happen
        // naturally; reap every spawned child before surfacing the error.
        tracing::warn!(abandoned = children.len(), "reaping already-spawned stages after spawn failure");
        for mut child in children {
            let _ = child.wait();
        }
        return Err(err);
    }

    // Step 3/4: close our copies of every pipe end (already implicit via
    // `Stdio::piped()`'s ownership transfer / `take()` above) and wait on
    // children in order, propagating the last stage's exit status.
    let mut last_status = 0;
    for (idx, mut child) in children.into_iter().enumerate() {
        let status = child.wait().map_err(ShellError::Io)?;
        if idx == n - 1 {
            last_status = status.code().unwrap_or_else(|| signal_exit_code(&status));
        }
    }

    Ok(last_status)
}

#[cfg(unix)]
fn signal_exit_code(status: &std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(|sig| 128 + sig).unwrap_or(1)
}

#[cfg(not(unix))]
fn signal_exit_code(_status: &std::process::ExitStatus) -> i32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{build_pipeline, ParseOutcome, Tokenizer};
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::PermissionsExt;

    fn pipeline_for(line: &str, path_var: &str) -> Pipeline {
        let mut tok = Tokenizer::new();
        let tokens = match tok.feed(line).unwrap() {
            ParseOutcome::Complete(t) => t,
            ParseOutcome::NeedMore => panic!("incomplete: {line:?}"),
        };
        build_pipeline(tokens, path_var).unwrap()
    }

    fn real_path_var() -> String {
        std::env::var("PATH").unwrap_or_else(|_| "/usr/bin:/bin".to_string())
    }

    #[test]
    fn single_external_stage_runs_and_exits_zero() {
        let path_var = real_path_var();
        let pipeline = pipeline_for("true\n", &path_var);
        let status = execute(&pipeline).unwrap();
        assert_eq!(status, 0);
    }

    #[test]
    fn nonzero_exit_is_propagated_not_treated_as_shell_error() {
        let path_var = real_path_var();
        let pipeline = pipeline_for("false\n", &path_var);
        let status = execute(&pipeline).unwrap();
        assert_ne!(status, 0);
    }

    #[test]
    fn pipe_wires_stdout_to_stdin() {
        let path_var = real_path_var();
        let dir = tempfile::tempdir().unwrap();
        let out_file = dir.path().join("wc_out.txt");

        let mut tok = Tokenizer::new();
        let line = format!("echo one two three | wc -w >{}\n", out_file.display());
        let tokens = match tok.feed(&line).unwrap() {
            ParseOutcome::Complete(t) => t,
            ParseOutcome::NeedMore => panic!("incomplete"),
        };
        let pipeline = build_pipeline(tokens, &path_var).unwrap();
        let status = execute(&pipeline).unwrap();
        assert_eq!(status, 0);
        let contents = std::fs::read_to_string(&out_file).unwrap();
        assert_eq!(contents.trim(), "3");
    }

    #[test]
    fn unresolvable_stage_fails_pipeline_build_before_any_process_exists() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good");
        std::fs::write(&good, "#!/bin/sh\ncat\n").unwrap();
        let mut perm = std::fs::metadata(&good).unwrap().permissions();
        perm.set_mode(0o755);
        std::fs::set_permissions(&good, perm).unwrap();
        let path_var = dir.path().to_str().unwrap().to_string();

        // "good" resolves, "missing_binary" does not — pipeline build itself
        // fails NotFound before any process exists, so `execute()` is never
        // reached at all.
        let mut tok = Tokenizer::new();
        let tokens = match tok.feed("good | missing_binary\n").unwrap() {
            ParseOutcome::Complete(t) => t,
            ParseOutcome::NeedMore => panic!("incomplete"),
        };
        let result = build_pipeline(tokens, &path_var);
        assert!(matches!(result, Err(ShellError::NotFound(name)) if name == "missing_binary"));
    }

    #[test]
    fn spawn_failure_at_later_stage_reaps_already_started_stages() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("good_ran");

        let good = dir.path().join("good");
        std::fs::write(&good, format!("#!/bin/sh\ntouch '{}'\n", marker.display())).unwrap();
        let mut good_perm = std::fs::metadata(&good).unwrap().permissions();
        good_perm.set_mode(0o755);
        std::fs::set_permissions(&good, good_perm).unwrap();

        let bad = dir.path().join("bad");
        std::fs::write(&bad, "#!/bin/sh\necho should not run\n").unwrap();
        let mut bad_perm = std::fs::metadata(&bad).unwrap().permissions();
        bad_perm.set_mode(0o755);
        std::fs::set_permissions(&bad, bad_perm).unwrap();

        let path_var = dir.path().to_str().unwrap().to_string();

        // Both stages are executable at build time, so the pipeline builds
        // successfully and PATH resolution for "bad" already succeeded.
        let pipeline = pipeline_for("good | bad\n", &path_var);

        // Strip "bad"'s executable bit *after* the pipeline was built, so
        // `execute()` hits a genuine execve-time spawn failure (EACCES) at
        // stage 1 instead of a build-time PATH-resolution failure.
        std::fs::set_permissions(&bad, std::fs::Permissions::from_mode(0o644)).unwrap();

        let err = execute(&pipeline).unwrap_err();
        assert!(matches!(err, ShellError::Io(_)));

        // Stage 0 ("good") had already spawned when stage 1 failed; the
        // executor must wait on it rather than abandon it, so its marker
        // file is on disk by the time `execute()` returns.
        assert!(marker.exists());
    }
}
