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

//! Builtin dispatcher: `exit`, `echo`, `type`, `pwd`, `cd`.
//!
//! Each builtin writes to the stage's redirected streams rather than the
//! process' own stdout/stderr directly, so redirections on a builtin stage
//! (`echo hi > out.txt`) are honoured.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{ShellError, ShellResult};
use crate::parser::pipeline::is_builtin;
use crate::path;

/// Where a builtin's stdout/stderr actually go for one invocation. The
/// REPL constructs this per-stage from the stage's pre-opened redirection
/// files, falling back to the shell's own terminal streams.
pub struct BuiltinStreams<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

/// Runs `argv` (a builtin stage's argv, `argv[0]` already confirmed to be
/// one of the five builtin names) against `streams`.
///
/// `cwd` is the shell's current-working-directory cell; `cd` mutates it in
/// place and `pwd` reads it. `path_var`/`home_var` are the `PATH`/`HOME`
/// collaborators the builtins still need to do their job.
pub fn dispatch(
    argv: &[String],
    streams: &mut BuiltinStreams<'_>,
    cwd: &mut PathBuf,
    path_var: &str,
    home_var: Option<&str>,
) -> ShellResult<()> {
    match argv[0].as_str() {
        "exit" => exit(argv, streams),
        "echo" => echo(argv, streams),
        "type" => r#type(argv, streams, path_var),
        "pwd" => pwd(streams, cwd),
        "cd" => cd(argv, streams, cwd, home_var),
        other => unreachable!("dispatch called with non-builtin {other:?}"),
    }
}

fn exit(argv: &[String], streams: &mut BuiltinStreams<'_>) -> ShellResult<()> {
    if argv.len() == 2 && argv[1] == "0" {
        return Err(ShellError::ExitRequested(0));
    }
    let joined = argv.join(" ");
    let _ = writeln!(streams.stderr, "{joined}: not found");
    Err(ShellError::NotFound(joined))
}

fn echo(argv: &[String], streams: &mut BuiltinStreams<'_>) -> ShellResult<()> {
    let joined = argv[1..].join(" ");
    writeln!(streams.stdout, "{joined}")?;
    Ok(())
}

fn r#type(argv: &[String], streams: &mut BuiltinStreams<'_>, path_var: &str) -> ShellResult<()> {
    for name in &argv[1..] {
        if is_builtin(name) {
            writeln!(streams.stdout, "{name} is a shell builtin")?;
        } else if let Some(resolved) = path::resolve(name, path_var) {
            writeln!(streams.stdout, "{name} is {}", resolved.display())?;
        } else {
            writeln!(streams.stdout, "{name}: not found")?;
        }
    }
    Ok(())
}

fn pwd(streams: &mut BuiltinStreams<'_>, cwd: &PathBuf) -> ShellResult<()> {
    writeln!(streams.stdout, "{}", cwd.display())?;
    Ok(())
}

/// `cd`'s "no path traversal beyond what a plain join would do" guard: any
/// run of three-or-more consecutive dots anywhere in the path is rejected
/// up front (`.*\.{3,}.*`).
fn looks_like_bad_traversal(path: &str) -> bool {
    let mut run = 0usize;
    for c in path.chars() {
        if c == '.' {
            run += 1;
            if run >= 3 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

fn cd(
    argv: &[String],
    streams: &mut BuiltinStreams<'_>,
    cwd: &mut PathBuf,
    home_var: Option<&str>,
) -> ShellResult<()> {
    let raw = argv.get(1).map(String::as_str).unwrap_or("");

    let expanded = if let Some(rest) = raw.strip_prefix('~') {
        let home = home_var.unwrap_or("");
        format!("{home}{rest}")
    } else {
        raw.to_string()
    };

    if looks_like_bad_traversal(&expanded) {
        let _ = writeln!(
            streams.stderr,
            "cd: {expanded}: No such file or directory"
        );
        return Err(ShellError::FileDoesNotExist(expanded));
    }

    let target = Path::new(&expanded);
    let candidate = if target.is_absolute() {
        target.to_path_buf()
    } else {
        cwd.join(target)
    };

    match std::fs::metadata(&candidate) {
        Ok(meta) if meta.is_dir() => {
            let canonical = std::fs::canonicalize(&candidate).unwrap_or(candidate);
            // Safety: single-threaded access to the environment at this
            // point — no other thread in this process reads or writes env
            // vars concurrently with a builtin dispatch.
            unsafe {
                std::env::set_var("PWD", &canonical);
            }
            *cwd = canonical;
            Ok(())
        }
        _ => {
            let _ = writeln!(
                streams.stderr,
                "cd: {expanded}: No such file or directory"
            );
            Err(ShellError::FileDoesNotExist(expanded))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn streams<'a>(out: &'a mut Vec<u8>, err: &'a mut Vec<u8>) -> BuiltinStreams<'a> {
        BuiltinStreams {
            stdout: out,
            stderr: err,
        }
    }

    #[test]
    fn echo_joins_with_single_space() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let argv = vec!["echo".to_string(), "Hello".to_string(), "World!".to_string()];
        echo(&argv, &mut streams(&mut out, &mut err)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Hello World!\n");
    }

    #[test]
    fn exit_zero_requests_shutdown() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let argv = vec!["exit".to_string(), "0".to_string()];
        let result = exit(&argv, &mut streams(&mut out, &mut err));
        assert!(matches!(result, Err(ShellError::ExitRequested(0))));
    }

    #[test]
    fn exit_with_garbage_reports_not_found() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let argv = vec!["exit".to_string(), "oops".to_string()];
        let result = exit(&argv, &mut streams(&mut out, &mut err));
        assert!(matches!(result, Err(ShellError::NotFound(_))));
        assert_eq!(String::from_utf8(err).unwrap(), "exit oops: not found\n");
    }

    #[test]
    fn type_reports_builtin_and_not_found() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let argv = vec!["type".to_string(), "echo".to_string(), "nope_nope".to_string()];
        r#type(&argv, &mut streams(&mut out, &mut err), "/nonexistent").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "echo is a shell builtin\nnope_nope: not found\n");
    }

    #[test]
    fn cd_rejects_triple_dot_traversal() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut cwd = PathBuf::from("/tmp");
        let argv = vec!["cd".to_string(), "...".to_string()];
        let result = cd(&argv, &mut streams(&mut out, &mut err), &mut cwd, None);
        assert!(result.is_err());
        assert_eq!(cwd, PathBuf::from("/tmp"));
    }

    #[test]
    fn cd_and_pwd_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut cwd = std::env::current_dir().unwrap();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let argv = vec!["cd".to_string(), dir.path().to_str().unwrap().to_string()];
        cd(&argv, &mut streams(&mut out, &mut err), &mut cwd, None).unwrap();

        let mut out2 = Vec::new();
        let mut err2 = Vec::new();
        pwd(&mut streams(&mut out2, &mut err2), &cwd).unwrap();
        let expected = format!("{}\n", std::fs::canonicalize(dir.path()).unwrap().display());
        assert_eq!(String::from_utf8(out2).unwrap(), expected);
    }

    #[test]
    fn cd_expands_tilde() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let mut cwd = PathBuf::from("/");
        let mut out = Vec::new();
        let mut err = Vec::new();
        let argv = vec!["cd".to_string(), "~/sub".to_string()];
        cd(
            &argv,
            &mut streams(&mut out, &mut err),
            &mut cwd,
            Some(dir.path().to_str().unwrap()),
        )
        .unwrap();
        assert_eq!(cwd, std::fs::canonicalize(dir.path().join("sub")).unwrap());
    }
}
