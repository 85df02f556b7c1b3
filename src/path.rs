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

//! `PATH` directory walking, shared by the completion engine and the
//! pipeline builder's argv[0] resolution.
//!
//! Deliberately the only place in the crate that reads the `PATH`
//! environment variable directly — everything else takes a resolved path or
//! a list of candidates.

use std::fs;
use std::path::{Path, PathBuf};

/// Splits `PATH` into directories, treating an empty element as `.`.
pub fn path_dirs(path_var: &str) -> Vec<PathBuf> {
    path_var.split(':').map(|s| if s.is_empty() { PathBuf::from(".") } else { PathBuf::from(s) }).collect()
}

/// True if `entry` is a regular file (not a directory) with at least one
/// execute bit set.
#[cfg(unix)]
fn is_executable(entry: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match fs::metadata(entry) {
        Ok(meta) => !meta.is_dir() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(entry: &Path) -> bool {
    matches!(fs::metadata(entry), Ok(meta) if !meta.is_dir())
}

/// Resolves `name` against `PATH`, returning the first executable match.
///
/// A `name` containing a `/` (e.g. `./foo`) is resolved directly against the
/// current directory instead of scanning `PATH`.
pub fn resolve(name: &str, path_var: &str) -> Option<PathBuf> {
    if name.contains('/') {
        let candidate = PathBuf::from(name);
        return is_executable(&candidate).then_some(candidate);
    }
    for dir in path_dirs(path_var) {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Scans every `PATH` directory for entries whose name starts with `prefix`,
/// deduplicated by name (first directory wins, matching shell `PATH` lookup
/// order). Missing directories are skipped silently; used by the completion
/// engine's prefix-match stage.
pub fn binary_matches(prefix: &str, path_var: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut matches = Vec::new();
    for dir in path_dirs(path_var) {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = match name.to_str() {
                Some(n) => n,
                None => continue,
            };
            if !name.starts_with(prefix) || seen.contains(name) {
                continue;
            }
            if is_executable(&entry.path()) {
                seen.insert(name.to_string());
                matches.push(name.to_string());
            }
        }
    }
    matches.sort();
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    fn make_executable(dir: &Path, name: &str) -> PathBuf {
        let p = dir.join(name);
        let mut f = fs::File::create(&p).unwrap();
        writeln!(f, "#!/bin/sh").unwrap();
        let mut perm = f.metadata().unwrap().permissions();
        perm.set_mode(0o755);
        fs::set_permissions(&p, perm).unwrap();
        p
    }

    #[test]
    fn resolve_finds_executable_in_path() {
        let dir = tempfile::tempdir().unwrap();
        make_executable(dir.path(), "mytool");
        let path_var = dir.path().to_str().unwrap();
        let found = resolve("mytool", path_var).unwrap();
        assert_eq!(found, dir.path().join("mytool"));
    }

    #[test]
    fn resolve_skips_non_executable() {
        let dir = tempfile::tempdir().unwrap();
        fs::File::create(dir.path().join("readme")).unwrap();
        let path_var = dir.path().to_str().unwrap();
        assert!(resolve("readme", path_var).is_none());
    }

    #[test]
    fn empty_path_element_is_cwd() {
        let dirs = path_dirs(":/usr/bin");
        assert_eq!(dirs[0], PathBuf::from("."));
    }

    #[test]
    fn binary_matches_dedupes_and_sorts() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        make_executable(dir_a.path(), "zzz");
        make_executable(dir_a.path(), "foobar");
        make_executable(dir_b.path(), "foobar");
        make_executable(dir_b.path(), "foobaz");
        let path_var = format!("{}:{}", dir_a.path().display(), dir_b.path().display());
        let matches = binary_matches("foo", &path_var);
        assert_eq!(matches, vec!["foobar".to_string(), "foobaz".to_string()]);
    }
}
