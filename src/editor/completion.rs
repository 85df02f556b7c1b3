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

//! Completion engine: a pure function from edit-buffer text plus bell
//! state to a [`CompletionOutcome`], so the caller — the line editor —
//! decides how to redraw. Kept free of terminal I/O so the two-stage
//! tab-completion algorithm can be unit tested without a real terminal.

use crate::parser::pipeline::BUILTINS;
use crate::path;

/// What the completion engine wants the caller to do with the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Nothing matched or the buffer was empty; buffer stays as-is.
    Unchanged,
    /// Ring the terminal bell; buffer stays as-is.
    Bell,
    /// Replace the whole buffer with this text.
    Replaced(String),
    /// Multiple candidates share the buffer's current prefix exactly; list
    /// them (second consecutive TAB press with no further extension possible).
    Listed(Vec<String>),
}

/// Runs the two-stage tab-completion algorithm against `buffer`, returning
/// the outcome and the bell count that should replace `bell_count` afterward.
pub fn complete(buffer: &str, bell_count: u8, path_var: &str) -> (CompletionOutcome, u8) {
    let word = buffer.trim_start();
    if word.is_empty() {
        return (CompletionOutcome::Unchanged, bell_count);
    }

    if let Some(first) = BUILTINS.iter().find(|name| name.starts_with(word)) {
        // The system intentionally does not cycle multiple builtin
        // candidates — the first alphabetical-in-array match wins.
        return (CompletionOutcome::Replaced(format!("{first} ")), 0);
    }

    let matches = path::binary_matches(word, path_var);

    match matches.len() {
        0 => (CompletionOutcome::Bell, bell_count),
        1 => (CompletionOutcome::Replaced(format!("{} ", matches[0])), 0),
        _ => {
            let prefix = common_prefix(&matches);
            if prefix.len() > word.len() {
                (CompletionOutcome::Replaced(prefix), 0)
            } else if bell_count == 0 {
                (CompletionOutcome::Bell, 1)
            } else {
                (CompletionOutcome::Listed(matches), bell_count)
            }
        }
    }
}

/// Longest common prefix of `items`, byte-wise (executable names are
/// effectively ASCII in practice; this degrades gracefully — never panics —
/// for non-ASCII names too, since it only ever truncates at a boundary
/// where all inputs already agreed byte-for-byte).
fn common_prefix(items: &[String]) -> String {
    let Some(first) = items.first() else {
        return String::new();
    };
    let first_bytes = first.as_bytes();
    let mut len = first_bytes.len();
    for item in &items[1..] {
        let bytes = item.as_bytes();
        let max = len.min(bytes.len());
        let mut matched = 0;
        while matched < max && first_bytes[matched] == bytes[matched] {
            matched += 1;
        }
        len = matched;
    }
    String::from_utf8_lossy(&first_bytes[..len]).into_owned()
}
