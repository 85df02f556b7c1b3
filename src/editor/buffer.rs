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

//! The line editor's edit buffer.

use unicode_segmentation::UnicodeSegmentation;

/// Per-line mutable state: the accumulated text and the two-stage
/// tab-completion bell indicator.
#[derive(Debug, Default)]
pub struct EditBuffer {
    pub text: String,
    pub bell_count: u8,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one raw byte. Bytes above ASCII are kept opaquely as a
    /// single `char` rather than UTF-8 decoded — the keystroke reader
    /// classifies one byte at a time, so multi-byte input is a known
    /// simplification of this core.
    pub fn push_byte(&mut self, byte: u8) {
        self.text.push(byte as char);
    }

    /// Drops the last grapheme cluster (not merely the last byte or
    /// `char`), so a combining-mark sequence erases as one unit; no-op on
    /// an empty buffer.
    pub fn pop(&mut self) -> Option<String> {
        let (start, _) = self.text.grapheme_indices(true).last()?;
        Some(self.text.split_off(start))
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}
