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

//! Keystroke reader: translates the raw byte stream from the terminal into
//! logical key events.
//!
//! Runs on a dedicated OS thread rather than a `tokio` blocking task — a
//! raw `read()` on stdin offers no cooperative cancellation checkpoint, so
//! there is nothing for an async runtime to usefully poll.
//! Reads up to 3 bytes per syscall so a lone byte and a 3-byte ANSI CSI
//! arrow sequence (`ESC [ A/B/C/D`) can be told apart without blocking on a
//! byte that may never come.

use std::collections::VecDeque;
use std::io::{self, Read};

use tokio::sync::mpsc::UnboundedSender;

/// One logical keystroke event, already classified from raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Any byte not otherwise recognised — appended to the edit buffer.
    Printable(u8),
    /// `0x7F`.
    Delete,
    /// `0x0A` or `0x0D`.
    Submit,
    /// `0x03`.
    SigInt,
    /// `0x09`.
    Tab,
    /// `ESC [ A/B/C/D` — vertical/horizontal arrows; the core does not
    /// implement in-line cursor movement, so these are recognised only to
    /// be ignored rather than echoed as printable garbage.
    ArrowIgnored,
}

fn classify_byte(byte: u8) -> KeyEvent {
    match byte {
        0x03 => KeyEvent::SigInt,
        0x09 => KeyEvent::Tab,
        0x0A | 0x0D => KeyEvent::Submit,
        0x7F => KeyEvent::Delete,
        other => KeyEvent::Printable(other),
    }
}

fn is_csi_arrow(b1: u8, b2: u8) -> bool {
    b1 == b'[' && matches!(b2, b'A' | b'B' | b'C' | b'D')
}

/// Blocks reading from `input` until EOF or the receiver is dropped,
/// translating each byte (or CSI arrow triple) into a [`KeyEvent`] and
/// sending it down `tx`. Returns cleanly on EOF; an `Err` means the
/// underlying `read` failed.
pub fn run(mut input: impl Read, tx: UnboundedSender<KeyEvent>) -> io::Result<()> {
    let mut pending: VecDeque<u8> = VecDeque::new();

    loop {
        if pending.is_empty() {
            let mut buf = [0u8; 3];
            let n = input.read(&mut buf)?;
            if n == 0 {
                return Ok(()); // EOF: a clean shell exit.
            }
            pending.extend(buf[..n].iter().copied());
        }

        if pending.len() >= 3 && pending[0] == 0x1B && is_csi_arrow(pending[1], pending[2]) {
            pending.drain(..3);
            if tx.send(KeyEvent::ArrowIgnored).is_err() {
                return Ok(());
            }
            continue;
        }

        let byte = pending.pop_front().expect("checked non-empty above");
        if tx.send(classify_byte(byte)).is_err() {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::unbounded_channel;

    fn drain(input: &[u8]) -> Vec<KeyEvent> {
        let (tx, mut rx) = unbounded_channel();
        run(input, tx).unwrap();
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn printable_bytes_pass_through() {
        assert_eq!(drain(b"ab"), vec![KeyEvent::Printable(b'a'), KeyEvent::Printable(b'b')]);
    }

    #[test]
    fn recognises_sigint_tab_submit_delete() {
        assert_eq!(
            drain(&[0x03, 0x09, 0x0A, 0x0D, 0x7F]),
            vec![
                KeyEvent::SigInt,
                KeyEvent::Tab,
                KeyEvent::Submit,
                KeyEvent::Submit,
                KeyEvent::Delete,
            ]
        );
    }

    #[test]
    fn csi_arrow_sequence_is_ignored_as_one_event() {
        assert_eq!(
            drain(&[0x1B, b'[', b'A', b'x']),
            vec![KeyEvent::ArrowIgnored, KeyEvent::Printable(b'x')]
        );
    }

    #[test]
    fn lone_escape_without_csi_tail_is_printable() {
        assert_eq!(drain(&[0x1B, b'y']), vec![KeyEvent::Printable(0x1B), KeyEvent::Printable(b'y')]);
    }
}
