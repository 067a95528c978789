// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line reassembly over an arbitrarily fragmented byte stream.
//!
//! Bytes are buffered until a `\n` arrives and only complete lines are
//! decoded, so a multi-byte character or a `\r\n` pair split across chunks
//! comes out whole. A trailing line without its terminator is never emitted.

use tracing::debug;

/// Buffers raw body chunks and yields complete lines.
#[derive(Debug, Default)]
pub struct FrameReassembler {
    pending: Vec<u8>,
}

impl FrameReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every line it completed, in order.
    ///
    /// Line terminators (`\n`, with an optional preceding `\r`) are stripped.
    /// Invalid UTF-8 inside a line is replaced rather than rejected; the
    /// decoder drops such frames when they fail to parse.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut search_from = self.pending.len();
        self.pending.extend_from_slice(chunk);

        let mut consumed = 0;
        while let Some(pos) = self.pending[search_from..]
            .iter()
            .position(|&b| b == b'\n')
        {
            let end = search_from + pos;
            let mut line = &self.pending[consumed..end];
            if let [rest @ .., b'\r'] = line {
                line = rest;
            }
            lines.push(String::from_utf8_lossy(line).into_owned());
            consumed = end + 1;
            search_from = consumed;
        }

        if consumed > 0 {
            self.pending.drain(..consumed);
        }
        lines
    }

    /// Bytes held back waiting for a line terminator.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Ends the stream, discarding any unterminated trailing line.
    ///
    /// Returns how many bytes were discarded.
    pub fn finish(self) -> usize {
        let discarded = self.pending.len();
        if discarded > 0 {
            debug!(bytes = discarded, "discarding unterminated trailing line");
        }
        discarded
    }
}
