/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

/// Reassembly buffer for the line oriented control channel.
///
/// Control replies have no length prefix, so one transport read may carry
/// a partial line, one line, or many. Bytes are pushed in as they arrive
/// and complete newline terminated lines are taken out, terminator
/// included.
pub(crate) struct ReplyLineBuf {
    buf: Vec<u8>,
    max_line_len: usize,
}

impl ReplyLineBuf {
    pub(crate) fn new(max_line_len: usize) -> Self {
        ReplyLineBuf {
            buf: Vec::with_capacity(max_line_len),
            max_line_len,
        }
    }

    pub(crate) fn feed(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub(crate) fn take_line(&mut self) -> Option<Vec<u8>> {
        let p = memchr::memchr(b'\n', &self.buf)?;
        Some(self.buf.drain(..=p).collect())
    }

    /// Surrender the buffered bytes once they exceed the line length limit
    /// without a line end showing up, so the relay never stalls on a peer
    /// that sends unterminated data.
    pub(crate) fn take_overflow(&mut self) -> Option<Vec<u8>> {
        if self.buf.len() >= self.max_line_len {
            Some(self.buf.drain(..).collect())
        } else {
            None
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub(crate) fn max_line_len(&self) -> usize {
        self.max_line_len
    }
}
