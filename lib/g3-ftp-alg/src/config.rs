/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use g3_ftp_proto::reply::MAX_REPLY_LINE_SIZE;

#[derive(Clone, Copy, Debug)]
pub struct FtpAlgConfig {
    max_line_len: usize,
}

impl Default for FtpAlgConfig {
    fn default() -> Self {
        FtpAlgConfig {
            max_line_len: MAX_REPLY_LINE_SIZE,
        }
    }
}

impl FtpAlgConfig {
    /// Set how many bytes of a reply line to buffer while waiting for its
    /// line end. Lines that grow beyond this are relayed uninspected.
    pub fn set_max_line_len(&mut self, len: usize) {
        self.max_line_len = len;
    }

    #[inline]
    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }
}
