/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use log::Level;

const FTP_ALG_DEBUG_LOG_LEVEL: Level = Level::Debug;
const FTP_ALG_DEBUG_LOG_TARGET: &str = "";

#[inline]
pub(crate) fn log_reply_chunk(chunk: &[u8]) {
    log::log!(
        target: FTP_ALG_DEBUG_LOG_TARGET,
        FTP_ALG_DEBUG_LOG_LEVEL,
        "< {}",
        String::from_utf8_lossy(chunk).trim_end()
    );
}

#[inline]
pub(crate) fn log_command_chunk(chunk: &[u8]) {
    log::log!(
        target: FTP_ALG_DEBUG_LOG_TARGET,
        FTP_ALG_DEBUG_LOG_LEVEL,
        "> {}",
        String::from_utf8_lossy(chunk).trim_end()
    );
}
