/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::FtpAlgConfig;

mod session;
pub use session::{ProxySessionContext, SessionContextError};

mod line_buf;

mod intercept;
pub use intercept::FtpControlInterceptor;

#[cfg(feature = "log-raw-io")]
mod debug;
