/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt::Write;

use super::PassiveEndpoint;

impl PassiveEndpoint {
    /// Emit the endpoint as a 227 passive mode reply line.
    ///
    /// The wire format is the exact inverse of the 227 parse rule: octet
    /// separators become commas and the port is split into its big-endian
    /// byte pair.
    pub fn encode(&self) -> String {
        let mut line = String::with_capacity(64);
        line.push_str("227 Entering Passive Mode (");
        for c in self.address.chars() {
            line.push(if c == '.' { ',' } else { c });
        }
        let _ = write!(line, ",{},{}).\n", self.port >> 8, self.port & 0xFF);
        line
    }
}
