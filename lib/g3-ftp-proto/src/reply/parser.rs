/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use atoi::FromRadix10Checked;

use super::{MAX_ADDRESS_LEN, PassiveEndpoint, PassiveReplyKind};

impl PassiveEndpoint {
    /// Parse the passive endpoint out of a control channel reply line.
    ///
    /// Only a 227 reply carries an extractable endpoint. 211 and 229 are
    /// recognized reply codes but have no rewrite rule, so they yield no
    /// endpoint and the line should be relayed as is.
    pub fn parse(line: &[u8]) -> Option<PassiveEndpoint> {
        match PassiveReplyKind::detect(line)? {
            PassiveReplyKind::Pasv => Some(PassiveEndpoint::parse_227(line)),
            _ => None,
        }
    }

    /// Extract the `(h1,h2,h3,h4,p1,p2)` fields of a 227 reply line.
    ///
    /// Bytes before the first `(` and after the first `)` are ignored.
    /// Malformed bracket content never fails: missing, non-numeric or
    /// out of range fields degrade to an empty address or a zero port
    /// byte, and the
    /// caller is expected to run [`PassiveEndpoint::to_socket_addr`]
    /// before acting on the value.
    pub fn parse_227(line: &[u8]) -> PassiveEndpoint {
        let mut address = String::with_capacity(MAX_ADDRESS_LEN);
        let mut hi = 0u8;
        let mut lo = 0u8;

        if let Some(p_start) = memchr::memchr(b'(', line) {
            let inner = &line[p_start + 1..];
            let inner = match memchr::memchr(b')', inner) {
                Some(p_end) => &inner[..p_end],
                None => inner,
            };

            for (i, field) in inner.split(|c| *c == b',').enumerate() {
                match i {
                    0..=3 => {
                        if i > 0 && address.len() < MAX_ADDRESS_LEN {
                            address.push('.');
                        }
                        for c in field {
                            if address.len() >= MAX_ADDRESS_LEN {
                                break;
                            }
                            address.push(char::from(*c));
                        }
                    }
                    4 => hi = u8::from_radix_10_checked(field).0.unwrap_or(0),
                    5 => lo = u8::from_radix_10_checked(field).0.unwrap_or(0),
                    _ => break,
                }
            }
        }

        PassiveEndpoint {
            address,
            port: (u16::from(hi) << 8) | u16::from(lo),
        }
    }
}
