/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{Ipv4Addr, SocketAddrV4};
use std::str::FromStr;

use atoi::FromRadix10;
use thiserror::Error;

mod parser;

mod encoder;

/// Maximum size of a single control channel reply line worth inspecting.
pub const MAX_REPLY_LINE_SIZE: usize = 512;

/// A dotted quad address is at most `255.255.255.255`.
pub(crate) const MAX_ADDRESS_LEN: usize = 15;

/// The reply codes that may announce a passive mode rendezvous point.
///
/// Any other reply code on the control channel is ordinary traffic and
/// carries no embedded addressing information.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassiveReplyKind {
    /// 227, RFC 959 PASV
    Pasv,
    /// 211, status reply which may list passive capabilities
    SystemStatus,
    /// 229, RFC 2428 EPSV
    Epsv,
}

impl PassiveReplyKind {
    /// Check the leading 3-digit reply code of a control channel line.
    ///
    /// Only the first 3 bytes are looked at, so ordinary replies like
    /// `200 Command okay` are rejected without scanning the full line.
    pub fn detect(line: &[u8]) -> Option<Self> {
        let end = line.len().min(3);
        let (code, _) = u16::from_radix_10(&line[..end]);
        match code {
            227 => Some(PassiveReplyKind::Pasv),
            211 => Some(PassiveReplyKind::SystemStatus),
            229 => Some(PassiveReplyKind::Epsv),
            _ => None,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            PassiveReplyKind::Pasv => 227,
            PassiveReplyKind::SystemStatus => 211,
            PassiveReplyKind::Epsv => 229,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PassiveEndpointError {
    #[error("invalid ipv4 address {0:?} in passive endpoint")]
    InvalidAddress(String),
}

/// The rendezvous endpoint embedded in a 227 passive mode reply.
///
/// A parsed value may carry garbage fields if the reply was malformed,
/// see [`PassiveEndpoint::to_socket_addr`] before trusting it. A value
/// built via [`PassiveEndpoint::new`] is always well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassiveEndpoint {
    address: String,
    port: u16,
}

impl PassiveEndpoint {
    pub fn new(addr: Ipv4Addr, port: u16) -> Self {
        PassiveEndpoint {
            address: addr.to_string(),
            port,
        }
    }

    #[inline]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Validate the address field and return the usable socket address.
    pub fn to_socket_addr(&self) -> Result<SocketAddrV4, PassiveEndpointError> {
        let ip = Ipv4Addr::from_str(&self.address)
            .map_err(|_| PassiveEndpointError::InvalidAddress(self.address.clone()))?;
        Ok(SocketAddrV4::new(ip, self.port))
    }
}
