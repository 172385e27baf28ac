/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::Ipv4Addr;
use std::str::FromStr;

use thiserror::Error;

use g3_ftp_proto::reply::PassiveEndpoint;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionContextError {
    #[error("configured external address {0:?} is not a valid ipv4 address")]
    InvalidExternalAddress(String),
    #[error("no data port reserved for this control session")]
    DataPortNotReserved,
}

/// Substitution inputs for one proxied FTP control session.
///
/// The external address comes from proxy wide configuration and the data
/// port is the one the relay layer has reserved for this session. Both are
/// read only here and validated at rewrite time, not at construction, so a
/// misconfigured proxy still relays the control channel.
#[derive(Debug, Clone)]
pub struct ProxySessionContext {
    external_addr: String,
    data_port: u16,
}

impl ProxySessionContext {
    pub fn new(external_addr: impl Into<String>, data_port: u16) -> Self {
        ProxySessionContext {
            external_addr: external_addr.into(),
            data_port,
        }
    }

    #[inline]
    pub fn external_addr(&self) -> &str {
        &self.external_addr
    }

    #[inline]
    pub fn data_port(&self) -> u16 {
        self.data_port
    }

    /// Build the endpoint to advertise in place of the server's one.
    ///
    /// It carries nothing from the parsed reply, only configuration data.
    pub fn passive_endpoint(&self) -> Result<PassiveEndpoint, SessionContextError> {
        let ip = Ipv4Addr::from_str(&self.external_addr)
            .map_err(|_| SessionContextError::InvalidExternalAddress(self.external_addr.clone()))?;
        if self.data_port == 0 {
            return Err(SessionContextError::DataPortNotReserved);
        }
        Ok(PassiveEndpoint::new(ip, self.data_port))
    }
}
