/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use log::{debug, trace, warn};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use g3_ftp_proto::reply::{PassiveEndpoint, PassiveReplyKind};

use crate::line_buf::ReplyLineBuf;
use crate::{FtpAlgConfig, ProxySessionContext};

/// Per control connection ALG logic for one proxied FTP session.
///
/// The reply path (server to client by protocol role) is inspected line by
/// line and 227 passive mode replies get the proxy's own endpoint appended.
/// The command path is a pure passthrough. Malformed FTP syntax never fails
/// the connection, the only surfaced error is a partner write failure.
pub struct FtpControlInterceptor {
    ctx: ProxySessionContext,
    recv_buf: ReplyLineBuf,
    lines_rewritten: usize,
    rewrites_skipped: usize,
}

impl FtpControlInterceptor {
    pub fn new(ctx: ProxySessionContext, config: &FtpAlgConfig) -> Self {
        FtpControlInterceptor {
            ctx,
            recv_buf: ReplyLineBuf::new(config.max_line_len()),
            lines_rewritten: 0,
            rewrites_skipped: 0,
        }
    }

    /// How many 227 replies got a rewritten endpoint appended.
    #[inline]
    pub fn lines_rewritten(&self) -> usize {
        self.lines_rewritten
    }

    /// How many 227 replies were relayed unmodified because either the
    /// reply or the substitution inputs failed validation.
    #[inline]
    pub fn rewrites_skipped(&self) -> usize {
        self.rewrites_skipped
    }

    /// Handle bytes arriving on the reply path and relay them to the
    /// partner side.
    ///
    /// Complete lines are decided independently, in arrival order. A
    /// trailing partial line stays buffered for the next call unless it
    /// outgrows the configured line length, in which case it is relayed
    /// uninspected.
    pub async fn on_reply_data<W>(&mut self, data: &[u8], partner: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        #[cfg(feature = "log-raw-io")]
        crate::debug::log_reply_chunk(data);

        self.recv_buf.feed(data);
        while let Some(line) = self.recv_buf.take_line() {
            match self.rewrite_line(&line) {
                Some(rewritten) => {
                    self.forward_rewritten(partner, &line, rewritten.as_bytes())
                        .await?
                }
                None => partner.write_all(&line).await?,
            }
        }
        if let Some(chunk) = self.recv_buf.take_overflow() {
            debug!(
                "reply line exceeds {} bytes, relaying without inspection",
                self.recv_buf.max_line_len()
            );
            partner.write_all(&chunk).await?;
        }
        if !self.recv_buf.is_empty() {
            trace!("partial reply line left buffered");
        }
        partner.flush().await
    }

    /// Handle bytes arriving on the command path: relay verbatim, no
    /// parsing, no buffering.
    pub async fn on_command_data<W>(&mut self, data: &[u8], partner: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        #[cfg(feature = "log-raw-io")]
        crate::debug::log_command_chunk(data);

        partner.write_all(data).await?;
        partner.flush().await
    }

    /// Decide whether a reply line gets a rewritten passive endpoint.
    ///
    /// Returns the encoded replacement line, or `None` for passthrough.
    fn rewrite_line(&mut self, line: &[u8]) -> Option<String> {
        let kind = PassiveReplyKind::detect(line)?;
        if kind != PassiveReplyKind::Pasv {
            debug!("no rewrite rule for {} reply, relaying as is", kind.code());
            return None;
        }

        let parsed = PassiveEndpoint::parse_227(line);
        let server_addr = match parsed.to_socket_addr() {
            Ok(addr) => addr,
            Err(e) => {
                self.rewrites_skipped += 1;
                warn!("malformed 227 reply, rewrite skipped: {e}");
                return None;
            }
        };

        let substitute = match self.ctx.passive_endpoint() {
            Ok(ep) => ep,
            Err(e) => {
                self.rewrites_skipped += 1;
                warn!("rewrite of 227 reply skipped: {e}");
                return None;
            }
        };

        debug!(
            "passive endpoint {} rewritten to {}:{}",
            server_addr,
            substitute.address(),
            substitute.port()
        );
        self.lines_rewritten += 1;
        Some(substitute.encode())
    }

    /// Enqueue the original reply line followed immediately by the
    /// rewritten one, as one logical write.
    ///
    /// The server's own line stays visible to the client, the substituted
    /// endpoint line follows right after it.
    async fn forward_rewritten<W>(
        &self,
        partner: &mut W,
        original: &[u8],
        rewritten: &[u8],
    ) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        partner.write_all(original).await?;
        partner.write_all(rewritten).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn interceptor(external_addr: &str, data_port: u16) -> FtpControlInterceptor {
        let ctx = ProxySessionContext::new(external_addr, data_port);
        FtpControlInterceptor::new(ctx, &FtpAlgConfig::default())
    }

    #[tokio::test]
    async fn ordinary_reply_passthrough() {
        let mut i = interceptor("203.0.113.7", 6000);
        let mut out = Cursor::new(Vec::new());

        i.on_reply_data(b"200 Command okay.\n", &mut out).await.unwrap();
        assert_eq!(out.get_ref().as_slice(), b"200 Command okay.\n");
        assert_eq!(i.lines_rewritten(), 0);
        assert_eq!(i.rewrites_skipped(), 0);
    }

    #[tokio::test]
    async fn basic_227_rewrite() {
        let mut i = interceptor("203.0.113.7", 6000);
        let mut out = Cursor::new(Vec::new());

        i.on_reply_data(b"227 Entering Passive Mode (10,0,0,5,19,136).\n", &mut out)
            .await
            .unwrap();
        assert_eq!(
            out.get_ref().as_slice(),
            b"227 Entering Passive Mode (10,0,0,5,19,136).\n\
              227 Entering Passive Mode (203,0,113,7,23,112).\n"
                .as_slice()
        );
        assert_eq!(i.lines_rewritten(), 1);
    }

    #[tokio::test]
    async fn extended_passive_passthrough() {
        let mut i = interceptor("203.0.113.7", 6000);
        let mut out = Cursor::new(Vec::new());

        i.on_reply_data(b"229 Entering Extended Passive Mode (|||6446|)\n", &mut out)
            .await
            .unwrap();
        assert_eq!(
            out.get_ref().as_slice(),
            b"229 Entering Extended Passive Mode (|||6446|)\n"
        );
        assert_eq!(i.lines_rewritten(), 0);
        assert_eq!(i.rewrites_skipped(), 0);
    }

    #[tokio::test]
    async fn malformed_227_skipped() {
        let mut i = interceptor("203.0.113.7", 6000);
        let mut out = Cursor::new(Vec::new());

        i.on_reply_data(b"227 No parens here\n", &mut out).await.unwrap();
        assert_eq!(out.get_ref().as_slice(), b"227 No parens here\n");
        assert_eq!(i.lines_rewritten(), 0);
        assert_eq!(i.rewrites_skipped(), 1);
    }

    #[tokio::test]
    async fn out_of_range_port_field_still_rewritten() {
        let mut i = interceptor("203.0.113.7", 6000);
        let mut out = Cursor::new(Vec::new());

        i.on_reply_data(b"227 Entering Passive Mode (10,0,0,5,999,136).\n", &mut out)
            .await
            .unwrap();
        assert_eq!(
            out.get_ref().as_slice(),
            b"227 Entering Passive Mode (10,0,0,5,999,136).\n\
              227 Entering Passive Mode (203,0,113,7,23,112).\n"
                .as_slice()
        );
        assert_eq!(i.lines_rewritten(), 1);
    }

    #[tokio::test]
    async fn invalid_external_addr_skipped() {
        let mut i = interceptor("ftp.example.net", 6000);
        let mut out = Cursor::new(Vec::new());

        i.on_reply_data(b"227 Entering Passive Mode (10,0,0,5,19,136).\n", &mut out)
            .await
            .unwrap();
        assert_eq!(
            out.get_ref().as_slice(),
            b"227 Entering Passive Mode (10,0,0,5,19,136).\n"
        );
        assert_eq!(i.rewrites_skipped(), 1);
    }

    #[tokio::test]
    async fn unreserved_data_port_skipped() {
        let mut i = interceptor("203.0.113.7", 0);
        let mut out = Cursor::new(Vec::new());

        i.on_reply_data(b"227 Entering Passive Mode (10,0,0,5,19,136).\n", &mut out)
            .await
            .unwrap();
        assert_eq!(
            out.get_ref().as_slice(),
            b"227 Entering Passive Mode (10,0,0,5,19,136).\n"
        );
        assert_eq!(i.rewrites_skipped(), 1);
    }

    #[tokio::test]
    async fn reply_split_across_reads() {
        let mut i = interceptor("203.0.113.7", 6000);
        let mut out = Cursor::new(Vec::new());

        i.on_reply_data(b"227 Entering Passive Mode (10,0,0,5,", &mut out)
            .await
            .unwrap();
        assert!(out.get_ref().is_empty());

        i.on_reply_data(b"19,136).\n", &mut out).await.unwrap();
        assert_eq!(
            out.get_ref().as_slice(),
            b"227 Entering Passive Mode (10,0,0,5,19,136).\n\
              227 Entering Passive Mode (203,0,113,7,23,112).\n"
                .as_slice()
        );
        assert_eq!(i.lines_rewritten(), 1);
    }

    #[tokio::test]
    async fn consecutive_reads_kept_in_order() {
        let mut i = interceptor("203.0.113.7", 6000);
        let mut out = Cursor::new(Vec::new());

        i.on_reply_data(b"150 Opening BINARY mode.\n", &mut out)
            .await
            .unwrap();
        i.on_reply_data(b"227 Entering Passive Mode (10,0,0,5,19,136).\n", &mut out)
            .await
            .unwrap();
        assert_eq!(
            out.get_ref().as_slice(),
            b"150 Opening BINARY mode.\n\
              227 Entering Passive Mode (10,0,0,5,19,136).\n\
              227 Entering Passive Mode (203,0,113,7,23,112).\n"
                .as_slice()
        );
    }

    #[tokio::test]
    async fn multiple_lines_in_one_read() {
        let mut i = interceptor("203.0.113.7", 6000);
        let mut out = Cursor::new(Vec::new());

        i.on_reply_data(
            b"230 Login successful.\n227 Entering Passive Mode (10,0,0,5,19,136).\n",
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(
            out.get_ref().as_slice(),
            b"230 Login successful.\n\
              227 Entering Passive Mode (10,0,0,5,19,136).\n\
              227 Entering Passive Mode (203,0,113,7,23,112).\n"
                .as_slice()
        );
    }

    #[tokio::test]
    async fn overlong_line_relayed_uninspected() {
        let ctx = ProxySessionContext::new("203.0.113.7", 6000);
        let mut config = FtpAlgConfig::default();
        config.set_max_line_len(16);
        let mut i = FtpControlInterceptor::new(ctx, &config);
        let mut out = Cursor::new(Vec::new());

        i.on_reply_data(b"227 aaaaaaaaaaaaaaaaaaaaaaaa", &mut out)
            .await
            .unwrap();
        assert_eq!(out.get_ref().as_slice(), b"227 aaaaaaaaaaaaaaaaaaaaaaaa");
        assert_eq!(i.lines_rewritten(), 0);
    }

    #[tokio::test]
    async fn command_path_passthrough() {
        let mut i = interceptor("203.0.113.7", 6000);
        let mut out = Cursor::new(Vec::new());

        i.on_command_data(b"PASV\r\n", &mut out).await.unwrap();
        i.on_command_data(b"RETR file.bin\r\n", &mut out).await.unwrap();
        assert_eq!(out.get_ref().as_slice(), b"PASV\r\nRETR file.bin\r\n");
    }
}
