//! TCP transport for the i-regul protocol.
//!
//! Every refresh opens its own connection, writes one request, reads one
//! response and closes. Connections are never reused or pooled.
//!
//! # Framing
//!
//! A response ends with a carriage return. The reader consumes the stream
//! until it sees that byte. How a stream that ends before the terminator is
//! handled is chosen with [`FramingPolicy`]:
//!
//! - [`FramingPolicy::Lenient`] (default) logs a warning and keeps what was read,
//!   since the server may close the socket right after (or instead of) the
//!   terminator.
//! - [`FramingPolicy::Strict`] rejects the response with `Error::Framing`.
//!
//! Under both policies a stream that ends before sending a single byte, or a
//! response growing past [`MAX_RESPONSE_SIZE`] without a terminator, is
//! rejected.
//!
//! # Constants
//!
//! - [`SERVER_HOST`] / [`SERVER_PORT`] - i-regul server endpoint
//! - [`DEFAULT_TIMEOUT`] - connect and exchange timeout (10 seconds)
//! - [`MAX_RESPONSE_SIZE`] - largest accepted response (4 MiB)

use std::time::Duration;

use log::{debug, trace, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::{Error, Result};
use crate::response::RESPONSE_TERMINATOR;

/// Hostname of the i-regul server.
pub const SERVER_HOST: &str = "i-regul.fr";

/// TCP port of the i-regul server.
pub const SERVER_PORT: u16 = 443;

/// Default timeout for connecting and for one request/response exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest response accepted before giving up on finding the terminator.
pub const MAX_RESPONSE_SIZE: usize = 4 * 1024 * 1024;

const READ_CHUNK_SIZE: usize = 4096;

/// How a response that ends without a terminator is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FramingPolicy {
    /// Keep the data read so far and log a warning.
    #[default]
    Lenient,
    /// Fail with `Error::Framing`.
    Strict,
}

/// One request/response connection to the server.
///
/// The stream is owned by the connection and released when it is dropped,
/// whichever way the exchange ends.
pub(crate) struct Connection<IO> {
    stream: IO,
    timeout: Duration,
}

impl Connection<TcpStream> {
    /// Opens a TCP connection to `host:port`.
    pub(crate) async fn connect(host: &str, port: u16, io_timeout: Duration) -> Result<Self> {
        debug!("connecting to {host}:{port}");

        let stream = timeout(io_timeout, TcpStream::connect((host, port)))
            .await?
            .map_err(Error::from_io)?;

        Ok(Self::new(stream, io_timeout))
    }
}

impl<IO> Connection<IO>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: IO, timeout: Duration) -> Self {
        Self { stream, timeout }
    }

    /// Writes `request` and reads the response up to (excluding) the terminator.
    pub(crate) async fn exchange(
        &mut self,
        request: &[u8],
        policy: FramingPolicy,
    ) -> Result<Vec<u8>> {
        timeout(self.timeout, self.send(request)).await??;
        timeout(self.timeout, self.read_response(policy)).await?
    }

    /// Shuts the write side down. Dropping the connection closes it as well.
    pub(crate) async fn close(mut self) {
        if let Err(err) = self.stream.shutdown().await {
            debug!("error while closing connection: {err}");
        }
    }

    async fn send(&mut self, request: &[u8]) -> Result<()> {
        self.stream.write_all(request).await.map_err(Error::from_io)?;
        self.stream.flush().await.map_err(Error::from_io)
    }

    async fn read_response(&mut self, policy: FramingPolicy) -> Result<Vec<u8>> {
        let mut response = Vec::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            let size = self.stream.read(&mut chunk).await.map_err(Error::from_io)?;

            if size == 0 && response.is_empty() {
                return Err(Error::framing("connection closed before any data"));
            }

            if size == 0 {
                return match policy {
                    FramingPolicy::Lenient => {
                        warn!(
                            "stream ended before terminator, keeping {} bytes",
                            response.len()
                        );
                        Ok(response)
                    }
                    FramingPolicy::Strict => Err(Error::framing(format!(
                        "stream ended before terminator after {} bytes",
                        response.len()
                    ))),
                };
            }

            let chunk = &chunk[..size];
            trace!("read {size} bytes");

            if let Some(end) = chunk.iter().position(|&b| b == RESPONSE_TERMINATOR) {
                response.extend_from_slice(&chunk[..end]);
                return Ok(response);
            }

            response.extend_from_slice(chunk);

            if response.len() > MAX_RESPONSE_SIZE {
                return Err(Error::framing(format!(
                    "no terminator within {MAX_RESPONSE_SIZE} bytes"
                )));
            }
        }
    }
}
