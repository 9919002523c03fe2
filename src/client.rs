//! High-level client for the i-regul heat pump server.
//!
//! This module provides the [`Client`] struct, the primary interface for
//! fetching heat pump readings.
//!
//! # Overview
//!
//! The client handles:
//! - Request construction from the configured credentials
//! - One TCP round trip per [`Client::refresh`]
//! - Classification of authentication and framing failures
//! - Keeping the last successfully decoded [`Snapshot`]
//!
//! Polling is left to the caller: call `refresh` at whatever interval suits
//! the application and read values in between.
//!
//! # Example
//!
//! ```no_run
//! use iregul::{Client, ClientConfig, Sensor};
//!
//! # async fn run() -> iregul::Result<()> {
//! let client = Client::new(ClientConfig::new("123456", "secret"));
//!
//! client.refresh().await?;
//!
//! if client.has_value(Sensor::OutsideTemperature.id()) {
//!     let temp = client.get_value(Sensor::OutsideTemperature.id())?;
//!     println!("outside: {temp} °C");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The snapshot sits behind a lock that is only held to swap or clone an
//! `Arc`, so a `Client` can be shared between tasks. Readers always see one
//! complete snapshot.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use log::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::request::{build_request, redacted_request, Credentials};
use crate::response::{is_auth_failure, Snapshot};
use crate::transport::{Connection, FramingPolicy, DEFAULT_TIMEOUT, SERVER_HOST, SERVER_PORT};

/// Configuration for creating an i-regul client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Installation identifier and password.
    pub credentials: Credentials,
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Timeout for connecting and for the request/response exchange.
    pub timeout: Duration,
    /// Handling of responses that end without a terminator.
    pub framing: FramingPolicy,
}

impl ClientConfig {
    /// Creates a configuration for the official server.
    ///
    /// # Example
    ///
    /// ```
    /// use iregul::ClientConfig;
    ///
    /// let config = ClientConfig::new("123456", "secret");
    /// assert_eq!(config.host, "i-regul.fr");
    /// assert_eq!(config.port, 443);
    /// ```
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(id, password),
            host: SERVER_HOST.to_string(),
            port: SERVER_PORT,
            timeout: DEFAULT_TIMEOUT,
            framing: FramingPolicy::default(),
        }
    }

    /// Points the client at another server, e.g. a local test double.
    ///
    /// # Example
    ///
    /// ```
    /// use iregul::ClientConfig;
    ///
    /// let config = ClientConfig::new("123456", "secret")
    ///     .with_server("127.0.0.1", 4000);
    /// ```
    pub fn with_server(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Sets a custom timeout (default is 10 seconds).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the framing policy (default is [`FramingPolicy::Lenient`]).
    pub fn with_framing(mut self, framing: FramingPolicy) -> Self {
        self.framing = framing;
        self
    }
}

/// i-regul client holding the readings of the last successful refresh.
///
/// Each [`refresh`](Client::refresh) produces exactly 1 request and 1 response
/// on a fresh connection. No automatic retries: a failed refresh returns the
/// error and leaves the previous readings in place.
pub struct Client {
    config: ClientConfig,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl Client {
    /// Creates a new client. No connection is made until the first refresh.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches fresh readings from the server.
    ///
    /// On success the stored snapshot is replaced as a whole. On failure it is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Connecting, writing or reading fails (`Error::Io`, `Error::Timeout`)
    /// - The credentials are rejected (`Error::Authentication`)
    /// - The response is cut or too large (`Error::Framing`)
    /// - The response cannot be decoded (`Error::MalformedResponse`)
    pub async fn refresh(&self) -> Result<()> {
        let config = &self.config;
        let request = build_request(&config.credentials);

        let mut connection = Connection::connect(&config.host, config.port, config.timeout).await?;

        debug!("sending: {}", redacted_request(&config.credentials));
        let response = connection
            .exchange(request.as_bytes(), config.framing)
            .await?;
        connection.close().await;

        trace!("received: {}", String::from_utf8_lossy(&response));

        let snapshot = Self::parse_response(&response)?;
        debug!("decoded {} readings", snapshot.len());

        self.replace_snapshot(snapshot);
        Ok(())
    }

    fn parse_response(response: &[u8]) -> Result<Snapshot> {
        if is_auth_failure(response) {
            warn!("server rejected credentials");
            return Err(Error::Authentication);
        }

        Snapshot::from_bytes(response)
    }

    fn replace_snapshot(&self, snapshot: Snapshot) {
        let mut current = self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *current = Arc::new(snapshot);
    }

    /// Returns the readings of the last successful refresh.
    ///
    /// The returned snapshot does not change when a later refresh succeeds,
    /// which makes it suitable for reading several related values.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns whether a value is available for `id`.
    ///
    /// Always `false` before the first successful refresh.
    pub fn has_value(&self, id: &str) -> bool {
        self.snapshot().contains(id)
    }

    /// Returns the value for `id` as a number.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingValue` if there is no value for `id` and
    /// `Error::NotNumeric` if the raw value does not parse as a float.
    pub fn get_value(&self, id: &str) -> Result<f64> {
        let snapshot = self.snapshot();
        let raw = snapshot.get(id).ok_or_else(|| Error::missing_value(id))?;

        raw.trim()
            .parse::<f64>()
            .map_err(|_| Error::not_numeric(id, raw))
    }

    /// Returns the value for `id` as an on/off state (any non-zero value is on).
    ///
    /// # Errors
    ///
    /// Same as [`get_value`](Client::get_value).
    pub fn get_bool(&self, id: &str) -> Result<bool> {
        self.get_value(id).map(|value| value != 0.0)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("readings", &self.snapshot().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const REQUEST: &[u8] = b"cdraminfoA1B2pa55{10#}";

    /// Serves one canned response per accepted connection, checking the request.
    async fn serve(responses: &[&[u8]]) -> (u16, tokio::task::JoinHandle<()>) {
        let responses: Vec<Vec<u8>> = responses.iter().map(|r| r.to_vec()).collect();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();

                let mut request = vec![0u8; REQUEST.len()];
                socket.read_exact(&mut request).await.unwrap();
                assert_eq!(request, REQUEST);

                socket.write_all(&response).await.unwrap();
                socket.shutdown().await.unwrap();

                // The client must release the connection whatever the outcome.
                let mut rest = Vec::new();
                let closed =
                    tokio::time::timeout(Duration::from_secs(2), socket.read_to_end(&mut rest))
                        .await;
                assert!(closed.is_ok(), "client kept the connection open");
            }
        });

        (port, handle)
    }

    fn client(port: u16) -> Client {
        Client::new(
            ClientConfig::new("A1B2", "pa55")
                .with_server("127.0.0.1", port)
                .with_timeout(Duration::from_secs(2)),
        )
    }

    #[test]
    fn test_client_config_new() {
        let config = ClientConfig::new("A1B2", "pa55");

        assert_eq!(config.credentials.id(), "A1B2");
        assert_eq!(config.host, SERVER_HOST);
        assert_eq!(config.port, SERVER_PORT);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.framing, FramingPolicy::Lenient);
    }

    #[test]
    fn test_client_config_builders() {
        let config = ClientConfig::new("A1B2", "pa55")
            .with_server("localhost", 4000)
            .with_timeout(Duration::from_secs(1))
            .with_framing(FramingPolicy::Strict);

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 4000);
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.framing, FramingPolicy::Strict);
    }

    #[test]
    fn test_no_value_before_refresh() {
        let client = Client::new(ClientConfig::new("A1B2", "pa55"));

        assert!(!client.has_value("A@3&valeur"));
        assert!(client.snapshot().is_empty());
        assert!(matches!(
            client.get_value("A@3&valeur"),
            Err(Error::MissingValue { .. })
        ));
    }

    #[test]
    fn test_client_debug_hides_password() {
        let client = Client::new(ClientConfig::new("A1B2", "pa55"));
        let debug_str = format!("{:?}", client);

        assert!(debug_str.contains("Client"));
        assert!(debug_str.contains("A1B2"));
        assert!(!debug_str.contains("pa55"));
    }

    #[test]
    fn test_get_value_parsing() {
        let client = Client::new(ClientConfig::new("A1B2", "pa55"));
        client.replace_snapshot(
            crate::decode("#A@3&valeur[21.5]#O@1&valeur[1]#O@3&valeur[0]#A@1&valeur[n/a]")
                .unwrap(),
        );

        assert_eq!(client.get_value("A@3&valeur").unwrap(), 21.5);
        assert!(client.get_bool("O@1&valeur").unwrap());
        assert!(!client.get_bool("O@3&valeur").unwrap());

        let err = client.get_value("A@1&valeur").unwrap_err();
        assert!(matches!(err, Error::NotNumeric { .. }));
        assert!(err.is_value_type());
    }

    #[tokio::test]
    async fn test_refresh_stores_snapshot() {
        let (port, server) = serve(&[b"#A@3&valeur[21.5]#O@1&valeur[1]\r"]).await;
        let client = client(port);

        client.refresh().await.unwrap();

        assert!(client.has_value("A@3&valeur"));
        assert_eq!(client.get_value("A@3&valeur").unwrap(), 21.5);
        assert_eq!(client.get_value("O@1&valeur").unwrap(), 1.0);
        assert_eq!(client.snapshot().len(), 2);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_replaces_whole_snapshot() {
        let (port, server) = serve(&[
            b"#A@3&valeur[21.5]#O@1&valeur[1]\r",
            b"#A@3&valeur[19.0]\r",
        ])
        .await;
        let client = client(port);

        client.refresh().await.unwrap();
        let first = client.snapshot();
        client.refresh().await.unwrap();

        assert_eq!(client.get_value("A@3&valeur").unwrap(), 19.0);
        assert!(!client.has_value("O@1&valeur"));
        assert_eq!(first.get("O@1&valeur"), Some("1"));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_auth_failure_keeps_snapshot() {
        let (port, server) = serve(&[b"#A@3&valeur[21.5]\r", b"PWD}\r"]).await;
        let client = client(port);

        client.refresh().await.unwrap();
        let err = client.refresh().await.unwrap_err();

        assert!(matches!(err, Error::Authentication));
        assert_eq!(client.get_value("A@3&valeur").unwrap(), 21.5);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_snapshot() {
        let (port, server) = serve(&[b"#A@3&valeur[21.5]\r"]).await;
        let client = client(port);

        client.refresh().await.unwrap();
        server.await.unwrap();

        // The listener is gone, so the next connect is refused.
        let err = client.refresh().await.unwrap_err();

        assert!(err.is_transient());
        assert!(client.has_value("A@3&valeur"));
        assert_eq!(client.get_value("A@3&valeur").unwrap(), 21.5);
    }

    #[tokio::test]
    async fn test_silent_close_keeps_snapshot() {
        let (port, server) = serve(&[b"#A@3&valeur[21.5]\r", b""]).await;
        let client = client(port);

        client.refresh().await.unwrap();
        let err = client.refresh().await.unwrap_err();

        assert!(matches!(err, Error::Framing { .. }));
        assert!(client.has_value("A@3&valeur"));
        assert_eq!(client.get_value("A@3&valeur").unwrap(), 21.5);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_response_keeps_snapshot() {
        let (port, server) = serve(&[b"#A@3&valeur[21.5]\r", b"#A@3&valeur[\xFF]\r"]).await;
        let client = client(port);

        client.refresh().await.unwrap();
        let err = client.refresh().await.unwrap_err();

        assert!(matches!(err, Error::MalformedResponse { .. }));
        assert_eq!(client.get_value("A@3&valeur").unwrap(), 21.5);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_without_terminator() {
        let (port, server) = serve(&[b"#A@3&valeur[21.5]", b"#A@3&valeur[30]"]).await;

        let lenient = client(port);
        lenient.refresh().await.unwrap();
        assert_eq!(lenient.get_value("A@3&valeur").unwrap(), 21.5);

        let strict = Client::new(
            ClientConfig::new("A1B2", "pa55")
                .with_server("127.0.0.1", port)
                .with_framing(FramingPolicy::Strict),
        );
        let err = strict.refresh().await.unwrap_err();
        assert!(matches!(err, Error::Framing { .. }));
        assert!(!strict.has_value("A@3&valeur"));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_response_clears_readings() {
        let (port, server) = serve(&[b"#A@3&valeur[21.5]\r", b"\r"]).await;
        let client = client(port);

        client.refresh().await.unwrap();
        client.refresh().await.unwrap();

        assert!(!client.has_value("A@3&valeur"));

        server.await.unwrap();
    }
}
