//! # i-regul Heat Pump Client
//!
//! A Rust library for reading telemetry from i-regul heat pumps through the
//! i-regul server's line-oriented TCP protocol.
//!
//! This is a **protocol-only** library: no scheduler, no entity model, no
//! persistence. Each [`Client::refresh`] produces exactly 1 request and
//! 1 response on a fresh connection. No automatic retries or reconnection;
//! the last successful readings are kept until the next successful refresh.
//!
//! ## Features
//!
//! - **Protocol-only** — request framing, response decoding, error classification
//! - **Consistent reads** — readings are swapped as a whole, never partially
//! - **Async** — built on tokio, with connect and read timeouts
//! - **No panics** — all errors returned as `Result<T, Error>`
//! - **Sensor catalog** — named identifiers for the known readings
//!
//! ## Quick Start
//!
//! ```no_run
//! use iregul::{BinarySensor, Client, ClientConfig, Sensor};
//!
//! #[tokio::main]
//! async fn main() -> iregul::Result<()> {
//!     let client = Client::new(ClientConfig::new("123456", "secret"));
//!
//!     client.refresh().await?;
//!
//!     let outside = client.get_value(Sensor::OutsideTemperature.id())?;
//!     println!("outside = {outside} °C");
//!
//!     let compressor = client.get_bool(BinarySensor::Compressor.id())?;
//!     println!("compressor = {}", if compressor { "on" } else { "off" });
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Protocol
//!
//! | Direction | Bytes |
//! |-----------|-------|
//! | Request | `cdraminfo<id><password>{10#}` |
//! | Response | `#<identifier>[<value>]` repeated, then `\r` |
//! | Rejected credentials | response starting with `PWD}` |
//!
//! ## Error Handling
//!
//! ```no_run
//! use iregul::{Client, ClientConfig, Error};
//!
//! # async fn run(client: Client) {
//! match client.refresh().await {
//!     Ok(()) => println!("{} readings", client.snapshot().len()),
//!     Err(Error::Authentication) => println!("check id and password"),
//!     Err(e) if e.is_transient() => println!("will try again later: {e}"),
//!     Err(e) => println!("Error: {e}"),
//! }
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```
//! use iregul::{ClientConfig, FramingPolicy};
//! use std::time::Duration;
//!
//! let config = ClientConfig::new("123456", "secret")
//!     .with_timeout(Duration::from_secs(5))    // default: 10s
//!     .with_framing(FramingPolicy::Strict);   // default: Lenient
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade. The
//! password never appears in log output.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod client;
mod error;
mod request;
mod response;
pub mod sensors;
mod transport;

// Public re-exports
pub use client::{Client, ClientConfig};
pub use error::{Error, Result};
pub use request::{build_request, Credentials, COMMAND_PREFIX, REQUEST_ID};
pub use response::{
    decode, is_auth_failure, Snapshot, AUTH_FAILURE_PREFIX, RESPONSE_TERMINATOR,
};
pub use sensors::{BinarySensor, Sensor};
pub use transport::{
    FramingPolicy, DEFAULT_TIMEOUT, MAX_RESPONSE_SIZE, SERVER_HOST, SERVER_PORT,
};
