//! RAK3172 AT Command Protocol
//!
//! This crate provides types and utilities for communicating with the RAK3172
//! family of LoRaWAN radio modules over their AT command interface. The module
//! speaks a simple line-based text protocol over a serial byte channel.
//!
//! # Protocol Overview
//!
//! - **Commands** (host → module): `AT` or `AT+<NAME>[=<value>]` terminated
//!   with `\n`. The query form `AT+<NAME>=?` reads a parameter back.
//! - **Responses** (module → host): free-form text; a command succeeded iff
//!   the response contains the literal token `OK`. Query responses carry a
//!   `key=value` segment from which the value is extracted.
//! - **Unsolicited events** (module → host): lines of the form
//!   `+EVT:<NAME>[:<field>]*`, emitted at any time. Recognized events are
//!   `JOINED`, `JOIN_FAILED`, `TX_DONE`, `LINKCHECK` and `RX_<n>` downlink
//!   frames carrying a hex-encoded payload.
//!
//! # Example
//!
//! ```rust
//! use rak3172_protocol::{Command, AtKey, Response};
//!
//! // Build a query command
//! let cmd = Command::Query { key: AtKey::DevEui };
//! assert_eq!(cmd.encode(), b"AT+DEVEUI=?\n");
//!
//! // Classify a response and extract its value
//! let response = Response::parse("AT+VER=1.2.3 OK");
//! assert!(response.is_ok());
//! assert_eq!(response.value(), Some("1.2.3".to_string()));
//! ```

mod codec;
mod commands;
mod error;
mod events;
pub mod hex;
mod responses;

pub use codec::*;
pub use commands::*;
pub use error::*;
pub use events::*;
pub use responses::*;
