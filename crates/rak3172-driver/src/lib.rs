//! Driver for the RAK3172 LoRaWAN radio module.
//!
//! The module speaks a line-oriented AT command dialect over a serial byte
//! stream. This crate layers a thread-safe driver on top of any
//! [`Transport`]: synchronous command round trips, a background poller for
//! unsolicited events, a frame inbox, single-slot callbacks and a typed
//! configuration facade covering the module's parameter set.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use rak3172_driver::{Band, Rak3172, TcpTransport};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = TcpTransport::connect("192.0.2.10:7000")?;
//! let radio = Rak3172::new(transport);
//!
//! radio.init()?;
//! radio.set_band(Band::Eu868)?;
//! radio.set_otaa("00112233", "44556677", "0123456789abcdef")?;
//!
//! let poller = radio.start_polling();
//! radio.join()?;
//! radio.wait_for_join(Duration::from_secs(70))?;
//! radio.send("Hello", 1)?;
//!
//! poller.shutdown();
//! # Ok(())
//! # }
//! ```

mod config;
mod driver;
mod engine;
mod error;
mod lock;
mod poller;
mod transport;

pub use driver::{DriverConfig, Rak3172, RetryPolicy, SessionState};
pub use error::{DriverResult, Error};
pub use lock::{TimedGuard, TimedMutex};
pub use poller::PollerHandle;
pub use transport::{MockHandle, MockTransport, TcpTransport, Transport};

// Protocol types most driver callers need.
pub use rak3172_protocol::{
    AtKey, Band, BaudRate, Command, DeviceClass, Event, JoinMode, LinkCheckMode, LowPowerLevel,
    ReceivedFrame, Response,
};
