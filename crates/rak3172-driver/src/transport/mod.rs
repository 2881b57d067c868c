//! Byte transport abstraction.
//!
//! The driver talks to the module through any bidirectional byte stream.
//! Reads are bounded: a call that produces no bytes before its timeout
//! returns `Ok(0)`, which the driver treats as "nothing arrived", never as
//! end of stream.

use std::io;
use std::time::Duration;

mod mock;
mod tcp;

pub use mock::{MockHandle, MockTransport};
pub use tcp::TcpTransport;

/// A bidirectional byte stream to the module.
pub trait Transport {
    /// Read up to `buf.len()` bytes, waiting at most `timeout`.
    ///
    /// Returns the number of bytes read; `Ok(0)` means the timeout elapsed
    /// with nothing available.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;

    /// Write the whole buffer.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush any buffered output.
    fn flush(&mut self) -> io::Result<()>;

    /// Reconfigure the link speed, where the transport supports it.
    fn set_baud_rate(&mut self, bps: u32) -> io::Result<()>;
}
