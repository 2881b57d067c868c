//! TCP transport, for modules exposed through a serial-over-TCP bridge.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use super::Transport;

/// A [`Transport`] over a TCP connection to a serial bridge.
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to a serial bridge at `addr`.
    pub fn connect(addr: impl ToSocketAddrs) -> io::Result<TcpTransport> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        debug!(peer = %stream.peer_addr()?, "connected to serial bridge");
        Ok(TcpTransport { stream })
    }
}

impl Transport for TcpTransport {
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        // set_read_timeout(Some(0)) is an error; clamp to something tiny.
        let timeout = timeout.max(Duration::from_millis(1));
        self.stream.set_read_timeout(Some(timeout))?;
        match self.stream.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }

    fn set_baud_rate(&mut self, bps: u32) -> io::Result<()> {
        // The bridge owns the physical line speed; nothing to do here.
        debug!(bps, "baud rate change requested on tcp transport, ignored");
        Ok(())
    }
}
