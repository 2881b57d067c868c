//! In-memory transport for tests.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::Transport;

type Responder = Box<dyn Fn(&str) -> Option<String> + Send>;

#[derive(Default)]
struct MockState {
    /// Bytes queued for delivery to the driver.
    rx: VecDeque<u8>,
    /// Everything the driver wrote, in order.
    written: Vec<u8>,
    /// Accumulates written bytes until a full command line is seen.
    pending_line: Vec<u8>,
    /// Optional scripted reply per written command line.
    responder: Option<Responder>,
    /// Baud rates the driver asked for.
    baud_changes: Vec<u32>,
}

/// A scriptable [`Transport`] backed by in-memory queues.
///
/// The paired [`MockHandle`] injects module output (including unsolicited
/// event lines) and inspects what the driver wrote. A responder closure can
/// answer each written command line, which makes command round trips work
/// without a real module.
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

/// Test-side handle to a [`MockTransport`].
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> (MockTransport, MockHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            MockTransport { state: Arc::clone(&state) },
            MockHandle { state },
        )
    }
}

impl MockHandle {
    /// Queue raw bytes for the driver to read.
    pub fn push_rx(&self, data: &[u8]) {
        self.state.lock().unwrap().rx.extend(data.iter().copied());
    }

    /// Queue one line of module output, adding the terminator.
    pub fn push_line(&self, line: &str) {
        let mut state = self.state.lock().unwrap();
        state.rx.extend(line.as_bytes().iter().copied());
        state.rx.push_back(b'\n');
    }

    /// Script a reply for each command line the driver writes. Returning
    /// `None` leaves the command unanswered.
    pub fn set_responder(&self, responder: impl Fn(&str) -> Option<String> + Send + 'static) {
        self.state.lock().unwrap().responder = Some(Box::new(responder));
    }

    /// Everything written so far, as lossy text.
    pub fn written_text(&self) -> String {
        String::from_utf8_lossy(&self.state.lock().unwrap().written).to_string()
    }

    /// Drain and return everything written so far.
    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut self.state.lock().unwrap().written)
    }

    /// Baud rates the driver asked the transport to switch to.
    pub fn baud_changes(&self) -> Vec<u32> {
        self.state.lock().unwrap().baud_changes.clone()
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        let mut n = 0;
        while n < buf.len() {
            let Some(byte) = state.rx.pop_front() else {
                break;
            };
            buf[n] = byte;
            n += 1;
        }
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.written.extend_from_slice(data);
        state.pending_line.extend_from_slice(data);

        // Feed each completed command line to the responder.
        while let Some(end) = state.pending_line.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = state.pending_line.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line_bytes[..end]).to_string();
            let reply = state.responder.as_ref().and_then(|respond| respond(&line));
            if let Some(reply) = reply {
                state.rx.extend(reply.as_bytes().iter().copied());
                state.rx.push_back(b'\n');
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn set_baud_rate(&mut self, bps: u32) -> io::Result<()> {
        self.state.lock().unwrap().baud_changes.push(bps);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_drains_queued_bytes() {
        let (mut transport, handle) = MockTransport::new();
        handle.push_rx(b"OK\n");

        let mut buf = [0u8; 8];
        let n = transport.read(&mut buf, Duration::from_millis(1)).unwrap();
        assert_eq!(&buf[..n], b"OK\n");

        let n = transport.read(&mut buf, Duration::from_millis(1)).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_responder_answers_command_lines() {
        let (mut transport, handle) = MockTransport::new();
        handle.set_responder(|cmd| (cmd == "AT").then(|| "OK".to_string()));

        transport.write_all(b"AT\n").unwrap();
        assert_eq!(handle.written_text(), "AT\n");

        let mut buf = [0u8; 8];
        let n = transport.read(&mut buf, Duration::from_millis(1)).unwrap();
        assert_eq!(&buf[..n], b"OK\n");
    }
}
