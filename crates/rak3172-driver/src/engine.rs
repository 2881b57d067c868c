//! Synchronous command round trips.
//!
//! One round trip holds the transport exclusively: write the encoded command,
//! then read in bounded chunks until the response window closes. Unsolicited
//! event lines that arrive inside the window are siphoned off and dispatched
//! after the lock is released, so a concurrent downlink never corrupts a
//! response and is never lost.

use std::time::Instant;

use rak3172_protocol::{Command, Event, Response};
use tracing::trace;

use crate::driver::{dispatch_event, report_error, Rak3172};
use crate::error::{DriverResult, Error};
use crate::transport::Transport;

impl<T: Transport> Rak3172<T> {
    /// Send a command and require an `OK` response.
    pub fn send_command(&self, command: Command) -> DriverResult<()> {
        let response = self.round_trip(&command)?;
        if response.is_ok() {
            Ok(())
        } else {
            Err(Error::CommandFailed { command: command.to_command_string() })
        }
    }

    /// Send a query and extract the value from its `key=value` response.
    ///
    /// Returns an empty string when the response carries no value, matching
    /// the module's behavior for unset parameters.
    pub fn get_command(&self, command: Command) -> DriverResult<String> {
        let response = self.round_trip(&command)?;
        Ok(response.value().unwrap_or_default())
    }

    /// One full command round trip under the transport lock.
    pub(crate) fn round_trip(&self, command: &Command) -> DriverResult<Response> {
        let config = &self.shared.config;
        let mut events = Vec::new();
        let mut decode_errors = Vec::new();
        let mut response_text = String::new();

        {
            let mut port = self.shared.transport.acquire(config.lock_timeout)?;
            trace!(command = %command.to_command_string(), "sending command");
            port.io.write_all(&command.encode())?;

            let deadline = Instant::now() + config.response_timeout;
            let mut buf = vec![0u8; config.read_chunk];
            'read: loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                let n = port.io.read(&mut buf, remaining)?;
                if n == 0 {
                    break;
                }
                port.codec.push(&buf[..n]);

                loop {
                    let line = match port.codec.decode_line() {
                        Ok(Some(line)) => line,
                        Ok(None) => break,
                        Err(e) => {
                            port.codec.clear();
                            decode_errors.push(e.to_string());
                            break;
                        }
                    };
                    match Event::parse(&line) {
                        Ok(Some(event)) => events.push(event),
                        Ok(None) => {
                            response_text.push_str(&line);
                            response_text.push('\n');
                        }
                        Err(e) => decode_errors.push(e.to_string()),
                    }
                }

                // The response terminator arrived; no need to wait out the
                // rest of the window.
                if response_text.contains("OK") || response_text.contains("ERROR") {
                    break 'read;
                }
            }
        }

        for event in events {
            dispatch_event(&self.shared, event);
        }
        for message in decode_errors {
            report_error(&self.shared, &message);
        }

        trace!(response = %response_text.trim_end(), "round trip complete");
        Ok(Response::parse(response_text))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rak3172_protocol::AtKey;

    use crate::driver::DriverConfig;
    use crate::transport::{MockHandle, MockTransport};

    use super::*;

    fn test_driver() -> (Rak3172<MockTransport>, MockHandle) {
        let (transport, handle) = MockTransport::new();
        let config = DriverConfig {
            response_timeout: Duration::from_millis(20),
            ..DriverConfig::default()
        };
        (Rak3172::with_config(transport, config), handle)
    }

    #[test]
    fn test_send_command_ok() {
        let (driver, handle) = test_driver();
        handle.set_responder(|_| Some("OK".to_string()));

        driver.send_command(Command::Ping).unwrap();
        assert_eq!(handle.written_text(), "AT\n");
    }

    #[test]
    fn test_send_command_rejected() {
        let (driver, handle) = test_driver();
        handle.set_responder(|_| Some("AT_PARAM_ERROR".to_string()));

        let err = driver
            .send_command(Command::Set { key: AtKey::DataRate, value: "5".to_string() })
            .unwrap_err();
        assert!(matches!(err, Error::CommandFailed { command } if command == "AT+DR=5"));
    }

    #[test]
    fn test_send_command_silence_is_failure() {
        let (driver, _handle) = test_driver();

        let err = driver.send_command(Command::Ping).unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
    }

    #[test]
    fn test_get_command_extracts_value() {
        let (driver, handle) = test_driver();
        handle.set_responder(|cmd| {
            (cmd == "AT+VER=?").then(|| "AT+VER=1.0.4 OK".to_string())
        });

        let version = driver.get_command(Command::Query { key: AtKey::Version }).unwrap();
        assert_eq!(version, "1.0.4");
    }

    #[test]
    fn test_get_command_empty_when_no_value() {
        let (driver, handle) = test_driver();
        handle.set_responder(|_| Some("OK".to_string()));

        let value = driver.get_command(Command::Query { key: AtKey::DevEui }).unwrap();
        assert_eq!(value, "");
    }

    #[test]
    fn test_event_interleaved_with_response_is_dispatched() {
        let (driver, handle) = test_driver();
        handle.set_responder(|_| Some("+EVT:RX_1:-38:13:UNICAST:2:48656c6c6f\nOK".to_string()));

        driver.send_command(Command::Ping).unwrap();

        assert_eq!(driver.available(), 1);
        let frames = driver.read();
        assert_eq!(frames[0].payload_text(), "Hello");
        assert_eq!(frames[0].port, 2);
    }
}
