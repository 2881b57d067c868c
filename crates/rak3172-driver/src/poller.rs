//! Background event poller.
//!
//! Unsolicited events arrive whenever the module feels like it. The poller
//! thread repeatedly grabs the transport for one bounded read, decodes any
//! complete lines and dispatches events; when a command round trip holds the
//! lock the poller just skips that cycle, because the round trip siphons
//! events itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use rak3172_protocol::Event;
use tracing::{debug, trace};

use crate::driver::{dispatch_event, report_error, Rak3172, Shared};
use crate::error::{DriverResult, Error};
use crate::transport::Transport;

/// Handle to a running poller thread.
pub struct PollerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Signal the poller to stop and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        debug!("poller stopped");
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl<T: Transport + Send + 'static> Rak3172<T> {
    /// Spawn the background poller thread.
    ///
    /// Dropping the returned handle signals the thread to stop;
    /// [`PollerHandle::shutdown`] additionally waits for it to exit.
    pub fn start_polling(&self) -> PollerHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let shared = Arc::clone(&self.shared);
        let stop_flag = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name("rak3172-poller".to_string())
            .spawn(move || {
                debug!("poller started");
                while !stop_flag.load(Ordering::Relaxed) {
                    match poll_once(&shared) {
                        Ok(true) => {}
                        Ok(false) => thread::sleep(shared.config.poll_interval),
                        // A command round trip holds the port; try again later.
                        Err(Error::LockTimeout) => thread::sleep(shared.config.poll_interval),
                        Err(e) => {
                            report_error(&shared, &e.to_string());
                            thread::sleep(shared.config.poll_interval);
                        }
                    }
                }
            })
            .expect("spawning the poller thread cannot fail");

        PollerHandle { stop, thread: Some(thread) }
    }
}

/// One poll cycle: read until one complete line (or the window closes) and
/// dispatch it. Returns `Ok(true)` if a line was handled.
pub(crate) fn poll_once<T: Transport>(shared: &Shared<T>) -> DriverResult<bool> {
    let config = &shared.config;
    let line = {
        let mut port = shared.transport.acquire(config.poll_interval)?;
        let deadline = std::time::Instant::now() + config.response_timeout;
        let mut buf = vec![0u8; config.read_chunk];
        loop {
            match port.codec.decode_line() {
                Ok(Some(line)) => break Some(line),
                Ok(None) => {}
                Err(e) => {
                    port.codec.clear();
                    drop(port);
                    report_error(shared, &e.to_string());
                    return Ok(false);
                }
            }
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                break None;
            }
            let n = port.io.read(&mut buf, remaining)?;
            if n == 0 {
                break None;
            }
            port.codec.push(&buf[..n]);
        }
    };

    let Some(line) = line else {
        return Ok(false);
    };

    match Event::parse(&line) {
        Ok(Some(event)) => dispatch_event(shared, event),
        Ok(None) => trace!(%line, "poller discarding non-event line"),
        Err(e) => report_error(shared, &e.to_string()),
    }
    Ok(true)
}
