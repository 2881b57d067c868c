//! The driver object and its shared state.
//!
//! A [`Rak3172`] is a cheap clone over shared state: the transport behind a
//! timed lock, the session snapshot, the frame inbox and the callback
//! registry. Command issuers and the background poller all operate on the
//! same shared state from any thread.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rak3172_protocol::{
    AtKey, Command, DeviceClass, Event, JoinMode, LineCodec, ReceivedFrame,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DriverResult, Error};
use crate::lock::TimedMutex;
use crate::transport::Transport;

// ============================================================================
// Configuration
// ============================================================================

/// Retry policy for operations that probe the module.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Number of attempts before giving up.
    pub attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy { attempts: 10, delay: Duration::from_millis(500) }
    }
}

/// Tunable timing parameters of the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// How long one command round trip waits for response bytes.
    pub response_timeout: Duration,
    /// How long to wait for exclusive transport access.
    pub lock_timeout: Duration,
    /// Idle sleep between poller cycles that saw no data.
    pub poll_interval: Duration,
    /// Transport read chunk size in bytes.
    pub read_chunk: usize,
    /// Retry policy for [`Rak3172::init`].
    pub init_retry: RetryPolicy,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            response_timeout: Duration::from_millis(100),
            lock_timeout: Duration::from_secs(1),
            poll_interval: Duration::from_millis(10),
            read_chunk: 128,
            init_retry: RetryPolicy::default(),
        }
    }
}

// ============================================================================
// Session state and callbacks
// ============================================================================

/// Snapshot of what the driver believes about the module.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Whether the module has joined a network.
    pub joined: bool,
    /// Device class last set through the driver.
    pub device_class: DeviceClass,
    /// Join mode last set through the driver.
    pub join_mode: JoinMode,
    /// Whether uplinks request confirmation.
    pub confirmed_uplink: bool,
}

type ReceiveCallback = Arc<dyn Fn(ReceivedFrame) + Send + Sync>;
type SendCallback = Arc<dyn Fn() + Send + Sync>;
type JoinCallback = Arc<dyn Fn(bool) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Single-slot callback registry; registering again replaces the slot.
#[derive(Default)]
pub(crate) struct Callbacks {
    on_receive: Option<ReceiveCallback>,
    on_send: Option<SendCallback>,
    on_join: Option<JoinCallback>,
    on_error: Option<ErrorCallback>,
}

/// The transport together with its line accumulation state. The two travel
/// under one lock so that a reader always sees a consistent byte stream.
pub(crate) struct Port<T> {
    pub(crate) io: T,
    pub(crate) codec: LineCodec,
}

pub(crate) struct Shared<T> {
    pub(crate) transport: TimedMutex<Port<T>>,
    pub(crate) session: Mutex<SessionState>,
    pub(crate) inbox: Mutex<Vec<ReceivedFrame>>,
    pub(crate) callbacks: Mutex<Callbacks>,
    pub(crate) config: DriverConfig,
}

// ============================================================================
// Event dispatch
// ============================================================================

/// Apply one classified event to the shared state and fire the matching
/// callback. Callbacks run on the dispatching thread with no locks held.
pub(crate) fn dispatch_event<T>(shared: &Shared<T>, event: Event) {
    match event {
        Event::Joined => {
            shared.session.lock().unwrap().joined = true;
            info!("network joined");
            if let Some(on_join) = clone_slot(&shared.callbacks, |c| c.on_join.clone()) {
                on_join(true);
            }
        }
        Event::JoinFailed => {
            shared.session.lock().unwrap().joined = false;
            warn!("network join failed");
            if let Some(on_join) = clone_slot(&shared.callbacks, |c| c.on_join.clone()) {
                on_join(false);
            }
        }
        Event::TxDone => {
            debug!("uplink transmission complete");
            if let Some(on_send) = clone_slot(&shared.callbacks, |c| c.on_send.clone()) {
                on_send();
            }
        }
        Event::LinkCheck(report) => {
            debug!(%report, "link check report");
        }
        Event::Rx(frame) => {
            debug!(
                rssi = frame.rssi,
                snr = frame.snr,
                port = frame.port,
                len = frame.len,
                "downlink frame received"
            );
            shared.inbox.lock().unwrap().push(frame.clone());
            if let Some(on_receive) = clone_slot(&shared.callbacks, |c| c.on_receive.clone()) {
                on_receive(frame);
            }
        }
    }
}

/// Report a poller-side failure through the error callback.
pub(crate) fn report_error<T>(shared: &Shared<T>, message: &str) {
    warn!(error = message, "event stream error");
    if let Some(on_error) = clone_slot(&shared.callbacks, |c| c.on_error.clone()) {
        on_error(message);
    }
}

fn clone_slot<C>(
    callbacks: &Mutex<Callbacks>,
    select: impl Fn(&Callbacks) -> Option<C>,
) -> Option<C> {
    select(&callbacks.lock().unwrap())
}

// ============================================================================
// Driver
// ============================================================================

/// Driver for a RAK3172 module reachable over a byte transport.
pub struct Rak3172<T> {
    pub(crate) shared: Arc<Shared<T>>,
}

impl<T> Clone for Rak3172<T> {
    fn clone(&self) -> Self {
        Rak3172 { shared: Arc::clone(&self.shared) }
    }
}

impl<T: Transport> Rak3172<T> {
    /// Create a driver over `transport` with default timing.
    pub fn new(transport: T) -> Rak3172<T> {
        Rak3172::with_config(transport, DriverConfig::default())
    }

    /// Create a driver with explicit timing parameters.
    pub fn with_config(transport: T, config: DriverConfig) -> Rak3172<T> {
        Rak3172 {
            shared: Arc::new(Shared {
                transport: TimedMutex::new(Port { io: transport, codec: LineCodec::new() }),
                session: Mutex::new(SessionState::default()),
                inbox: Mutex::new(Vec::new()),
                callbacks: Mutex::new(Callbacks::default()),
                config,
            }),
        }
    }

    /// Probe the module until it answers, then switch it to LoRaWAN mode.
    ///
    /// The attention ping is retried per the configured
    /// [`RetryPolicy`]; a module mid-boot simply stays silent.
    pub fn init(&self) -> DriverResult<()> {
        let retry = self.shared.config.init_retry;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send_command(Command::Ping) {
                Ok(()) => break,
                Err(Error::CommandFailed { .. }) if attempt < retry.attempts => {
                    debug!(attempt, "module not answering yet, retrying");
                    thread::sleep(retry.delay);
                }
                Err(e) => return Err(e),
            }
        }
        self.send_command(Command::Set {
            key: AtKey::WorkMode,
            value: "1".to_string(),
        })?;
        info!("module initialized in lorawan work mode");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Join and send workflows
    // ------------------------------------------------------------------

    /// Start a network join with the stock parameters (no auto-join,
    /// 7 second retry interval, 10 attempts).
    pub fn join(&self) -> DriverResult<()> {
        self.join_with(true, false, 7, 10)
    }

    /// Start or stop a network join. Requires OTAA mode.
    ///
    /// `retry_interval_secs` must be at least 7; the module rejects shorter
    /// intervals.
    pub fn join_with(
        &self,
        start: bool,
        auto_join: bool,
        retry_interval_secs: u8,
        max_attempts: u8,
    ) -> DriverResult<()> {
        if self.session().join_mode != JoinMode::Otaa {
            return Err(Error::WrongJoinMode);
        }
        if retry_interval_secs < 7 {
            return Err(Error::InvalidArgument(format!(
                "join retry interval must be at least 7 seconds, got {}",
                retry_interval_secs
            )));
        }
        self.send_command(Command::Join {
            start,
            auto_join,
            retry_interval: retry_interval_secs,
            retry_count: max_attempts,
        })
    }

    /// Block until the module reports a join, up to `timeout`.
    ///
    /// The join result arrives as an unsolicited event, so the poller must be
    /// running (see [`Rak3172::start_polling`]).
    pub fn wait_for_join(&self, timeout: Duration) -> DriverResult<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.is_joined() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(100));
        }
        if self.is_joined() {
            Ok(())
        } else {
            Err(Error::JoinTimeout)
        }
    }

    /// Send a text uplink on `port`; returns the payload length in bytes.
    pub fn send(&self, text: &str, port: u8) -> DriverResult<usize> {
        self.send_bytes(text.as_bytes(), port)
    }

    /// Send a binary uplink on `port`; returns the payload length in bytes.
    ///
    /// The port must be in 1..=233 and the hex-encoded payload must be
    /// between 2 and 500 characters, both module limits.
    pub fn send_bytes(&self, data: &[u8], port: u8) -> DriverResult<usize> {
        if !(1..=233).contains(&port) {
            return Err(Error::InvalidArgument(format!(
                "uplink port must be in 1..=233, got {}",
                port
            )));
        }
        let hex_payload = rak3172_protocol::hex::encode(data);
        if !(2..=500).contains(&hex_payload.len()) {
            return Err(Error::InvalidArgument(format!(
                "encoded payload must be 2..=500 hex chars, got {}",
                hex_payload.len()
            )));
        }
        self.send_command(Command::Send { port, hex_payload })?;
        Ok(data.len())
    }

    // ------------------------------------------------------------------
    // Inbox
    // ------------------------------------------------------------------

    /// Number of frames waiting in the inbox.
    pub fn available(&self) -> usize {
        self.shared.inbox.lock().unwrap().len()
    }

    /// A copy of the frames waiting in the inbox, oldest first.
    pub fn read(&self) -> Vec<ReceivedFrame> {
        self.shared.inbox.lock().unwrap().clone()
    }

    /// Discard all inbox frames and flush the transport.
    pub fn flush(&self) -> DriverResult<()> {
        self.shared.inbox.lock().unwrap().clear();
        let mut port = self.shared.transport.acquire(self.shared.config.lock_timeout)?;
        port.io.flush()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Whether the module has joined a network.
    pub fn is_joined(&self) -> bool {
        self.session().joined
    }

    /// A copy of the current session snapshot.
    pub fn session(&self) -> SessionState {
        self.shared.session.lock().unwrap().clone()
    }

    // ------------------------------------------------------------------
    // Callbacks
    // ------------------------------------------------------------------

    /// Register the downlink frame callback.
    pub fn on_receive(&self, callback: impl Fn(ReceivedFrame) + Send + Sync + 'static) {
        self.shared.callbacks.lock().unwrap().on_receive = Some(Arc::new(callback));
    }

    /// Register the transmission-complete callback.
    pub fn on_send(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.shared.callbacks.lock().unwrap().on_send = Some(Arc::new(callback));
    }

    /// Register the join-result callback; the argument is `true` on success.
    pub fn on_join(&self, callback: impl Fn(bool) + Send + Sync + 'static) {
        self.shared.callbacks.lock().unwrap().on_join = Some(Arc::new(callback));
    }

    /// Register the event-stream error callback.
    pub fn on_error(&self, callback: impl Fn(&str) + Send + Sync + 'static) {
        self.shared.callbacks.lock().unwrap().on_error = Some(Arc::new(callback));
    }
}
