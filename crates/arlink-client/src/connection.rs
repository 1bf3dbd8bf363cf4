//! Connection: the four protocol components wired together.
//!
//! A `Connection` owns the engine, catalog, transaction queue, state store,
//! and watchdog, and is driven by repeatedly calling [`Connection::poll`]
//! from a single context. There is no internal locking; a multi-threaded
//! caller moves the connection to one thread and talks to it through the
//! command handles and observer channels.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use arlink_catalog::{builtin, MessageCatalog, Params};
use arlink_frame::{Frame, Message};
use arlink_transport::DatagramLink;

use crate::decoded::DecodedMessage;
use crate::engine::{Inbound, ProtocolEngine};
use crate::error::{ClientError, Result};
use crate::events::ConnectionEvents;
use crate::queue::{CommandHandle, TransactionQueue};
use crate::state::{PropertyChange, PropertyValue, StateStore};
use crate::watchdog::LivenessWatchdog;

/// Receive buffer size; comfortably above any single control datagram.
const RECV_BUF_SIZE: usize = 64 * 1024;

#[derive(Debug)]
pub struct Connection<L: DatagramLink> {
    engine: ProtocolEngine<L>,
    catalog: MessageCatalog,
    queue: TransactionQueue,
    state: StateStore,
    watchdog: LivenessWatchdog,
    events: ConnectionEvents,
    open: bool,
}

impl<L: DatagramLink> Connection<L> {
    /// Wrap an established link. The watchdog arms immediately; the device
    /// is expected to start pinging as soon as the handshake completes.
    pub fn new(link: L, catalog: MessageCatalog, watchdog: LivenessWatchdog) -> Self {
        let mut watchdog = watchdog;
        watchdog.reset(Instant::now());
        Self {
            engine: ProtocolEngine::new(link),
            catalog,
            queue: TransactionQueue::new(),
            state: StateStore::new(),
            watchdog,
            events: ConnectionEvents::default(),
            open: true,
        }
    }

    /// [`Connection::new`] with the built-in catalog and default watchdog.
    pub fn with_builtin_catalog(link: L) -> Self {
        Self::new(link, builtin::builtin(), LivenessWatchdog::default())
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    pub fn link(&self) -> &L {
        self.engine.link()
    }

    pub fn link_mut(&mut self) -> &mut L {
        self.engine.link_mut()
    }

    /// Last cached value at `"feature.property"`.
    pub fn buffer(&self, path: &str) -> Option<&PropertyValue> {
        self.state.buffer(path)
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Observe every decodable inbound frame.
    pub fn subscribe_frames(&mut self) -> mpsc::Receiver<Frame> {
        self.events.frames.subscribe()
    }

    /// Observe best-effort channel messages.
    pub fn subscribe_commands(&mut self) -> mpsc::Receiver<DecodedMessage> {
        self.events.commands.subscribe()
    }

    /// Observe acked channel messages (request-matched or spontaneous).
    pub fn subscribe_events(&mut self) -> mpsc::Receiver<DecodedMessage> {
        self.events.events.subscribe()
    }

    /// Observe completed property updates.
    pub fn subscribe_properties(&mut self) -> mpsc::Receiver<PropertyChange> {
        self.events.properties.subscribe()
    }

    /// Submit a command by dotted path with the default timeout.
    pub fn send_command(&mut self, path: &str, params: Params) -> Result<CommandHandle> {
        self.send_command_with_timeout(path, params, None)
    }

    pub fn send_command_with_timeout(
        &mut self,
        path: &str,
        params: Params,
        timeout: Option<Duration>,
    ) -> Result<CommandHandle> {
        if !self.open {
            return Err(ClientError::ConnectionClosed);
        }
        self.queue.submit_path(
            &mut self.engine,
            &self.catalog,
            path,
            params,
            timeout,
            Instant::now(),
        )
    }

    /// One event-loop iteration: wait up to `recv_timeout` for a datagram,
    /// dispatch whatever arrived, then run queue and watchdog deadlines.
    ///
    /// Returns `true` if a datagram was processed. The loop keeps the
    /// connection honest even when idle; deadlines only advance here.
    pub fn poll(&mut self, recv_timeout: Duration) -> Result<bool> {
        if !self.open {
            return Err(ClientError::ConnectionClosed);
        }

        let mut buf = [0u8; RECV_BUF_SIZE];
        let received = self.engine.link_mut().recv(&mut buf, recv_timeout)?;
        let now = Instant::now();

        let handled = match received {
            Some(n) => {
                self.watchdog.reset(now);
                let inbound = self.engine.process_datagram(&buf[..n])?;
                for item in inbound {
                    match item {
                        Inbound::Frame(frame) => self.events.frames.publish(&frame),
                        Inbound::Command(message) => self.on_message(message, false, now)?,
                        Inbound::AckedCommand(message) => self.on_message(message, true, now)?,
                    }
                }
                true
            }
            None => false,
        };

        self.queue.poll(&mut self.engine, now)?;
        if self.watchdog.expired(now) {
            self.close();
        }
        Ok(handled)
    }

    fn on_message(&mut self, message: Message, acked: bool, now: Instant) -> Result<()> {
        let Some(schema) = self.catalog.resolve_message(&message) else {
            debug!(identity = ?message.identity(), "dropping message with no schema");
            return Ok(());
        };
        let params = match schema.decode(&message.args) {
            Ok(params) => params,
            Err(err) => {
                warn!(path = %schema.path, %err, "dropping undecodable message");
                return Ok(());
            }
        };
        let decoded = DecodedMessage::new(message, schema, params);

        if acked {
            self.queue.on_acked(&mut self.engine, &decoded, now)?;
            self.events.events.publish(&decoded);
        } else {
            self.events.commands.publish(&decoded);
        }

        if let Some(change) = self.state.handle(&decoded) {
            self.events.properties.publish(&change);
        }
        Ok(())
    }

    /// Close the connection: reject all outstanding commands, disarm the
    /// watchdog. Idempotent.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        info!("connection closed");
        self.open = false;
        self.queue.close();
        self.watchdog.clear();
    }
}

impl<L: DatagramLink> Drop for Connection<L> {
    fn drop(&mut self) {
        self.close();
    }
}
