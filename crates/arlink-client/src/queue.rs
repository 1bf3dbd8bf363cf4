//! Single-flight transactional command queue.
//!
//! Commands that expect a response are strictly serialized: at most one is
//! in flight, the rest wait their turn. Fire-and-forget commands pass
//! straight through and never block the queue. Responses are matched
//! against the in-flight command's expected-response selector; multi-part
//! list/map replies accumulate until the terminator fragment arrives.
//!
//! The queue owns no timer. [`TransactionQueue::poll`] must be called from
//! the connection's event loop with the current instant; deadlines are
//! plain fields checked there.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use arlink_catalog::{EventContent, MessageCatalog, MessageKind, MessageSchema, Params};
use arlink_frame::FrameType;
use arlink_transport::DatagramLink;

use crate::decoded::DecodedMessage;
use crate::engine::ProtocolEngine;
use crate::error::{ClientError, Result};

/// Fragment flag marking the first element of a list/map stream.
pub const LIST_FLAG_FIRST: u8 = 0x01;
/// Fragment flag marking the last element; completes the transaction.
pub const LIST_FLAG_LAST: u8 = 0x02;

/// Default response deadline.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(5000);

type Outcome = Result<Vec<DecodedMessage>>;

/// Caller's side of a submitted command.
///
/// Fire-and-forget commands complete at submit time; response-expecting
/// ones complete when the terminal response, a timeout, or a close arrives.
/// A handle whose submission was superseded by a coalescing resubmit
/// reports [`ClientError::ConnectionClosed`].
#[derive(Debug)]
pub struct CommandHandle {
    rx: mpsc::Receiver<Outcome>,
}

impl CommandHandle {
    fn pair() -> (mpsc::Sender<Outcome>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }

    /// Take the outcome if it has already been decided.
    pub fn try_result(&self) -> Option<Outcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(ClientError::ConnectionClosed)),
        }
    }

    /// Block until the outcome is decided.
    ///
    /// Only safe from a thread that is not the one driving the connection's
    /// event loop; the loop itself should use [`CommandHandle::try_result`].
    pub fn wait(self) -> Outcome {
        self.rx
            .recv()
            .unwrap_or(Err(ClientError::ConnectionClosed))
    }

    /// Block until the outcome is decided or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Outcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Some(Err(ClientError::ConnectionClosed))
            }
        }
    }
}

struct PendingCommand {
    schema: Arc<MessageSchema>,
    params: Params,
    completer: mpsc::Sender<Outcome>,
    timeout: Duration,
}

impl std::fmt::Debug for PendingCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCommand")
            .field("path", &self.schema.path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct TransactionQueue {
    queue: VecDeque<PendingCommand>,
    /// True while the head has been sent and awaits its response.
    waiting: bool,
    fragments: Vec<DecodedMessage>,
    deadline: Option<Instant>,
}

impl TransactionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Resolve `path` against `catalog` and submit.
    pub fn submit_path<L: DatagramLink>(
        &mut self,
        engine: &mut ProtocolEngine<L>,
        catalog: &MessageCatalog,
        path: &str,
        params: Params,
        timeout: Option<Duration>,
        now: Instant,
    ) -> Result<CommandHandle> {
        let schema = catalog
            .resolve_path(path)
            .map_err(|_| ClientError::UnknownCommand(path.to_string()))?;
        self.submit(engine, schema, params, timeout, now)
    }

    /// Enqueue a command and pump the queue.
    ///
    /// A not-yet-sent queued entry with the same identity is replaced in
    /// place, keeping its position; the superseded completer is dropped.
    pub fn submit<L: DatagramLink>(
        &mut self,
        engine: &mut ProtocolEngine<L>,
        schema: Arc<MessageSchema>,
        params: Params,
        timeout: Option<Duration>,
        now: Instant,
    ) -> Result<CommandHandle> {
        if !schema.is_command() {
            return Err(ClientError::UnknownCommand(schema.path.clone()));
        }
        // Encode now so argument errors surface at the call site.
        schema.encode(&params)?;

        let (completer, handle) = CommandHandle::pair();
        let pending = PendingCommand {
            schema,
            params,
            completer,
            timeout: timeout.unwrap_or(DEFAULT_COMMAND_TIMEOUT),
        };

        // The head is off limits for coalescing while it is in flight.
        let unsent_from = usize::from(self.waiting);
        let coalesced = self
            .queue
            .iter_mut()
            .skip(unsent_from)
            .find(|entry| entry.schema.identity() == pending.schema.identity());
        match coalesced {
            Some(entry) => {
                trace!(path = %pending.schema.path, "coalescing queued command");
                *entry = pending;
            }
            None => self.queue.push_back(pending),
        }

        self.pump(engine, now)?;
        Ok(handle)
    }

    /// Send queued commands until one goes into flight or the queue drains.
    fn pump<L: DatagramLink>(
        &mut self,
        engine: &mut ProtocolEngine<L>,
        now: Instant,
    ) -> Result<()> {
        while !self.waiting {
            let Some(head) = self.queue.front() else {
                break;
            };

            let message = head.schema.message(&head.params)?;
            let channel_id = match &head.schema.kind {
                MessageKind::Command { ack, .. } => ack.channel_id(),
                MessageKind::Event { .. } => unreachable!("submit rejects events"),
            };
            trace!(path = %head.schema.path, channel_id, "sending command");
            engine.send_frame(FrameType::Data, channel_id, message.encode())?;

            if head.schema.expects().is_some() {
                self.waiting = true;
                self.deadline = Some(now + head.timeout);
            } else {
                let head = self.queue.pop_front().expect("head checked above");
                let _ = head.completer.send(Ok(Vec::new()));
            }
        }
        Ok(())
    }

    /// Feed an inbound acknowledged message to the matcher.
    ///
    /// Returns whether the message completed the in-flight transaction. The
    /// caller forwards the message as an event in every case; completion
    /// only decides the queue's disposition.
    pub fn on_acked<L: DatagramLink>(
        &mut self,
        engine: &mut ProtocolEngine<L>,
        decoded: &DecodedMessage,
        now: Instant,
    ) -> Result<bool> {
        if !self.waiting {
            return Ok(false);
        }
        let head = self.queue.front().expect("waiting implies a head");
        let expect = head.schema.expects().expect("waiting implies expectation");

        if !expect.matches(&decoded.message) {
            // Off-selector traffic during a transaction still accumulates;
            // settings dumps interleave many event identities.
            self.fragments.push(decoded.clone());
            return Ok(false);
        }

        // The response stream has started; the deadline no longer applies.
        self.deadline = None;

        let fragmented = matches!(
            &decoded.schema.kind,
            MessageKind::Event {
                content: EventContent::ListItem | EventContent::MapItem(_)
            }
        );
        if fragmented {
            self.fragments.push(decoded.clone());
            if decoded.params.list_flags() != Some(LIST_FLAG_LAST) {
                return Ok(false);
            }
        } else if !decoded.params.is_empty() {
            self.fragments.push(decoded.clone());
        }

        let head = self.queue.pop_front().expect("waiting implies a head");
        self.waiting = false;
        debug!(path = %head.schema.path, fragments = self.fragments.len(), "command completed");
        let _ = head.completer.send(Ok(std::mem::take(&mut self.fragments)));

        self.pump(engine, now)?;
        Ok(true)
    }

    /// Expire the in-flight command if its deadline has passed, then keep
    /// the queue moving.
    pub fn poll<L: DatagramLink>(
        &mut self,
        engine: &mut ProtocolEngine<L>,
        now: Instant,
    ) -> Result<()> {
        if self.waiting {
            if let Some(deadline) = self.deadline {
                if now >= deadline {
                    let head = self.queue.pop_front().expect("waiting implies a head");
                    warn!(path = %head.schema.path, timeout = ?head.timeout, "command timed out");
                    self.waiting = false;
                    self.deadline = None;
                    self.fragments.clear();
                    let _ = head
                        .completer
                        .send(Err(ClientError::MessageTimeout(head.timeout)));
                }
            }
        }
        self.pump(engine, now)
    }

    /// Reject everything outstanding; used on connection close.
    pub fn close(&mut self) {
        self.waiting = false;
        self.deadline = None;
        self.fragments.clear();
        while let Some(entry) = self.queue.pop_front() {
            let _ = entry.completer.send(Err(ClientError::ConnectionClosed));
        }
    }
}
