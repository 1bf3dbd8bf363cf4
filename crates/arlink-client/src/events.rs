//! Typed observer channels.
//!
//! Observers subscribe by taking the receiving half of an mpsc channel;
//! the connection broadcasts by cloning into every live sender. A dropped
//! receiver unsubscribes implicitly: its sender errors on the next publish
//! and is pruned.

use std::sync::mpsc;

use arlink_frame::Frame;

use crate::decoded::DecodedMessage;
use crate::state::PropertyChange;

#[derive(Debug)]
pub struct ObserverSet<T: Clone> {
    senders: Vec<mpsc::Sender<T>>,
}

impl<T: Clone> Default for ObserverSet<T> {
    fn default() -> Self {
        Self {
            senders: Vec::new(),
        }
    }
}

impl<T: Clone> ObserverSet<T> {
    pub fn subscribe(&mut self) -> mpsc::Receiver<T> {
        let (tx, rx) = mpsc::channel();
        self.senders.push(tx);
        rx
    }

    /// Deliver to every live observer, dropping the disconnected ones.
    pub fn publish(&mut self, value: &T) {
        self.senders.retain(|tx| tx.send(value.clone()).is_ok());
    }

    pub fn observer_count(&self) -> usize {
        self.senders.len()
    }
}

/// The connection's notification surfaces, one channel set per concern.
#[derive(Debug, Default)]
pub struct ConnectionEvents {
    /// Every decodable inbound frame, before channel dispatch.
    pub frames: ObserverSet<Frame>,
    /// Messages from the best-effort command channel.
    pub commands: ObserverSet<DecodedMessage>,
    /// Messages from the acked channel, request-matched or not.
    pub events: ObserverSet<DecodedMessage>,
    /// Completed property updates from the state store.
    pub properties: ObserverSet<PropertyChange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_sees_every_publish() {
        let mut set: ObserverSet<u32> = ObserverSet::default();
        let a = set.subscribe();
        let b = set.subscribe();

        set.publish(&7);
        set.publish(&8);

        assert_eq!(a.try_recv().unwrap(), 7);
        assert_eq!(b.try_recv().unwrap(), 7);
        assert_eq!(a.try_recv().unwrap(), 8);
        assert_eq!(b.try_recv().unwrap(), 8);
    }

    #[test]
    fn dropped_receivers_are_pruned_on_publish() {
        let mut set: ObserverSet<u32> = ObserverSet::default();
        let keep = set.subscribe();
        drop(set.subscribe());
        assert_eq!(set.observer_count(), 2);

        set.publish(&1);
        assert_eq!(set.observer_count(), 1);
        assert_eq!(keep.try_recv().unwrap(), 1);
    }
}
