//! Ordered event queue between a search and its consumer.
//!
//! Built on [std::sync::mpsc]: any number of [EventSender]s feed a single [EventReceiver], and
//! events come out in the order they were sent. The unbounded flavour never blocks the sender,
//! so a fast search can build up an arbitrarily large backlog while the consumer replays at its
//! own pace. The bounded flavour blocks the sender instead once `capacity` events are pending.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use crate::config::PlaybackConfig;
use crate::error::{Error, Result};
use crate::event::VisualizationEvent;

#[derive(Clone, Debug)]
enum Tx {
    Unbounded(mpsc::Sender<VisualizationEvent>),
    Bounded(mpsc::SyncSender<VisualizationEvent>),
}

/// Producer half. Cloning it gives another producer on the same queue.
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: Tx,
    backlog: Arc<AtomicUsize>,
}

/// Consumer half.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::Receiver<VisualizationEvent>,
    backlog: Arc<AtomicUsize>,
}

pub fn unbounded() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel();
    pair(Tx::Unbounded(tx), rx)
}

pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::sync_channel(capacity);
    pair(Tx::Bounded(tx), rx)
}

pub fn from_config(config: &PlaybackConfig) -> (EventSender, EventReceiver) {
    match config.channel_capacity {
        Some(capacity) => bounded(capacity),
        None => unbounded(),
    }
}

fn pair(tx: Tx, rx: mpsc::Receiver<VisualizationEvent>) -> (EventSender, EventReceiver) {
    let backlog = Arc::new(AtomicUsize::new(0));
    (
        EventSender {
            tx,
            backlog: Arc::clone(&backlog),
        },
        EventReceiver { rx, backlog },
    )
}

impl EventSender {
    /// Queues `event` behind everything sent before it. Fails only once the receiver is gone.
    pub fn send(&self, event: VisualizationEvent) -> Result<()> {
        // Counted before the send so a receiver never sees the counter go below zero
        self.backlog.fetch_add(1, Ordering::SeqCst);
        let sent = match &self.tx {
            Tx::Unbounded(tx) => tx.send(event).is_ok(),
            Tx::Bounded(tx) => tx.send(event).is_ok(),
        };
        if sent {
            Ok(())
        } else {
            self.backlog.fetch_sub(1, Ordering::SeqCst);
            Err(Error::ChannelClosed)
        }
    }

    /// Events sent but not yet received.
    pub fn backlog(&self) -> usize {
        self.backlog.load(Ordering::SeqCst)
    }
}

impl EventReceiver {
    /// The oldest pending event, or `None` if nothing is queued right now.
    pub fn try_receive(&self) -> Option<VisualizationEvent> {
        let event = self.rx.try_recv().ok()?;
        self.backlog.fetch_sub(1, Ordering::SeqCst);
        Some(event)
    }

    pub fn receive_timeout(&self, timeout: Duration) -> Option<VisualizationEvent> {
        let event = self.rx.recv_timeout(timeout).ok()?;
        self.backlog.fetch_sub(1, Ordering::SeqCst);
        Some(event)
    }

    /// Everything currently queued, oldest first.
    pub fn drain(&self) -> Vec<VisualizationEvent> {
        std::iter::from_fn(|| self.try_receive()).collect()
    }

    pub fn backlog(&self) -> usize {
        self.backlog.load(Ordering::SeqCst)
    }
}
