//! Outbound snapshot delivery
//!
//! The engine hands each [`Snapshot`] to a [`SnapshotSink`] from inside the
//! render call, so every implementation here returns immediately: a full or
//! closed queue drops the snapshot instead of waiting.

use crate::metrics::Snapshot;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Receiver of periodic snapshots
pub trait SnapshotSink: Send {
    /// Deliver one snapshot without blocking
    fn emit(&mut self, snapshot: Snapshot);
}

/// Sink backed by a bounded crossbeam channel
///
/// Snapshots that do not fit are dropped and counted. Each failure mode is
/// logged once.
#[derive(Debug)]
pub struct ChannelSink {
    sender: Sender<Snapshot>,
    dropped: u64,
    warned_full: bool,
    warned_disconnected: bool,
}

impl ChannelSink {
    pub fn new(sender: Sender<Snapshot>) -> Self {
        Self {
            sender,
            dropped: 0,
            warned_full: false,
            warned_disconnected: false,
        }
    }

    /// Number of snapshots that could not be queued
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl SnapshotSink for ChannelSink {
    fn emit(&mut self, snapshot: Snapshot) {
        match self.sender.try_send(snapshot) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                if !self.warned_full {
                    self.warned_full = true;
                    tracing::warn!("Snapshot queue full, dropping snapshots");
                }
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
                if !self.warned_disconnected {
                    self.warned_disconnected = true;
                    tracing::warn!("Snapshot receiver disconnected, dropping snapshots");
                }
            }
        }
    }
}

/// Create a bounded snapshot queue
///
/// `bound` is clamped to at least one slot.
pub fn snapshot_channel(bound: usize) -> (ChannelSink, Receiver<Snapshot>) {
    let (sender, receiver) = bounded(bound.max(1));
    (ChannelSink::new(sender), receiver)
}

/// Sink that forwards every snapshot to a closure
pub struct CallbackSink<F> {
    callback: F,
}

impl<F> CallbackSink<F>
where
    F: FnMut(Snapshot) + Send,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> SnapshotSink for CallbackSink<F>
where
    F: FnMut(Snapshot) + Send,
{
    fn emit(&mut self, snapshot: Snapshot) {
        (self.callback)(snapshot);
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn emit(&mut self, _snapshot: Snapshot) {}
}

impl SnapshotSink for Box<dyn SnapshotSink> {
    fn emit(&mut self, snapshot: Snapshot) {
        (**self).emit(snapshot);
    }
}
