//! The global event queue.
//!
//! Every state change in the network flows through this queue: output
//! pins schedule their next committed level here, and so do external
//! stimuli.  Events are ordered by (due time, insertion sequence), so
//! two events due at the same instant are applied in the order they
//! were scheduled, which makes a run deterministic and replayable.
//!
//! The queue is keyed by the event's *source*.  Scheduling a source
//! which already has a pending event replaces the stale one: an
//! output pin (or an external driver of a net) has at most one
//! outstanding write at any time.
use std::cmp::Reverse;
use std::time::Duration;

use keyed_priority_queue::KeyedPriorityQueue;
use tracing::{event, Level};

use super::types::{DeviceId, NetId};

/// Identifies what scheduled an event; the key under which it can be
/// superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EventKey {
    /// A write scheduled by output pin `output` of a device.
    Driver(DeviceId, usize),
    /// A write scheduled by the external driver of a net.
    External(NetId),
}

/// Queue position of a pending event.  `seq` breaks ties between
/// events due at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Rank {
    pub(crate) due: Duration,
    pub(crate) seq: u64,
}

#[derive(Debug)]
pub(crate) struct EventQueue {
    items: KeyedPriorityQueue<EventKey, Reverse<Rank>>,
    next_seq: u64,
}

impl EventQueue {
    pub(crate) fn new() -> EventQueue {
        EventQueue {
            items: KeyedPriorityQueue::new(),
            next_seq: 0,
        }
    }

    /// Schedules (or reschedules) the event for `key` at `due`.  The
    /// event gets a fresh sequence number either way, so a superseded
    /// write due at the same instant still lands after everything
    /// already queued for that instant.  Returns the due time of the
    /// write it replaced, if there was one.
    pub(crate) fn schedule(&mut self, key: EventKey, due: Duration) -> Option<Duration> {
        let seq = self.next_seq;
        self.next_seq += 1;
        let old = self
            .items
            .push(key, Reverse(Rank { due, seq }))
            .map(|Reverse(rank)| rank.due);
        if let Some(previous) = old {
            event!(
                Level::TRACE,
                "superseding pending event for {:?}: due {:?} -> {:?}",
                key,
                previous,
                due
            );
        }
        old
    }

    /// The due time of the earliest pending event.
    pub(crate) fn peek_due(&self) -> Option<Duration> {
        self.items.peek().map(|(_, Reverse(rank))| rank.due)
    }

    pub(crate) fn pop(&mut self) -> Option<(EventKey, Rank)> {
        self.items.pop().map(|(key, Reverse(rank))| (key, rank))
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
