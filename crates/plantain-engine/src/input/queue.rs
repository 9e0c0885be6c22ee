use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use super::types::InputEvent;

pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 100;

/// Bounded FIFO between the platform callbacks and the game loop.
///
/// Producers never block. Past `capacity`, events spill into an overflow
/// list where consecutive `MouseMoved` events keep only the latest position
/// and consecutive `Scrolled` deltas are summed. Presses, releases, resizes
/// and focus changes are never dropped, and arrival order is kept.
pub struct EventQueue {
    tx: SyncSender<InputEvent>,
    rx: Receiver<InputEvent>,
    overflow: VecDeque<InputEvent>,
    capacity: usize,
    coalesced: u64,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::sync_channel(capacity);
        Self {
            tx,
            rx,
            overflow: VecDeque::new(),
            capacity,
            coalesced: 0,
        }
    }

    /// Queues an event. Returns `false` if it was merged into the previous
    /// overflow event instead of being queued on its own.
    pub fn push(&mut self, ev: InputEvent) -> bool {
        if !self.overflow.is_empty() {
            return self.spill(ev);
        }
        match self.tx.try_send(ev) {
            Ok(()) => true,
            Err(TrySendError::Full(ev)) => {
                log::warn!("input queue full ({} events); coalescing motion", self.capacity);
                self.spill(ev)
            }
            // Both ends live in `self`.
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    fn spill(&mut self, ev: InputEvent) -> bool {
        let merged = match (self.overflow.back_mut(), ev) {
            (Some(last), InputEvent::MouseMoved { .. })
                if matches!(last, InputEvent::MouseMoved { .. }) =>
            {
                *last = ev;
                true
            }
            (
                Some(InputEvent::Scrolled { dx, dy }),
                InputEvent::Scrolled { dx: more_x, dy: more_y },
            ) => {
                *dx += more_x;
                *dy += more_y;
                true
            }
            _ => false,
        };
        if merged {
            self.coalesced += 1;
        } else {
            self.overflow.push_back(ev);
        }
        !merged
    }

    /// Yields queued events in arrival order until the queue is empty.
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.rx.try_iter().chain(self.overflow.drain(..))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events queued past `capacity` and not yet drained.
    pub fn overflowed(&self) -> usize {
        self.overflow.len()
    }

    /// Total number of motion and scroll events merged into a later one.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_QUEUE_CAPACITY)
    }
}
