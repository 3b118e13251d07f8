//! Cancellable deferred work
//!
//! A min-heap of actions keyed by due time. Every scheduled action gets a
//! [`TimerId`] that works as its cancellation token; cancelled entries stay in
//! the heap and are discarded when they reach the top.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Token identifying one scheduled action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct Entry<A> {
    due_ms: u64,
    id: TimerId,
    action: A,
}

impl<A> PartialEq for Entry<A> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.id == other.id
    }
}

impl<A> Eq for Entry<A> {}

impl<A> PartialOrd for Entry<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Entry<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap behavior (earliest first, then first scheduled)
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Queue of actions waiting for their due time
pub struct TimerQueue<A> {
    heap: BinaryHeap<Entry<A>>,
    live: HashSet<TimerId>,
    next_id: u64,
}

impl<A> TimerQueue<A> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashSet::new(),
            next_id: 1,
        }
    }

    /// Schedule `action` to become due at `due_ms`
    pub fn schedule(&mut self, due_ms: u64, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.heap.push(Entry { due_ms, id, action });
        self.live.insert(id);
        id
    }

    /// Cancel one action. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id)
    }

    /// Cancel everything that is pending
    pub fn cancel_all(&mut self) {
        self.heap.clear();
        self.live.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.live.contains(&id)
    }

    /// Number of actions still pending
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Due time of the earliest pending action
    pub fn next_deadline(&mut self) -> Option<u64> {
        self.discard_cancelled();
        self.heap.peek().map(|e| e.due_ms)
    }

    /// Remove and return the earliest action due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerId, u64, A)> {
        self.discard_cancelled();
        if self.heap.peek()?.due_ms > now_ms {
            return None;
        }
        let entry = self.heap.pop()?;
        self.live.remove(&entry.id);
        Some((entry.id, entry.due_ms, entry.action))
    }

    fn discard_cancelled(&mut self) {
        while let Some(top) = self.heap.peek() {
            if self.live.contains(&top.id) {
                break;
            }
            self.heap.pop();
        }
    }
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}
