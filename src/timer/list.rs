use crate::utils::Slab;

use std::time::Instant;

/// Handle to a timer stored in an [`ExpiryList`].
///
/// A `TimerId` is an arena index, not a reference: holding one does not
/// keep the timer alive, and a handle must not be used again after the
/// timer it names has been removed. The reactor maintains this by
/// routing every close through a single tear-down path that takes the
/// handle out of the connection slot before touching the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId(usize);

/// A timer node in the list arena.
struct Node {
    /// Absolute expiry time.
    deadline: Instant,

    /// Token of the owning connection (its descriptor value).
    token: usize,

    /// Previous node in deadline order.
    prev: Option<usize>,

    /// Next node in deadline order.
    next: Option<usize>,
}

/// An ascending-ordered list of per-connection deadlines.
///
/// Nodes live in a slab arena and are linked in non-decreasing deadline
/// order. Insertion scans linearly from the head, which is acceptable
/// here: the list is short relative to the I/O work around it, and the
/// common insert (now + a fixed timeout) lands at the tail. Removal and
/// adjustment are O(1) given the handle.
pub struct ExpiryList {
    /// Arena holding the timer nodes.
    nodes: Slab<Node>,

    /// Earliest deadline, if any.
    head: Option<usize>,

    /// Latest deadline, if any.
    tail: Option<usize>,
}

impl ExpiryList {
    /// Creates an empty expiry list.
    pub fn new() -> Self {
        Self {
            nodes: Slab::new(64),
            head: None,
            tail: None,
        }
    }

    /// Inserts a timer for `token` expiring at `deadline`.
    ///
    /// The new node is placed after every node with an earlier or equal
    /// deadline, so equal deadlines expire in insertion order and the
    /// list stays non-decreasing.
    pub fn add(&mut self, token: usize, deadline: Instant) -> TimerId {
        // Common case: deadlines are `now + fixed timeout`, so the new
        // one lands at the tail.
        if let Some(t) = self.tail {
            if self.nodes.get(t).deadline <= deadline {
                let index = self.nodes.insert(Node {
                    deadline,
                    token,
                    prev: Some(t),
                    next: None,
                });

                self.nodes.get_mut(t).next = Some(index);
                self.tail = Some(index);

                return TimerId(index);
            }
        }

        // Find the insertion point: the last node with deadline <= new.
        let mut before = None;
        let mut after = self.head;

        while let Some(i) = after {
            if self.nodes.get(i).deadline <= deadline {
                before = Some(i);
                after = self.nodes.get(i).next;
            } else {
                break;
            }
        }

        let index = self.nodes.insert(Node {
            deadline,
            token,
            prev: before,
            next: after,
        });

        match before {
            Some(b) => self.nodes.get_mut(b).next = Some(index),
            None => self.head = Some(index),
        }

        match after {
            Some(a) => self.nodes.get_mut(a).prev = Some(index),
            None => self.tail = Some(index),
        }

        TimerId(index)
    }

    /// Detaches and discards the timer named by `id`.
    pub fn remove(&mut self, id: TimerId) {
        self.unlink(id.0);
        self.nodes.remove(id.0);
    }

    /// Pushes the timer's deadline out to `new_deadline`.
    ///
    /// The node is removed and reinserted rather than mutated in place,
    /// which restores the ordering invariant. Returns the handle of the
    /// reinserted timer.
    pub fn adjust(&mut self, id: TimerId, new_deadline: Instant) -> TimerId {
        self.unlink(id.0);
        let node = self.nodes.remove(id.0);

        self.add(node.token, new_deadline)
    }

    /// Expires every timer whose deadline is at or before `now`.
    ///
    /// Walks from the head and stops at the first unexpired node, so a
    /// sweep never scans past the due prefix. Each expired timer is
    /// removed and its token returned exactly once; a second sweep with
    /// the same `now` returns nothing.
    pub fn tick(&mut self, now: Instant) -> Vec<usize> {
        let mut due = Vec::new();

        while let Some(i) = self.head {
            if self.nodes.get(i).deadline > now {
                break;
            }

            self.unlink(i);
            let node = self.nodes.remove(i);
            due.push(node.token);
        }

        due
    }

    /// Returns the number of pending timers.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// Returns the pending `(token, deadline)` pairs in list order.
    ///
    /// List order is deadline order, which is what tests observe when
    /// checking the sortedness invariant.
    pub fn entries(&self) -> Vec<(usize, Instant)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut cur = self.head;

        while let Some(i) = cur {
            let node = self.nodes.get(i);
            out.push((node.token, node.deadline));
            cur = node.next;
        }

        out
    }

    /// Unlinks node `i` from the chain without freeing its slot.
    fn unlink(&mut self, i: usize) {
        let (prev, next) = {
            let node = self.nodes.get(i);
            (node.prev, node.next)
        };

        match prev {
            Some(p) => self.nodes.get_mut(p).next = next,
            None => self.head = next,
        }

        match next {
            Some(n) => self.nodes.get_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }
}

impl Default for ExpiryList {
    fn default() -> Self {
        Self::new()
    }
}
