//! Generation counters for discarding responses to superseded requests
//!
//! A derived value (a quote, a balance) is recomputed whenever its inputs
//! change. Each recomputation takes a ticket; when the response arrives it is
//! applied only if no newer ticket was taken for the same value since

use std::sync::atomic::{AtomicU64, Ordering};

/// The source of ticket generations, shared by every tracker in the process
/// so that a tracker dropped and recreated never reissues a live generation
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// A claim on the right to update a derived value
#[derive(Clone, Copy, Debug)]
pub struct Ticket {
    /// The generation the ticket was issued at
    generation: u64,
}

/// Tracks the latest request issued for a derived value
#[derive(Debug)]
pub struct Supersession<K> {
    /// The generation of the latest ticket, or of the latest cancellation
    generation: u64,
    /// The inputs of the latest outstanding request
    key: Option<K>,
}

impl<K> Default for Supersession<K> {
    fn default() -> Self {
        Self { generation: 0, key: None }
    }
}

impl<K> Supersession<K> {
    /// Issue a ticket for a new request, superseding all earlier tickets
    pub fn begin(&mut self, key: K) -> Ticket {
        self.generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        self.key = Some(key);
        Ticket { generation: self.generation }
    }

    /// Supersede all earlier tickets without issuing a new one
    pub fn cancel(&mut self) {
        self.generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        self.key = None;
    }

    /// Whether the ticket is the latest one; only the latest ticket may apply
    /// its response
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.generation == ticket.generation
    }

    /// Mark the latest request as answered
    pub fn complete(&mut self, ticket: &Ticket) -> bool {
        let current = self.is_current(ticket);
        if current {
            self.key = None;
        }
        current
    }

    /// The inputs of the outstanding request, if one is in flight
    pub fn pending(&self) -> Option<&K> {
        self.key.as_ref()
    }
}
