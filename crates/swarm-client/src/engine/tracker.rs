use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Running totals across every flow the process has launched.
#[derive(Debug, Default)]
pub struct FlowStats {
    pub started: AtomicU64,
    pub completed: AtomicU64,
    pub dial_failures: AtomicU64,
    pub write_failures: AtomicU64,
    pub read_failures: AtomicU64,
    pub peer_closed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub started: u64,
    pub completed: u64,
    pub dial_failures: u64,
    pub write_failures: u64,
    pub read_failures: u64,
    pub peer_closed: u64,
}

impl FlowStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started: self.started.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            dial_failures: self.dial_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            peer_closed: self.peer_closed.load(Ordering::Relaxed),
        }
    }
}

/// Shared between the spawn loop and every worker. Holds the live
/// connection count, which is only touched through atomics.
#[derive(Debug, Default)]
pub struct FlowTracker {
    live: AtomicUsize,
    pub stats: FlowStats,
}

impl FlowTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Reserves one slot if that keeps the live count within `ceiling`.
    /// Check and increment happen in a single CAS, so the ceiling is hard.
    pub fn try_acquire(self: &Arc<Self>, ceiling: usize) -> Option<ConnectionSlot> {
        self.live
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |live| {
                (live < ceiling).then_some(live + 1)
            })
            .ok()?;
        self.stats.started.fetch_add(1, Ordering::Relaxed);
        Some(ConnectionSlot {
            tracker: Arc::clone(self),
        })
    }
}

/// One counted live connection. Dropping it releases the slot, whichever
/// way the owning flow ends.
#[derive(Debug)]
pub struct ConnectionSlot {
    tracker: Arc<FlowTracker>,
}

impl ConnectionSlot {
    pub fn stats(&self) -> &FlowStats {
        &self.tracker.stats
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.tracker.live.fetch_sub(1, Ordering::SeqCst);
    }
}
