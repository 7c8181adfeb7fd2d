// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Event kinds in tie-break order: at equal timestamps arrivals are handled
/// before completions, and among completions CPU before disk before TTY.
///
/// The declaration order is the priority order, so the derived `Ord` is the
/// one the simulation depends on. Whether a real-time arrival preempts a
/// burst completing at the same instant, and whether a freed CPU is claimed
/// before a same-tick disk or TTY event, both fall out of this ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    Arrival,
    CpuDone,
    DiskDone,
    TtyDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimEvent {
    pub time: u64,
    pub kind: EventKind,
    pub pid: u32,
}

// (time, kind) is the load-bearing key; pid keeps pops deterministic when
// two processes share a timestamp and kind.
impl Ord for SimEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.pid.cmp(&other.pid))
    }
}

impl PartialOrd for SimEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-queue of pending events, keyed by (time, kind, pid).
///
/// An empty queue is the simulation's sole termination condition: every
/// handler either retires a process or schedules it onto a resource with a
/// positive finite duration, so the event stream cannot recur forever.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<SimEvent>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, ev: SimEvent) {
        self.heap.push(Reverse(ev));
    }

    /// Remove and return the earliest pending event. `None` means the
    /// simulation is over.
    pub fn pop(&mut self) -> Option<SimEvent> {
        self.heap.pop().map(|Reverse(ev)| ev)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
