// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use std::collections::VecDeque;
use std::fmt;

/// Scheduling class of a simulated process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessClass {
    RealTime,
    Interactive,
}

impl fmt::Display for ProcessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessClass::RealTime => write!(f, "REAL-TIME"),
            ProcessClass::Interactive => write!(f, "INTERACTIVE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    Ready,
    Running,
    Waiting,
    Terminated,
}

/// The serially shared resources a process can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Cpu,
    Disk,
    Tty,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Cpu => write!(f, "CPU"),
            ResourceKind::Disk => write!(f, "DISK"),
            ResourceKind::Tty => write!(f, "TTY"),
        }
    }
}

/// One resource use: which resource, and for how many simulated ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub kind: ResourceKind,
    pub duration: u64,
}

/// A simulated process and its remaining resource requests.
///
/// Requests are consumed strictly in order: the front of the queue is the
/// request currently being served (or served next), and it is removed only
/// when that resource use completes.
#[derive(Debug, Clone)]
pub struct Process {
    pub id: u32,
    pub class: ProcessClass,
    pub arrival: u64,
    /// Absolute deadline; only set for real-time processes.
    pub deadline: Option<u64>,
    pub requests: VecDeque<Request>,
    pub status: ProcState,
    /// Remaining time of a preempted CPU burst. `None` means the next
    /// dispatch starts a fresh burst from the front request's duration.
    pub resume: Option<u64>,
}

impl Process {
    pub fn new(id: u32, class: ProcessClass, arrival: u64, deadline: Option<u64>) -> Self {
        Self {
            id,
            class,
            arrival,
            deadline,
            requests: VecDeque::new(),
            status: ProcState::Ready,
            resume: None,
        }
    }

    /// The request currently at the front of the queue, if any.
    pub fn head(&self) -> Option<&Request> {
        self.requests.front()
    }
}
