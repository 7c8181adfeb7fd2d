// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use std::collections::{BTreeMap, HashMap, VecDeque};

use log::{debug, info};

use crate::event::{EventKind, EventQueue, SimEvent};
use crate::process::{ProcState, Process, ProcessClass, ResourceKind};
use crate::stats::Stats;

/// The process currently holding the CPU, with the bookkeeping needed to
/// account a partial burst on preemption and to detect stale completions.
#[derive(Debug, Clone, Copy)]
struct CpuSlot {
    pid: u32,
    burst_start: u64,
    completion: u64,
}

/// Lifecycle transitions reported in the chronological event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Started,
    Terminated,
    TerminatedDeadlineMiss,
}

#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub time: u64,
    pub pid: u32,
    pub class: ProcessClass,
    pub what: Lifecycle,
}

/// All mutable simulation state: the process table, the event queue, the
/// per-resource queues, the CPU slot and the statistics accumulator. One
/// instance per run, driven to completion by [`Simulation::run`].
pub struct Simulation {
    procs: BTreeMap<u32, Process>,
    events: EventQueue,
    rt_ready: VecDeque<u32>,
    int_ready: VecDeque<u32>,
    disk: VecDeque<u32>,
    /// Time each queued disk request entered service contention, keyed by
    /// pid. Reset to the service start time when a backlogged request
    /// reaches the front of the disk queue.
    disk_entered: HashMap<u32, u64>,
    cpu: Option<CpuSlot>,
    stats: Stats,
    transitions: Vec<Transition>,
}

impl Simulation {
    /// Build a simulation from a fully populated process table, seeding the
    /// event queue with one arrival per process.
    pub fn new(processes: Vec<Process>) -> Self {
        let mut events = EventQueue::new();
        let mut procs = BTreeMap::new();
        for p in processes {
            events.push(SimEvent {
                time: p.arrival,
                kind: EventKind::Arrival,
                pid: p.id,
            });
            procs.insert(p.id, p);
        }
        Self {
            procs,
            events,
            rt_ready: VecDeque::new(),
            int_ready: VecDeque::new(),
            disk: VecDeque::new(),
            disk_entered: HashMap::new(),
            cpu: None,
            stats: Stats::default(),
            transitions: Vec::new(),
        }
    }

    /// Drain the event queue. Each handler may push further events; the run
    /// ends when none remain. Returns the accumulated statistics.
    pub fn run(&mut self) -> &Stats {
        while let Some(ev) = self.events.pop() {
            debug_assert!(ev.time >= self.stats.sim_end);
            self.stats.sim_end = ev.time;
            match ev.kind {
                EventKind::Arrival => self.handle_arrival(ev.time, ev.pid),
                EventKind::CpuDone => self.handle_cpu_done(ev.time, ev.pid),
                EventKind::DiskDone => self.handle_disk_done(ev.time, ev.pid),
                EventKind::TtyDone => self.handle_tty_done(ev.time, ev.pid),
            }
        }
        &self.stats
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Chronological log of lifecycle transitions, for the report renderer.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn process(&self, pid: u32) -> Option<&Process> {
        self.procs.get(&pid)
    }

    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.procs.values()
    }

    fn proc_mut(&mut self, pid: u32) -> &mut Process {
        self.procs.get_mut(&pid).expect("event for unknown pid")
    }

    /// Fill an idle CPU from the ready queues, real-time first. Never
    /// interrupts a running process; interruption is arrival-driven.
    fn schedule_cpu(&mut self, now: u64) {
        if self.cpu.is_some() {
            return;
        }
        let pid = match self
            .rt_ready
            .pop_front()
            .or_else(|| self.int_ready.pop_front())
        {
            Some(pid) => pid,
            None => return,
        };
        let proc = self.proc_mut(pid);
        proc.status = ProcState::Running;
        let burst = proc.head().expect("dispatched process with no requests").duration;
        // A preempted burst resumes with its remainder, a fresh one runs
        // the full front-request duration.
        let remaining = proc.resume.take().unwrap_or(burst);
        let completion = now + remaining;
        self.events.push(SimEvent {
            time: completion,
            kind: EventKind::CpuDone,
            pid,
        });
        self.cpu = Some(CpuSlot {
            pid,
            burst_start: now,
            completion,
        });
        debug!("{} ms: process {} gets the cpu for {} ms", now, pid, remaining);
    }

    fn handle_arrival(&mut self, now: u64, pid: u32) {
        let class = self.proc_mut(pid).class;
        self.record(now, pid, class, Lifecycle::Started);

        match class {
            ProcessClass::RealTime => {
                self.rt_ready.push_back(pid);
                // An interactive incumbent is evicted; a real-time one
                // keeps the CPU (no preemption among equals).
                if let Some(slot) = self.cpu {
                    if self.proc_mut(slot.pid).class == ProcessClass::Interactive {
                        self.preempt(now, slot);
                    }
                }
            }
            ProcessClass::Interactive => {
                self.int_ready.push_back(pid);
            }
        }
        self.schedule_cpu(now);
    }

    /// Evict the interactive incumbent: credit the partial burst, stash the
    /// clamped remainder so the next dispatch resumes rather than restarts,
    /// and send it back to the interactive ready queue.
    fn preempt(&mut self, now: u64, slot: CpuSlot) {
        let elapsed = now - slot.burst_start;
        self.stats.cpu_busy += elapsed;
        let remainder = slot.completion.saturating_sub(now);
        let proc = self.proc_mut(slot.pid);
        proc.resume = Some(remainder);
        proc.status = ProcState::Ready;
        self.int_ready.push_back(slot.pid);
        self.cpu = None;
        debug!(
            "{} ms: process {} preempted with {} ms left",
            now, slot.pid, remainder
        );
    }

    fn handle_cpu_done(&mut self, now: u64, pid: u32) {
        // A completion that does not match the incumbent's pid and scheduled
        // completion time is stale: the target was preempted, and its burst
        // is governed by its next dispatch. The time check matters when the
        // preempted process is already running again by the time the event
        // from its original burst fires.
        let slot = match self.cpu {
            Some(slot) if slot.pid == pid && slot.completion == now => slot,
            _ => {
                debug!("{} ms: stale cpu completion for process {}", now, pid);
                return;
            }
        };
        self.stats.cpu_busy += now - slot.burst_start;
        self.cpu = None;

        let proc = self.proc_mut(pid);
        proc.resume = None;
        proc.requests.pop_front();
        if proc.requests.is_empty() {
            self.terminate(now, pid);
        } else {
            self.route_next(now, pid);
        }
        self.schedule_cpu(now);
    }

    fn handle_disk_done(&mut self, now: u64, pid: u32) {
        let service = self
            .proc_mut(pid)
            .head()
            .expect("disk completion for process with no requests")
            .duration;
        self.stats.disk_busy += service;
        if let Some(entered) = self.disk_entered.remove(&pid) {
            self.stats.disk_access_time += now - entered;
        }

        let front = self.disk.pop_front();
        debug_assert_eq!(front, Some(pid));

        // FCFS backlog: the next queued request starts service immediately,
        // so the disk never idles while work is pending.
        if let Some(&next) = self.disk.front() {
            let duration = self
                .proc_mut(next)
                .head()
                .expect("queued disk process with no requests")
                .duration;
            self.disk_entered.insert(next, now);
            self.events.push(SimEvent {
                time: now + duration,
                kind: EventKind::DiskDone,
                pid: next,
            });
        }

        let proc = self.proc_mut(pid);
        proc.requests.pop_front();
        if proc.requests.is_empty() {
            self.terminate(now, pid);
        } else {
            self.route_next(now, pid);
        }
    }

    fn handle_tty_done(&mut self, now: u64, pid: u32) {
        let proc = self.proc_mut(pid);
        proc.requests.pop_front();
        if proc.requests.is_empty() {
            self.terminate(now, pid);
        } else {
            self.route_next(now, pid);
        }
    }

    /// Send a process to whatever resource its new front request names.
    fn route_next(&mut self, now: u64, pid: u32) {
        let (head, class) = {
            let proc = self.proc_mut(pid);
            (
                *proc.head().expect("routed process with no requests"),
                proc.class,
            )
        };
        debug!(
            "{} ms: process {} next request {} ({} ms)",
            now, pid, head.kind, head.duration
        );
        match head.kind {
            ResourceKind::Cpu => {
                self.proc_mut(pid).status = ProcState::Ready;
                match class {
                    ProcessClass::RealTime => self.rt_ready.push_back(pid),
                    ProcessClass::Interactive => self.int_ready.push_back(pid),
                }
                self.schedule_cpu(now);
            }
            ResourceKind::Disk => {
                self.proc_mut(pid).status = ProcState::Waiting;
                self.disk.push_back(pid);
                self.disk_entered.insert(pid, now);
                self.stats.disk_accesses += 1;
                // Only the empty-to-busy transition arms the disk; an
                // existing backlog is re-armed by the completion handler.
                if self.disk.len() == 1 {
                    self.events.push(SimEvent {
                        time: now + head.duration,
                        kind: EventKind::DiskDone,
                        pid,
                    });
                }
            }
            ResourceKind::Tty => {
                // Terminals are private per process: no queue, no
                // contention, just a completion after the duration.
                self.proc_mut(pid).status = ProcState::Waiting;
                self.events.push(SimEvent {
                    time: now + head.duration,
                    kind: EventKind::TtyDone,
                    pid,
                });
            }
        }
    }

    /// Retire a process whose request list emptied. Real-time processes are
    /// classified against their deadline; nothing ever re-enqueues a
    /// terminated process.
    fn terminate(&mut self, now: u64, pid: u32) {
        let proc = self.proc_mut(pid);
        proc.status = ProcState::Terminated;
        let class = proc.class;
        let missed =
            class == ProcessClass::RealTime && proc.deadline.is_some_and(|d| now > d);

        match class {
            ProcessClass::RealTime if missed => self.stats.rt_missed += 1,
            ProcessClass::RealTime => self.stats.rt_completed += 1,
            ProcessClass::Interactive => self.stats.int_completed += 1,
        }
        let what = if missed {
            Lifecycle::TerminatedDeadlineMiss
        } else {
            Lifecycle::Terminated
        };
        self.record(now, pid, class, what);
    }

    fn record(&mut self, time: u64, pid: u32, class: ProcessClass, what: Lifecycle) {
        match what {
            Lifecycle::Started => info!("{} ms: process {} ({}) started", time, pid, class),
            Lifecycle::Terminated => {
                info!("{} ms: process {} ({}) terminated", time, pid, class)
            }
            Lifecycle::TerminatedDeadlineMiss => info!(
                "{} ms: process {} ({}) terminated (deadline missed)",
                time, pid, class
            ),
        }
        self.transitions.push(Transition {
            time,
            pid,
            class,
            what,
        });
    }
}
