// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Discrete-event simulation of a two-class CPU scheduler.
//!
//! Real-time processes are deadline-bound and strictly prioritized over
//! interactive processes for the CPU; an arriving real-time process evicts a
//! running interactive one. The disk is serial, non-preemptible and FCFS.
//! Terminals are private per process, so TTY requests never contend.

pub mod event;
pub mod process;
pub mod sim;
pub mod stats;
pub mod workload;

pub use sim::Simulation;
