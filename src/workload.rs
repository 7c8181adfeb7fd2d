// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Workload file parser.
//!
//! The format is line oriented; blank lines are skipped:
//!
//! ```text
//! REAL-TIME <arrival>      open a real-time process (ids run from 1)
//! DEADLINE <time>          its absolute deadline, on the next line
//! INTERACTIVE <arrival>    open an interactive process
//! CPU <duration>           append a resource request to the
//! DISK <duration>          most recently opened process
//! TTY <duration>
//! ```
//!
//! Malformed input is rejected here so the simulation core never sees a
//! process without requests, a request without a positive duration, or a
//! real-time process without a deadline.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::process::{Process, ProcessClass, Request, ResourceKind};

/// A fully populated process table, ready to seed a simulation.
pub struct Workload {
    pub processes: Vec<Process>,
}

pub fn load(path: &Path) -> Result<Workload> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read workload file {}", path.display()))?;
    parse(&text).with_context(|| format!("malformed workload file {}", path.display()))
}

pub fn parse(text: &str) -> Result<Workload> {
    let mut processes: Vec<Process> = Vec::new();
    let mut want_deadline = false;

    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let word = fields.next().unwrap();
        let arg = fields.next();

        if want_deadline && word != "DEADLINE" {
            bail!(
                "line {}: expected DEADLINE for real-time process {}",
                lineno,
                processes.len()
            );
        }

        match word {
            "REAL-TIME" | "INTERACTIVE" => {
                let arrival = number(arg, lineno, word)?;
                let class = if word == "REAL-TIME" {
                    ProcessClass::RealTime
                } else {
                    ProcessClass::Interactive
                };
                let id = processes.len() as u32 + 1;
                processes.push(Process::new(id, class, arrival, None));
                want_deadline = class == ProcessClass::RealTime;
            }
            "DEADLINE" => {
                if !want_deadline {
                    bail!("line {}: DEADLINE outside a real-time process header", lineno);
                }
                let deadline = number(arg, lineno, word)?;
                processes
                    .last_mut()
                    .expect("deadline pending without a process")
                    .deadline = Some(deadline);
                want_deadline = false;
            }
            "CPU" | "DISK" | "TTY" => {
                let duration = number(arg, lineno, word)?;
                if duration == 0 {
                    bail!("line {}: {} duration must be positive", lineno, word);
                }
                let kind = match word {
                    "CPU" => ResourceKind::Cpu,
                    "DISK" => ResourceKind::Disk,
                    _ => ResourceKind::Tty,
                };
                let proc = processes
                    .last_mut()
                    .with_context(|| format!("line {}: {} request before any process", lineno, word))?;
                proc.requests.push_back(Request { kind, duration });
            }
            other => bail!("line {}: unknown directive {:?}", lineno, other),
        }
    }

    if want_deadline {
        bail!("missing DEADLINE for final real-time process");
    }
    if let Some(p) = processes.iter().find(|p| p.requests.is_empty()) {
        bail!("process {} has no resource requests", p.id);
    }
    Ok(Workload { processes })
}

fn number(arg: Option<&str>, lineno: usize, what: &str) -> Result<u64> {
    let raw = arg.with_context(|| format!("line {}: {} needs a value", lineno, what))?;
    raw.parse()
        .with_context(|| format!("line {}: invalid {} value {:?}", lineno, what, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
REAL-TIME 0
DEADLINE 100

CPU 30
DISK 20
CPU 10

INTERACTIVE 5
CPU 40
TTY 25
";

    #[test]
    fn parses_sample_workload() {
        let w = parse(SAMPLE).unwrap();
        assert_eq!(w.processes.len(), 2);

        let rt = &w.processes[0];
        assert_eq!(rt.id, 1);
        assert_eq!(rt.class, ProcessClass::RealTime);
        assert_eq!(rt.arrival, 0);
        assert_eq!(rt.deadline, Some(100));
        assert_eq!(rt.requests.len(), 3);
        assert_eq!(
            *rt.requests.front().unwrap(),
            Request {
                kind: ResourceKind::Cpu,
                duration: 30
            }
        );

        let int = &w.processes[1];
        assert_eq!(int.id, 2);
        assert_eq!(int.class, ProcessClass::Interactive);
        assert_eq!(int.deadline, None);
        assert_eq!(int.requests.back().unwrap().kind, ResourceKind::Tty);
    }

    #[test]
    fn deadline_may_follow_after_blank_lines() {
        let w = parse("REAL-TIME 10\n\n\nDEADLINE 90\nCPU 5\n").unwrap();
        assert_eq!(w.processes[0].deadline, Some(90));
    }

    #[test]
    fn rejects_missing_deadline() {
        assert!(parse("REAL-TIME 0\nCPU 10\n").is_err());
        assert!(parse("REAL-TIME 0\nDEADLINE 50\nCPU 10\nREAL-TIME 5\n").is_err());
    }

    #[test]
    fn rejects_deadline_for_interactive() {
        assert!(parse("INTERACTIVE 0\nDEADLINE 50\nCPU 10\n").is_err());
    }

    #[test]
    fn rejects_zero_duration() {
        assert!(parse("INTERACTIVE 0\nCPU 0\n").is_err());
    }

    #[test]
    fn rejects_request_before_any_process() {
        assert!(parse("CPU 10\n").is_err());
    }

    #[test]
    fn rejects_process_with_no_requests() {
        assert!(parse("INTERACTIVE 0\n").is_err());
        assert!(parse("INTERACTIVE 0\nINTERACTIVE 5\nCPU 10\n").is_err());
    }

    #[test]
    fn rejects_unknown_directive() {
        assert!(parse("GPU 10\n").is_err());
    }

    #[test]
    fn rejects_garbage_numbers() {
        assert!(parse("INTERACTIVE soon\nCPU 10\n").is_err());
        assert!(parse("INTERACTIVE\nCPU 10\n").is_err());
    }
}
