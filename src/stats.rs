// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use std::io::Write;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Running totals accumulated over one simulation. Monotonic, never reset
/// mid-run; the derived percentages are computed on demand.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Total time the CPU spent executing bursts, partial bursts included.
    pub cpu_busy: u64,
    /// Total time the disk spent servicing requests.
    pub disk_busy: u64,
    pub disk_accesses: u64,
    /// Summed wait-plus-service time across all disk accesses.
    pub disk_access_time: u64,
    pub rt_completed: u64,
    pub rt_missed: u64,
    pub int_completed: u64,
    /// Time of the last processed event.
    pub sim_end: u64,
}

impl Stats {
    pub fn cpu_utilization(&self) -> f64 {
        percentage(self.cpu_busy, self.sim_end)
    }

    pub fn disk_utilization(&self) -> f64 {
        percentage(self.disk_busy, self.sim_end)
    }

    pub fn avg_disk_access_time(&self) -> f64 {
        if self.disk_accesses > 0 {
            self.disk_access_time as f64 / self.disk_accesses as f64
        } else {
            0.0
        }
    }

    /// Missed deadlines as a share of all finished real-time processes,
    /// zero when none ran.
    pub fn deadline_miss_pct(&self) -> f64 {
        percentage(self.rt_missed, self.rt_missed + self.rt_completed)
    }

    /// Render the end-of-run summary report.
    pub fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        writeln!(w, "\nSummary Report:")?;
        writeln!(w, "Real-Time processes completed: {}", self.rt_completed)?;
        writeln!(
            w,
            "Real-Time processes missed deadline: {:.2}%",
            self.deadline_miss_pct()
        )?;
        writeln!(w, "Interactive processes completed: {}", self.int_completed)?;
        writeln!(w, "Total disk accesses: {}", self.disk_accesses)?;
        writeln!(
            w,
            "Average disk access time: {:.2} ms",
            self.avg_disk_access_time()
        )?;
        writeln!(w, "Total simulation time: {} ms", self.sim_end)?;
        writeln!(w, "CPU Utilization: {:.2}%", self.cpu_utilization())?;
        writeln!(w, "Disk Utilization: {:.2}%", self.disk_utilization())?;
        Ok(())
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}
