//! Statistics accumulators and the final report of a tandem run.

use crate::simulation::SimulationContext;
use crate::stats::{HookMode, TimeWeighted};
use crate::time::SimTime;

use super::model::{Stations, TandemModel};

/// Accumulators filled during the run (the model's statistics block).
#[derive(Debug, Clone, Default)]
pub struct TandemStats {
    /// Customers that entered the system.
    pub arrivals: u64,
    /// Customers that finished service at station 2.
    pub completed: u64,
    /// Summed time in system of completed customers.
    pub total_sojourn: f64,
    pub queue_1: TimeWeighted,
    pub queue_2: TimeWeighted,
    pub busy_1: TimeWeighted,
    pub busy_2: TimeWeighted,
    /// Set by the `Finalize` hook call.
    pub final_report: Option<TandemReport>,
}

impl TandemStats {
    fn observe_levels(&mut self, now: SimTime, stations: &Stations) {
        self.queue_1.observe(now, stations.queued_1 as f64);
        self.queue_2.observe(now, stations.queued_2 as f64);
        self.busy_1.observe(now, if stations.busy_1 { 1.0 } else { 0.0 });
        self.busy_2.observe(now, if stations.busy_2 { 1.0 } else { 0.0 });
    }

    /// Derive the summary metrics for a run that lasted `elapsed`.
    pub fn report(&self, elapsed: f64) -> TandemReport {
        let waiting_area = self.queue_1.area() + self.queue_2.area();
        TandemReport {
            arrivals: self.arrivals,
            completed: self.completed,
            elapsed,
            mean_queue_length_1: self.queue_1.mean(elapsed),
            mean_queue_length_2: self.queue_2.mean(elapsed),
            utilization_1: self.busy_1.mean(elapsed),
            utilization_2: self.busy_2.mean(elapsed),
            mean_waiting_time: per_customer(waiting_area, self.arrivals),
            mean_waiting_time_per_station: per_customer(waiting_area, 2 * self.arrivals),
            mean_sojourn_time: per_customer(self.total_sojourn, self.completed),
        }
    }
}

fn per_customer(total: f64, customers: u64) -> f64 {
    if customers == 0 {
        0.0
    } else {
        total / customers as f64
    }
}

/// Statistics hook of the tandem model.
///
/// Each `Accumulate` call charges the previous queue lengths and busy
/// flags for the time since the last dispatch, then records the new
/// levels. `Finalize` turns the integrals into averages.
pub fn record_statistics(ctx: &mut SimulationContext<TandemModel>, mode: HookMode) {
    let now = ctx.now();
    match mode {
        HookMode::Accumulate { .. } => {
            let stations = ctx.variables;
            ctx.statistics.observe_levels(now, &stations);
        }
        HookMode::Finalize => {
            let report = ctx.statistics.report(now.as_f64());
            ctx.statistics.final_report = Some(report);
        }
    }
}

/// Final metrics of a tandem run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TandemReport {
    pub arrivals: u64,
    pub completed: u64,
    /// Simulated time covered by the run.
    pub elapsed: f64,
    /// Time-average number of customers waiting at each station.
    pub mean_queue_length_1: f64,
    pub mean_queue_length_2: f64,
    /// Fraction of time each server was busy.
    pub utilization_1: f64,
    pub utilization_2: f64,
    /// Average total time an arriving customer spends waiting, summed
    /// over both queues (Little's law on the combined queue area).
    pub mean_waiting_time: f64,
    /// `mean_waiting_time` split evenly over the two stations: the
    /// average wait in one queue.
    pub mean_waiting_time_per_station: f64,
    /// Average arrival-to-departure time of completed customers.
    pub mean_sojourn_time: f64,
}

impl TandemReport {
    /// Customers still inside the system at the end of the run.
    pub fn in_system(&self) -> u64 {
        self.arrivals - self.completed
    }

    /// Mean queue length averaged over both stations.
    pub fn mean_queue_length(&self) -> f64 {
        (self.mean_queue_length_1 + self.mean_queue_length_2) / 2.0
    }

    /// Utilization averaged over both stations.
    pub fn utilization(&self) -> f64 {
        (self.utilization_1 + self.utilization_2) / 2.0
    }
}

impl std::fmt::Display for TandemReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "    Elapsed time:        {:.3}", self.elapsed)?;
        writeln!(f, "    Arrivals:            {}", self.arrivals)?;
        writeln!(f, "    Completed:           {}", self.completed)?;
        writeln!(
            f,
            "    Mean queue length:   {:.4} (station 1: {:.4}, station 2: {:.4})",
            self.mean_queue_length(),
            self.mean_queue_length_1,
            self.mean_queue_length_2
        )?;
        writeln!(
            f,
            "    Utilization:         {:.4} (station 1: {:.4}, station 2: {:.4})",
            self.utilization(),
            self.utilization_1,
            self.utilization_2
        )?;
        writeln!(
            f,
            "    Mean waiting time:   {:.4} total ({:.4} per station)",
            self.mean_waiting_time, self.mean_waiting_time_per_station
        )?;
        write!(f, "    Mean sojourn time:   {:.4}", self.mean_sojourn_time)
    }
}
