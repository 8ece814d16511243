//! Two single-server stations in series: the reference client model.
//!
//! Customers arrive as a Poisson process, queue FIFO for station 1,
//! then queue FIFO for station 2, and leave. The run ends when the
//! terminal event fires at the configured horizon.
//!
//! # Module structure
//!
//! | Sub-module | Contents |
//! |---|---|
//! | [`config`] | [`TandemConfig`] |
//! | [`model`] | [`TandemEvent`], [`TandemModel`], state blocks |
//! | [`handlers`] | one handler per event kind |
//! | [`report`] | [`TandemStats`], [`TandemReport`], statistics hook |

pub mod config;
mod handlers;
pub mod model;
pub mod report;

pub use config::TandemConfig;
pub use model::{Customer, Stations, TandemEvent, TandemModel, WaitQueues};
pub use report::{record_statistics, TandemReport, TandemStats};

use tracing::info;

use crate::dsl::SimulationBuilder;
use crate::error::SimResult;
use crate::simulation::{Simulation, SimulationConfig};

/// Assemble an idle tandem simulation.
pub fn build(config: &TandemConfig) -> SimResult<Simulation<TandemModel>> {
    build_with(config, SimulationConfig::default())
}

/// Assemble an idle tandem simulation with explicit kernel settings.
pub fn build_with(
    config: &TandemConfig,
    sim_config: SimulationConfig,
) -> SimResult<Simulation<TandemModel>> {
    config.validate()?;
    let cfg = *config;

    SimulationBuilder::<TandemModel>::new()
        .config(sim_config)
        .start_with(TandemEvent::Start)
        .on_fn(TandemEvent::Start, move |ctx, _| handlers::start(ctx, &cfg))
        .on_fn(TandemEvent::Arrival, move |ctx, _| handlers::arrival(ctx, &cfg))
        .on_fn(TandemEvent::JoinQueue1, handlers::join_queue_1)
        .on_fn(TandemEvent::BeginService1, move |ctx, _| {
            handlers::begin_service_1(ctx, &cfg)
        })
        .on_fn(TandemEvent::EndService1, handlers::end_service_1)
        .on_fn(TandemEvent::JoinQueue2, handlers::join_queue_2)
        .on_fn(TandemEvent::BeginService2, move |ctx, _| {
            handlers::begin_service_2(ctx, &cfg)
        })
        .on_fn(TandemEvent::EndService2, handlers::end_service_2)
        .on_fn(TandemEvent::End, |ctx, _| handlers::end(ctx))
        .statistics_fn(record_statistics)
        .build(Stations::default(), WaitQueues::default(), TandemStats::default())
}

/// Run the model to its horizon, release it, and return the report.
pub fn run(config: &TandemConfig) -> SimResult<TandemReport> {
    let mut sim = build(config)?;
    info!(
        arrival_rate = config.arrival_rate,
        load_1 = config.load_1(),
        load_2 = config.load_2(),
        horizon = config.horizon,
        "running tandem model"
    );
    let summary = sim.start()?;
    sim.clean()?;

    let stats = sim.statistics();
    let report = stats
        .final_report
        .unwrap_or_else(|| stats.report(summary.final_time.as_f64()));
    Ok(report)
}
