//! Event handlers of the tandem model.
//!
//! Both stations run the same cycle. A customer joins the queue and
//! service begins when the server is free. The end of service frees the
//! server and, if someone is waiting, starts the next service at the
//! same instant.

use tracing::{trace, warn};

use crate::entity::EntityId;
use crate::simulation::SimulationContext;

use super::config::TandemConfig;
use super::model::{Customer, TandemEvent, TandemModel};

type Ctx = SimulationContext<TandemModel>;

pub(crate) fn start(ctx: &mut Ctx, config: &TandemConfig) {
    let first = ctx.exponential(config.arrival_rate);
    ctx.schedule(first, TandemEvent::Arrival, None);
    ctx.schedule(config.horizon, TandemEvent::End, None);
}

pub(crate) fn arrival(ctx: &mut Ctx, config: &TandemConfig) {
    let now = ctx.now();
    let id = ctx.entities.insert(Customer { arrived_at: now });
    ctx.statistics.arrivals += 1;
    ctx.schedule(0.0, TandemEvent::JoinQueue1, Some(id));

    let next = ctx.exponential(config.arrival_rate);
    ctx.schedule(next, TandemEvent::Arrival, None);
}

pub(crate) fn join_queue_1(ctx: &mut Ctx, entity: Option<EntityId>) {
    let Some(id) = entity else {
        warn!(now = %ctx.now(), "JoinQueue1 without a customer");
        return;
    };
    ctx.resources.queue_1.insert(id);
    ctx.variables.queued_1 += 1;
    if !ctx.variables.busy_1 && ctx.variables.queued_1 == 1 {
        ctx.schedule(0.0, TandemEvent::BeginService1, None);
    }
}

pub(crate) fn begin_service_1(ctx: &mut Ctx, config: &TandemConfig) {
    let Some(id) = ctx.resources.queue_1.pull() else {
        warn!(now = %ctx.now(), "station 1 started service on an empty queue");
        return;
    };
    ctx.variables.queued_1 -= 1;
    ctx.variables.busy_1 = true;
    let service = ctx.exponential(config.service_rate_1);
    ctx.schedule(service, TandemEvent::EndService1, Some(id));
}

pub(crate) fn end_service_1(ctx: &mut Ctx, entity: Option<EntityId>) {
    ctx.variables.busy_1 = false;
    if let Some(id) = entity {
        ctx.schedule(0.0, TandemEvent::JoinQueue2, Some(id));
    }
    if ctx.variables.queued_1 > 0 {
        ctx.schedule(0.0, TandemEvent::BeginService1, None);
    }
}

pub(crate) fn join_queue_2(ctx: &mut Ctx, entity: Option<EntityId>) {
    let Some(id) = entity else {
        warn!(now = %ctx.now(), "JoinQueue2 without a customer");
        return;
    };
    ctx.resources.queue_2.insert(id);
    ctx.variables.queued_2 += 1;
    if !ctx.variables.busy_2 && ctx.variables.queued_2 == 1 {
        ctx.schedule(0.0, TandemEvent::BeginService2, None);
    }
}

pub(crate) fn begin_service_2(ctx: &mut Ctx, config: &TandemConfig) {
    let Some(id) = ctx.resources.queue_2.pull() else {
        warn!(now = %ctx.now(), "station 2 started service on an empty queue");
        return;
    };
    ctx.variables.queued_2 -= 1;
    ctx.variables.busy_2 = true;
    let service = ctx.exponential(config.service_rate_2);
    ctx.schedule(service, TandemEvent::EndService2, Some(id));
}

pub(crate) fn end_service_2(ctx: &mut Ctx, entity: Option<EntityId>) {
    ctx.variables.busy_2 = false;
    if ctx.variables.queued_2 > 0 {
        ctx.schedule(0.0, TandemEvent::BeginService2, None);
    }
    let now = ctx.now();
    if let Some(customer) = entity.and_then(|id| ctx.entities.remove(id)) {
        let sojourn = now.since(customer.arrived_at);
        ctx.statistics.completed += 1;
        ctx.statistics.total_sojourn += sojourn;
        trace!(sojourn, "customer left the system");
    }
}

pub(crate) fn end(ctx: &mut Ctx) {
    ctx.stop();
}
