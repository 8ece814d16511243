//! Event kinds and state blocks of the tandem model.

use crate::dispatch::EventKind;
use crate::queue::WaitQueue;
use crate::simulation::Model;
use crate::time::SimTime;

use super::report::TandemStats;

/// Everything that can happen in the tandem model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TandemEvent {
    /// Bootstrap: first arrival and the terminal event are scheduled.
    Start,
    /// A new customer enters the system.
    Arrival,
    JoinQueue1,
    BeginService1,
    EndService1,
    JoinQueue2,
    BeginService2,
    EndService2,
    /// Horizon reached.
    End,
}

impl EventKind for TandemEvent {
    const ALL: &'static [Self] = &[
        TandemEvent::Start,
        TandemEvent::Arrival,
        TandemEvent::JoinQueue1,
        TandemEvent::BeginService1,
        TandemEvent::EndService1,
        TandemEvent::JoinQueue2,
        TandemEvent::BeginService2,
        TandemEvent::EndService2,
        TandemEvent::End,
    ];
}

/// Entity payload: when the customer entered the system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Customer {
    pub arrived_at: SimTime,
}

/// Occupancy of both stations (the model's variables).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stations {
    pub busy_1: bool,
    pub busy_2: bool,
    /// Customers waiting (not in service) at station 1.
    pub queued_1: usize,
    pub queued_2: usize,
}

/// The waiting lines (the model's resources).
#[derive(Debug, Clone, Default)]
pub struct WaitQueues {
    pub queue_1: WaitQueue,
    pub queue_2: WaitQueue,
}

/// Type bundle plugged into the kernel.
pub struct TandemModel;

impl Model for TandemModel {
    type Kind = TandemEvent;
    type Entity = Customer;
    type Variables = Stations;
    type Resources = WaitQueues;
    type Statistics = TandemStats;
}
