//! Deterministic fault injection
//!
//! Lets tests exercise every unwind path of a driver client by making
//! the host refuse specific boundary operations, in a fully
//! deterministic order.
//!
//! ## Example
//!
//! ```
//! use sim_host::{FaultPlan, HostFault, SimulatedHost};
//!
//! let host = SimulatedHost::new()
//!     .with_fault_plan(FaultPlan::new().with_fault(HostFault::RejectGrants { count: 1 }));
//! ```

use std::collections::{HashMap, HashSet};

use driver_types::{ChannelId, ChannelKind, DriverNum};

/// A fault to inject at the host boundary
#[derive(Debug, Clone)]
pub enum HostFault {
    /// Refuse the next N grant establishments on any channel
    RejectGrants { count: usize },

    /// Refuse the next N grant establishments on a specific channel
    ///
    /// Read and write grants share slot numbering, so the kind is part
    /// of the target.
    RejectGrantsOn {
        channel: ChannelId,
        kind: ChannelKind,
        count: usize,
    },

    /// Refuse the next N subscriptions on any channel
    RejectSubscribes { count: usize },

    /// Refuse the next N subscriptions on a specific channel
    RejectSubscribesOn { channel: ChannelId, count: usize },

    /// Refuse the next N commands to any driver
    RejectCommands { count: usize },

    /// Make a driver invisible to presence probes and all operations
    DriverAbsent { driver: DriverNum },
}

/// A plan describing all faults to inject
///
/// Configured per-test; the host consumes it through a [`FaultInjector`].
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    faults: Vec<HostFault>,
}

impl FaultPlan {
    /// Creates an empty plan
    pub fn new() -> Self {
        Self { faults: Vec::new() }
    }

    /// Adds a fault to the plan
    pub fn with_fault(mut self, fault: HostFault) -> Self {
        self.faults.push(fault);
        self
    }

    /// Returns the planned faults
    pub fn faults(&self) -> &[HostFault] {
        &self.faults
    }
}

/// Stateful application of a [`FaultPlan`]
#[derive(Debug, Default)]
pub struct FaultInjector {
    reject_grants: usize,
    reject_grants_on: HashMap<(ChannelId, ChannelKind), usize>,
    reject_subscribes: usize,
    reject_subscribes_on: HashMap<ChannelId, usize>,
    reject_commands: usize,
    absent_drivers: HashSet<DriverNum>,
}

impl FaultInjector {
    /// Creates an injector primed with the given plan
    pub fn new(plan: FaultPlan) -> Self {
        let mut injector = Self::default();
        for fault in plan.faults() {
            match fault {
                HostFault::RejectGrants { count } => {
                    injector.reject_grants += count;
                }
                HostFault::RejectGrantsOn {
                    channel,
                    kind,
                    count,
                } => {
                    *injector
                        .reject_grants_on
                        .entry((*channel, *kind))
                        .or_insert(0) += count;
                }
                HostFault::RejectSubscribes { count } => {
                    injector.reject_subscribes += count;
                }
                HostFault::RejectSubscribesOn { channel, count } => {
                    *injector.reject_subscribes_on.entry(*channel).or_insert(0) += count;
                }
                HostFault::RejectCommands { count } => {
                    injector.reject_commands += count;
                }
                HostFault::DriverAbsent { driver } => {
                    injector.absent_drivers.insert(*driver);
                }
            }
        }
        injector
    }

    /// Decides whether the next grant of `kind` on `channel` is refused
    pub fn reject_grant(&mut self, channel: ChannelId, kind: ChannelKind) -> bool {
        if self.reject_grants > 0 {
            self.reject_grants -= 1;
            return true;
        }
        if let Some(count) = self.reject_grants_on.get_mut(&(channel, kind)) {
            if *count > 0 {
                *count -= 1;
                return true;
            }
        }
        false
    }

    /// Decides whether the next subscription on `channel` is refused
    pub fn reject_subscribe(&mut self, channel: ChannelId) -> bool {
        if self.reject_subscribes > 0 {
            self.reject_subscribes -= 1;
            return true;
        }
        if let Some(count) = self.reject_subscribes_on.get_mut(&channel) {
            if *count > 0 {
                *count -= 1;
                return true;
            }
        }
        false
    }

    /// Decides whether the next command to `driver` is refused
    pub fn reject_command(&mut self, _driver: DriverNum) -> bool {
        if self.reject_commands > 0 {
            self.reject_commands -= 1;
            return true;
        }
        false
    }

    /// True if `driver` is planned absent
    pub fn driver_absent(&self, driver: DriverNum) -> bool {
        self.absent_drivers.contains(&driver)
    }
}
