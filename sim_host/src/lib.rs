//! # Simulated Host
//!
//! This crate implements [`DriverHost`] for tests and demos: a simulated
//! host kernel with pluggable simulated drivers, deterministic fault
//! injection and a queryable audit trail.
//!
//! ## Philosophy
//!
//! - **Deterministic**: no real time, no real hardware, no randomness
//!   unless a test injects it
//! - **Cooperative**: upcalls are queued when drivers complete work and
//!   delivered only inside [`SimulatedHost::wait`] and
//!   [`SimulatedHost::run_until_idle`], exactly like the real scheduling
//!   model
//! - **Auditable**: every grant, revocation, subscription, command and
//!   upcall is recorded with a simulated timestamp so tests can assert
//!   resource balance instead of trusting the code under test
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A performance model (commands complete in zero simulated time)
//! - A real kernel (there is no isolation; everything runs in-process)

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use driver_abi::{
    Completion, CompletionRecord, CommandError, DriverHost, Duration, GrantError, Instant,
    SubscribeError, Upcall,
};
use driver_types::{BoundedBuffer, ChannelId, ChannelKind, CommandId, DriverNum, UpcallArgs};

pub mod audit;
pub mod buttons;
pub mod buzzer;
pub mod display;
pub mod fault_injection;
pub mod net;

pub use audit::{AuditRecord, HostAuditLog, HostEvent};
pub use buttons::{ButtonBoardHandle, SimButtons};
pub use buzzer::{SimBuzzer, Tone, ToneLog};
pub use display::{DisplayLog, DisplayedText, SimTextDisplay};
pub use fault_injection::{FaultInjector, FaultPlan, HostFault};
pub use net::{NetworkScript, ObservedRequest, ScriptedResponse, SimNetworkDriver};

/// A simulated driver registered with the host
///
/// Drivers receive commands with a [`DriverContext`] exposing the grant
/// tables and upcall scheduling; they never touch the host directly.
pub trait SimDriver {
    /// The platform-assigned driver number this driver answers to
    fn driver_num(&self) -> DriverNum;

    /// Handles a command synchronously
    ///
    /// Acceptance obliges the driver to schedule the matching completion
    /// upcall (request-style drivers) before returning.
    fn command(
        &mut self,
        ctx: &mut DriverContext<'_>,
        command: CommandId,
        arg0: u32,
        arg1: u32,
    ) -> Result<(), CommandError>;
}

/// What a simulated driver can see and do while handling a command
pub struct DriverContext<'a> {
    read_grants: &'a HashMap<ChannelId, Vec<u8>>,
    write_grants: &'a mut HashMap<ChannelId, BoundedBuffer>,
    pending: &'a mut VecDeque<(ChannelId, UpcallArgs)>,
}

impl DriverContext<'_> {
    /// Returns the bytes behind an active read grant
    pub fn read_grant(&self, channel: ChannelId) -> Option<&[u8]> {
        self.read_grants.get(&channel).map(|bytes| bytes.as_slice())
    }

    /// Returns the buffer behind an active write grant
    pub fn write_grant_mut(&mut self, channel: ChannelId) -> Option<&mut BoundedBuffer> {
        self.write_grants.get_mut(&channel)
    }

    /// Queues an upcall for delivery at the next suspension point
    pub fn schedule_upcall(&mut self, channel: ChannelId, args: UpcallArgs) {
        self.pending.push_back((channel, args));
    }
}

struct HostState {
    read_grants: HashMap<ChannelId, Vec<u8>>,
    write_grants: HashMap<ChannelId, BoundedBuffer>,
    subscriptions: HashMap<ChannelId, Upcall>,
    pending: VecDeque<(ChannelId, UpcallArgs)>,
    faults: FaultInjector,
    audit: HostAuditLog,
    clock: Instant,
}

impl HostState {
    fn record(&mut self, event: HostEvent) {
        let timestamp = self.clock;
        self.audit.record(timestamp, event);
    }
}

/// The simulated host kernel
///
/// All methods take `&self`; interior mutability models the kernel's own
/// state being distinct from the application's. Applications that need
/// to share the host across upcall handlers wrap it in an `Rc`.
pub struct SimulatedHost {
    state: RefCell<HostState>,
    drivers: RefCell<HashMap<DriverNum, Box<dyn SimDriver>>>,
}

impl SimulatedHost {
    /// Creates a host with no drivers and no faults
    pub fn new() -> Self {
        Self {
            state: RefCell::new(HostState {
                read_grants: HashMap::new(),
                write_grants: HashMap::new(),
                subscriptions: HashMap::new(),
                pending: VecDeque::new(),
                faults: FaultInjector::default(),
                audit: HostAuditLog::new(),
                clock: Instant::EPOCH,
            }),
            drivers: RefCell::new(HashMap::new()),
        }
    }

    /// Applies a fault plan to this host
    pub fn with_fault_plan(self, plan: FaultPlan) -> Self {
        self.state.borrow_mut().faults = FaultInjector::new(plan);
        self
    }

    /// Registers a simulated driver
    ///
    /// Replaces any driver previously registered under the same number.
    pub fn register_driver(&self, driver: Box<dyn SimDriver>) {
        let num = driver.driver_num();
        self.drivers.borrow_mut().insert(num, driver);
    }

    /// Queues an upcall as if hardware had raised an event
    ///
    /// This is the injection point for event-style drivers (buttons);
    /// tests and driver handles call it, application code never does.
    pub fn schedule_upcall(&self, channel: ChannelId, args: UpcallArgs) {
        self.state.borrow_mut().pending.push_back((channel, args));
    }

    /// Delivers pending upcalls until the queue is empty
    ///
    /// Handlers may re-enter the host and queue further work; delivery
    /// continues until the system is quiescent.
    pub fn run_until_idle(&self) {
        while let Some((upcall, args)) = self.next_delivery() {
            upcall(args);
        }
    }

    /// Returns true when no upcalls are pending
    pub fn is_idle(&self) -> bool {
        self.state.borrow().pending.is_empty()
    }

    /// Advances simulated time
    pub fn advance_time(&self, duration: Duration) {
        let mut state = self.state.borrow_mut();
        state.clock = state.clock + duration;
    }

    /// Returns a copy of the audit trail so far
    pub fn audit_snapshot(&self) -> Vec<AuditRecord> {
        self.state.borrow().audit.records().to_vec()
    }

    /// Returns true if every established grant has been revoked
    pub fn grants_balanced(&self) -> bool {
        self.state.borrow().audit.grants_balanced()
    }

    /// Number of grants currently active
    pub fn active_grant_count(&self) -> usize {
        let state = self.state.borrow();
        state.read_grants.len() + state.write_grants.len()
    }

    /// Number of subscriptions currently active
    pub fn active_subscription_count(&self) -> usize {
        self.state.borrow().subscriptions.len()
    }

    // Pops the next deliverable upcall, skipping channels whose
    // subscription has since been cancelled. Returns with no host
    // borrows held so the handler may re-enter.
    fn next_delivery(&self) -> Option<(Upcall, UpcallArgs)> {
        let mut state = self.state.borrow_mut();
        while let Some((channel, args)) = state.pending.pop_front() {
            if let Some(upcall) = state.subscriptions.get(&channel) {
                let upcall = Rc::clone(upcall);
                state.record(HostEvent::UpcallDelivered { channel, args });
                return Some((upcall, args));
            }
        }
        None
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverHost for SimulatedHost {
    fn driver_present(&self, driver: DriverNum) -> bool {
        if self.state.borrow().faults.driver_absent(driver) {
            return false;
        }
        self.drivers.borrow().contains_key(&driver)
    }

    fn grant_read(&self, channel: ChannelId, bytes: &[u8]) -> Result<(), GrantError> {
        if !self.driver_present(channel.driver) {
            return Err(GrantError::DriverAbsent);
        }
        let mut state = self.state.borrow_mut();
        if state.faults.reject_grant(channel, ChannelKind::ReadGrant) {
            return Err(GrantError::Refused);
        }
        if state.read_grants.contains_key(&channel) {
            return Err(GrantError::SlotOccupied);
        }
        state.read_grants.insert(channel, bytes.to_vec());
        state.record(HostEvent::GrantEstablished {
            channel,
            kind: ChannelKind::ReadGrant,
            bytes: bytes.len(),
        });
        Ok(())
    }

    fn grant_write(
        &self,
        channel: ChannelId,
        buffer: BoundedBuffer,
    ) -> Result<(), (BoundedBuffer, GrantError)> {
        if !self.driver_present(channel.driver) {
            return Err((buffer, GrantError::DriverAbsent));
        }
        let mut state = self.state.borrow_mut();
        if state.faults.reject_grant(channel, ChannelKind::WriteGrant) {
            return Err((buffer, GrantError::Refused));
        }
        if state.write_grants.contains_key(&channel) {
            return Err((buffer, GrantError::SlotOccupied));
        }
        let bytes = buffer.capacity();
        state.write_grants.insert(channel, buffer);
        state.record(HostEvent::GrantEstablished {
            channel,
            kind: ChannelKind::WriteGrant,
            bytes,
        });
        Ok(())
    }

    fn revoke_read(&self, channel: ChannelId) {
        let mut state = self.state.borrow_mut();
        if state.read_grants.remove(&channel).is_some() {
            state.record(HostEvent::GrantRevoked {
                channel,
                kind: ChannelKind::ReadGrant,
            });
        }
    }

    fn revoke_write(&self, channel: ChannelId) -> Option<BoundedBuffer> {
        let mut state = self.state.borrow_mut();
        let buffer = state.write_grants.remove(&channel);
        if buffer.is_some() {
            state.record(HostEvent::GrantRevoked {
                channel,
                kind: ChannelKind::WriteGrant,
            });
        }
        buffer
    }

    fn subscribe(&self, channel: ChannelId, upcall: Upcall) -> Result<(), SubscribeError> {
        if !self.driver_present(channel.driver) {
            return Err(SubscribeError::DriverAbsent);
        }
        let mut state = self.state.borrow_mut();
        if state.faults.reject_subscribe(channel) {
            return Err(SubscribeError::Refused);
        }
        if state.subscriptions.contains_key(&channel) {
            return Err(SubscribeError::SlotOccupied);
        }
        state.subscriptions.insert(channel, upcall);
        state.record(HostEvent::Subscribed { channel });
        Ok(())
    }

    fn unsubscribe(&self, channel: ChannelId) {
        let mut state = self.state.borrow_mut();
        if state.subscriptions.remove(&channel).is_some() {
            state.record(HostEvent::Unsubscribed { channel });
        }
    }

    fn issue_command(
        &self,
        driver: DriverNum,
        command: CommandId,
        arg0: u32,
        arg1: u32,
    ) -> Result<(), CommandError> {
        if !self.driver_present(driver) {
            return Err(CommandError::DriverAbsent);
        }
        let mut drivers = self.drivers.borrow_mut();
        let mut state = self.state.borrow_mut();
        if state.faults.reject_command(driver) {
            state.record(HostEvent::CommandIssued {
                driver,
                command,
                accepted: false,
            });
            return Err(CommandError::Refused);
        }
        let result = match drivers.get_mut(&driver) {
            None => Err(CommandError::DriverAbsent),
            Some(sim) => {
                let HostState {
                    read_grants,
                    write_grants,
                    pending,
                    ..
                } = &mut *state;
                let mut ctx = DriverContext {
                    read_grants,
                    write_grants,
                    pending,
                };
                sim.command(&mut ctx, command, arg0, arg1)
            }
        };
        state.record(HostEvent::CommandIssued {
            driver,
            command,
            accepted: result.is_ok(),
        });
        result
    }

    fn wait(&self, completion: &Completion) -> CompletionRecord {
        loop {
            if let Some(record) = completion.record() {
                return record;
            }
            match self.next_delivery() {
                Some((upcall, args)) => upcall(args),
                None => panic!(
                    "cooperative wait can never resolve: completion unresolved and no upcalls pending"
                ),
            }
        }
    }

    fn now(&self) -> Instant {
        self.state.borrow().clock
    }

    fn sleep(&self, duration: Duration) {
        self.advance_time(duration);
    }
}
