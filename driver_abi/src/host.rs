//! The host boundary trait

use crate::completion::{Completion, CompletionRecord, Upcall};
use crate::error::{CommandError, GrantError, SubscribeError};
use crate::time::{Duration, Instant};
use driver_types::{BoundedBuffer, ChannelId, CommandId, DriverNum};

/// The driver host trait
///
/// This defines the boundary between application code and the kernel's
/// driver layer. Multiple implementations are possible:
/// - Simulated host (for tests and demos)
/// - Real host (syscalls into the running kernel)
///
/// # Design Principles
///
/// **Ownership models validity.** A read grant hands the host a copy of
/// the bytes; a write grant moves the buffer into the host and gets it
/// back on revocation. Either way the granted region cannot be freed or
/// reused from the application side while the grant is active.
///
/// **Completion is asynchronous.** [`issue_command`] only accepts or
/// rejects; the outcome arrives through the subscribed upcall while the
/// caller is suspended in [`wait`].
///
/// **Cooperative suspension.** [`wait`] is the only point at which
/// upcalls (for this or any other driver) may run. Everything between
/// two waits is atomic with respect to upcall delivery.
///
/// [`issue_command`]: DriverHost::issue_command
/// [`wait`]: DriverHost::wait
pub trait DriverHost {
    /// Probes whether a driver is present
    ///
    /// Callers are expected to probe before issuing any operation; every
    /// other method reports an absent driver as an error or no-op.
    fn driver_present(&self, driver: DriverNum) -> bool;

    /// Grants the driver read access to a copy of `bytes`
    ///
    /// The grant stays active until [`revoke_read`] is called for the
    /// same channel.
    ///
    /// [`revoke_read`]: DriverHost::revoke_read
    fn grant_read(&self, channel: ChannelId, bytes: &[u8]) -> Result<(), GrantError>;

    /// Grants the driver write access to `buffer`
    ///
    /// Ownership of the buffer moves to the host while the grant is
    /// active. On refusal the buffer comes back to the caller together
    /// with the error, so nothing is lost on the failure path.
    fn grant_write(
        &self,
        channel: ChannelId,
        buffer: BoundedBuffer,
    ) -> Result<(), (BoundedBuffer, GrantError)>;

    /// Revokes a read grant
    ///
    /// Idempotent: revoking a channel with no active grant is a no-op.
    fn revoke_read(&self, channel: ChannelId);

    /// Revokes a write grant, returning the buffer if one was active
    ///
    /// Idempotent. The returned buffer contains whatever the driver
    /// wrote while the grant was active.
    fn revoke_write(&self, channel: ChannelId) -> Option<BoundedBuffer>;

    /// Registers an upcall on a subscription channel
    ///
    /// The host holds the handler until [`unsubscribe`]; request-style
    /// drivers invoke it exactly once per accepted command.
    ///
    /// [`unsubscribe`]: DriverHost::unsubscribe
    fn subscribe(&self, channel: ChannelId, upcall: Upcall) -> Result<(), SubscribeError>;

    /// Cancels an upcall subscription
    ///
    /// Idempotent: cancelling a channel with no active subscription is a
    /// no-op. Upcalls already scheduled but not yet delivered are
    /// dropped.
    fn unsubscribe(&self, channel: ChannelId);

    /// Submits a command to a driver
    ///
    /// Synchronous accept/reject only. Acceptance means the completion
    /// upcall will fire exactly once, later.
    fn issue_command(
        &self,
        driver: DriverNum,
        command: CommandId,
        arg0: u32,
        arg1: u32,
    ) -> Result<(), CommandError>;

    /// Blocks cooperatively until `completion` resolves
    ///
    /// This is the single suspension point of the system: the host
    /// delivers pending upcalls (for any driver) until the given
    /// completion fires, then returns its record. There is deliberately
    /// no timeout: a driver that never completes stalls the caller, a
    /// known limitation of the design.
    fn wait(&self, completion: &Completion) -> CompletionRecord;

    /// Returns the current time
    ///
    /// Explicit, never ambient; simulated hosts control it for
    /// deterministic tests.
    fn now(&self) -> Instant;

    /// Sleeps for the specified duration
    ///
    /// Yields control to the host; simulated hosts advance virtual time
    /// without real delay.
    fn sleep(&self, duration: Duration);
}
