//! Scoped resource acquisition
//!
//! Every resource shared with a driver is acquired through a guard that
//! releases it on drop. Composing guards in establishment order makes
//! partial failure unwind exactly the resources already acquired, in
//! reverse order, with no cleanup code on the failure paths.

use crate::error::{GrantError, SubscribeError};
use crate::host::DriverHost;
use crate::Upcall;
use driver_types::{BoundedBuffer, ChannelId};

/// A read-only memory grant, revoked on drop
pub struct ReadGrant<'a, H: DriverHost> {
    host: &'a H,
    channel: ChannelId,
}

impl<'a, H: DriverHost> ReadGrant<'a, H> {
    /// Grants the driver read access to `bytes` until the guard drops
    pub fn establish(host: &'a H, channel: ChannelId, bytes: &[u8]) -> Result<Self, GrantError> {
        host.grant_read(channel, bytes)?;
        Ok(Self { host, channel })
    }

    /// The channel this grant occupies
    pub fn channel(&self) -> ChannelId {
        self.channel
    }
}

impl<H: DriverHost> Drop for ReadGrant<'_, H> {
    fn drop(&mut self) {
        self.host.revoke_read(self.channel);
    }
}

/// A read-write memory grant, revoked on drop
///
/// The buffer lives inside the host while granted. Dropping the guard
/// revokes the grant and discards the buffer; [`release`] revokes and
/// hands the buffer back instead, for callers that want the driver's
/// output.
///
/// [`release`]: WriteGrant::release
pub struct WriteGrant<'a, H: DriverHost> {
    host: &'a H,
    channel: ChannelId,
    active: bool,
}

impl<'a, H: DriverHost> WriteGrant<'a, H> {
    /// Grants the driver write access to `buffer` until the guard drops
    ///
    /// On refusal the host hands the buffer back and it is dropped here;
    /// the caller only sees the error.
    pub fn establish(
        host: &'a H,
        channel: ChannelId,
        buffer: BoundedBuffer,
    ) -> Result<Self, GrantError> {
        match host.grant_write(channel, buffer) {
            Ok(()) => Ok(Self {
                host,
                channel,
                active: true,
            }),
            Err((_buffer, error)) => Err(error),
        }
    }

    /// Revokes the grant and returns the buffer with the driver's output
    pub fn release(mut self) -> Option<BoundedBuffer> {
        self.active = false;
        self.host.revoke_write(self.channel)
    }
}

impl<H: DriverHost> Drop for WriteGrant<'_, H> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.host.revoke_write(self.channel);
        }
    }
}

/// An upcall subscription, cancelled on drop
pub struct Subscription<'a, H: DriverHost> {
    host: &'a H,
    channel: ChannelId,
}

impl<'a, H: DriverHost> Subscription<'a, H> {
    /// Registers `upcall` on `channel` until the guard drops
    pub fn register(host: &'a H, channel: ChannelId, upcall: Upcall) -> Result<Self, SubscribeError> {
        host.subscribe(channel, upcall)?;
        Ok(Self { host, channel })
    }
}

impl<H: DriverHost> Drop for Subscription<'_, H> {
    fn drop(&mut self) {
        self.host.unsubscribe(self.channel);
    }
}
