//! Driver and channel addressing

use core::fmt;
use serde::{Deserialize, Serialize};

/// Identity of a driver exposed by the host kernel
///
/// Driver numbers are platform-assigned constants, not dynamically
/// allocated handles. Holding a number grants nothing by itself; every
/// operation is still checked by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverNum(u32);

impl DriverNum {
    /// Creates a driver number from its platform-assigned value
    pub const fn new(num: u32) -> Self {
        Self(num)
    }

    /// Returns the raw driver number
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DriverNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "driver:{:#x}", self.0)
    }
}

/// One grant or subscription slot of one driver
///
/// A driver exposes small fixed families of numbered slots: read grants,
/// write grants and upcall subscriptions each have their own slot space.
/// Which family a `ChannelId` addresses is determined by the operation it
/// is passed to, not by the id itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId {
    /// The driver this channel belongs to
    pub driver: DriverNum,
    /// Slot index within the driver's channel family
    pub slot: u32,
}

impl ChannelId {
    /// Creates a channel id for a driver slot
    pub const fn new(driver: DriverNum, slot: u32) -> Self {
        Self { driver, slot }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.driver, self.slot)
    }
}

/// Which channel family an operation addressed
///
/// Carried in audit records so tests can distinguish the three uses of a
/// slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    /// Read-only memory grant (driver reads application memory)
    ReadGrant,
    /// Read-write memory grant (driver writes application memory)
    WriteGrant,
    /// Upcall subscription
    Subscription,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::ReadGrant => write!(f, "read-grant"),
            ChannelKind::WriteGrant => write!(f, "write-grant"),
            ChannelKind::Subscription => write!(f, "subscription"),
        }
    }
}

/// Driver-defined command opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(u32);

impl CommandId {
    /// Creates a command id from a driver-defined opcode
    pub const fn new(opcode: u32) -> Self {
        Self(opcode)
    }

    /// Returns the raw opcode
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;
    use std::format;
    use std::string::ToString;

    #[test]
    fn test_driver_num_display() {
        let driver = DriverNum::new(0xa0001);
        assert_eq!(driver.to_string(), "driver:0xa0001");
    }

    #[test]
    fn test_channel_id_equality() {
        let driver = DriverNum::new(0xa0001);
        assert_eq!(ChannelId::new(driver, 0), ChannelId::new(driver, 0));
        assert_ne!(ChannelId::new(driver, 0), ChannelId::new(driver, 1));
    }

    #[test]
    fn test_channel_id_display() {
        let channel = ChannelId::new(DriverNum::new(3), 2);
        assert_eq!(channel.to_string(), "driver:0x3#2");
    }

    #[test]
    fn test_channel_kind_display() {
        assert_eq!(ChannelKind::ReadGrant.to_string(), "read-grant");
        assert_eq!(ChannelKind::WriteGrant.to_string(), "write-grant");
        assert_eq!(ChannelKind::Subscription.to_string(), "subscription");
    }

    #[test]
    fn test_channel_id_serde_roundtrip() {
        let channel = ChannelId::new(DriverNum::new(0xa0000), 1);
        let json = serde_json::to_string(&channel).unwrap();
        let back: ChannelId = serde_json::from_str(&json).unwrap();
        assert_eq!(channel, back);
        let _ = format!("{}", back);
    }
}
