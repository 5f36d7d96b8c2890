//! Boundary error types
//!
//! These are the host's synchronous rejections. Asynchronous failures are
//! not errors at this layer: they arrive as a non-success [`StatusCode`]
//! in the completion upcall.
//!
//! [`StatusCode`]: driver_types::StatusCode

use core::fmt;

/// A memory grant was refused by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantError {
    /// No driver is registered behind the addressed channel
    DriverAbsent,
    /// The slot already holds an active grant
    SlotOccupied,
    /// The host refused the grant for a driver-specific reason
    Refused,
}

impl fmt::Display for GrantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantError::DriverAbsent => write!(f, "no driver behind the grant channel"),
            GrantError::SlotOccupied => write!(f, "grant slot already occupied"),
            GrantError::Refused => write!(f, "grant refused by the host"),
        }
    }
}

impl core::error::Error for GrantError {}

/// An upcall subscription was refused by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeError {
    /// No driver is registered behind the addressed channel
    DriverAbsent,
    /// The slot already holds an active subscription
    SlotOccupied,
    /// The host refused the subscription for a driver-specific reason
    Refused,
}

impl fmt::Display for SubscribeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscribeError::DriverAbsent => write!(f, "no driver behind the subscription channel"),
            SubscribeError::SlotOccupied => write!(f, "subscription slot already occupied"),
            SubscribeError::Refused => write!(f, "subscription refused by the host"),
        }
    }
}

impl core::error::Error for SubscribeError {}

/// A command was synchronously rejected by the driver
///
/// Acceptance only means the driver took the command; the outcome still
/// arrives asynchronously through the subscribed upcall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// No driver is registered under the addressed driver number
    DriverAbsent,
    /// The driver is already servicing a command
    Busy,
    /// A command argument or required grant was missing or malformed
    InvalidArgument,
    /// The driver refused the command for another reason
    Refused,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::DriverAbsent => write!(f, "no driver behind the command"),
            CommandError::Busy => write!(f, "driver busy"),
            CommandError::InvalidArgument => write!(f, "invalid command argument"),
            CommandError::Refused => write!(f, "command refused by the driver"),
        }
    }
}

impl core::error::Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_error_display() {
        assert_eq!(
            GrantError::SlotOccupied.to_string(),
            "grant slot already occupied"
        );
        assert_eq!(
            GrantError::DriverAbsent.to_string(),
            "no driver behind the grant channel"
        );
    }

    #[test]
    fn test_command_error_display() {
        assert_eq!(CommandError::Busy.to_string(), "driver busy");
        assert_eq!(
            CommandError::InvalidArgument.to_string(),
            "invalid command argument"
        );
    }
}
