//! Upcall data words and status codes

use core::fmt;
use serde::{Deserialize, Serialize};

/// Driver-defined completion code
///
/// `0` means success by convention across all request-style drivers;
/// any other value is a driver-defined failure and is passed through to
/// the caller without interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusCode(u32);

impl StatusCode {
    /// The success code shared by all drivers
    pub const SUCCESS: StatusCode = StatusCode(0);

    /// Creates a status code from a raw driver value
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    /// Returns the raw code
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns true if this is the success code
    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status:{}", self.0)
    }
}

/// The three data words delivered by one upcall
///
/// Meaning is driver-defined. Request-style drivers (network, display,
/// buzzer) put a [`StatusCode`] in `arg0` and a byte length in `arg1`;
/// event-style drivers (buttons) use the words for event data instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcallArgs {
    pub arg0: u32,
    pub arg1: u32,
    pub arg2: u32,
}

impl UpcallArgs {
    /// Creates upcall args from raw words
    pub const fn new(arg0: u32, arg1: u32, arg2: u32) -> Self {
        Self { arg0, arg1, arg2 }
    }

    /// Creates the completion shape used by request-style drivers
    pub const fn completion(status: StatusCode, length: u32) -> Self {
        Self {
            arg0: status.as_u32(),
            arg1: length,
            arg2: 0,
        }
    }

    /// Interprets `arg0` as a status code (request-style drivers)
    pub const fn status(&self) -> StatusCode {
        StatusCode::new(self.arg0)
    }

    /// Interprets `arg1` as a byte length (request-style drivers)
    pub const fn length(&self) -> usize {
        self.arg1 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;
    use std::string::ToString;

    #[test]
    fn test_status_code_success() {
        assert!(StatusCode::SUCCESS.is_success());
        assert!(!StatusCode::new(418).is_success());
    }

    #[test]
    fn test_status_code_display() {
        assert_eq!(StatusCode::new(418).to_string(), "status:418");
    }

    #[test]
    fn test_completion_shape() {
        let args = UpcallArgs::completion(StatusCode::new(418), 12);
        assert_eq!(args.status(), StatusCode::new(418));
        assert_eq!(args.length(), 12);
        assert_eq!(args.arg2, 0);
    }

    #[test]
    fn test_raw_words_pass_through() {
        let args = UpcallArgs::new(2, 1, 0);
        assert_eq!(args.arg0, 2);
        assert_eq!(args.arg1, 1);
    }
}
