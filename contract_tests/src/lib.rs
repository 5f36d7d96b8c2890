//! # Badge Contract Tests
//!
//! Cross-crate scenario tests pinning down the behavior the badge
//! stack guarantees end to end:
//!
//! - single-flight admission: an overlapping request is rejected
//!   outright, without acquiring anything
//! - resource balance: every grant and subscription established during
//!   a request is released by the time the call returns, on success and
//!   on every failure branch
//! - POST exposes nothing: no response byte is observable after a POST
//! - truncation passthrough: over-long responses are clamped to the
//!   buffer capacity, never faulted on
//!
//! The per-crate unit tests cover the same ground piecewise; these
//! tests drive whole application flows over one simulated badge.

pub mod badge_session;
pub mod request_lifecycle;

/// Shared simulated badge assembly
pub mod test_board {
    use std::rc::Rc;

    use sim_host::{
        ButtonBoardHandle, DisplayLog, NetworkScript, SimButtons, SimBuzzer, SimNetworkDriver,
        SimTextDisplay, SimulatedHost, ToneLog,
    };

    /// A fully populated badge: network, display, three buttons, buzzer
    pub struct TestBoard {
        pub host: Rc<SimulatedHost>,
        pub network: NetworkScript,
        pub display: DisplayLog,
        pub buttons: ButtonBoardHandle,
        pub tones: ToneLog,
    }

    /// Builds a badge with every driver registered
    pub fn badge() -> TestBoard {
        let host = SimulatedHost::new();
        let (net, network) = SimNetworkDriver::new();
        let (matrix, display) = SimTextDisplay::new();
        let (board, buttons) = SimButtons::new(3);
        let (buzzer, tones) = SimBuzzer::new();
        host.register_driver(Box::new(net));
        host.register_driver(Box::new(matrix));
        host.register_driver(Box::new(board));
        host.register_driver(Box::new(buzzer));
        TestBoard {
            host: Rc::new(host),
            network,
            display,
            buttons,
            tones,
        }
    }
}
