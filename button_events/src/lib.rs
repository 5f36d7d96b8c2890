//! # Button Events
//!
//! Client for the button board driver.
//!
//! ## Philosophy
//!
//! - **Events, not polling**: presses arrive as structured events
//!   through an upcall subscription
//! - **Explicit interrupts**: a button is silent until its interrupt is
//!   enabled, and can be silenced again
//! - **Events, not ambient state**: there is no "is button down" global;
//!   handlers see each edge exactly once
//!
//! Handlers run during upcall delivery, i.e. inside a suspension point
//! of whatever call is currently waiting: the cooperative model's
//! equivalent of an interrupt handler.

use std::rc::Rc;

use driver_abi::scoped::Subscription;
use driver_abi::{CommandError, DriverHost, SubscribeError};
use driver_types::{ChannelId, CommandId, DriverNum, UpcallArgs};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The button driver's platform number
pub const BUTTON_DRIVER: DriverNum = DriverNum::new(0x3);

/// Subscription slot for button events
pub const EVENT_CHANNEL: ChannelId = ChannelId::new(BUTTON_DRIVER, 0);

/// Command enabling the interrupt for the button in arg0
pub const ENABLE_INTERRUPT: CommandId = CommandId::new(1);

/// Command disabling the interrupt for the button in arg0
pub const DISABLE_INTERRUPT: CommandId = CommandId::new(2);

/// One button edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEvent {
    /// Which button changed state
    pub index: u32,
    /// True on press, false on release
    pub pressed: bool,
}

impl ButtonEvent {
    /// Creates a press event
    pub fn press(index: u32) -> Self {
        Self {
            index,
            pressed: true,
        }
    }

    /// Creates a release event
    pub fn release(index: u32) -> Self {
        Self {
            index,
            pressed: false,
        }
    }

    /// Decodes the driver's upcall words (arg0 = index, arg1 = pressed)
    pub fn from_upcall(args: UpcallArgs) -> Self {
        Self {
            index: args.arg0,
            pressed: args.arg1 != 0,
        }
    }
}

/// Why a button operation failed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ButtonError {
    /// The event subscription was refused by the host
    #[error("button subscription refused: {0}")]
    Subscribe(#[from] SubscribeError),

    /// An interrupt command was rejected by the driver
    #[error("button command rejected: {0}")]
    Command(#[from] CommandError),
}

/// Keeps the button handler registered while held
pub struct ButtonSubscription<'a, H: DriverHost> {
    _subscription: Subscription<'a, H>,
}

/// Client for the button board driver
#[derive(Debug, Default)]
pub struct Buttons;

impl Buttons {
    /// Creates a button client
    pub fn new() -> Self {
        Self
    }

    /// Probes whether the button driver is present
    pub fn is_available<H: DriverHost>(&self, host: &H) -> bool {
        host.driver_present(BUTTON_DRIVER)
    }

    /// Registers `handler` for button events
    ///
    /// Events keep arriving until the returned guard is dropped.
    pub fn subscribe<'a, H: DriverHost>(
        &self,
        host: &'a H,
        handler: impl Fn(ButtonEvent) + 'static,
    ) -> Result<ButtonSubscription<'a, H>, ButtonError> {
        let upcall = Rc::new(move |args: UpcallArgs| handler(ButtonEvent::from_upcall(args)));
        let subscription = Subscription::register(host, EVENT_CHANNEL, upcall)?;
        Ok(ButtonSubscription {
            _subscription: subscription,
        })
    }

    /// Enables the interrupt for one button
    pub fn enable_interrupt<H: DriverHost>(&self, host: &H, index: u32) -> Result<(), ButtonError> {
        host.issue_command(BUTTON_DRIVER, ENABLE_INTERRUPT, index, 0)?;
        Ok(())
    }

    /// Disables the interrupt for one button
    pub fn disable_interrupt<H: DriverHost>(
        &self,
        host: &H,
        index: u32,
    ) -> Result<(), ButtonError> {
        host.issue_command(BUTTON_DRIVER, DISABLE_INTERRUPT, index, 0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_host::{ButtonBoardHandle, SimButtons, SimulatedHost};
    use std::cell::RefCell;

    fn board_host() -> (SimulatedHost, ButtonBoardHandle) {
        let host = SimulatedHost::new();
        let (driver, handle) = SimButtons::new(3);
        host.register_driver(Box::new(driver));
        (host, handle)
    }

    #[test]
    fn test_events_reach_the_handler() {
        let (host, board) = board_host();
        let buttons = Buttons::new();
        let seen: Rc<RefCell<Vec<ButtonEvent>>> = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let _subscription = buttons
            .subscribe(&host, move |event| sink.borrow_mut().push(event))
            .unwrap();
        buttons.enable_interrupt(&host, 0).unwrap();
        buttons.enable_interrupt(&host, 2).unwrap();

        board.tap(&host, 0);
        board.press(&host, 2);
        host.run_until_idle();

        assert_eq!(
            *seen.borrow(),
            vec![
                ButtonEvent::press(0),
                ButtonEvent::release(0),
                ButtonEvent::press(2),
            ]
        );
    }

    #[test]
    fn test_disabled_button_is_silent() {
        let (host, board) = board_host();
        let buttons = Buttons::new();
        let seen: Rc<RefCell<Vec<ButtonEvent>>> = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let _subscription = buttons
            .subscribe(&host, move |event| sink.borrow_mut().push(event))
            .unwrap();
        buttons.enable_interrupt(&host, 1).unwrap();
        buttons.disable_interrupt(&host, 1).unwrap();

        board.tap(&host, 1);
        host.run_until_idle();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_dropping_the_guard_unsubscribes() {
        let (host, board) = board_host();
        let buttons = Buttons::new();
        let seen: Rc<RefCell<Vec<ButtonEvent>>> = Rc::new(RefCell::new(Vec::new()));

        {
            let sink = Rc::clone(&seen);
            let _subscription = buttons
                .subscribe(&host, move |event| sink.borrow_mut().push(event))
                .unwrap();
            buttons.enable_interrupt(&host, 0).unwrap();
        }

        board.tap(&host, 0);
        host.run_until_idle();
        assert!(seen.borrow().is_empty());
        assert_eq!(host.active_subscription_count(), 0);
    }

    #[test]
    fn test_event_decoding() {
        let event = ButtonEvent::from_upcall(UpcallArgs::new(2, 1, 0));
        assert_eq!(event, ButtonEvent::press(2));
        let event = ButtonEvent::from_upcall(UpcallArgs::new(0, 0, 0));
        assert_eq!(event, ButtonEvent::release(0));
    }
}
