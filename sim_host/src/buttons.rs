//! Simulated button board
//!
//! Button presses are hardware events: tests inject them through a
//! [`ButtonBoardHandle`], and the driver only delivers upcalls for
//! buttons whose interrupt has been enabled, like the real board.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use driver_abi::CommandError;
use driver_types::{ChannelId, CommandId, DriverNum, UpcallArgs};

use crate::{DriverContext, SimDriver, SimulatedHost};

/// The button driver's platform number
pub const BUTTON_DRIVER: DriverNum = DriverNum::new(0x3);

/// Subscription slot for button events
pub const EVENT_CHANNEL: ChannelId = ChannelId::new(BUTTON_DRIVER, 0);

/// Command enabling the interrupt for the button in arg0
pub const ENABLE_INTERRUPT: CommandId = CommandId::new(1);

/// Command disabling the interrupt for the button in arg0
pub const DISABLE_INTERRUPT: CommandId = CommandId::new(2);

#[derive(Debug, Default)]
struct BoardState {
    button_count: u32,
    enabled: HashSet<u32>,
}

/// Test-side handle injecting presses into the board
#[derive(Debug, Clone)]
pub struct ButtonBoardHandle {
    shared: Rc<RefCell<BoardState>>,
}

impl ButtonBoardHandle {
    /// Injects a press of `index`, if that interrupt is enabled
    pub fn press(&self, host: &SimulatedHost, index: u32) {
        self.inject(host, index, 1);
    }

    /// Injects a release of `index`, if that interrupt is enabled
    pub fn release(&self, host: &SimulatedHost, index: u32) {
        self.inject(host, index, 0);
    }

    /// Injects a press followed by a release
    pub fn tap(&self, host: &SimulatedHost, index: u32) {
        self.press(host, index);
        self.release(host, index);
    }

    fn inject(&self, host: &SimulatedHost, index: u32, value: u32) {
        let state = self.shared.borrow();
        if index < state.button_count && state.enabled.contains(&index) {
            host.schedule_upcall(EVENT_CHANNEL, UpcallArgs::new(index, value, 0));
        }
    }
}

/// The simulated button board driver
#[derive(Debug)]
pub struct SimButtons {
    shared: Rc<RefCell<BoardState>>,
}

impl SimButtons {
    /// Creates a board with `button_count` buttons and its handle
    pub fn new(button_count: u32) -> (Self, ButtonBoardHandle) {
        let shared = Rc::new(RefCell::new(BoardState {
            button_count,
            enabled: HashSet::new(),
        }));
        let handle = ButtonBoardHandle {
            shared: Rc::clone(&shared),
        };
        (Self { shared }, handle)
    }
}

impl SimDriver for SimButtons {
    fn driver_num(&self) -> DriverNum {
        BUTTON_DRIVER
    }

    fn command(
        &mut self,
        _ctx: &mut DriverContext<'_>,
        command: CommandId,
        arg0: u32,
        _arg1: u32,
    ) -> Result<(), CommandError> {
        let mut state = self.shared.borrow_mut();
        match command.as_u32() {
            0 => Ok(()),
            1 => {
                if arg0 >= state.button_count {
                    return Err(CommandError::InvalidArgument);
                }
                state.enabled.insert(arg0);
                Ok(())
            }
            2 => {
                state.enabled.remove(&arg0);
                Ok(())
            }
            _ => Err(CommandError::InvalidArgument),
        }
    }
}
