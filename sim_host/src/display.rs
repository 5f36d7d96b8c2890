//! Simulated LED-matrix text driver
//!
//! Records what would appear on the matrix instead of driving LEDs. A
//! one-shot display completes (schedules its upcall) as soon as the
//! command is accepted; a repeating display never completes, matching
//! the real driver, which keeps scrolling until replaced or cleared.

use std::cell::RefCell;
use std::rc::Rc;

use driver_abi::CommandError;
use driver_types::{ChannelId, CommandId, DriverNum, StatusCode, UpcallArgs};

use crate::{DriverContext, SimDriver};

/// The LED-matrix text driver's platform number
pub const TEXT_DRIVER: DriverNum = DriverNum::new(0xa0000);

/// Read slot carrying the text to display
pub const TEXT_CHANNEL: ChannelId = ChannelId::new(TEXT_DRIVER, 0);

/// Subscription slot for display completion
pub const COMPLETION_CHANNEL: ChannelId = ChannelId::new(TEXT_DRIVER, 0);

/// Command showing the granted text (arg0 = per-char delay ms, arg1 = repeat flag)
pub const SHOW: CommandId = CommandId::new(1);

/// Command blanking the matrix
pub const CLEAR: CommandId = CommandId::new(2);

/// One text shown on the simulated matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedText {
    pub text: String,
    pub repeat: bool,
    pub char_delay_ms: u32,
}

#[derive(Debug, Default)]
struct MatrixState {
    shown: Vec<DisplayedText>,
    current: Option<DisplayedText>,
}

/// Test-side handle for observing the matrix
#[derive(Debug, Clone)]
pub struct DisplayLog {
    shared: Rc<RefCell<MatrixState>>,
}

impl DisplayLog {
    /// Everything shown so far, in order
    pub fn shown(&self) -> Vec<DisplayedText> {
        self.shared.borrow().shown.clone()
    }

    /// What the matrix is showing right now, if anything
    pub fn current(&self) -> Option<DisplayedText> {
        self.shared.borrow().current.clone()
    }
}

/// The simulated LED-matrix text driver
#[derive(Debug)]
pub struct SimTextDisplay {
    shared: Rc<RefCell<MatrixState>>,
}

impl SimTextDisplay {
    /// Creates the driver and its observation handle
    pub fn new() -> (Self, DisplayLog) {
        let shared = Rc::new(RefCell::new(MatrixState::default()));
        let log = DisplayLog {
            shared: Rc::clone(&shared),
        };
        (Self { shared }, log)
    }
}

impl SimDriver for SimTextDisplay {
    fn driver_num(&self) -> DriverNum {
        TEXT_DRIVER
    }

    fn command(
        &mut self,
        ctx: &mut DriverContext<'_>,
        command: CommandId,
        arg0: u32,
        arg1: u32,
    ) -> Result<(), CommandError> {
        match command.as_u32() {
            0 => Ok(()),
            1 => {
                let text = match ctx.read_grant(TEXT_CHANNEL) {
                    Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                    None => return Err(CommandError::InvalidArgument),
                };
                let repeat = arg1 != 0;
                let entry = DisplayedText {
                    text,
                    repeat,
                    char_delay_ms: arg0,
                };
                let mut shared = self.shared.borrow_mut();
                shared.shown.push(entry.clone());
                shared.current = Some(entry);
                drop(shared);

                // Repeating text scrolls until replaced; nothing to wait
                // for, so no completion is scheduled.
                if !repeat {
                    ctx.schedule_upcall(
                        COMPLETION_CHANNEL,
                        UpcallArgs::completion(StatusCode::SUCCESS, 0),
                    );
                }
                Ok(())
            }
            2 => {
                self.shared.borrow_mut().current = None;
                ctx.schedule_upcall(
                    COMPLETION_CHANNEL,
                    UpcallArgs::completion(StatusCode::SUCCESS, 0),
                );
                Ok(())
            }
            _ => Err(CommandError::InvalidArgument),
        }
    }
}
