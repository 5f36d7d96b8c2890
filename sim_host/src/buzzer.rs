//! Simulated buzzer
//!
//! Records requested tones instead of making noise; every tone command
//! completes immediately.

use std::cell::RefCell;
use std::rc::Rc;

use driver_abi::CommandError;
use driver_types::{ChannelId, CommandId, DriverNum, StatusCode, UpcallArgs};

use crate::{DriverContext, SimDriver};

/// The buzzer driver's platform number
pub const BUZZER_DRIVER: DriverNum = DriverNum::new(0x90000);

/// Subscription slot for tone completion
pub const COMPLETION_CHANNEL: ChannelId = ChannelId::new(BUZZER_DRIVER, 0);

/// Command playing a tone (arg0 = frequency Hz, arg1 = duration ms)
pub const PLAY_TONE: CommandId = CommandId::new(1);

/// One tone requested from the buzzer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

/// Test-side handle for observing played tones
#[derive(Debug, Clone)]
pub struct ToneLog {
    shared: Rc<RefCell<Vec<Tone>>>,
}

impl ToneLog {
    /// All tones requested so far, in order
    pub fn tones(&self) -> Vec<Tone> {
        self.shared.borrow().clone()
    }
}

/// The simulated buzzer driver
#[derive(Debug)]
pub struct SimBuzzer {
    shared: Rc<RefCell<Vec<Tone>>>,
}

impl SimBuzzer {
    /// Creates the driver and its observation handle
    pub fn new() -> (Self, ToneLog) {
        let shared = Rc::new(RefCell::new(Vec::new()));
        let log = ToneLog {
            shared: Rc::clone(&shared),
        };
        (Self { shared }, log)
    }
}

impl SimDriver for SimBuzzer {
    fn driver_num(&self) -> DriverNum {
        BUZZER_DRIVER
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
                self.shared.borrow_mut().push(Tone {
                    frequency_hz: arg0,
                    duration_ms: arg1,
                });
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
