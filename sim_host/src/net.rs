//! Simulated network driver
//!
//! Plays the role of the kernel's network driver: reads the URL (and,
//! for POST, the payload) from the granted slots, writes a scripted
//! response body into the granted response buffer and schedules exactly
//! one completion upcall per accepted command.
//!
//! With no scripted response queued, the driver completes with status
//! 418 and an empty body, the real driver's "no new notification"
//! answer.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use driver_abi::CommandError;
use driver_types::{ChannelId, CommandId, DriverNum, StatusCode, UpcallArgs};

use crate::{DriverContext, SimDriver};

/// The network driver's platform number
pub const NETWORK_DRIVER: DriverNum = DriverNum::new(0xa0001);

/// Read slot carrying the request URL
pub const URL_CHANNEL: ChannelId = ChannelId::new(NETWORK_DRIVER, 0);

/// Read slot carrying the POST payload
pub const PAYLOAD_CHANNEL: ChannelId = ChannelId::new(NETWORK_DRIVER, 1);

/// Write slot receiving the response body
pub const RESPONSE_CHANNEL: ChannelId = ChannelId::new(NETWORK_DRIVER, 0);

/// Subscription slot for request completion
pub const COMPLETION_CHANNEL: ChannelId = ChannelId::new(NETWORK_DRIVER, 0);

/// Command submitting the prepared request
pub const SEND_REQUEST: CommandId = CommandId::new(1);

/// Completion status when no notification is available
pub const NO_CONTENT: StatusCode = StatusCode::new(418);

/// One scripted driver outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// A request observed by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedRequest {
    /// URL bytes, decoded lossily for assertion convenience
    pub url: String,
    /// POST payload, if a payload grant was active
    pub payload: Option<Vec<u8>>,
}

impl ObservedRequest {
    /// True if a payload grant accompanied the request
    pub fn is_post(&self) -> bool {
        self.payload.is_some()
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    responses: VecDeque<ScriptedResponse>,
    observed: Vec<ObservedRequest>,
}

/// Test-side handle for scripting responses and observing requests
#[derive(Debug, Clone)]
pub struct NetworkScript {
    shared: Rc<RefCell<ScriptState>>,
}

impl NetworkScript {
    /// Queues a response for the next request
    pub fn enqueue_response(&self, status: StatusCode, body: &[u8]) {
        self.shared.borrow_mut().responses.push_back(ScriptedResponse {
            status,
            body: body.to_vec(),
        });
    }

    /// Queues a successful response with the given body
    pub fn enqueue_body(&self, body: &[u8]) {
        self.enqueue_response(StatusCode::SUCCESS, body);
    }

    /// Returns all requests observed so far
    pub fn requests(&self) -> Vec<ObservedRequest> {
        self.shared.borrow().observed.clone()
    }

    /// Number of requests observed so far
    pub fn request_count(&self) -> usize {
        self.shared.borrow().observed.len()
    }
}

/// The simulated network driver
#[derive(Debug)]
pub struct SimNetworkDriver {
    shared: Rc<RefCell<ScriptState>>,
}

impl SimNetworkDriver {
    /// Creates the driver and its scripting handle
    pub fn new() -> (Self, NetworkScript) {
        let shared = Rc::new(RefCell::new(ScriptState::default()));
        let script = NetworkScript {
            shared: Rc::clone(&shared),
        };
        (Self { shared }, script)
    }
}

impl SimDriver for SimNetworkDriver {
    fn driver_num(&self) -> DriverNum {
        NETWORK_DRIVER
    }

    fn command(
        &mut self,
        ctx: &mut DriverContext<'_>,
        command: CommandId,
        _arg0: u32,
        _arg1: u32,
    ) -> Result<(), CommandError> {
        match command.as_u32() {
            0 => Ok(()),
            1 => {
                // A request needs at least a URL grant to be well-formed.
                let url = match ctx.read_grant(URL_CHANNEL) {
                    Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                    None => return Err(CommandError::InvalidArgument),
                };
                let payload = ctx.read_grant(PAYLOAD_CHANNEL).map(|bytes| bytes.to_vec());

                let mut shared = self.shared.borrow_mut();
                shared.observed.push(ObservedRequest { url, payload });
                let scripted = shared
                    .responses
                    .pop_front()
                    .unwrap_or(ScriptedResponse {
                        status: NO_CONTENT,
                        body: Vec::new(),
                    });
                drop(shared);

                if scripted.status.is_success() {
                    if let Some(buffer) = ctx.write_grant_mut(RESPONSE_CHANNEL) {
                        buffer.write_at(0, &scripted.body);
                    }
                }

                // The reported length is the full response length; a
                // too-small buffer is the client's truncation problem.
                ctx.schedule_upcall(
                    COMPLETION_CHANNEL,
                    UpcallArgs::completion(scripted.status, scripted.body.len() as u32),
                );
                Ok(())
            }
            _ => Err(CommandError::InvalidArgument),
        }
    }
}
