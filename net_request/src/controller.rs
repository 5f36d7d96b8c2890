//! The request lifecycle controller
//!
//! One request walks: admission → allocate → grant → subscribe → issue →
//! await → resolve → release. Admission is guarded by a single-flight
//! flag; everything after it is held in scoped guards, so any early
//! return unwinds the resources acquired so far in reverse order and
//! the flag itself is released by its own guard on every path.

use core::cell::Cell;

use driver_abi::scoped::{ReadGrant, Subscription, WriteGrant};
use driver_abi::{Completion, DriverHost};
use driver_types::{BoundedBuffer, ChannelId, CommandId, DriverNum};

use crate::RequestError;

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

/// Default response buffer capacity in bytes
pub const DEFAULT_RESPONSE_CAPACITY: usize = 1024;

/// Single-flight admission flag with a scoped guard
///
/// The scheduling model is single-threaded cooperative, so a plain
/// `Cell` is sufficient: the flag can only be observed set by code
/// running from an upcall delivered while a request is suspended in its
/// wait.
#[derive(Debug, Default)]
struct SingleFlight {
    busy: Cell<bool>,
}

impl SingleFlight {
    fn try_acquire(&self) -> Option<FlightGuard<'_>> {
        if self.busy.get() {
            return None;
        }
        self.busy.set(true);
        Some(FlightGuard { flag: &self.busy })
    }
}

struct FlightGuard<'a> {
    flag: &'a Cell<bool>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Client for the network driver's HTTP-like request interface
///
/// Owns the single-flight admission flag and the response capacity.
/// The host is passed per call, so one client can be driven against a
/// simulated host in tests and a real one in production.
#[derive(Debug)]
pub struct NetworkClient {
    response_capacity: usize,
    flight: SingleFlight,
}

impl NetworkClient {
    /// Creates a client with the default response capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_RESPONSE_CAPACITY)
    }

    /// Creates a client with a specific response capacity
    ///
    /// The capacity is fixed for the life of the client: the driver-side
    /// grant length must match the buffer, so it is never grown.
    pub fn with_capacity(response_capacity: usize) -> Self {
        Self {
            response_capacity,
            flight: SingleFlight::default(),
        }
    }

    /// Returns the response buffer capacity in bytes
    pub fn capacity(&self) -> usize {
        self.response_capacity
    }

    /// Probes whether the network driver is present
    pub fn is_available<H: DriverHost>(&self, host: &H) -> bool {
        host.driver_present(NETWORK_DRIVER)
    }

    /// Performs a GET request, returning the response body
    ///
    /// On success the body holds at most [`capacity`] bytes, truncated
    /// from whatever the driver delivered. Any failure returns with
    /// every grant revoked, the subscription cancelled, the buffer
    /// freed and the single-flight flag released.
    ///
    /// [`capacity`]: NetworkClient::capacity
    pub fn get<H: DriverHost>(&self, host: &H, url: &str) -> Result<Vec<u8>, RequestError> {
        let _flight = self.flight.try_acquire().ok_or(RequestError::Busy)?;

        let buffer = BoundedBuffer::try_allocate(self.response_capacity)
            .ok_or(RequestError::OutOfMemory)?;
        let inbound = WriteGrant::establish(host, RESPONSE_CHANNEL, buffer)?;
        let outbound = ReadGrant::establish(host, URL_CHANNEL, url.as_bytes())?;

        let completion = Completion::new();
        let subscription = Subscription::register(host, COMPLETION_CHANNEL, completion.upcall())?;

        host.issue_command(NETWORK_DRIVER, SEND_REQUEST, 0, 0)?;
        let outcome = host.wait(&completion);

        // Release order reverses establishment: subscription first, then
        // the URL grant, and the response grant last.
        drop(subscription);
        drop(outbound);
        if !outcome.status.is_success() {
            return Err(RequestError::Remote(outcome.status));
        }
        let body = inbound
            .release()
            .map(|buffer| buffer.into_response(outcome.length))
            .unwrap_or_default();
        Ok(body)
    }

    /// Performs a POST request
    ///
    /// The driver protocol still needs an inbound buffer for the
    /// implicit acknowledgement, but nothing from it ever reaches the
    /// caller: the result is pass/fail only. Revocation order on every
    /// exit path is payload grant, URL grant, then the inbound buffer.
    pub fn post<H: DriverHost>(
        &self,
        host: &H,
        url: &str,
        payload: &[u8],
    ) -> Result<(), RequestError> {
        let _flight = self.flight.try_acquire().ok_or(RequestError::Busy)?;

        let buffer = BoundedBuffer::try_allocate(self.response_capacity)
            .ok_or(RequestError::OutOfMemory)?;
        let inbound = WriteGrant::establish(host, RESPONSE_CHANNEL, buffer)?;
        let outbound = ReadGrant::establish(host, URL_CHANNEL, url.as_bytes())?;
        let payload_grant = ReadGrant::establish(host, PAYLOAD_CHANNEL, payload)?;

        let completion = Completion::new();
        let subscription = Subscription::register(host, COMPLETION_CHANNEL, completion.upcall())?;

        host.issue_command(NETWORK_DRIVER, SEND_REQUEST, 0, 0)?;
        let outcome = host.wait(&completion);

        drop(subscription);
        drop(payload_grant);
        drop(outbound);
        drop(inbound);

        if outcome.status.is_success() {
            Ok(())
        } else {
            Err(RequestError::Remote(outcome.status))
        }
    }
}

impl Default for NetworkClient {
    fn default() -> Self {
        Self::new()
    }
}
