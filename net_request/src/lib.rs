//! # Network Request Client
//!
//! This crate implements the request/response lifecycle for the network
//! driver: it coordinates an outbound URL grant, an inbound response
//! buffer grant (plus an outbound payload grant for POST) and a
//! completion subscription into one logical HTTP-like request.
//!
//! ## Philosophy
//!
//! - **Single-flight**: at most one request is in flight; a concurrent
//!   attempt is rejected with [`RequestError::Busy`], never queued
//! - **Scoped resources**: every grant and subscription is held by a
//!   guard ([`driver_abi::scoped`]), so every exit path (success,
//!   partial setup failure, remote failure) releases exactly what was
//!   acquired, in reverse order of acquisition
//! - **Bounded responses**: the response buffer has a fixed capacity;
//!   a longer driver response is truncated, never grown into
//! - **No retries, no timeouts**: a rejected step aborts the request
//!   and surfaces the error; once a command is accepted the client
//!   blocks until the driver completes. A stuck driver stalls the
//!   caller, a known limitation deliberately not papered over here
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - An HTTP implementation (the driver performs the network
//!   transaction; this crate never parses wire bytes)
//! - A connection pool or request multiplexer
//! - A retry or timeout policy (callers layer those on top if needed)

use driver_abi::{CommandError, GrantError, SubscribeError};
use driver_types::StatusCode;
use thiserror::Error;

pub mod controller;

pub use controller::{
    NetworkClient, COMPLETION_CHANNEL, DEFAULT_RESPONSE_CAPACITY, NETWORK_DRIVER, PAYLOAD_CHANNEL,
    RESPONSE_CHANNEL, SEND_REQUEST, URL_CHANNEL,
};

/// Why a request did not produce a response
///
/// The first five variants are local, synchronous failures: the request
/// is fully unwound before they are returned and nothing was sent.
/// [`Remote`] means the driver accepted and completed the command but
/// reported a non-success status; it is a normal outcome, not a fault.
///
/// [`Remote`]: RequestError::Remote
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// A request is already in flight; this one was rejected outright
    #[error("a request is already in flight")]
    Busy,

    /// The response buffer could not be allocated
    #[error("failed to allocate the response buffer")]
    OutOfMemory,

    /// A memory grant was refused by the host
    #[error("memory grant refused: {0}")]
    Grant(#[from] GrantError),

    /// The completion subscription was refused by the host
    #[error("completion subscription refused: {0}")]
    Subscribe(#[from] SubscribeError),

    /// The request command was synchronously rejected by the driver
    #[error("request command rejected: {0}")]
    Command(#[from] CommandError),

    /// The driver completed the request with a non-success status
    #[error("driver completed with {0}")]
    Remote(StatusCode),
}
