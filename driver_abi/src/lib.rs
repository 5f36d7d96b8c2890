//! # Driver ABI
//!
//! This crate defines the interface between application code and the host
//! kernel's asynchronous driver layer.
//!
//! ## Philosophy
//!
//! The host provides **mechanisms**, not policies:
//! - Memory grants (explicit revocable sharing, not ambient pointers)
//! - Upcall subscriptions (explicit completion delivery, not signals)
//! - Commands (synchronous accept/reject, asynchronous completion)
//! - Cooperative waiting (explicit suspension points, not preemption)
//!
//! ## Design Goals
//!
//! 1. **Testability**: the entire boundary can be simulated and driven
//!    deterministically from tests
//! 2. **Explicitness**: every shared resource is established and revoked
//!    by name; nothing is inherited or leaked
//! 3. **Single-threaded cooperative**: upcalls interleave with application
//!    code only at the [`DriverHost::wait`] suspension point
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A wire protocol (commands carry three data words, nothing more)
//! - A specific transport (the trait can be backed by real syscalls or a
//!   simulated host)
//! - A scheduler (there is exactly one logical thread of control)

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod completion;
pub mod error;
pub mod host;
pub mod scoped;
pub mod time;

pub use completion::{Completion, CompletionRecord, Upcall};
pub use error::{CommandError, GrantError, SubscribeError};
pub use host::DriverHost;
pub use scoped::{ReadGrant, Subscription, WriteGrant};
pub use time::{Duration, Instant};
