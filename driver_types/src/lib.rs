#![no_std]

//! # Driver Types
//!
//! This crate defines the fundamental value types exchanged across the
//! userspace/driver boundary in Beacon.
//!
//! ## Philosophy
//!
//! - **Capabilities, not file descriptors**: drivers are addressed by
//!   explicit driver numbers and channel slots, never ambient handles
//! - **Words, not wire formats**: commands and upcalls carry three data
//!   words with driver-defined meaning; no parsing happens at this layer
//! - **Bounded memory**: buffers shared with a driver have a fixed,
//!   explicit capacity and never grow
//! - **Testable**: every type is serializable and can be constructed in
//!   tests without a running host
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A syscall interface (see `driver_abi` for the host trait)
//! - A driver registry (driver numbers are assigned by the platform)
//! - A message-passing layer (upcalls are plain data words)

extern crate alloc;

pub mod buffer;
pub mod channel;
pub mod upcall;

pub use buffer::BoundedBuffer;
pub use channel::{ChannelId, ChannelKind, CommandId, DriverNum};
pub use upcall::{StatusCode, UpcallArgs};
