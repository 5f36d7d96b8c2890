//! Whole-badge session contracts
//!
//! Application flows driven through the button board, the way a user
//! would hold the device.
