//! Wire types for the Chrome DevTools Protocol.
//!
//! This crate contains the serde-serializable frames exchanged with a
//! Chromium page target over its DevTools WebSocket, plus the handful of
//! command payloads slotwatch sends. These types represent the "protocol
//! layer" - the shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization
//! * 1:1 with protocol: Field names match the CDP JSON schema
//! * Stable: Changes only when the wire protocol changes
//!
//! Higher-level page operations are built on top of these types in
//! `slotwatch-runtime`.

pub mod commands;
pub mod message;
pub mod targets;

pub use commands::*;
pub use message::*;
pub use targets::*;
