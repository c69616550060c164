//! Wire protocol frame types and codec.
//!
//! This module defines the message format exchanged with the remote
//! debugging target and the codec that classifies inbound traffic.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `RequestFrame` | Local → Remote | Method call |
//! | `ResponseFrame` | Remote → Local | Call outcome, matched by id |
//! | `EventFrame` | Remote → Local | Unsolicited notification, no id |
//!
//! # Method Naming
//!
//! Methods and events follow `Domain.name` format:
//!
//! - `Page.navigate`
//! - `Network.requestWillBeSent`
//! - `Runtime.evaluate`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `frame` | Frame data types |
//! | `codec` | JSON encoding and inbound classification |

// ============================================================================
// Submodules
// ============================================================================

/// Frame data types.
pub mod frame;

/// JSON encoding and inbound classification.
pub mod codec;

// ============================================================================
// Re-exports
// ============================================================================

pub use codec::FrameCodec;
pub use frame::{EventFrame, Frame, RemoteError, RequestFrame, ResponseFrame, ResponseOutcome};
