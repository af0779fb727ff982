//! Request and response types for the slotbook booking surface.
//!
//! Two operations are exposed: a read that returns one day's slot verdicts
//! in the visitor's timezone, and a write that books a slot. Both travel as
//! JSON objects tagged with a `type` field.
//!
//! ```rust
//! use slotbook_protocol::{Request, decode_message, encode_message};
//!
//! let request = Request::availability("2024-03-10", "Asia/Tokyo");
//! let bytes = encode_message(&request).unwrap();
//! let decoded: Request = decode_message(&bytes).unwrap();
//! assert_eq!(decoded, request);
//! ```

mod codec;
mod error;
mod types;

pub use codec::{decode_message, encode_message, read_message};
pub use error::{ProtocolError, ProtocolResult};
pub use types::{
    AvailabilityView, BookingPayload, BookingResult, ErrorCode, ErrorResponse, Request, Response,
    SlotView,
};

/// Maximum body size (64 KiB).
pub const MAX_MESSAGE_SIZE: u32 = 64 * 1024;
