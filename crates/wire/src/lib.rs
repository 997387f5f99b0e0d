#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keeper-wire: startup-packet framing and parsing (C2's wire format).
//!
//! Wire format: 4-byte length prefix (big-endian, including itself) +
//! body, whose first four bytes are a 32-bit discriminator dispatching to
//! a cancel request, a secure-transport negotiation, or a `MAJOR.MINOR`
//! protocol version (§4.2, §6).

pub mod error;
pub mod framing;
pub mod response;
pub mod startup;

pub use error::ProtocolError;
pub use framing::{read_frame, write_frame, MAX_STARTUP_MESSAGE_LEN};
pub use response::{write_rejection, write_secure_negotiate_reply, SecureNegotiateReply};
pub use startup::{
    parse_startup_message, ParsedFields, StartupMessage, CANCEL_DISCRIMINATOR, EARLIEST_SUPPORTED,
    LATEST_SUPPORTED, LEGACY_NAME_LIMIT, SECURE_NEGOTIATE_DISCRIMINATOR,
};
