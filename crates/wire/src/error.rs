//! Errors raised while framing or parsing a startup packet (§7
//! ProtocolViolation).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("startup message length {0} exceeds the maximum of {1}")]
    MessageTooLong(u32, u32),

    #[error("declared length {0} is smaller than the 4-byte length prefix itself")]
    LengthUnderflow(u32),

    #[error("connection closed before a complete startup message was read")]
    TruncatedMessage,

    #[error("name/value pairs were not terminated by an empty name before the declared end")]
    MissingTerminator,

    #[error("a terminator appeared before the declared end of the message")]
    TerminatorNotAtDeclaredEnd,

    #[error("a second SECURE_NEGOTIATE discriminator appeared in an already-negotiated message")]
    RepeatedSecureNegotiate,

    #[error("unsupported protocol version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("startup message is missing a required user field")]
    MissingUser,

    #[error("a name/value pair was not valid UTF-8")]
    InvalidUtf8,

    #[error("I/O error while reading or writing a startup message: {0}")]
    Io(#[from] std::io::Error),
}
