//! Outbound replies the handshake processor sends before handing off (or
//! refusing to hand off) a connection to a worker (§4.2, §6, §7).

use crate::error::ProtocolError;
use keeper_core::RejectionCategory;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Secure-transport negotiation reply: exactly one ASCII byte (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecureNegotiateReply {
    Available,
    Unavailable,
}

impl SecureNegotiateReply {
    pub fn as_byte(self) -> u8 {
        match self {
            SecureNegotiateReply::Available => b'S',
            SecureNegotiateReply::Unavailable => b'N',
        }
    }
}

pub async fn write_secure_negotiate_reply<W: AsyncWrite + Unpin>(
    writer: &mut W,
    reply: SecureNegotiateReply,
) -> Result<(), ProtocolError> {
    writer.write_all(&[reply.as_byte()]).await?;
    Ok(())
}

/// A one-shot, best-effort textual rejection reply (§4.2: "MUST send a
/// one-shot, best-effort textual error packet if possible (non-blocking,
/// single write, no retry)"). Failure to write is deliberately swallowed
/// by the caller; this function only builds and performs the single
/// write.
pub async fn write_rejection<W: AsyncWrite + Unpin>(
    writer: &mut W,
    category: RejectionCategory,
) -> Result<(), ProtocolError> {
    let body = category.as_str().as_bytes();
    let declared_len = u32::try_from(body.len() + 4).unwrap_or(u32::MAX);
    let mut frame = declared_len.to_be_bytes().to_vec();
    frame.extend_from_slice(body);
    writer.write_all(&frame).await?;
    Ok(())
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
