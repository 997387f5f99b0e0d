//! Length-prefixed framing for the startup packet (§6: "`uint32 length
//! (including itself, big-endian)` followed by `length-4` bytes").

use crate::error::ProtocolError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Matches the historical startup-packet ceiling for this wire protocol
/// family; exceeding it is a protocol violation (§6, §8 boundary
/// behavior).
pub const MAX_STARTUP_MESSAGE_LEN: u32 = 10_000;

/// Reads one length-prefixed startup message body (the length prefix
/// itself is consumed but not returned).
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let declared_len = reader.read_u32().await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::TruncatedMessage
        } else {
            ProtocolError::Io(err)
        }
    })?;

    if declared_len > MAX_STARTUP_MESSAGE_LEN {
        return Err(ProtocolError::MessageTooLong(declared_len, MAX_STARTUP_MESSAGE_LEN));
    }
    let body_len = declared_len
        .checked_sub(4)
        .ok_or(ProtocolError::LengthUnderflow(declared_len))?;

    let mut body = vec![0u8; body_len as usize];
    reader
        .read_exact(&mut body)
        .await
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::UnexpectedEof {
                ProtocolError::TruncatedMessage
            } else {
                ProtocolError::Io(err)
            }
        })?;
    Ok(body)
}

/// Writes `body` as a length-prefixed frame (length includes itself).
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, body: &[u8]) -> Result<(), ProtocolError> {
    let declared_len = u32::try_from(body.len() + 4).map_err(|_| ProtocolError::MessageTooLong(u32::MAX, MAX_STARTUP_MESSAGE_LEN))?;
    writer.write_u32(declared_len).await?;
    writer.write_all(body).await?;
    Ok(())
}

#[cfg(test)]
#[path = "framing_tests.rs"]
mod tests;
