//! Handshake processor (C2): reads a startup packet, handles the
//! secure-transport and cancel variants, extracts connection parameters,
//! and asks the admission controller for a verdict before replying
//! (§4.2).

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use keeper_core::{
    admit, AdmissionLimits, AdmissionVerdict, CancelRequest, ConnectionContext, ListenerDescriptor,
    RejectionCategory,
};
use keeper_wire::{
    parse_startup_message, read_frame, write_rejection, write_secure_negotiate_reply,
    ProtocolError, SecureNegotiateReply, StartupMessage,
};

/// What the handshake decided a connection should become. The caller
/// (`supervisor`) dispatches on this to reach C9 or C4.
pub enum HandshakeOutcome {
    Cancel(CancelRequest),
    Admitted(ConnectionContext),
    Rejected,
    Violation,
}

/// Drives one handshake to completion, including the secure-negotiate
/// recursion, against the given reader/writer pair.
pub async fn process<R, W>(
    reader: &mut R,
    writer: &mut W,
    listener: ListenerDescriptor,
    secure_transport_available: bool,
    limits: AdmissionLimits,
    live_worker_count: impl Fn() -> u32,
    state: &keeper_core::SupervisorState,
) -> HandshakeOutcome
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let body = match read_frame(reader).await {
        Ok(body) => body,
        Err(err) => {
            debug!(%err, "protocol violation while reading startup packet");
            return HandshakeOutcome::Violation;
        }
    };

    let message = match parse_startup_message(&body, true) {
        Ok(message) => message,
        Err(err) => {
            debug!(%err, "protocol violation while parsing startup packet");
            let _ = write_rejection(writer, rejection_category_for(&err)).await;
            return HandshakeOutcome::Violation;
        }
    };

    let message = match message {
        StartupMessage::Cancel(request) => return HandshakeOutcome::Cancel(request),
        StartupMessage::SecureNegotiate => {
            let available = secure_transport_available && !listener.is_local();
            let reply = if available { SecureNegotiateReply::Available } else { SecureNegotiateReply::Unavailable };
            if write_secure_negotiate_reply(writer, reply).await.is_err() {
                return HandshakeOutcome::Violation;
            }
            // Either way, the client sends a second startup message next:
            // a plain-text retry if unavailable, or the continuation of the
            // now-secured session if available. A nested SECURE_NEGOTIATE
            // in that second message is itself a protocol violation.
            let body = match read_frame(reader).await {
                Ok(body) => body,
                Err(_) => return HandshakeOutcome::Violation,
            };
            match parse_startup_message(&body, false) {
                Ok(message) => message,
                Err(err) => {
                    let _ = write_rejection(writer, rejection_category_for(&err)).await;
                    return HandshakeOutcome::Violation;
                }
            }
        }
        version_message @ StartupMessage::Version { .. } => version_message,
    };

    let StartupMessage::Version { version, fields } = message else {
        return HandshakeOutcome::Violation;
    };

    let mut context = ConnectionContext::new(listener, version);
    context.user = fields.user;
    context.database = fields.database.or_else(|| context.user.clone());
    context.extra_options = fields.extra;

    let verdict = admit(state, live_worker_count(), limits);
    context.admission_verdict = Some(verdict);

    match verdict {
        AdmissionVerdict::Ok => HandshakeOutcome::Admitted(context),
        AdmissionVerdict::Reject(category) => {
            let _ = write_rejection(writer, category).await;
            HandshakeOutcome::Rejected
        }
    }
}

/// Maps a parse-time protocol violation to the client-visible category for
/// its best-effort reply (§7 "ProtocolViolation ... best-effort one-shot
/// reply"). Framing-level errors (truncated/oversized/malformed messages)
/// get the generic category: the client is already assumed unreliable at
/// that point, but the reply is still attempted.
fn rejection_category_for(err: &ProtocolError) -> RejectionCategory {
    match err {
        ProtocolError::UnsupportedVersion { .. } => RejectionCategory::UnsupportedProtocol,
        ProtocolError::MissingUser => RejectionCategory::BadUser,
        _ => RejectionCategory::Internal,
    }
}

#[cfg(test)]
#[path = "handshake_tests.rs"]
mod tests;
