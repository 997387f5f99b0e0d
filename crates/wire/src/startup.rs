//! Startup packet discriminator dispatch and body parsing (§4.2, §6).

use crate::error::ProtocolError;
use keeper_core::{CancelRequest, CancelSecret, ConnectionOption, ProtocolVersion, WorkerId};

/// The discriminator value identifying a cancel request body.
pub const CANCEL_DISCRIMINATOR: u32 = 80_877_102;
/// The discriminator value identifying a secure-transport negotiation.
pub const SECURE_NEGOTIATE_DISCRIMINATOR: u32 = 80_877_103;

/// Earliest accepted `MAJOR.MINOR` frontend protocol version. Versions
/// below 3.0 are accepted but use the legacy fixed-width record (§4.2).
pub const EARLIEST_SUPPORTED: ProtocolVersion = ProtocolVersion::new(2, 0);
/// Latest accepted `MAJOR.MINOR` frontend protocol version.
pub const LATEST_SUPPORTED: ProtocolVersion = ProtocolVersion::new(3, 2);

/// Fixed-width field length for the legacy (pre-3.0) startup record,
/// matching this family's historical system identifier limit.
pub const LEGACY_NAME_LIMIT: usize = 64;

/// The parsed meaning of a startup message's first four bytes and
/// whatever follows (§4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupMessage {
    Cancel(CancelRequest),
    SecureNegotiate,
    Version { version: ProtocolVersion, fields: ParsedFields },
}

/// The recognized and generic fields extracted from a version ≥ 3 startup
/// body, or synthesized from a legacy fixed-width record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFields {
    pub database: Option<String>,
    pub user: Option<String>,
    pub options: Option<String>,
    pub extra: Vec<ConnectionOption>,
}

/// Parses the discriminator and, for a version message, its body. Callers
/// are responsible for secure-transport recursion (§4.2: "If 'S' ... a
/// second SECURE_NEGOTIATE in the inner message is a protocol violation")
/// by passing `allow_secure_negotiate = false` on the recursive call.
pub fn parse_startup_message(body: &[u8], allow_secure_negotiate: bool) -> Result<StartupMessage, ProtocolError> {
    if body.len() < 4 {
        return Err(ProtocolError::TruncatedMessage);
    }
    let discriminator = u32::from_be_bytes([body[0], body[1], body[2], body[3]]);
    let rest = &body[4..];

    if discriminator == CANCEL_DISCRIMINATOR {
        return Ok(StartupMessage::Cancel(parse_cancel_body(rest)?));
    }
    if discriminator == SECURE_NEGOTIATE_DISCRIMINATOR {
        if !allow_secure_negotiate {
            return Err(ProtocolError::RepeatedSecureNegotiate);
        }
        return Ok(StartupMessage::SecureNegotiate);
    }

    let version = decode_version(discriminator);
    check_version_supported(version)?;

    let fields = if version.uses_name_value_pairs() {
        parse_name_value_pairs(rest)?
    } else {
        parse_legacy_record(rest)?
    };
    if fields.user.is_none() {
        return Err(ProtocolError::MissingUser);
    }
    Ok(StartupMessage::Version { version, fields })
}

fn parse_cancel_body(rest: &[u8]) -> Result<CancelRequest, ProtocolError> {
    if rest.len() < 8 {
        return Err(ProtocolError::TruncatedMessage);
    }
    let worker_id = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]);
    let cancel_secret = u32::from_be_bytes([rest[4], rest[5], rest[6], rest[7]]);
    Ok(CancelRequest { worker_id: WorkerId::new(worker_id), cancel_secret: CancelSecret::new(cancel_secret) })
}

fn decode_version(discriminator: u32) -> ProtocolVersion {
    ProtocolVersion::new((discriminator >> 16) as u16, (discriminator & 0xFFFF) as u16)
}

fn check_version_supported(version: ProtocolVersion) -> Result<(), ProtocolError> {
    let too_old = version.major < EARLIEST_SUPPORTED.major;
    let too_new = version.major > LATEST_SUPPORTED.major
        || (version.major == LATEST_SUPPORTED.major && version.minor > LATEST_SUPPORTED.minor);
    if too_old || too_new {
        return Err(ProtocolError::UnsupportedVersion { major: version.major, minor: version.minor });
    }
    Ok(())
}

/// Parses NUL-terminated name/value pairs terminated by an empty name
/// (§4.2). A missing terminator, or a terminator not exactly at the
/// declared end, is a protocol violation.
fn parse_name_value_pairs(rest: &[u8]) -> Result<ParsedFields, ProtocolError> {
    let mut fields = ParsedFields::default();
    let mut cursor = 0usize;
    loop {
        let (name, next) = read_cstr(rest, cursor)?;
        cursor = next;
        if name.is_empty() {
            if cursor != rest.len() {
                return Err(ProtocolError::TerminatorNotAtDeclaredEnd);
            }
            return Ok(fields);
        }
        let (value, next) = read_cstr(rest, cursor)?;
        cursor = next;
        match name.as_str() {
            "database" => fields.database = Some(value),
            "user" => fields.user = Some(value),
            "options" => fields.options = Some(value),
            _ => fields.extra.push(ConnectionOption { name, value }),
        }
        if cursor > rest.len() {
            return Err(ProtocolError::MissingTerminator);
        }
    }
}

fn read_cstr(bytes: &[u8], start: usize) -> Result<(String, usize), ProtocolError> {
    let remainder = bytes.get(start..).ok_or(ProtocolError::MissingTerminator)?;
    let nul_at = remainder.iter().position(|&b| b == 0).ok_or(ProtocolError::MissingTerminator)?;
    let text = std::str::from_utf8(&remainder[..nul_at]).map_err(|_| ProtocolError::InvalidUtf8)?;
    Ok((text.to_string(), start + nul_at + 1))
}

/// Legacy (pre-3.0) startup record: fixed-width `user` and `database`
/// fields, each truncated to [`LEGACY_NAME_LIMIT`] (§4.2).
fn parse_legacy_record(rest: &[u8]) -> Result<ParsedFields, ProtocolError> {
    let user = read_fixed_width_cstr(rest, 0)?;
    let database = read_fixed_width_cstr(rest, LEGACY_NAME_LIMIT)?;
    Ok(ParsedFields {
        database: non_empty(database),
        user: non_empty(user),
        options: None,
        extra: Vec::new(),
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn read_fixed_width_cstr(bytes: &[u8], offset: usize) -> Result<String, ProtocolError> {
    let field = bytes.get(offset..offset + LEGACY_NAME_LIMIT).ok_or(ProtocolError::TruncatedMessage)?;
    let nul_at = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    std::str::from_utf8(&field[..nul_at])
        .map(|s| s.to_string())
        .map_err(|_| ProtocolError::InvalidUtf8)
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
