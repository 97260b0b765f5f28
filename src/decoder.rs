use crate::types::PlateCheckRequest;
use failure::Fail;

#[derive(Debug, Fail)]
#[fail(display = "Failed to parse plate check request: {}", _0)]
pub struct DecodeError(#[fail(cause)] serde_json::Error);

/// Parses one inbound frame body. Text and binary frames share this path.
pub fn decode(raw: &[u8]) -> Result<PlateCheckRequest, DecodeError> {
    serde_json::from_slice(raw).map_err(DecodeError)
}
