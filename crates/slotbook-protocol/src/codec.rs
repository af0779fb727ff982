//! JSON body encoding for requests and responses.
//!
//! Bodies are plain JSON documents, bounded by [`MAX_MESSAGE_SIZE`].

use std::io::Read;

use serde::{Serialize, de::DeserializeOwned};

use crate::MAX_MESSAGE_SIZE;
use crate::error::{ProtocolError, ProtocolResult};

/// Encodes a message as compact JSON.
pub fn encode_message<T: Serialize>(message: &T) -> ProtocolResult<Vec<u8>> {
    let json = serde_json::to_vec(message)?;
    check_size(json.len())?;
    Ok(json)
}

/// Decodes a message from a complete JSON body.
pub fn decode_message<T: DeserializeOwned>(data: &[u8]) -> ProtocolResult<T> {
    check_size(data.len())?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(ProtocolError::EmptyMessage);
    }
    Ok(serde_json::from_slice(data)?)
}

/// Reads one JSON body from `reader` until EOF.
///
/// Stops reading one byte past the size limit so an oversized body is
/// rejected without being buffered in full.
pub fn read_message<T: DeserializeOwned, R: Read>(reader: R) -> ProtocolResult<T> {
    let mut data = Vec::new();
    reader
        .take(u64::from(MAX_MESSAGE_SIZE) + 1)
        .read_to_end(&mut data)?;
    decode_message(&data)
}

fn check_size(len: usize) -> ProtocolResult<()> {
    let max = MAX_MESSAGE_SIZE as usize;
    if len > max {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max,
        });
    }
    Ok(())
}
