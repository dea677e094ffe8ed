//! Asset payload extraction and codec.
//!
//! Payloads ride in a single `OP_RETURN <push>` output. The push may use a
//! direct length opcode or `OP_PUSHDATA1/2/4`; anything after the push is
//! ignored. Events are bincode-encoded with the standard configuration.

use crate::constants::{MAX_DIRECT_PUSH, OP_PUSHDATA1, OP_PUSHDATA2, OP_PUSHDATA4, OP_RETURN};
use crate::error::DecodeError;
use crate::traits::PayloadCodec;
use crate::types::{AllocationEvent, AssetEvent};

/// Return the data pushed by an `OP_RETURN` script, or `None` if the script
/// is not a data carrier or the push is empty or truncated.
pub fn extract_op_return(script: &[u8]) -> Option<&[u8]> {
    let (&first, rest) = script.split_first()?;
    if first != OP_RETURN {
        return None;
    }
    let (&opcode, rest) = rest.split_first()?;
    let (len, rest) = match opcode {
        1..=0x4b => (opcode as usize, rest),
        OP_PUSHDATA1 => {
            let (&n, rest) = rest.split_first()?;
            (n as usize, rest)
        }
        OP_PUSHDATA2 => {
            let bytes: [u8; 2] = rest.get(..2)?.try_into().ok()?;
            (u16::from_le_bytes(bytes) as usize, &rest[2..])
        }
        OP_PUSHDATA4 => {
            let bytes: [u8; 4] = rest.get(..4)?.try_into().ok()?;
            (u32::from_le_bytes(bytes) as usize, &rest[4..])
        }
        _ => return None,
    };
    let data = rest.get(..len)?;
    (!data.is_empty()).then_some(data)
}

/// Build an `OP_RETURN` script carrying `data` with the minimal push opcode.
pub fn op_return_script(data: &[u8]) -> Vec<u8> {
    let mut script = Vec::with_capacity(data.len() + 6);
    script.push(OP_RETURN);
    let len = data.len();
    if len <= MAX_DIRECT_PUSH {
        script.push(len as u8);
    } else if len <= u8::MAX as usize {
        script.push(OP_PUSHDATA1);
        script.push(len as u8);
    } else if len <= u16::MAX as usize {
        script.push(OP_PUSHDATA2);
        script.extend_from_slice(&(len as u16).to_le_bytes());
    } else {
        script.push(OP_PUSHDATA4);
        script.extend_from_slice(&(len as u32).to_le_bytes());
    }
    script.extend_from_slice(data);
    script
}

fn decode_exact<T: bincode::Decode<()>>(payload: &[u8]) -> Result<T, DecodeError> {
    if payload.is_empty() {
        return Err(DecodeError::Empty);
    }
    let (value, consumed): (T, usize) =
        bincode::decode_from_slice(payload, bincode::config::standard())
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
    if consumed != payload.len() {
        return Err(DecodeError::TrailingBytes { consumed, len: payload.len() });
    }
    Ok(value)
}

/// Encode an asset event payload.
pub fn encode_asset(event: &AssetEvent) -> Vec<u8> {
    // Encoding into a Vec only fails for types with fallible Encode impls.
    bincode::encode_to_vec(event, bincode::config::standard()).unwrap_or_default()
}

/// Encode an allocation event payload.
pub fn encode_allocation(event: &AllocationEvent) -> Vec<u8> {
    bincode::encode_to_vec(event, bincode::config::standard()).unwrap_or_default()
}

/// Payload codec for `OP_RETURN`-carried, bincode-encoded events.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodePayloadCodec;

impl PayloadCodec for BincodePayloadCodec {
    fn extract_payload<'a>(&self, script: &'a [u8]) -> Option<&'a [u8]> {
        extract_op_return(script)
    }

    fn decode_asset(&self, payload: &[u8]) -> Result<AssetEvent, DecodeError> {
        decode_exact(payload)
    }

    fn decode_allocation(&self, payload: &[u8]) -> Result<AllocationEvent, DecodeError> {
        decode_exact(payload)
    }
}
