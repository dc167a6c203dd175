//! JSON payload codec
//!
//! Payloads are opaque bytes to the runtime. Typed helpers on contexts and
//! references encode with serde_json.

use crate::constants::PAYLOAD_SIZE_BYTES_MAX;
use crate::error::{Error, Result};
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

/// Encode a message into a payload
pub fn encode<T: Serialize>(message: &T) -> Result<Bytes> {
    let bytes = serde_json::to_vec(message).map_err(|e| Error::SerializationFailed {
        reason: e.to_string(),
    })?;
    check_payload_size(bytes.len())?;
    Ok(Bytes::from(bytes))
}

/// Decode a payload into a message
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    serde_json::from_slice(payload).map_err(|e| Error::DeserializationFailed {
        reason: e.to_string(),
    })
}

/// Reject payloads over the size limit
pub fn check_payload_size(size: usize) -> Result<()> {
    if size > PAYLOAD_SIZE_BYTES_MAX {
        return Err(Error::PayloadTooLarge {
            size,
            limit: PAYLOAD_SIZE_BYTES_MAX,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Ping {
        seq: u32,
    }

    #[test]
    fn test_decode_garbage() {
        let result: Result<Ping> = decode(b"not json");
        assert!(matches!(result, Err(Error::DeserializationFailed { .. })));
    }

    #[test]
    fn test_encode_too_large() {
        let big = "x".repeat(PAYLOAD_SIZE_BYTES_MAX);
        assert!(matches!(
            encode(&big),
            Err(Error::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_encode_decode() {
        let payload = encode(&Ping { seq: 3 }).unwrap();
        assert_eq!(decode::<Ping>(&payload).unwrap(), Ping { seq: 3 });
    }
}
