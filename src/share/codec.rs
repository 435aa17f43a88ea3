//! Payload codec: JSON -> zlib (level 9) -> Base64.
//!
//! The output alphabet is `[A-Za-z0-9+/=]`. It never contains `&` or `#`,
//! and `=` only appears as trailing padding, which is what lets the fragment
//! wire format split on delimiters without any escaping.

use std::io::{self, Write};

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{DecodeError, Result, ShareError};

/// Upper bound on inflated payload size when no explicit limit is given.
pub const DEFAULT_MAX_INFLATED_BYTES: usize = 16 * 1024 * 1024;

const INFLATE_CHUNK: usize = 64 * 1024;

/// Standard alphabet; padding is written but optional on read, since
/// hand-truncated links often lose it.
const SAFE_TEXT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Characters a safe-text token may contain.
pub fn is_safe_text(token: &str) -> bool {
    token
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

/// Serialize `value` to JSON, deflate it at maximum compression and render
/// the result as a safe-text token.
pub fn compress<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value)?;

    let mut encoder = ZlibEncoder::new(Vec::with_capacity(json.len() / 2), Compression::best());
    encoder.write_all(&json).map_err(ShareError::Compress)?;
    let compressed = encoder.finish().map_err(ShareError::Compress)?;

    tracing::debug!(
        json_bytes = json.len(),
        compressed_bytes = compressed.len(),
        "Compressed share payload"
    );
    Ok(SAFE_TEXT.encode(compressed))
}

/// Inverse of [`compress`], bounded by [`DEFAULT_MAX_INFLATED_BYTES`].
pub fn decompress<T: DeserializeOwned>(token: &str) -> Result<T> {
    decompress_bounded(token, DEFAULT_MAX_INFLATED_BYTES)
}

/// Inverse of [`compress`], refusing payloads that inflate past `max_bytes`.
pub fn decompress_bounded<T: DeserializeOwned>(token: &str, max_bytes: usize) -> Result<T> {
    let bytes = inflate(token, max_bytes)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn inflate(token: &str, max_bytes: usize) -> std::result::Result<Vec<u8>, DecodeError> {
    let compressed = SAFE_TEXT.decode(token.trim())?;

    let mut inflater = Decompress::new(true);
    let mut inflated = Vec::with_capacity(compressed.len().saturating_mul(4).min(max_bytes + 1));
    loop {
        if inflated.len() > max_bytes {
            return Err(DecodeError::TooLarge { limit: max_bytes });
        }
        // Always leave room for one byte past the limit
        let room = (max_bytes + 1 - inflated.len()).min(INFLATE_CHUNK);
        inflated.reserve(room);

        let (before_in, before_out) = (inflater.total_in(), inflater.total_out());
        let status = inflater
            .decompress_vec(
                &compressed[before_in as usize..],
                &mut inflated,
                FlushDecompress::None,
            )
            .map_err(|e| DecodeError::Inflate(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        if status == Status::StreamEnd {
            break;
        }
        if inflater.total_in() == before_in && inflater.total_out() == before_out {
            return Err(DecodeError::Inflate(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "compressed stream ended early",
            )));
        }
    }

    if inflated.len() > max_bytes {
        return Err(DecodeError::TooLarge { limit: max_bytes });
    }
    Ok(inflated)
}
