use serde::Serialize;
use thiserror::Error;

/// Failures turning a safe-text token back into bytes.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid safe-text token: {0}")]
    Token(#[from] base64::DecodeError),

    #[error("Corrupt or truncated compressed stream: {0}")]
    Inflate(std::io::Error),

    #[error("Inflated payload exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Scanning engine is not ready")]
    EngineUnavailable,

    #[error("Compression failed: {0}")]
    Compress(std::io::Error),

    #[error("Invalid fragment: {0}")]
    InvalidFragment(String),

    #[error("Content is {size} bytes, limit is {limit}")]
    ContentTooLarge { size: usize, limit: usize },

    #[error("Unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ShareError {
    /// True for failures that happen while turning a wire payload back into state.
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, ShareError::Decode(_) | ShareError::Parse(_))
    }
}

// Emitted as a plain string in JSON output
impl Serialize for ShareError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_display_string() {
        let err = ShareError::ContentTooLarge { size: 10, limit: 5 };
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Content is 10 bytes, limit is 5\"");
    }

    #[test]
    fn test_decode_failure_classification() {
        let parse = serde_json::from_str::<u8>("nope").unwrap_err();
        assert!(ShareError::Parse(parse).is_decode_failure());
        assert!(ShareError::Decode(DecodeError::TooLarge { limit: 1 }).is_decode_failure());
        assert!(!ShareError::EngineUnavailable.is_decode_failure());
    }
}
