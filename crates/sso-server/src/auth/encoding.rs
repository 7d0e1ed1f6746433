//! Opaque token encoding: URL-safe base64 without padding.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed token encoding: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded token is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

pub fn decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(URL_SAFE_NO_PAD.decode(input)?)
}

/// Decode a token that wraps a UTF-8 string (e.g. a signed JWT).
pub fn decode_string(input: &str) -> Result<String, DecodeError> {
    Ok(String::from_utf8(decode(input)?)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_arbitrary_bytes() {
        let data = [0u8, 255, 62, 63, 251, 10];
        assert_eq!(decode(&encode(data)).unwrap(), data);
    }

    #[test]
    fn output_is_url_safe_and_unpadded() {
        // 0xfb 0xff encodes to "+/" characters in the standard alphabet.
        let encoded = encode([0xfb, 0xff]);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.ends_with('='));
    }

    #[test]
    fn padded_input_is_rejected() {
        assert!(decode("QQ==").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode("not base64!").is_err());
        assert!(decode_string("////").is_err());
    }

    #[test]
    fn non_utf8_payload_is_rejected() {
        let encoded = encode([0xff, 0xfe]);
        assert!(matches!(decode_string(&encoded), Err(DecodeError::Utf8(_))));
    }
}
