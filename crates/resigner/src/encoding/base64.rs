use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::StageEncoder;

/// Standard alphabet, `=` padded, no line wrapping.
pub struct Base64Encoder;

impl StageEncoder for Base64Encoder {
    fn encode(&self, raw: &[u8]) -> Vec<u8> {
        STANDARD.encode(raw).into_bytes()
    }

    fn name(&self) -> &str {
        "base64"
    }
}
