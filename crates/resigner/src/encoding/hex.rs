use super::StageEncoder;

/// Two hex characters per byte.
pub struct HexEncoder {
    uppercase: bool,
}

impl HexEncoder {
    pub const fn lower() -> Self {
        Self { uppercase: false }
    }

    pub const fn upper() -> Self {
        Self { uppercase: true }
    }
}

impl StageEncoder for HexEncoder {
    fn encode(&self, raw: &[u8]) -> Vec<u8> {
        let encoded = if self.uppercase {
            hex::encode_upper(raw)
        } else {
            hex::encode(raw)
        };
        encoded.into_bytes()
    }

    fn name(&self) -> &str {
        if self.uppercase { "hex" } else { "hexlower" }
    }
}
