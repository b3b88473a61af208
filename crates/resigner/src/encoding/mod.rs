mod raw;
mod hex;
mod base64;

use std::fmt;
use std::str::FromStr;

use crate::error::ResignError;

pub use raw::RawEncoder;
pub use self::hex::HexEncoder;
pub use self::base64::Base64Encoder;

/// Trait for turning the raw output of one digest stage into the bytes
/// handed to the next stage (or written out as the signature).
pub trait StageEncoder: Send + Sync {
    /// Encode raw digest bytes.
    fn encode(&self, raw: &[u8]) -> Vec<u8>;

    /// Encoding name as written in directives (e.g. "hex").
    fn name(&self) -> &str;
}

/// Output encoding of a single algorithm stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputEncoding {
    #[default]
    None,
    /// Uppercase hex.
    Hex,
    HexLower,
    Base64,
}

static RAW: RawEncoder = RawEncoder;
static HEX: HexEncoder = HexEncoder::upper();
static HEX_LOWER: HexEncoder = HexEncoder::lower();
static BASE64: Base64Encoder = Base64Encoder;

impl OutputEncoding {
    pub fn encoder(&self) -> &'static dyn StageEncoder {
        match self {
            OutputEncoding::None => &RAW,
            OutputEncoding::Hex => &HEX,
            OutputEncoding::HexLower => &HEX_LOWER,
            OutputEncoding::Base64 => &BASE64,
        }
    }

    pub fn encode(&self, raw: &[u8]) -> Vec<u8> {
        self.encoder().encode(raw)
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputEncoding::None => "none",
            OutputEncoding::Hex => "hex",
            OutputEncoding::HexLower => "hexlower",
            OutputEncoding::Base64 => "base64",
        }
    }
}

impl FromStr for OutputEncoding {
    type Err = ResignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(OutputEncoding::None),
            "hex" => Ok(OutputEncoding::Hex),
            "hexlower" => Ok(OutputEncoding::HexLower),
            "base64" => Ok(OutputEncoding::Base64),
            other => Err(ResignError::ConfigInvalid(format!(
                "unknown output encoding {other:?} (expected none, hex, hexlower or base64)"
            ))),
        }
    }
}

impl fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
