use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, ArchiveResult};

/// How a finished archive is handed back to the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputEncoding {
    /// Raw archive bytes.
    #[default]
    Bytes,
    /// Standard base64 text.
    Base64,
    /// Lowercase hex text.
    Hex,
}

impl OutputEncoding {
    /// Every supported encoding, in declaration order.
    pub const ALL: [OutputEncoding; 3] = [Self::Bytes, Self::Base64, Self::Hex];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bytes => "bytes",
            Self::Base64 => "base64",
            Self::Hex => "hex",
        }
    }
}

impl fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputEncoding {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ArchiveError::UnsupportedEncoding(s.to_string()))
    }
}

/// A finished archive in its requested representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArchiveOutput {
    Bytes(Vec<u8>),
    Base64(String),
    Hex(String),
}

impl ArchiveOutput {
    /// Encode raw archive bytes.
    pub fn encode(bytes: Vec<u8>, encoding: OutputEncoding) -> Self {
        match encoding {
            OutputEncoding::Bytes => Self::Bytes(bytes),
            OutputEncoding::Base64 => Self::Base64(STANDARD.encode(&bytes)),
            OutputEncoding::Hex => Self::Hex(hex::encode(&bytes)),
        }
    }

    pub fn encoding(&self) -> OutputEncoding {
        match self {
            Self::Bytes(_) => OutputEncoding::Bytes,
            Self::Base64(_) => OutputEncoding::Base64,
            Self::Hex(_) => OutputEncoding::Hex,
        }
    }

    /// Recover the raw archive bytes.
    pub fn decode(&self) -> ArchiveResult<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::Base64(text) => STANDARD.decode(text).map_err(|e| ArchiveError::Decode {
                encoding: "base64".into(),
                reason: e.to_string(),
            }),
            Self::Hex(text) => hex::decode(text).map_err(|e| ArchiveError::Decode {
                encoding: "hex".into(),
                reason: e.to_string(),
            }),
        }
    }
}
