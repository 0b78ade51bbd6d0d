use pnet::util::MacAddr;
use serde::{Deserialize, Deserializer};

use crate::error::ModelError;

/// Parses a colon separated MAC address. Hex digits may be of either case.
pub fn parse(text: &str) -> Result<MacAddr, ModelError> {
    text.trim()
        .parse::<MacAddr>()
        .map_err(|_| ModelError::InvalidMac(text.to_string()))
}

/// `serde(deserialize_with)` adapter for MAC fields in topology files.
pub fn deserialize<'de, D>(deserializer: D) -> Result<MacAddr, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse(&text).map_err(serde::de::Error::custom)
}
