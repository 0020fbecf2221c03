//! Hex string forms used by the template, auxiliary work and job JSON.

use super::*;

pub(crate) mod compact {
    use super::*;

    pub(crate) fn serialize<S: Serializer>(bits: &CompactTarget, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&format!("{:08x}", bits.to_consensus()))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<CompactTarget, D::Error> {
        let s = String::deserialize(de)?;
        CompactTarget::from_unprefixed_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Targets as 64 big-endian hex digits.
pub(crate) mod target {
    use super::*;

    pub(crate) fn serialize<S: Serializer>(target: &Target, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&hex::encode(target.to_be_bytes()))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Target, D::Error> {
        let s = String::deserialize(de)?;
        parse(&s).map_err(serde::de::Error::custom)
    }

    /// Accepts an optional `0x` prefix and fewer than 64 digits.
    pub(crate) fn parse(s: &str) -> Result<Target, hex::FromHexError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let padded = format!("{s:0>64}");
        Ok(Target::from_be_bytes(<[u8; 32]>::from_hex(&padded)?))
    }
}
