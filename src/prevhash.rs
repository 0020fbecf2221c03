use super::*;

/// Previous block hash in stratum form: every 4-byte word of the internal
/// byte order written big-endian.
#[derive(Debug, PartialEq, Eq, Clone, Copy, DeserializeFromStr, SerializeDisplay)]
pub struct PrevHash(BlockHash);

impl FromStr for PrevHash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words = <[u8; 32]>::from_hex(s)?;

        let mut internal = [0u8; 32];
        for (src, dst) in words.chunks_exact(4).zip(internal.chunks_exact_mut(4)) {
            LittleEndian::write_u32(dst, BigEndian::read_u32(src));
        }

        Ok(Self(BlockHash::from_byte_array(internal)))
    }
}

impl Display for PrevHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut words = [0u8; 32];
        for (src, dst) in self
            .0
            .as_byte_array()
            .chunks_exact(4)
            .zip(words.chunks_exact_mut(4))
        {
            BigEndian::write_u32(dst, LittleEndian::read_u32(src));
        }

        write!(f, "{}", hex::encode(words))
    }
}

impl From<BlockHash> for PrevHash {
    fn from(hash: BlockHash) -> Self {
        Self(hash)
    }
}

impl From<PrevHash> for BlockHash {
    fn from(prev_hash: PrevHash) -> Self {
        prev_hash.0
    }
}
