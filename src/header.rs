use super::*;

/// Wire size of a header on chains with a 32-bit nonce.
pub const BITCOIN_HEADER_SIZE: usize = 80;

/// Wire size reserved for an Equihash header: 140 fixed bytes, a 3-byte
/// compact size and a 1344-byte solution (n=200, k=9) make 1487, rounded up
/// to 1488 for alignment.
pub const EQUIHASH_HEADER_SIZE: usize = 1488;

/// Bytes of an Equihash header before the solution.
const EQUIHASH_FIXED_SIZE: usize = 140;

/// A block header kept in its exact wire layout inside a fixed-size,
/// zero-initialized buffer. The size is a property of the type, so components
/// exchanging records must agree on the chain out of band (see
/// [`Chain::check_header_record`]).
pub trait HeaderRecord: Sized {
    const SIZE: usize;

    type Header;

    fn as_bytes(&self) -> &[u8];

    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError>;

    fn set(&mut self, header: &Self::Header) -> Result<(), CodecError>;

    fn get(&self) -> Result<Self::Header, CodecError>;
}

fn copy_record<const N: usize>(bytes: &[u8]) -> Result<[u8; N], CodecError> {
    ensure!(bytes.len() == N, MalformedBufferSnafu { len: bytes.len() });
    let mut buf = [0u8; N];
    buf.copy_from_slice(bytes);
    Ok(buf)
}

fn serialize_record<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&hex::encode(bytes))
}

fn deserialize_record<'de, D, H>(de: D) -> Result<H, D::Error>
where
    D: Deserializer<'de>,
    H: HeaderRecord,
{
    let s = String::deserialize(de)?;
    let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
    H::from_bytes(&bytes).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct BitcoinHeaderData([u8; BITCOIN_HEADER_SIZE]);

const _: () = assert!(std::mem::size_of::<BitcoinHeaderData>() == BITCOIN_HEADER_SIZE);

impl Default for BitcoinHeaderData {
    fn default() -> Self {
        Self([0; BITCOIN_HEADER_SIZE])
    }
}

impl HeaderRecord for BitcoinHeaderData {
    const SIZE: usize = BITCOIN_HEADER_SIZE;

    type Header = Header;

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(Self(copy_record(bytes)?))
    }

    fn set(&mut self, header: &Header) -> Result<(), CodecError> {
        let bytes = consensus::serialize(header);

        ensure!(
            bytes.len() == Self::SIZE,
            SerializationFailureSnafu {
                message: format!("header serialized to {} bytes", bytes.len()),
            }
        );

        self.0.copy_from_slice(&bytes);
        Ok(())
    }

    fn get(&self) -> Result<Header, CodecError> {
        consensus::deserialize(&self.0).map_err(|err| CodecError::HeaderParseFailure {
            message: err.to_string(),
        })
    }
}

impl From<&Header> for BitcoinHeaderData {
    fn from(header: &Header) -> Self {
        let mut data = Self::default();
        data.0.copy_from_slice(&consensus::serialize(header));
        data
    }
}

impl Serialize for BitcoinHeaderData {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        serialize_record(self.as_bytes(), ser)
    }
}

impl<'de> Deserialize<'de> for BitcoinHeaderData {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        deserialize_record(de)
    }
}

/// Header of an Equihash chain: a 256-bit nonce and a variable-length
/// solution follow the usual fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquihashHeader {
    pub version: i32,
    pub prev_blockhash: BlockHash,
    pub merkle_root: TxMerkleNode,
    pub final_sapling_root: [u8; 32],
    pub time: u32,
    pub bits: CompactTarget,
    pub nonce: [u8; 32],
    pub solution: Vec<u8>,
}

impl EquihashHeader {
    fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(EQUIHASH_HEADER_SIZE);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(self.prev_blockhash.as_byte_array());
        buf.extend_from_slice(self.merkle_root.as_byte_array());
        buf.extend_from_slice(&self.final_sapling_root);
        buf.extend_from_slice(&self.time.to_le_bytes());
        buf.extend_from_slice(&self.bits.to_consensus().to_le_bytes());
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&consensus::serialize(&VarInt(self.solution.len() as u64)));
        buf.extend_from_slice(&self.solution);
        buf
    }

    fn parse(buf: &[u8]) -> Result<Self, CodecError> {
        let fail = |message: String| CodecError::HeaderParseFailure { message };

        if buf.len() < EQUIHASH_FIXED_SIZE {
            return Err(fail(format!("{} bytes is too short", buf.len())));
        }

        let hash = |range: std::ops::Range<usize>| {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&buf[range]);
            bytes
        };

        let (len, consumed) = consensus::deserialize_partial::<VarInt>(&buf[EQUIHASH_FIXED_SIZE..])
            .map_err(|err| fail(format!("invalid solution length: {err}")))?;

        let start = EQUIHASH_FIXED_SIZE + consumed;
        let len = usize::try_from(len.0)
            .ok()
            .filter(|len| *len > 0 && *len <= buf.len() - start)
            .ok_or_else(|| fail(format!("invalid solution length {}", len.0)))?;

        Ok(Self {
            version: LittleEndian::read_i32(&buf[0..4]),
            prev_blockhash: BlockHash::from_byte_array(hash(4..36)),
            merkle_root: TxMerkleNode::from_byte_array(hash(36..68)),
            final_sapling_root: hash(68..100),
            time: LittleEndian::read_u32(&buf[100..104]),
            bits: CompactTarget::from_consensus(LittleEndian::read_u32(&buf[104..108])),
            nonce: hash(108..140),
            solution: buf[start..start + len].to_vec(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct EquihashHeaderData([u8; EQUIHASH_HEADER_SIZE]);

const _: () = assert!(std::mem::size_of::<EquihashHeaderData>() == EQUIHASH_HEADER_SIZE);

impl Default for EquihashHeaderData {
    fn default() -> Self {
        Self([0; EQUIHASH_HEADER_SIZE])
    }
}

impl HeaderRecord for EquihashHeaderData {
    const SIZE: usize = EQUIHASH_HEADER_SIZE;

    type Header = EquihashHeader;

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(Self(copy_record(bytes)?))
    }

    /// Bytes past the end of the solution are zeroed.
    fn set(&mut self, header: &EquihashHeader) -> Result<(), CodecError> {
        let bytes = header.serialize();

        ensure!(
            bytes.len() <= Self::SIZE,
            SerializationFailureSnafu {
                message: format!(
                    "header is {} bytes, record holds {}",
                    bytes.len(),
                    Self::SIZE
                ),
            }
        );

        self.0 = [0; EQUIHASH_HEADER_SIZE];
        self.0[..bytes.len()].copy_from_slice(&bytes);
        Ok(())
    }

    fn get(&self) -> Result<EquihashHeader, CodecError> {
        EquihashHeader::parse(&self.0)
    }
}

impl Serialize for EquihashHeaderData {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        serialize_record(self.as_bytes(), ser)
    }
}

impl<'de> Deserialize<'de> for EquihashHeaderData {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        deserialize_record(de)
    }
}
