use {super::*, legacy::{ShareBytesV1, ShareBytesV2}, record::ShareRecord};

pub use status::StratumStatus;

mod legacy;
mod record;
mod status;

/// Version tag of the generation-2 fixed layout.
pub const BYTES_VERSION: u32 = 0x0001_0003;
/// Version tag of the tagged-field encoding. Every decoded share carries it.
pub const CURRENT_VERSION: u32 = 0x0001_0004;

/// Bytes of the little-endian length or version prefix.
const PREFIX_SIZE: usize = 4;

/// Difficulty of a compact target, relative to the difficulty-1 target.
/// Zero bits decode to a zero target and yield 0.0.
pub fn bits_to_difficulty(bits: u32) -> f64 {
    let target = Target::from_compact(CompactTarget::from_consensus(bits));

    if target == Target::ZERO {
        return 0.0;
    }

    target.difficulty_float()
}

/// One proof-of-work submission and its evaluation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub version: u32,
    pub worker_hash_id: i64,
    pub user_id: i32,
    pub status: StratumStatus,
    pub timestamp: i64,
    pub ip: String,
    pub job_id: u64,
    pub share_diff: u64,
    pub blk_bits: u32,
    pub height: u32,
    pub nonce: u32,
    pub session_id: u32,
    pub version_mask: u32,
}

impl Default for Share {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            worker_hash_id: 0,
            user_id: 0,
            status: StratumStatus::REJECT_NO_REASON,
            timestamp: 0,
            ip: Ipv4Addr::UNSPECIFIED.to_string(),
            job_id: 0,
            share_diff: 0,
            blk_bits: 0,
            height: 0,
            nonce: 0,
            session_id: 0,
            version_mask: 0,
        }
    }
}

impl Share {
    /// Fraction of a block this share is worth, in `[0.0, 1.0]`.
    pub fn score(&self) -> f64 {
        if self.share_diff == 0 || self.blk_bits == 0 {
            return 0.0;
        }

        let network_difficulty = bits_to_difficulty(self.blk_bits);

        if network_difficulty < self.share_diff as f64 {
            return 1.0;
        }

        self.share_diff as f64 / network_difficulty
    }

    /// Checks the version tag and that every identifying field is set. A
    /// share can decode fine and still fail here.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.version != CURRENT_VERSION {
            debug!("share version {:#010x}", self.version);
            return IncompleteFieldsSnafu {
                fields: format!("version {:#010x}", self.version),
            }
            .fail();
        }

        let missing = [
            ("jobId", self.job_id == 0),
            ("userId", self.user_id == 0),
            ("workerHashId", self.worker_hash_id == 0),
            ("height", self.height == 0),
            ("blkBits", self.blk_bits == 0),
            ("shareDiff", self.share_diff == 0),
        ]
        .into_iter()
        .filter_map(|(name, zero)| zero.then_some(name))
        .collect::<Vec<&str>>();

        if !missing.is_empty() {
            debug!("share missing fields: {}", missing.join(", "));
            return IncompleteFieldsSnafu {
                fields: missing.join(", "),
            }
            .fail();
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Decodes any of the three share generations.
    ///
    /// The leading four bytes select the path: the current version tag means a
    /// tagged-field payload follows, the bytes-version tag plus an exact
    /// generation-2 length means a checksummed fixed record, and an exact
    /// generation-1 length means the untagged 48-byte record. Generation-1
    /// carries no height, so the chain's legacy height stands in for it.
    pub fn decode(buf: &[u8], chain: Chain) -> Result<Self, CodecError> {
        ensure!(!buf.is_empty(), MalformedBufferSnafu { len: 0usize });

        let mut tag_bytes = [0u8; PREFIX_SIZE];
        let n = buf.len().min(PREFIX_SIZE);
        tag_bytes[..n].copy_from_slice(&buf[..n]);
        let tag = LittleEndian::read_u32(&tag_bytes);

        let mut share = if tag == CURRENT_VERSION && buf.len() >= PREFIX_SIZE {
            let record = ShareRecord::decode(&buf[PREFIX_SIZE..]).map_err(|source| {
                debug!("share payload decode failed: {source}");
                CodecError::SchemaDecodeFailure { source }
            })?;
            record.into_share()?
        } else if tag == BYTES_VERSION && buf.len() == ShareBytesV2::SIZE {
            let bytes = ShareBytesV2::parse(buf)?;
            let computed = bytes.checksum();

            if computed != bytes.check_sum {
                debug!(
                    "share checksum mismatch: stored {:#010x}, computed {computed:#010x}",
                    bytes.check_sum
                );
                return ChecksumMismatchSnafu {
                    stored: bytes.check_sum,
                    computed,
                }
                .fail();
            }

            bytes.into_share()
        } else if buf.len() == ShareBytesV1::SIZE {
            ShareBytesV1::parse(buf)?.into_share(chain)
        } else {
            debug!("unknown share received: tag {tag:#010x}, {} bytes", buf.len());
            return UnrecognizedEncodingSnafu {
                tag,
                len: buf.len(),
            }
            .fail();
        };

        share.version = CURRENT_VERSION;

        Ok(share)
    }

    /// Size of the bare tagged-field payload.
    pub fn encoded_len(&self) -> usize {
        ShareRecord::from(self).encoded_len()
    }

    /// Bare tagged-field payload. Its length is the length of the buffer.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let record = ShareRecord::from(self);
        let mut buf = Vec::with_capacity(record.encoded_len());
        Self::write_record(&record, &mut buf)?;
        Ok(buf)
    }

    /// Little-endian current version tag followed by the tagged-field
    /// payload. This is the form [`Share::decode`] expects.
    pub fn encode_with_version(&self) -> Result<Vec<u8>, CodecError> {
        let record = ShareRecord::from(self);
        let mut buf = Vec::with_capacity(PREFIX_SIZE + record.encoded_len());
        buf.extend_from_slice(&CURRENT_VERSION.to_le_bytes());
        Self::write_record(&record, &mut buf)?;
        Ok(buf)
    }

    /// Little-endian payload length followed by the tagged-field payload.
    pub fn encode_with_length(&self) -> Result<Vec<u8>, CodecError> {
        let record = ShareRecord::from(self);
        let len = record.encoded_len();
        let prefix = u32::try_from(len).map_err(|_| CodecError::SerializationFailure {
            message: format!("share payload of {len} bytes exceeds length prefix"),
        })?;

        let mut buf = Vec::with_capacity(PREFIX_SIZE + len);
        buf.extend_from_slice(&prefix.to_le_bytes());
        Self::write_record(&record, &mut buf)?;
        Ok(buf)
    }

    fn write_record(record: &ShareRecord, buf: &mut Vec<u8>) -> Result<(), CodecError> {
        record.encode(buf).map_err(|err| {
            debug!("share serialization failed: {err}");
            CodecError::SerializationFailure {
                message: err.to_string(),
            }
        })
    }
}

impl Display for Share {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let date = chrono::DateTime::from_timestamp(self.timestamp, 0)
            .map(|date| date.format("%F %T").to_string())
            .unwrap_or_default();

        write!(
            f,
            "share(jobId: {}, ip: {}, userId: {}, workerId: {}, time: {}/{}, height: {}, \
             blkBits: {:08x}/{}, shareDiff: {}, nonce: {:08x}, sessionId: {:08x}, \
             versionMask: {:08x}, status: {}/{})",
            self.job_id,
            self.ip,
            self.user_id,
            self.worker_hash_id,
            self.timestamp,
            date,
            self.height,
            self.blk_bits,
            bits_to_difficulty(self.blk_bits),
            self.share_diff,
            self.nonce,
            self.session_id,
            self.version_mask,
            self.status.code(),
            self.status,
        )
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq as pretty_assert_eq};

    fn share() -> Share {
        Share {
            version: CURRENT_VERSION,
            worker_hash_id: -4_120_586_110_213_377_393,
            user_id: 1043,
            status: StratumStatus::ACCEPT,
            timestamp: 1_574_000_000,
            ip: "203.0.113.7".into(),
            job_id: 6_762_291_404_816_105_473,
            share_diff: 16384,
            blk_bits: 0x1715_a35c,
            height: 603_000,
            nonce: 0xdead_beef,
            session_id: 0x0100_0002,
            version_mask: 0x1fff_e000,
        }
    }

    fn v1(result: i32) -> [u8; 48] {
        let mut buf = [0u8; 48];
        LittleEndian::write_i32(&mut buf[40..44], result);
        buf
    }

    #[test]
    fn default_share() {
        let share = Share::default();
        assert_eq!(share.version, CURRENT_VERSION);
        assert_eq!(share.ip, "0.0.0.0");
        assert_eq!(share.status, StratumStatus::REJECT_NO_REASON);
        assert_eq!(share.score(), 0.0);
        assert!(!share.is_valid());
    }

    #[test]
    fn score_is_zero_without_diff_or_bits() {
        let mut share = share();
        share.share_diff = 0;
        assert_eq!(share.score(), 0.0);

        let mut share = self::share();
        share.blk_bits = 0;
        assert_eq!(share.score(), 0.0);
    }

    #[test]
    fn score_clamps_to_one() {
        let mut share = share();
        share.blk_bits = 0x1d00ffff;
        share.share_diff = 2;
        assert_eq!(share.score(), 1.0);
    }

    #[test]
    fn score_is_ratio_of_network_difficulty() {
        let mut share = share();
        share.blk_bits = 0x1b0404cb;
        share.share_diff = 1000;

        let expected = 1000.0 / bits_to_difficulty(0x1b0404cb);
        assert_eq!(share.score(), expected);
        assert!(share.score() > 0.06 && share.score() < 0.07);
    }

    #[test]
    fn score_at_network_difficulty() {
        let mut share = share();
        share.blk_bits = 0x1d00ffff;
        share.share_diff = 1;
        assert!((share.score() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn difficulty_of_genesis_bits() {
        assert!((bits_to_difficulty(0x1d00ffff) - 1.0).abs() < 1e-12);
        assert_eq!(bits_to_difficulty(0), 0.0);
        assert!((bits_to_difficulty(0x1b0404cb) - 16307.420938523983).abs() < 1e-6);
    }

    #[test]
    fn validity_requires_every_identifier() {
        assert!(share().is_valid());

        let cases: [fn(&mut Share); 6] = [
            |s| s.job_id = 0,
            |s| s.user_id = 0,
            |s| s.worker_hash_id = 0,
            |s| s.height = 0,
            |s| s.blk_bits = 0,
            |s| s.share_diff = 0,
        ];

        for clear in cases {
            let mut share = share();
            clear(&mut share);
            assert!(!share.is_valid());
        }
    }

    #[test]
    fn validity_requires_current_version() {
        let mut share = share();
        share.version = BYTES_VERSION;
        assert!(matches!(
            share.validate(),
            Err(CodecError::IncompleteFields { .. })
        ));
    }

    #[test]
    fn validate_names_missing_fields() {
        let mut share = share();
        share.height = 0;
        share.share_diff = 0;

        assert_eq!(
            share.validate().unwrap_err().to_string(),
            "Share is missing required fields: height, shareDiff"
        );
    }

    #[test]
    fn version_prefixed_round_trip() {
        let share = share();
        let buf = share.encode_with_version().unwrap();
        assert_eq!(&buf[..4], &CURRENT_VERSION.to_le_bytes());
        pretty_assert_eq!(Share::decode(&buf, Chain::Bitcoin).unwrap(), share);
    }

    #[test]
    fn length_prefixed_encoding() {
        let share = share();
        let buf = share.encode_with_length().unwrap();
        let len = LittleEndian::read_u32(&buf[..4]) as usize;
        assert_eq!(len, share.encoded_len());
        assert_eq!(&buf[4..], share.encode().unwrap().as_slice());
    }

    #[test]
    fn bare_encoding_length() {
        let share = share();
        assert_eq!(share.encode().unwrap().len(), share.encoded_len());
    }

    #[test]
    fn empty_buffer_is_malformed() {
        assert!(matches!(
            Share::decode(&[], Chain::Bitcoin),
            Err(CodecError::MalformedBuffer { len: 0 })
        ));
    }

    #[test]
    fn short_buffer_is_unrecognized() {
        assert!(matches!(
            Share::decode(&[0x04, 0x00], Chain::Bitcoin),
            Err(CodecError::UnrecognizedEncoding { len: 2, .. })
        ));
    }

    #[test]
    fn unknown_tag_is_unrecognized() {
        let mut buf = share().encode_with_version().unwrap();
        buf[0] ^= 0xff;
        assert!(matches!(
            Share::decode(&buf, Chain::Bitcoin),
            Err(CodecError::UnrecognizedEncoding { .. })
        ));
    }

    #[test]
    fn corrupt_payload_does_not_fall_back() {
        let mut buf = CURRENT_VERSION.to_le_bytes().to_vec();
        buf.resize(48, 0xff);
        assert!(matches!(
            Share::decode(&buf, Chain::Bitcoin),
            Err(CodecError::SchemaDecodeFailure { .. })
        ));
    }

    #[test]
    fn payload_missing_fields_is_incomplete() {
        let mut buf = CURRENT_VERSION.to_le_bytes().to_vec();
        // field 1 (version), varint 4
        buf.extend_from_slice(&[0x08, 0x04]);
        assert!(matches!(
            Share::decode(&buf, Chain::Bitcoin),
            Err(CodecError::IncompleteFields { .. })
        ));
    }

    #[test]
    fn v1_accept() {
        let share = Share::decode(&v1(1), Chain::Bitcoin).unwrap();
        assert_eq!(share.status, StratumStatus::ACCEPT);
        assert_eq!(share.version, CURRENT_VERSION);
        assert_eq!(share.height, 570_000);
        assert_eq!(share.ip, "0.0.0.0");
        assert_eq!(share.job_id, 0);
        assert_eq!(share.user_id, 0);
        assert_eq!(share.worker_hash_id, 0);
        assert_eq!(share.blk_bits, 0);
        assert_eq!(share.share_diff, 0);
        assert!(!share.is_valid());
    }

    #[test]
    fn v1_reject() {
        let share = Share::decode(&v1(0), Chain::UnitedBitcoin).unwrap();
        assert_eq!(share.status, StratumStatus::REJECT_NO_REASON);
        assert_eq!(share.height, 758_000);

        let share = Share::decode(&v1(7), Chain::Bitcoin).unwrap();
        assert_eq!(share.status, StratumStatus::REJECT_NO_REASON);
    }

    #[test]
    fn display_includes_status_name() {
        let display = share().to_string();
        assert!(display.contains("height: 603000"), "{display}");
        assert!(display.contains("status: 1798084231/Share accepted"), "{display}");
        assert!(display.contains("2019-11-17"), "{display}");
    }
}
