//! Fixed-layout share records from earlier producers. Both are decoded field
//! by field from declared offsets; neither is ever written.

use super::*;

/// Generation-1 record. No version tag, no checksum, no height; recognized
/// only by its exact length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShareBytesV1 {
    pub(crate) job_id: u64,
    pub(crate) worker_hash_id: i64,
    pub(crate) ip: Ipv4Addr,
    pub(crate) user_id: i32,
    pub(crate) share_diff: u64,
    pub(crate) timestamp: u32,
    pub(crate) blk_bits: u32,
    pub(crate) result: i32,
}

impl ShareBytesV1 {
    pub(crate) const SIZE: usize = 48;

    /// `result` value of an accepted share. Anything else, including the zero
    /// of an uninitialized record, is a rejection.
    pub(crate) const ACCEPT: i32 = 1;

    pub(crate) fn parse(buf: &[u8]) -> Result<Self, CodecError> {
        ensure!(buf.len() == Self::SIZE, MalformedBufferSnafu { len: buf.len() });

        Ok(Self {
            job_id: LittleEndian::read_u64(&buf[0..8]),
            worker_hash_id: LittleEndian::read_i64(&buf[8..16]),
            ip: Ipv4Addr::new(buf[16], buf[17], buf[18], buf[19]),
            user_id: LittleEndian::read_i32(&buf[20..24]),
            share_diff: LittleEndian::read_u64(&buf[24..32]),
            timestamp: LittleEndian::read_u32(&buf[32..36]),
            blk_bits: LittleEndian::read_u32(&buf[36..40]),
            result: LittleEndian::read_i32(&buf[40..44]),
            // 44..48 is alignment padding
        })
    }

    pub(crate) fn into_share(self, chain: Chain) -> Share {
        Share {
            version: CURRENT_VERSION,
            worker_hash_id: self.worker_hash_id,
            user_id: self.user_id,
            status: if self.result == Self::ACCEPT {
                StratumStatus::ACCEPT
            } else {
                StratumStatus::REJECT_NO_REASON
            },
            timestamp: self.timestamp.into(),
            ip: self.ip.to_string(),
            job_id: self.job_id,
            share_diff: self.share_diff,
            blk_bits: self.blk_bits,
            height: chain.legacy_share_height(),
            ..Share::default()
        }
    }
}

/// Generation-2 record, tagged with [`BYTES_VERSION`] and guarded by an
/// additive checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShareBytesV2 {
    pub(crate) version: u32,
    pub(crate) check_sum: u32,
    pub(crate) worker_hash_id: i64,
    pub(crate) user_id: i32,
    pub(crate) status: i32,
    pub(crate) timestamp: i64,
    /// `in6_addr` bytes; IPv4 peers are stored v4-mapped.
    pub(crate) ip: [u8; 16],
    pub(crate) job_id: u64,
    pub(crate) share_diff: u64,
    pub(crate) blk_bits: u32,
    pub(crate) height: u32,
    pub(crate) nonce: u32,
    pub(crate) session_id: u32,
}

impl ShareBytesV2 {
    pub(crate) const SIZE: usize = 80;

    pub(crate) fn parse(buf: &[u8]) -> Result<Self, CodecError> {
        ensure!(buf.len() == Self::SIZE, MalformedBufferSnafu { len: buf.len() });

        let mut ip = [0u8; 16];
        ip.copy_from_slice(&buf[32..48]);

        Ok(Self {
            version: LittleEndian::read_u32(&buf[0..4]),
            check_sum: LittleEndian::read_u32(&buf[4..8]),
            worker_hash_id: LittleEndian::read_i64(&buf[8..16]),
            user_id: LittleEndian::read_i32(&buf[16..20]),
            status: LittleEndian::read_i32(&buf[20..24]),
            timestamp: LittleEndian::read_i64(&buf[24..32]),
            ip,
            job_id: LittleEndian::read_u64(&buf[48..56]),
            share_diff: LittleEndian::read_u64(&buf[56..64]),
            blk_bits: LittleEndian::read_u32(&buf[64..68]),
            height: LittleEndian::read_u32(&buf[68..72]),
            nonce: LittleEndian::read_u32(&buf[72..76]),
            session_id: LittleEndian::read_u32(&buf[76..80]),
        })
    }

    /// Tamper detection only, not a security boundary. Every field except the
    /// checksum itself is widened to 64 bits (signed fields sign-extend, as
    /// the C producers' casts do), summed with wraparound, and the two halves
    /// of the sum are added together.
    pub(crate) fn checksum(&self) -> u32 {
        let c = [
            u64::from(self.version),
            self.worker_hash_id as u64,
            i64::from(self.user_id) as u64,
            i64::from(self.status) as u64,
            self.timestamp as u64,
            LittleEndian::read_u64(&self.ip[..8]),
            LittleEndian::read_u64(&self.ip[8..]),
            self.job_id,
            self.share_diff,
            u64::from(self.blk_bits),
            u64::from(self.height),
            u64::from(self.nonce),
            u64::from(self.session_id),
        ]
        .into_iter()
        .fold(0u64, u64::wrapping_add);

        (c as u32).wrapping_add((c >> 32) as u32)
    }

    /// Textual form of the stored address. IPv4-compatible and v4-mapped
    /// addresses print as dotted quads.
    pub(crate) fn ip_string(&self) -> String {
        let v6 = Ipv6Addr::from(self.ip);

        if self.ip[..12] == [0u8; 12] {
            return Ipv4Addr::new(self.ip[12], self.ip[13], self.ip[14], self.ip[15]).to_string();
        }

        match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => v6.to_string(),
        }
    }

    pub(crate) fn into_share(self) -> Share {
        Share {
            version: CURRENT_VERSION,
            worker_hash_id: self.worker_hash_id,
            user_id: self.user_id,
            status: StratumStatus::from(self.status),
            timestamp: self.timestamp,
            ip: self.ip_string(),
            job_id: self.job_id,
            share_diff: self.share_diff,
            blk_bits: self.blk_bits,
            height: self.height,
            nonce: self.nonce,
            session_id: self.session_id,
            version_mask: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        LittleEndian::write_u32(&mut buf[0..4], self.version);
        LittleEndian::write_u32(&mut buf[4..8], self.check_sum);
        LittleEndian::write_i64(&mut buf[8..16], self.worker_hash_id);
        LittleEndian::write_i32(&mut buf[16..20], self.user_id);
        LittleEndian::write_i32(&mut buf[20..24], self.status);
        LittleEndian::write_i64(&mut buf[24..32], self.timestamp);
        buf[32..48].copy_from_slice(&self.ip);
        LittleEndian::write_u64(&mut buf[48..56], self.job_id);
        LittleEndian::write_u64(&mut buf[56..64], self.share_diff);
        LittleEndian::write_u32(&mut buf[64..68], self.blk_bits);
        LittleEndian::write_u32(&mut buf[68..72], self.height);
        LittleEndian::write_u32(&mut buf[72..76], self.nonce);
        LittleEndian::write_u32(&mut buf[76..80], self.session_id);
        buf
    }
}
