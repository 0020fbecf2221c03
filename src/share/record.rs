use super::*;

/// Tagged-field (protobuf, proto2) form of a share. Field numbers are part of
/// the wire contract with deployed producers and must never be renumbered.
///
/// Every field is declared optional so that a payload lacking one of the
/// required fields is caught in [`ShareRecord::into_share`] instead of
/// silently decoding to zero.
#[derive(Clone, PartialEq, prost::Message)]
pub(crate) struct ShareRecord {
    #[prost(uint32, optional, tag = "1")]
    pub(crate) version: Option<u32>,
    #[prost(int64, optional, tag = "2")]
    pub(crate) worker_hash_id: Option<i64>,
    #[prost(int32, optional, tag = "3")]
    pub(crate) user_id: Option<i32>,
    #[prost(int32, optional, tag = "4")]
    pub(crate) status: Option<i32>,
    #[prost(int64, optional, tag = "5")]
    pub(crate) timestamp: Option<i64>,
    #[prost(string, optional, tag = "6")]
    pub(crate) ip: Option<String>,
    #[prost(uint64, optional, tag = "7")]
    pub(crate) job_id: Option<u64>,
    #[prost(uint64, optional, tag = "8")]
    pub(crate) share_diff: Option<u64>,
    #[prost(uint32, optional, tag = "9")]
    pub(crate) blk_bits: Option<u32>,
    #[prost(uint32, optional, tag = "10")]
    pub(crate) height: Option<u32>,
    #[prost(uint32, optional, tag = "11")]
    pub(crate) nonce: Option<u32>,
    #[prost(uint32, optional, tag = "12")]
    pub(crate) session_id: Option<u32>,
    #[prost(uint32, optional, tag = "13")]
    pub(crate) version_mask: Option<u32>,
}

impl ShareRecord {
    pub(crate) fn into_share(self) -> Result<Share, CodecError> {
        let mut missing = Vec::new();

        macro_rules! required {
            ($field:ident, $name:literal) => {
                match self.$field {
                    Some(value) => value,
                    None => {
                        missing.push($name);
                        Default::default()
                    }
                }
            };
        }

        let share = Share {
            version: required!(version, "version"),
            worker_hash_id: required!(worker_hash_id, "workerHashId"),
            user_id: required!(user_id, "userId"),
            status: StratumStatus::from(required!(status, "status")),
            timestamp: required!(timestamp, "timestamp"),
            ip: required!(ip, "ip"),
            job_id: required!(job_id, "jobId"),
            share_diff: required!(share_diff, "shareDiff"),
            blk_bits: required!(blk_bits, "blkBits"),
            height: required!(height, "height"),
            nonce: required!(nonce, "nonce"),
            session_id: required!(session_id, "sessionId"),
            version_mask: self.version_mask.unwrap_or_default(),
        };

        if !missing.is_empty() {
            debug!("share payload missing fields: {}", missing.join(", "));
            return IncompleteFieldsSnafu {
                fields: missing.join(", "),
            }
            .fail();
        }

        Ok(share)
    }
}

impl From<&Share> for ShareRecord {
    fn from(share: &Share) -> Self {
        Self {
            version: Some(share.version),
            worker_hash_id: Some(share.worker_hash_id),
            user_id: Some(share.user_id),
            status: Some(share.status.code()),
            timestamp: Some(share.timestamp),
            ip: Some(share.ip.clone()),
            job_id: Some(share.job_id),
            share_diff: Some(share.share_diff),
            blk_bits: Some(share.blk_bits),
            height: Some(share.height),
            nonce: Some(share.nonce),
            session_id: Some(share.session_id),
            version_mask: Some(share.version_mask),
        }
    }
}
