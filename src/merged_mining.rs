//! Auxiliary work handed to job construction by the merged-mining
//! collaborators: a Namecoin-style aux block and RSK getwork.

use super::*;

/// `fabe` followed by `mm`, the merged-mining commitment marker.
pub const MERGED_MINING_MAGIC: [u8; 4] = [0xfa, 0xbe, 0x6d, 0x6d];

/// Prefix of the RSK OP_RETURN tag, followed by the 32-byte block hash.
pub const RSK_TAG: &[u8] = b"RSKBLOCK:";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct NmcAuxBlock {
    pub hash: BlockHash,
    /// Root over several aux chains; absent when only one chain is merged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merkle_root: Option<BlockHash>,
    #[serde(default = "NmcAuxBlock::default_merkle_size")]
    pub merkle_size: i32,
    #[serde(default)]
    pub merkle_nonce: i32,
    pub height: i32,
    #[serde(with = "hex_serde::compact")]
    pub bits: CompactTarget,
    #[serde(default)]
    pub rpc_addr: String,
    #[serde(default)]
    pub rpc_userpass: String,
}

impl NmcAuxBlock {
    fn default_merkle_size() -> i32 {
        1
    }

    pub fn parse(json: &str) -> Result<Self, JobError> {
        serde_json::from_str(json).context(AuxJsonSnafu)
    }

    /// Hash committed in the parent coinbase.
    pub fn aux_root(&self) -> BlockHash {
        self.merkle_root.unwrap_or(self.hash)
    }

    pub fn network_target(&self) -> Target {
        Target::from_compact(self.bits)
    }

    /// `fabe6d6d || root (display order) || merkle_size || merkle_nonce`
    pub fn commitment(&self) -> Vec<u8> {
        let mut root = self.aux_root().to_byte_array();
        root.reverse();

        let mut commitment = Vec::with_capacity(44);
        commitment.extend_from_slice(&MERGED_MINING_MAGIC);
        commitment.extend_from_slice(&root);
        commitment.extend_from_slice(&self.merkle_size.to_le_bytes());
        commitment.extend_from_slice(&self.merkle_nonce.to_le_bytes());
        commitment
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RskWork {
    pub block_hash_for_merged_mining: String,
    pub target: String,
    #[serde(default)]
    pub fees_paid_to_miner: String,
    #[serde(rename = "rskdRpcAddress", default)]
    pub rpc_address: String,
    #[serde(rename = "rskdRpcUserPwd", default)]
    pub rpc_user_pwd: String,
    #[serde(default)]
    pub notify_flag: bool,
}

impl RskWork {
    pub fn parse(json: &str) -> Result<Self, JobError> {
        serde_json::from_str(json).map_err(|err| {
            RskWorkSnafu {
                message: err.to_string(),
            }
            .build()
        })
    }

    pub fn block_hash(&self) -> Result<[u8; 32], JobError> {
        let hash = &self.block_hash_for_merged_mining;
        <[u8; 32]>::from_hex(hash.strip_prefix("0x").unwrap_or(hash)).context(HexSnafu {
            field: "blockHashForMergedMining",
        })
    }

    pub fn network_target(&self) -> Result<Target, JobError> {
        hex_serde::target::parse(&self.target).context(HexSnafu { field: "target" })
    }

    /// Payload of the OP_RETURN output carrying the tag.
    pub fn tag(&self) -> Result<Vec<u8>, JobError> {
        let mut tag = RSK_TAG.to_vec();
        tag.extend_from_slice(&self.block_hash()?);
        Ok(tag)
    }
}
