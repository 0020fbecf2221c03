use super::*;

/// Block template as published by the template maker: the raw
/// `getblocktemplate` response, base64 encoded, plus its creation time and
/// identity hash.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct GbtMessage {
    pub created_at_ts: u32,
    pub block_template_base64: String,
    pub gbthash: String,
}

impl GbtMessage {
    pub fn new(
        created_at_ts: u32,
        template: &BlockTemplate,
        gbthash: impl Into<String>,
    ) -> Result<Self, JobError> {
        let response = serde_json::to_vec(&TemplateResponse {
            result: Some(template.clone()),
        })
        .context(TemplateJsonSnafu)?;

        Ok(Self {
            created_at_ts,
            block_template_base64: general_purpose::STANDARD.encode(response),
            gbthash: gbthash.into(),
        })
    }

    pub fn parse(gbt: &str) -> Result<Self, JobError> {
        serde_json::from_str(gbt).context(TemplateJsonSnafu)
    }

    pub fn block_template(&self) -> Result<BlockTemplate, JobError> {
        let json = general_purpose::STANDARD
            .decode(&self.block_template_base64)
            .context(TemplateBase64Snafu)?;

        serde_json::from_slice::<TemplateResponse>(&json)
            .context(TemplateJsonSnafu)?
            .result
            .context(TemplateMissingSnafu)
    }
}

#[derive(Deserialize, Serialize)]
struct TemplateResponse {
    result: Option<BlockTemplate>,
}

#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct BlockTemplate {
    #[serde(with = "hex_serde::compact")]
    pub bits: CompactTarget,
    #[serde(rename = "previousblockhash")]
    pub previous_block_hash: BlockHash,
    #[serde(rename = "curtime")]
    pub current_time: u32,
    #[serde(rename = "mintime", default)]
    pub min_time: u32,
    pub height: u64,
    pub version: i32,
    pub transactions: Vec<TemplateTransaction>,
    #[serde(default)]
    pub default_witness_commitment: String,
    #[serde(default)]
    pub coinbaseaux: BTreeMap<String, String>,
    #[serde(rename = "coinbasevalue", with = "bitcoin::amount::serde::as_sat")]
    pub coinbase_value: Amount,
    /// Only present on chains with smart-contract state.
    #[serde(rename = "rootstatehash", default)]
    pub root_state_hash: String,
}

impl BlockTemplate {
    /// Ids of the non-coinbase transactions, in block order.
    pub fn transaction_ids(&self) -> Vec<TxMerkleNode> {
        self.transactions.iter().map(TemplateTransaction::id).collect()
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct TemplateTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<Txid>,
    #[serde(rename = "hash")]
    pub wtxid: Wtxid,
    #[serde(default)]
    pub data: String,
}

impl TemplateTransaction {
    /// Nodes without segwit only report `hash`, which is then the txid.
    pub fn id(&self) -> TxMerkleNode {
        match self.txid {
            Some(txid) => TxMerkleNode::from_raw_hash(txid.to_raw_hash()),
            None => TxMerkleNode::from_raw_hash(self.wtxid.to_raw_hash()),
        }
    }
}
