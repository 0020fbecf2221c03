use super::*;

/// One unit of mining work at a fixed height, as distributed between pool
/// processes. Built once per template or merged-mining update and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: u64,
    pub gbt_hash: String,
    pub prev_hash: BlockHash,
    pub prev_hash_be_str: String,
    pub height: i32,
    pub coinbase1: String,
    pub coinbase2: String,
    pub merkle_branch: Vec<TxMerkleNode>,
    pub n_version: i32,
    pub n_bits: u32,
    pub n_time: u32,
    pub min_time: u32,
    #[serde(with = "bitcoin::amount::serde::as_sat")]
    pub coinbase_value: Amount,
    /// Empty when segwit is not active.
    pub witness_commitment: String,
    /// Empty unless the chain carries contract state.
    pub root_state_hash: String,
    #[serde(with = "hex_serde::target")]
    pub network_target: Target,
    pub nmc: NmcAuxJob,
    pub rsk: RskJob,
}

impl Job {
    pub fn serialize_to_json(&self) -> Result<String, JobError> {
        serde_json::to_string(self).context(JobJsonSnafu)
    }

    pub fn unserialize_from_json(json: &str) -> Result<Self, JobError> {
        serde_json::from_str(json).context(JobJsonSnafu)
    }

    pub fn is_empty_block(&self) -> bool {
        self.merkle_branch.is_empty()
    }

    pub fn height(&self) -> u64 {
        u64::try_from(self.height).unwrap_or_default()
    }

    pub fn prev_hash(&self) -> PrevHash {
        PrevHash::from(self.prev_hash)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NmcAuxJob {
    pub aux_bits: u32,
    pub aux_block_hash: BlockHash,
    pub aux_merkle_size: i32,
    pub aux_merkle_nonce: i32,
    #[serde(with = "hex_serde::target")]
    pub network_target: Target,
    pub height: i32,
    pub rpc_addr: String,
    pub rpc_userpass: String,
}

impl Default for NmcAuxJob {
    fn default() -> Self {
        Self {
            aux_bits: 0,
            aux_block_hash: BlockHash::all_zeros(),
            aux_merkle_size: 0,
            aux_merkle_nonce: 0,
            network_target: Target::ZERO,
            height: 0,
            rpc_addr: String::new(),
            rpc_userpass: String::new(),
        }
    }
}

impl From<&NmcAuxBlock> for NmcAuxJob {
    fn from(aux: &NmcAuxBlock) -> Self {
        Self {
            aux_bits: aux.bits.to_consensus(),
            aux_block_hash: aux.aux_root(),
            aux_merkle_size: aux.merkle_size,
            aux_merkle_nonce: aux.merkle_nonce,
            network_target: aux.network_target(),
            height: aux.height,
            rpc_addr: aux.rpc_addr.clone(),
            rpc_userpass: aux.rpc_userpass.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RskJob {
    pub block_hash_for_merged_mining: String,
    #[serde(with = "hex_serde::target")]
    pub network_target: Target,
    pub rpc_address: String,
    pub rpc_user_pwd: String,
    pub fees_for_miner: String,
    pub is_merged_mining_clean_job: bool,
}

impl Default for RskJob {
    fn default() -> Self {
        Self {
            block_hash_for_merged_mining: String::new(),
            network_target: Target::ZERO,
            rpc_address: String::new(),
            rpc_user_pwd: String::new(),
            fees_for_miner: String::new(),
            is_merged_mining_clean_job: false,
        }
    }
}

/// Builds a [`Job`] from a block template message and the auxiliary work
/// current at the time.
#[derive(Clone)]
pub struct JobBuilder<'a> {
    block_version: u32,
    chain: Chain,
    gbt: &'a str,
    merged_mining_update: bool,
    nmc_aux_block: Option<&'a str>,
    payout_address: Address,
    pool_coinbase_info: String,
    rsk_work: Option<RskWork>,
    server_id: u8,
}

impl<'a> JobBuilder<'a> {
    /// A non-zero `block_version` overrides the template version.
    pub fn new(
        gbt: &'a str,
        pool_coinbase_info: impl Into<String>,
        payout_address: Address,
        block_version: u32,
        server_id: u8,
    ) -> Self {
        Self {
            block_version,
            chain: Chain::default(),
            gbt,
            merged_mining_update: false,
            nmc_aux_block: None,
            payout_address,
            pool_coinbase_info: pool_coinbase_info.into(),
            rsk_work: None,
            server_id,
        }
    }

    /// Aux block JSON. Blank input means no aux chain.
    pub fn nmc_aux_block(mut self, json: &'a str) -> Self {
        self.nmc_aux_block = Some(json).filter(|json| !json.trim().is_empty());
        self
    }

    pub fn rsk_work(mut self, work: RskWork) -> Self {
        self.rsk_work = Some(work);
        self
    }

    /// Set when the job is triggered by new merged-mining work rather than a
    /// new template.
    pub fn merged_mining_update(mut self, update: bool) -> Self {
        self.merged_mining_update = update;
        self
    }

    pub fn chain(mut self, chain: Chain) -> Self {
        self.chain = chain;
        self
    }

    pub fn build(self) -> Result<Job, JobError> {
        let gbt = GbtMessage::parse(self.gbt)?;
        let template = gbt.block_template()?;

        let height = i32::try_from(template.height)
            .ok()
            .context(HeightSnafu {
                height: template.height,
            })?;

        let nmc = self.nmc_aux_block.map(NmcAuxBlock::parse).transpose()?;

        let witness_commitment = ScriptBuf::from_bytes(
            hex::decode(&template.default_witness_commitment).context(HexSnafu {
                field: "default_witness_commitment",
            })?,
        );

        let mut coinbase = CoinbaseBuilder::new(
            self.payout_address,
            template.height,
            template.coinbase_value,
            witness_commitment,
        )
        .with_aux(template.coinbaseaux.clone())
        .with_pool_coinbase_info(self.pool_coinbase_info);

        if let Some(aux) = &nmc {
            coinbase = coinbase.with_merged_mining_commitment(aux.commitment());
        }

        let rsk = match &self.rsk_work {
            Some(work) => {
                coinbase = coinbase.with_rsk_tag(work.tag()?);

                RskJob {
                    block_hash_for_merged_mining: work.block_hash_for_merged_mining.clone(),
                    network_target: work.network_target()?,
                    rpc_address: work.rpc_address.clone(),
                    rpc_user_pwd: work.rpc_user_pwd.clone(),
                    fees_for_miner: work.fees_paid_to_miner.clone(),
                    is_merged_mining_clean_job: self.merged_mining_update && work.notify_flag,
                }
            }
            None => RskJob::default(),
        };

        let (_, coinbase1, coinbase2) = coinbase.build()?;

        let merkle_branch = merkle_branch(&template.transaction_ids());

        let n_version = if self.block_version != 0 {
            self.block_version as i32
        } else {
            template.version
        };

        let root_state_hash = if self.chain.has_root_state_hash() {
            template.root_state_hash.clone()
        } else {
            String::new()
        };

        let job = Job {
            job_id: job_id(gbt.created_at_ts, self.server_id, &gbt.gbthash),
            gbt_hash: gbt.gbthash,
            prev_hash: template.previous_block_hash,
            prev_hash_be_str: PrevHash::from(template.previous_block_hash).to_string(),
            height,
            coinbase1,
            coinbase2,
            merkle_branch,
            n_version,
            n_bits: template.bits.to_consensus(),
            n_time: template.current_time,
            min_time: template.min_time,
            coinbase_value: template.coinbase_value,
            witness_commitment: template.default_witness_commitment,
            root_state_hash,
            network_target: Target::from_compact(template.bits),
            nmc: nmc.as_ref().map(NmcAuxJob::from).unwrap_or_default(),
            rsk,
        };

        info!(
            "Built job {} for {} at height {} with {} transactions",
            job.job_id,
            self.chain,
            job.height,
            template.transactions.len()
        );

        debug!(
            "Job {} merged mining: nmc height {}, rsk hash {:?}, clean {}",
            job.job_id,
            job.nmc.height,
            job.rsk.block_hash_for_merged_mining,
            job.rsk.is_merged_mining_clean_job
        );

        Ok(job)
    }
}

/// `created_at_ts << 32 | server_id << 24 | djb2(gbthash) & 0xffffff`
fn job_id(created_at_ts: u32, server_id: u8, gbthash: &str) -> u64 {
    let hash = gbthash
        .bytes()
        .fold(5381u32, |hash, byte| hash.wrapping_mul(33).wrapping_add(byte.into()));

    u64::from(created_at_ts) << 32 | u64::from(server_id) << 24 | u64::from(hash & 0x00ff_ffff)
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq as pretty_assert_eq};

    const TEMPLATE: &str = r#"{
        "bits": "17034219",
        "previousblockhash": "00000000000000000001f3b1e21e7f9c1f8b1e6ad9e7a4c2b8e0f1d3c5a79b11",
        "curtime": 1700000000,
        "mintime": 1699998000,
        "height": 817000,
        "version": 536870912,
        "transactions": [
            {"txid": "1111111111111111111111111111111111111111111111111111111111111111", "hash": "2222222222222222222222222222222222222222222222222222222222222222"},
            {"hash": "3333333333333333333333333333333333333333333333333333333333333333"},
            {"txid": "4444444444444444444444444444444444444444444444444444444444444444", "hash": "4444444444444444444444444444444444444444444444444444444444444444"}
        ],
        "default_witness_commitment": "6a24aa21a9ed0000000000000000000000000000000000000000000000000000000000000000",
        "coinbaseaux": {"flags": "0a"},
        "coinbasevalue": 640000000,
        "rootstatehash": "abcd"
    }"#;

    const AUX: &str = r#"{
        "hash": "0000000000000000000000000000000000000000000000000000000000000abc",
        "merkle_size": 1,
        "merkle_nonce": 0,
        "height": 500000,
        "bits": "1a0e2f8a",
        "rpc_addr": "127.0.0.1:8336",
        "rpc_userpass": "user:pass"
    }"#;

    fn gbt(template: &str) -> String {
        let template = serde_json::from_str::<BlockTemplate>(template).unwrap();
        serde_json::to_string(&GbtMessage::new(1700000001, &template, "a1b2c3d4").unwrap()).unwrap()
    }

    fn address() -> Address {
        "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"
            .parse::<Address<NetworkUnchecked>>()
            .unwrap()
            .assume_checked()
    }

    fn rsk_work() -> RskWork {
        RskWork {
            block_hash_for_merged_mining:
                "0x5555555555555555555555555555555555555555555555555555555555555555".into(),
            target: "0x00000000000000000000000000000000000000000000000000000000ffffffff".into(),
            fees_paid_to_miner: "1000".into(),
            rpc_address: "http://127.0.0.1:4444".into(),
            rpc_user_pwd: "user:pwd".into(),
            notify_flag: true,
        }
    }

    fn build(gbt: &str) -> Job {
        JobBuilder::new(gbt, "/pool/", address(), 0, 7).build().unwrap()
    }

    #[test]
    fn fields_from_template() {
        let gbt = gbt(TEMPLATE);
        let job = build(&gbt);

        assert_eq!(job.height, 817000);
        assert_eq!(job.height(), 817000);
        assert_eq!(job.gbt_hash, "a1b2c3d4");
        assert_eq!(job.n_version, 536870912);
        assert_eq!(job.n_bits, 0x17034219);
        assert_eq!(job.n_time, 1700000000);
        assert_eq!(job.min_time, 1699998000);
        assert_eq!(job.coinbase_value, Amount::from_sat(640_000_000));
        assert_eq!(
            job.network_target,
            Target::from_compact(CompactTarget::from_consensus(0x17034219))
        );
        assert_eq!(job.root_state_hash, "");
        assert_eq!(job.prev_hash_be_str, job.prev_hash().to_string());
        assert_eq!(job.nmc, NmcAuxJob::default());
        assert_eq!(job.rsk, RskJob::default());
        assert!(!job.is_empty_block());
    }

    #[test]
    fn job_id_layout() {
        let job = build(&gbt(TEMPLATE));

        assert_eq!(job.job_id >> 32, 1700000001);
        assert_eq!((job.job_id >> 24) & 0xff, 7);
        assert_eq!(job.job_id & 0x00ff_ffff, u64::from(job_id(0, 0, "a1b2c3d4")));
        assert_eq!(job_id(0, 0, ""), 5381);
    }

    #[test]
    fn block_version_override() {
        let gbt = gbt(TEMPLATE);
        let job = JobBuilder::new(&gbt, "", address(), 0x2000_0004, 0)
            .build()
            .unwrap();
        assert_eq!(job.n_version, 0x2000_0004);
    }

    #[test]
    fn root_state_hash_only_on_chains_that_carry_it() {
        let gbt = gbt(TEMPLATE);
        let job = JobBuilder::new(&gbt, "", address(), 0, 0)
            .chain(Chain::UnitedBitcoin)
            .build()
            .unwrap();
        assert_eq!(job.root_state_hash, "abcd");
    }

    #[test]
    fn deterministic() {
        let gbt = gbt(TEMPLATE);

        let build = || {
            JobBuilder::new(&gbt, "/pool/", address(), 0, 7)
                .nmc_aux_block(AUX)
                .rsk_work(rsk_work())
                .build()
                .unwrap()
        };

        let a = build();
        let b = build();

        pretty_assert_eq!(a.coinbase1, b.coinbase1);
        pretty_assert_eq!(a.coinbase2, b.coinbase2);
        pretty_assert_eq!(a.merkle_branch, b.merkle_branch);
        pretty_assert_eq!(a, b);
    }

    #[test]
    fn coinbase_halves_reassemble() {
        let job = build(&gbt(TEMPLATE));

        let mut bytes = hex::decode(&job.coinbase1).unwrap();
        bytes.extend_from_slice(&[0; EXTRANONCE1_SIZE + EXTRANONCE2_SIZE]);
        bytes.extend_from_slice(&hex::decode(&job.coinbase2).unwrap());

        let coinbase = consensus::deserialize::<Transaction>(&bytes).unwrap();
        assert!(coinbase.is_coinbase());
        assert_eq!(coinbase.output[0].value, job.coinbase_value);
        assert_eq!(coinbase.output.len(), 2);
        assert_eq!(
            hex::encode(coinbase.output[1].script_pubkey.as_bytes()),
            job.witness_commitment
        );

        let script_sig = coinbase.input[0].script_sig.as_bytes();
        assert_eq!(script_sig[..4], [3, 0x68, 0x77, 0x0c]);
        assert_eq!(script_sig[4], 0x0a);
    }

    #[test]
    fn merkle_branch_keeps_transaction_order() {
        let job = build(&gbt(TEMPLATE));
        let template = serde_json::from_str::<BlockTemplate>(TEMPLATE).unwrap();

        assert_eq!(job.merkle_branch, merkle_branch(&template.transaction_ids()));
        assert_eq!(job.merkle_branch.len(), 2);
        assert_eq!(
            job.merkle_branch[0].to_string(),
            "1111111111111111111111111111111111111111111111111111111111111111"
        );
    }

    #[test]
    fn empty_block() {
        let gbt = gbt(&TEMPLATE.replace(
            r#""transactions": ["#,
            r#""transactions": [], "unused": ["#,
        ));
        let job = build(&gbt);

        assert!(job.is_empty_block());
    }

    #[test]
    fn merged_mining_fields() {
        let gbt = gbt(TEMPLATE);
        let job = JobBuilder::new(&gbt, "/pool/", address(), 0, 7)
            .nmc_aux_block(AUX)
            .rsk_work(rsk_work())
            .build()
            .unwrap();

        assert_eq!(job.nmc.height, 500000);
        assert_eq!(job.nmc.aux_bits, 0x1a0e2f8a);
        assert_eq!(job.nmc.aux_merkle_size, 1);
        assert_eq!(job.nmc.rpc_addr, "127.0.0.1:8336");
        assert_eq!(
            job.nmc.aux_block_hash.to_string(),
            "0000000000000000000000000000000000000000000000000000000000000abc"
        );
        assert!(job.coinbase1.contains("fabe6d6d"));

        assert_eq!(job.rsk.fees_for_miner, "1000");
        assert_eq!(job.rsk.rpc_user_pwd, "user:pwd");
        assert!(!job.rsk.is_merged_mining_clean_job);
        assert!(job.coinbase2.contains(&hex::encode(b"RSKBLOCK:")));
    }

    #[test]
    fn clean_job_needs_update_and_notify() {
        let gbt = gbt(TEMPLATE);

        let clean = |update: bool, notify: bool| {
            JobBuilder::new(&gbt, "", address(), 0, 0)
                .rsk_work(RskWork {
                    notify_flag: notify,
                    ..rsk_work()
                })
                .merged_mining_update(update)
                .build()
                .unwrap()
                .rsk
                .is_merged_mining_clean_job
        };

        assert!(clean(true, true));
        assert!(!clean(true, false));
        assert!(!clean(false, true));
    }

    #[test]
    fn blank_aux_block_is_ignored() {
        let gbt = gbt(TEMPLATE);
        let job = JobBuilder::new(&gbt, "", address(), 0, 0)
            .nmc_aux_block("  ")
            .build()
            .unwrap();
        assert_eq!(job.nmc, NmcAuxJob::default());
    }

    #[test]
    fn json_round_trip() {
        let gbt = gbt(TEMPLATE);
        let job = JobBuilder::new(&gbt, "/pool/", address(), 0, 7)
            .nmc_aux_block(AUX)
            .rsk_work(rsk_work())
            .merged_mining_update(true)
            .build()
            .unwrap();

        let json = job.serialize_to_json().unwrap();
        pretty_assert_eq!(Job::unserialize_from_json(&json).unwrap(), job);
    }

    #[test]
    fn json_keeps_empty_strings() {
        let gbt = gbt(&TEMPLATE.replace(
            r#""default_witness_commitment": "6a24aa21a9ed0000000000000000000000000000000000000000000000000000000000000000","#,
            "",
        ));
        let job = build(&gbt);
        assert_eq!(job.witness_commitment, "");

        let json = job.serialize_to_json().unwrap();
        assert!(json.contains(r#""witnessCommitment":"""#));
        assert!(json.contains(r#""rootStateHash":"""#));
        assert!(json.contains(r#""nmc":{"#));

        pretty_assert_eq!(Job::unserialize_from_json(&json).unwrap(), job);
    }

    #[test]
    fn build_errors() {
        assert!(matches!(
            JobBuilder::new("{}", "", address(), 0, 0).build(),
            Err(JobError::TemplateJson { .. })
        ));

        let gbt = gbt(TEMPLATE);
        assert!(matches!(
            JobBuilder::new(&gbt, "", address(), 0, 0)
                .nmc_aux_block("{")
                .build(),
            Err(JobError::AuxJson { .. })
        ));
        assert!(matches!(
            JobBuilder::new(&gbt, "x".repeat(100), address(), 0, 0).build(),
            Err(JobError::ScriptSigSize { .. })
        ));
        assert!(matches!(
            Job::unserialize_from_json("{}"),
            Err(JobError::JobJson { .. })
        ));
    }
}
