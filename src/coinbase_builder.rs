use super::*;

/// Builds the job coinbase and splits it around the extranonce placeholder.
///
/// The scriptSig is `height || aux flags || merged-mining commitment ||
/// pool coinbase info || extranonce1 || extranonce2`, so `coinbase1` ends
/// exactly where the miner's extranonce begins. No clock is read: the same
/// inputs always produce the same bytes.
#[derive(Clone)]
pub struct CoinbaseBuilder {
    address: Address,
    aux: BTreeMap<String, String>,
    height: u64,
    merged_mining_commitment: Vec<u8>,
    pool_coinbase_info: Option<String>,
    rsk_tag: Option<Vec<u8>>,
    value: Amount,
    witness_commitment: ScriptBuf,
}

impl CoinbaseBuilder {
    pub const MIN_COINBASE_SCRIPT_SIG_SIZE: usize = 2;
    pub const MAX_COINBASE_SCRIPT_SIG_SIZE: usize = 100;

    pub fn new(address: Address, height: u64, value: Amount, witness_commitment: ScriptBuf) -> Self {
        Self {
            address,
            aux: BTreeMap::new(),
            height,
            merged_mining_commitment: Vec::new(),
            pool_coinbase_info: None,
            rsk_tag: None,
            value,
            witness_commitment,
        }
    }

    pub fn with_aux(mut self, aux: BTreeMap<String, String>) -> Self {
        self.aux = aux;
        self
    }

    pub fn with_merged_mining_commitment(mut self, commitment: Vec<u8>) -> Self {
        self.merged_mining_commitment = commitment;
        self
    }

    pub fn with_pool_coinbase_info(mut self, info: String) -> Self {
        self.pool_coinbase_info = Some(info);
        self
    }

    pub fn with_rsk_tag(mut self, tag: Vec<u8>) -> Self {
        self.rsk_tag = Some(tag);
        self
    }

    pub fn build(self) -> Result<(Transaction, String, String), JobError> {
        let mut buf: Vec<u8> = Vec::with_capacity(Self::MAX_COINBASE_SCRIPT_SIG_SIZE);

        // BIP34 height
        let mut height = [0u8; 8];
        let len = write_scriptint(
            &mut height,
            i64::try_from(self.height)
                .ok()
                .context(HeightSnafu { height: self.height })?,
        );
        buf.push(len as u8);
        buf.extend_from_slice(&height[..len]);

        for value in self.aux.values() {
            buf.extend_from_slice(&hex::decode(value).context(HexSnafu { field: "coinbaseaux" })?);
        }

        buf.extend_from_slice(&self.merged_mining_commitment);

        if let Some(info) = &self.pool_coinbase_info {
            buf.extend_from_slice(info.as_bytes());
        }

        let script_prefix_size = buf.len();
        let extranonce_size = EXTRANONCE1_SIZE + EXTRANONCE2_SIZE;

        buf.resize(script_prefix_size + extranonce_size, 0);

        let script_sig = ScriptBuf::from_bytes(buf);
        let script_sig_size = script_sig.len();

        ensure!(
            (Self::MIN_COINBASE_SCRIPT_SIG_SIZE..=Self::MAX_COINBASE_SCRIPT_SIG_SIZE)
                .contains(&script_sig_size),
            ScriptSigSizeSnafu {
                size: script_sig_size,
                min: Self::MIN_COINBASE_SCRIPT_SIG_SIZE,
                max: Self::MAX_COINBASE_SCRIPT_SIG_SIZE,
            }
        );

        let mut output = vec![TxOut {
            value: self.value,
            script_pubkey: self.address.script_pubkey(),
        }];

        if !self.witness_commitment.is_empty() {
            output.push(TxOut {
                value: Amount::ZERO,
                script_pubkey: self.witness_commitment,
            });
        }

        if let Some(tag) = self.rsk_tag {
            let mut script = Vec::with_capacity(tag.len() + 2);
            script.push(0x6a);
            script.push(tag.len() as u8);
            script.extend_from_slice(&tag);

            output.push(TxOut {
                value: Amount::ZERO,
                script_pubkey: ScriptBuf::from_bytes(script),
            });
        }

        let coinbase = Transaction {
            version: bitcoin::transaction::Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig,
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output,
        };

        // version + input count + outpoint + scriptSig length + prefix
        let offset = 4
            + VarInt(coinbase.input.len() as u64).size()
            + 36
            + VarInt(script_sig_size as u64).size()
            + script_prefix_size;

        let bin = consensus::serialize(&coinbase);
        let coinbase1 = hex::encode(&bin[..offset]);
        let coinbase2 = hex::encode(&bin[offset + extranonce_size..]);

        Ok((coinbase, coinbase1, coinbase2))
    }
}
