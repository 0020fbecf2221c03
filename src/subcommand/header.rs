use super::*;

#[derive(Debug, Parser)]
pub(crate) struct HeaderCmd {
    #[arg(help = "Header record as <HEX>.")]
    record: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct Output {
    pub chain: Chain,
    pub record_size: usize,
    pub version: i32,
    pub prev_blockhash: BlockHash,
    pub merkle_root: TxMerkleNode,
    pub time: u32,
    pub bits: String,
    pub nonce: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<BlockHash>,
}

impl HeaderCmd {
    pub(crate) fn run(self, settings: &Settings) -> Result {
        println!("{}", serde_json::to_string_pretty(&self.output(settings.chain())?)?);
        Ok(())
    }

    fn output(&self, chain: Chain) -> Result<Output> {
        let bytes = hex::decode(self.record.trim())
            .map_err(|err| anyhow!("header record is not valid hex: {err}"))?;

        match chain {
            Chain::Zcash => {
                let header = parse_record::<EquihashHeaderData>(chain, &bytes)?;
                Ok(Output {
                    chain,
                    record_size: EquihashHeaderData::SIZE,
                    version: header.version,
                    prev_blockhash: header.prev_blockhash,
                    merkle_root: header.merkle_root,
                    time: header.time,
                    bits: format!("{:08x}", header.bits.to_consensus()),
                    nonce: hex::encode(header.nonce),
                    block_hash: None,
                })
            }
            _ => {
                let header = parse_record::<BitcoinHeaderData>(chain, &bytes)?;
                Ok(Output {
                    chain,
                    record_size: BitcoinHeaderData::SIZE,
                    version: header.version.to_consensus(),
                    prev_blockhash: header.prev_blockhash,
                    merkle_root: header.merkle_root,
                    time: header.time,
                    bits: format!("{:08x}", header.bits.to_consensus()),
                    nonce: format!("{:08x}", header.nonce),
                    block_hash: Some(header.block_hash()),
                })
            }
        }
    }
}

fn parse_record<H: HeaderRecord>(chain: Chain, bytes: &[u8]) -> Result<H::Header> {
    chain.check_header_record::<H>()?;
    Ok(H::from_bytes(bytes)?.get()?)
}
