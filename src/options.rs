use super::*;

#[derive(Clone, Default, Debug, Parser)]
pub struct Options {
    #[arg(long, help = "Load configuration from <CONFIG>.")]
    pub config: Option<PathBuf>,

    #[arg(long = "chain", value_enum, help = "Use <CHAIN>. [default: bitcoin]")]
    pub chain: Option<Chain>,

    #[arg(long, help = "Stamp job ids with <SERVER_ID>. [default: 1]")]
    pub server_id: Option<u8>,

    #[arg(long, help = "Write <POOL_COINBASE_INFO> into coinbase scriptSigs.")]
    pub pool_coinbase_info: Option<String>,

    #[arg(long, help = "Pay block rewards to <PAYOUT_ADDRESS>.")]
    pub payout_address: Option<Address<NetworkUnchecked>>,

    #[arg(
        long,
        help = "Use <BLOCK_VERSION> instead of the template version. [default: 0, keep template]"
    )]
    pub block_version: Option<u32>,
}
