use {
    anyhow::{anyhow, bail},
    arguments::Arguments,
    base64::{Engine, engine::general_purpose},
    bitcoin::{
        Address, Amount, BlockHash, CompactTarget, OutPoint, ScriptBuf, Sequence, Target,
        Transaction, TxIn, TxMerkleNode, TxOut, Txid, VarInt, Witness, Wtxid,
        address::NetworkUnchecked,
        block::Header,
        consensus,
        hashes::{Hash, HashEngine, sha256d},
        locktime::absolute::LockTime,
        script::write_scriptint,
    },
    byteorder::{BigEndian, ByteOrder, LittleEndian},
    clap::{Parser, ValueEnum},
    error::{
        AuxJsonSnafu, ChecksumMismatchSnafu, HeightSnafu, HexSnafu,
        IncompleteFieldsSnafu, JobJsonSnafu, MalformedBufferSnafu, RskWorkSnafu,
        ScriptSigSizeSnafu, SerializationFailureSnafu, TemplateBase64Snafu, TemplateJsonSnafu,
        TemplateMissingSnafu, UnrecognizedEncodingSnafu,
    },
    hex::FromHex,
    prost::Message,
    serde::{Deserialize, Deserializer, Serialize, Serializer},
    serde_with::{DeserializeFromStr, SerializeDisplay},
    snafu::{OptionExt, ResultExt, Snafu, ensure},
    std::{
        collections::BTreeMap,
        env,
        fmt::{self, Display, Formatter},
        fs, io,
        net::{Ipv4Addr, Ipv6Addr},
        path::{Path, PathBuf},
        process,
        str::FromStr,
    },
    tracing::{debug, info},
    tracing_appender::non_blocking,
    tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt},
};

pub use {
    block_template::{BlockTemplate, GbtMessage, TemplateTransaction},
    chain::Chain,
    coinbase_builder::CoinbaseBuilder,
    error::{CodecError, JobError},
    found_block::{FoundBlock, WORKER_FULL_NAME_SIZE},
    header::{
        BITCOIN_HEADER_SIZE, BitcoinHeaderData, EQUIHASH_HEADER_SIZE, EquihashHeader,
        EquihashHeaderData, HeaderRecord,
    },
    job::{Job, JobBuilder, NmcAuxJob, RskJob},
    merged_mining::{MERGED_MINING_MAGIC, NmcAuxBlock, RSK_TAG, RskWork},
    merkle::{merkle_branch, merkle_root},
    prevhash::PrevHash,
    settings::Settings,
    share::{BYTES_VERSION, CURRENT_VERSION, Share, StratumStatus, bits_to_difficulty},
};

mod arguments;
mod block_template;
mod chain;
mod coinbase_builder;
mod error;
mod found_block;
mod header;
mod hex_serde;
mod job;
mod logs;
mod merged_mining;
mod merkle;
mod options;
mod prevhash;
mod settings;
pub mod share;
mod subcommand;

pub const COIN_VALUE: u64 = 100_000_000;
/// Bytes reserved in the coinbase scriptSig for extranonce1.
pub const EXTRANONCE1_SIZE: usize = 4;
/// Bytes reserved in the coinbase scriptSig for extranonce2.
pub const EXTRANONCE2_SIZE: usize = 8;

type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;

pub fn main() {
    let _guard = logs::init();

    let args = Arguments::parse();

    match args.run() {
        Err(err) => {
            eprintln!("error: {err}");

            for (i, cause) in err.chain().skip(1).enumerate() {
                if i == 0 {
                    eprintln!();
                    eprintln!("because:");
                }
                eprintln!("- {cause}");
            }

            if env::var_os("RUST_BACKTRACE")
                .map(|val| val == "1")
                .unwrap_or_default()
            {
                eprintln!();
                eprintln!("{}", err.backtrace());
            }
            process::exit(1);
        }
        Ok(_) => {
            process::exit(0);
        }
    }
}
