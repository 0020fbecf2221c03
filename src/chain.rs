use super::*;

/// The chain a deployment mines. Chosen once at start-up and never switched.
#[derive(Default, ValueEnum, Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
    #[default]
    #[value(alias = "btc")]
    Bitcoin,
    #[value(alias = "bch")]
    BitcoinCash,
    #[value(alias = "bsv")]
    BitcoinSv,
    #[value(alias = "ubtc")]
    UnitedBitcoin,
    /// Only header and found-block records are supported. [`JobBuilder`]
    /// builds Bitcoin-style coinbases and has no merkle root or final sapling
    /// root fields for Zcash jobs.
    #[value(alias = "zec")]
    Zcash,
}

impl Chain {
    /// Height assumed for generation-1 shares, which carry none. Chosen from a
    /// historical block-reward era rather than derived from data.
    pub fn legacy_share_height(self) -> u32 {
        match self {
            // UBTC's height and rewards differ from the other SHA256 chains
            Self::UnitedBitcoin => 758_000,
            // block reward is 12.5 at this height
            Self::Bitcoin | Self::BitcoinCash | Self::BitcoinSv | Self::Zcash => 570_000,
        }
    }

    pub fn header_size(self) -> usize {
        match self {
            Self::Zcash => EQUIHASH_HEADER_SIZE,
            Self::Bitcoin | Self::BitcoinCash | Self::BitcoinSv | Self::UnitedBitcoin => {
                BITCOIN_HEADER_SIZE
            }
        }
    }

    pub fn has_root_state_hash(self) -> bool {
        self == Self::UnitedBitcoin
    }

    /// Producers and consumers of header records must agree on the record size
    /// out of band. Run this once at start-up with the record type in use.
    pub fn check_header_record<H: HeaderRecord>(self) -> Result {
        anyhow::ensure!(
            H::SIZE == self.header_size(),
            "{self} uses {} byte headers but the header record holds {} bytes",
            self.header_size(),
            H::SIZE
        );
        Ok(())
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Bitcoin => "bitcoin",
                Self::BitcoinCash => "bitcoin-cash",
                Self::BitcoinSv => "bitcoin-sv",
                Self::UnitedBitcoin => "united-bitcoin",
                Self::Zcash => "zcash",
            }
        )
    }
}

impl FromStr for Chain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bitcoin" | "btc" => Ok(Self::Bitcoin),
            "bitcoin-cash" | "bch" => Ok(Self::BitcoinCash),
            "bitcoin-sv" | "bsv" => Ok(Self::BitcoinSv),
            "united-bitcoin" | "ubtc" => Ok(Self::UnitedBitcoin),
            "zcash" | "zec" => Ok(Self::Zcash),
            _ => Err(anyhow::anyhow!("invalid chain `{s}`")),
        }
    }
}
