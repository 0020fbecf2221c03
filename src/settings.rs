use {super::*, options::Options};

/// TOML config file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub chain: Option<Chain>,
    pub server_id: Option<u8>,
    pub pool_coinbase_info: Option<String>,
    pub payout_address: Option<Address<NetworkUnchecked>>,
    pub block_version: Option<u32>,
}

/// Settings merged from the command line, `POOLSHARE_*` environment
/// variables and the config file, in that order of priority.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub config: Option<PathBuf>,
    pub chain: Option<Chain>,
    pub server_id: Option<u8>,
    pub pool_coinbase_info: Option<String>,
    pub payout_address: Option<Address<NetworkUnchecked>>,
    pub block_version: Option<u32>,
}

impl Settings {
    pub const ENV_PREFIX: &'static str = "POOLSHARE_";

    /// Load settings from all sources with proper priority
    pub(crate) fn load(options: Options) -> Result<Self> {
        let mut env = BTreeMap::<String, String>::new();

        for (var, value) in env::vars_os() {
            let Some(var) = var.to_str() else {
                continue;
            };

            let Some(key) = var.strip_prefix(Self::ENV_PREFIX) else {
                continue;
            };

            env.insert(
                key.into(),
                value.into_string().map_err(|value| {
                    anyhow!(
                        "environment variable `{var}` not valid unicode: `{}`",
                        value.to_string_lossy()
                    )
                })?,
            );
        }

        Self::merge(options, env)
    }

    pub(crate) fn merge(options: Options, env: BTreeMap<String, String>) -> Result<Self> {
        let settings = Self::from_options(&options).or(Self::from_env(&env)?);

        let config = match &settings.config {
            Some(path) => Self::read_config(path)?,
            None => Config::default(),
        };

        let settings = settings.or(Self::from_config(&config)).or_defaults();

        settings.validate()?;

        debug!("Loaded settings: {settings:?}");

        Ok(settings)
    }

    fn read_config(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path)
            .map_err(|err| anyhow!("failed to open config file `{}`: {err}", path.display()))?;

        toml::from_str(&contents).map_err(|err| {
            anyhow!(
                "failed to deserialize config file `{}`: {err}",
                path.display()
            )
        })
    }

    pub(crate) fn from_options(options: &Options) -> Self {
        Self {
            config: options.config.clone(),
            chain: options.chain,
            server_id: options.server_id,
            pool_coinbase_info: options.pool_coinbase_info.clone(),
            payout_address: options.payout_address.clone(),
            block_version: options.block_version,
        }
    }

    pub(crate) fn from_env(env: &BTreeMap<String, String>) -> Result<Self> {
        fn parse<T: FromStr>(env: &BTreeMap<String, String>, key: &str) -> Result<Option<T>>
        where
            T::Err: Display,
        {
            env.get(key)
                .map(|value| value.parse::<T>())
                .transpose()
                .map_err(|err| {
                    anyhow!(
                        "failed to parse environment variable {}{key}: {err}",
                        Settings::ENV_PREFIX
                    )
                })
        }

        Ok(Self {
            config: env.get("CONFIG").map(PathBuf::from),
            chain: parse(env, "CHAIN")?,
            server_id: parse(env, "SERVER_ID")?,
            pool_coinbase_info: env.get("POOL_COINBASE_INFO").cloned(),
            payout_address: parse(env, "PAYOUT_ADDRESS")?,
            block_version: parse(env, "BLOCK_VERSION")?,
        })
    }

    pub(crate) fn from_config(config: &Config) -> Self {
        Self {
            config: None,
            chain: config.chain,
            server_id: config.server_id,
            pool_coinbase_info: config.pool_coinbase_info.clone(),
            payout_address: config.payout_address.clone(),
            block_version: config.block_version,
        }
    }

    /// Merge self with another Settings, self takes priority
    pub fn or(self, other: Self) -> Self {
        Self {
            config: self.config.or(other.config),
            chain: self.chain.or(other.chain),
            server_id: self.server_id.or(other.server_id),
            pool_coinbase_info: self.pool_coinbase_info.or(other.pool_coinbase_info),
            payout_address: self.payout_address.or(other.payout_address),
            block_version: self.block_version.or(other.block_version),
        }
    }

    fn or_defaults(self) -> Self {
        Self {
            config: self.config,
            chain: Some(self.chain.unwrap_or_default()),
            server_id: Some(self.server_id.unwrap_or(1)),
            pool_coinbase_info: Some(self.pool_coinbase_info.unwrap_or_default()),
            payout_address: self.payout_address,
            block_version: Some(self.block_version.unwrap_or_default()),
        }
    }

    fn validate(&self) -> Result {
        if self.server_id == Some(0) {
            bail!("server id must be between 1 and 255");
        }

        let info_len = self.pool_coinbase_info().len();
        if info_len > CoinbaseBuilder::MAX_COINBASE_SCRIPT_SIG_SIZE {
            bail!(
                "pool coinbase info is {info_len} bytes, more than fits in a coinbase scriptSig ({})",
                CoinbaseBuilder::MAX_COINBASE_SCRIPT_SIG_SIZE
            );
        }

        Ok(())
    }

    pub fn chain(&self) -> Chain {
        self.chain.unwrap_or_default()
    }

    pub fn server_id(&self) -> u8 {
        self.server_id.unwrap_or(1)
    }

    pub fn pool_coinbase_info(&self) -> &str {
        self.pool_coinbase_info.as_deref().unwrap_or_default()
    }

    pub fn block_version(&self) -> u32 {
        self.block_version.unwrap_or_default()
    }

    pub fn payout_address(&self) -> Result<Address> {
        self.payout_address
            .clone()
            .map(|address| address.assume_checked())
            .ok_or_else(|| anyhow!("no payout address configured, use --payout-address"))
    }
}
