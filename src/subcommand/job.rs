use super::*;

#[derive(Debug, Parser)]
pub(crate) struct JobCmd {
    #[arg(long, help = "Read the block template message from <GBT>.")]
    gbt: PathBuf,
    #[arg(long, help = "Read the Namecoin aux block JSON from <NMC_AUX>.")]
    nmc_aux: Option<PathBuf>,
    #[arg(long, help = "Read RSK work JSON from <RSK_WORK>.")]
    rsk_work: Option<PathBuf>,
    #[arg(long, help = "Mark the job as triggered by merged-mining work.")]
    merged_mining_update: bool,
}

impl JobCmd {
    pub(crate) fn run(self, settings: &Settings) -> Result {
        println!("{}", self.build(settings)?.serialize_to_json()?);
        Ok(())
    }

    fn build(&self, settings: &Settings) -> Result<Job> {
        let gbt = read(&self.gbt)?;

        let nmc_aux = self.nmc_aux.as_deref().map(read).transpose()?;

        let rsk_work = self
            .rsk_work
            .as_deref()
            .map(|path| Ok::<_, anyhow::Error>(RskWork::parse(&read(path)?)?))
            .transpose()?;

        let mut builder = JobBuilder::new(
            &gbt,
            settings.pool_coinbase_info(),
            settings.payout_address()?,
            settings.block_version(),
            settings.server_id(),
        )
        .chain(settings.chain())
        .merged_mining_update(self.merged_mining_update);

        if let Some(json) = &nmc_aux {
            builder = builder.nmc_aux_block(json);
        }

        if let Some(work) = rsk_work {
            builder = builder.rsk_work(work);
        }

        Ok(builder.build()?)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| anyhow!("failed to read `{}`: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Write};

    const TEMPLATE: &str = r#"{
        "bits": "1d00ffff",
        "previousblockhash": "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f",
        "curtime": 1231469665,
        "height": 1,
        "version": 1,
        "transactions": [],
        "coinbasevalue": 5000000000
    }"#;

    fn file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn settings() -> Settings {
        Settings {
            payout_address: Some("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".parse().unwrap()),
            server_id: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn build_from_files() {
        let template = serde_json::from_str::<BlockTemplate>(TEMPLATE).unwrap();
        let gbt = file(
            &serde_json::to_string(&GbtMessage::new(1231469666, &template, "ff").unwrap()).unwrap(),
        );

        let job = JobCmd {
            gbt: gbt.path().into(),
            nmc_aux: None,
            rsk_work: None,
            merged_mining_update: false,
        }
        .build(&settings())
        .unwrap();

        assert_eq!(job.height, 1);
        assert_eq!((job.job_id >> 24) & 0xff, 2);
        assert!(job.is_empty_block());
    }

    #[test]
    fn missing_payout_address() {
        let gbt = file("{}");

        let err = JobCmd {
            gbt: gbt.path().into(),
            nmc_aux: None,
            rsk_work: None,
            merged_mining_update: false,
        }
        .build(&Settings::default())
        .unwrap_err();

        assert!(err.to_string().contains("no payout address"));
    }

    #[test]
    fn missing_template_file() {
        let err = JobCmd {
            gbt: "/nonexistent/gbt.json".into(),
            nmc_aux: None,
            rsk_work: None,
            merged_mining_update: false,
        }
        .build(&settings())
        .unwrap_err();

        assert!(err.to_string().contains("failed to read"));
    }
}
