use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Decode {
    #[arg(help = "Share buffer as <HEX>.")]
    buffer: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Output {
    pub share: Share,
    pub status: String,
    pub valid: bool,
    pub score: f64,
}

impl Decode {
    pub(crate) fn run(self, settings: &Settings) -> Result {
        println!("{}", serde_json::to_string_pretty(&self.output(settings.chain())?)?);
        Ok(())
    }

    fn output(&self, chain: Chain) -> Result<Output> {
        let buffer = hex::decode(self.buffer.trim())
            .map_err(|err| anyhow!("share buffer is not valid hex: {err}"))?;

        let share = Share::decode(&buffer, chain)?;

        info!("Decoded {share}");

        Ok(Output {
            status: share.status.to_string(),
            valid: share.is_valid(),
            score: share.score(),
            share,
        })
    }
}
