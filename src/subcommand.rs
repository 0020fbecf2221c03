use super::*;

mod decode;
mod header;
mod job;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
    #[command(about = "Decode a share buffer of any generation")]
    Decode(decode::Decode),
    #[command(about = "Parse a fixed block header record")]
    Header(header::HeaderCmd),
    #[command(about = "Build a job from a block template")]
    Job(job::JobCmd),
}

impl Subcommand {
    pub(crate) fn run(self, settings: Settings) -> Result {
        match self {
            Self::Decode(decode) => decode.run(&settings),
            Self::Header(header) => header.run(&settings),
            Self::Job(job) => job.run(&settings),
        }
    }
}
