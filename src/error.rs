use super::*;

/// Failures of the share codec and the fixed header records.
///
/// None of these are retried internally. A failed decode produces no share
/// and the caller decides whether to drop, log or penalize the submitter.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CodecError {
    #[snafu(display("Malformed buffer: {len} bytes"))]
    MalformedBuffer { len: usize },

    #[snafu(display("Unrecognized share encoding (tag {tag:#010x}, {len} bytes)"))]
    UnrecognizedEncoding { tag: u32, len: usize },

    #[snafu(display("Share checksum mismatch: stored {stored:#010x}, computed {computed:#010x}"))]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[snafu(display("Failed to decode tagged share payload: {source}"))]
    SchemaDecodeFailure { source: prost::DecodeError },

    #[snafu(display("Share is missing required fields: {fields}"))]
    IncompleteFields { fields: String },

    #[snafu(display("Serialization failure: {message}"))]
    SerializationFailure { message: String },

    #[snafu(display("Failed to parse block header: {message}"))]
    HeaderParseFailure { message: String },
}

/// Failures while building a job from a block template.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum JobError {
    #[snafu(display("Invalid block template message: {source}"))]
    TemplateJson { source: serde_json::Error },

    #[snafu(display("Invalid base64 block template: {source}"))]
    TemplateBase64 { source: base64::DecodeError },

    #[snafu(display("Block template response has no result"))]
    TemplateMissing,

    #[snafu(display("Invalid hex in `{field}`: {source}"))]
    Hex {
        field: &'static str,
        source: hex::FromHexError,
    },

    #[snafu(display("Invalid auxiliary block: {source}"))]
    AuxJson { source: serde_json::Error },

    #[snafu(display("Invalid RSK work: {message}"))]
    RskWork { message: String },

    #[snafu(display("Block height {height} out of range"))]
    Height { height: u64 },

    #[snafu(display("Script sig is {size} bytes (must be between {min} and {max})"))]
    ScriptSigSize { size: usize, min: usize, max: usize },

    #[snafu(display("Failed to serialize job: {source}"))]
    JobJson { source: serde_json::Error },
}
