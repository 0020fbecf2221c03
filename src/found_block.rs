use super::*;

/// Capacity of the worker name buffer, terminator included.
pub const WORKER_FULL_NAME_SIZE: usize = 40;

/// Notification handed to the block submitter when a share solves a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundBlock<H: HeaderRecord = BitcoinHeaderData> {
    pub job_id: u64,
    pub worker_id: i64,
    pub user_id: i32,
    pub height: i32,
    pub header_data: H,
    #[serde(
        serialize_with = "serialize_worker_full_name",
        deserialize_with = "deserialize_worker_full_name"
    )]
    worker_full_name: [u8; WORKER_FULL_NAME_SIZE],
}

impl<H: HeaderRecord + Default> Default for FoundBlock<H> {
    fn default() -> Self {
        Self {
            job_id: 0,
            worker_id: 0,
            user_id: 0,
            height: 0,
            header_data: H::default(),
            worker_full_name: [0; WORKER_FULL_NAME_SIZE],
        }
    }
}

impl<H: HeaderRecord> FoundBlock<H> {
    pub fn from_job(
        job: &Job,
        header_data: H,
        worker_id: i64,
        user_id: i32,
        worker_full_name: &str,
    ) -> Self {
        let mut found = Self {
            job_id: job.job_id,
            worker_id,
            user_id,
            height: job.height,
            header_data,
            worker_full_name: [0; WORKER_FULL_NAME_SIZE],
        };
        found.set_worker_full_name(worker_full_name);
        found
    }

    /// Stores `user.worker`, cut to the last character boundary that fits
    /// before the terminator.
    pub fn set_worker_full_name(&mut self, name: &str) {
        self.worker_full_name = name_buffer(name);
    }

    pub fn worker_full_name(&self) -> &str {
        name_str(&self.worker_full_name)
    }

    pub fn worker_full_name_bytes(&self) -> &[u8; WORKER_FULL_NAME_SIZE] {
        &self.worker_full_name
    }
}

fn name_buffer(name: &str) -> [u8; WORKER_FULL_NAME_SIZE] {
    let mut end = name.len().min(WORKER_FULL_NAME_SIZE - 1);
    while !name.is_char_boundary(end) {
        end -= 1;
    }

    if end < name.len() {
        debug!("Truncating worker name {name:?} to {end} bytes");
    }

    let mut buf = [0; WORKER_FULL_NAME_SIZE];
    buf[..end].copy_from_slice(&name.as_bytes()[..end]);
    buf
}

fn name_str(buf: &[u8]) -> &str {
    let len = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    std::str::from_utf8(&buf[..len]).unwrap_or_default()
}

fn serialize_worker_full_name<S: Serializer>(
    buf: &[u8; WORKER_FULL_NAME_SIZE],
    ser: S,
) -> Result<S::Ok, S::Error> {
    ser.serialize_str(name_str(buf))
}

fn deserialize_worker_full_name<'de, D: Deserializer<'de>>(
    de: D,
) -> Result<[u8; WORKER_FULL_NAME_SIZE], D::Error> {
    Ok(name_buffer(&String::deserialize(de)?))
}
