use {
    super::*,
    bitcoin::{block::Header, hashes::Hash},
};

#[test]
fn from_job() {
    let job = JobBuilder::new(&gbt(), "", address(), 0, 1).build().unwrap();

    let header = Header {
        version: bitcoin::block::Version::from_consensus(job.n_version),
        prev_blockhash: job.prev_hash,
        merkle_root: bitcoin::TxMerkleNode::from_byte_array([9; 32]),
        time: job.n_time,
        bits: bitcoin::CompactTarget::from_consensus(job.n_bits),
        nonce: 7,
    };

    let found = FoundBlock::from_job(
        &job,
        BitcoinHeaderData::from(&header),
        -12,
        34,
        "alice.a-worker-name-that-is-far-too-long-to-fit",
    );

    assert_eq!(found.job_id, job.job_id);
    assert_eq!(found.height, job.height);
    assert_eq!(found.worker_id, -12);
    assert_eq!(found.user_id, 34);
    assert_eq!(found.worker_full_name().len(), 39);
    assert_eq!(found.worker_full_name_bytes()[39], 0);
    assert!(found.worker_full_name().starts_with("alice.a-worker"));
    assert_eq!(found.header_data.get().unwrap(), header);

    let json = serde_json::to_string(&found).unwrap();
    pretty_assert_eq!(serde_json::from_str::<FoundBlock>(&json).unwrap(), found);
}

#[test]
fn equihash_found_block_defaults() {
    let found = FoundBlock::<EquihashHeaderData>::default();
    assert_eq!(found.header_data.as_bytes().len(), EquihashHeaderData::SIZE);
    assert_eq!(found.worker_full_name(), "");
}
