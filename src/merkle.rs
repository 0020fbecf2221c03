use super::*;

/// Merkle root of a block whose coinbase is `coinbase`, folding in `branch`
/// in order.
pub fn merkle_root(coinbase: &[u8], branch: &[TxMerkleNode]) -> TxMerkleNode {
    let mut root = sha256d::Hash::hash(coinbase);

    for node in branch {
        let mut concat = [0u8; 64];
        concat[..32].copy_from_slice(root.as_byte_array());
        concat[32..].copy_from_slice(node.as_byte_array());
        root = sha256d::Hash::hash(&concat);
    }

    TxMerkleNode::from_raw_hash(root)
}

/// Siblings on the path from the coinbase (index 0) to the root, given the
/// ids of every non-coinbase transaction in block order.
pub fn merkle_branch(transactions: &[TxMerkleNode]) -> Vec<TxMerkleNode> {
    if transactions.is_empty() {
        return Vec::new();
    }

    let mut level = Vec::with_capacity(transactions.len() + 1);
    level.push(TxMerkleNode::all_zeros());
    level.extend_from_slice(transactions);

    let mut branch = Vec::new();

    while level.len() > 1 {
        branch.push(level[1]);

        level = level
            .chunks(2)
            .map(|pair| {
                let left = pair[0];
                let right = pair.get(1).copied().unwrap_or(left);

                let mut engine = TxMerkleNode::engine();
                engine.input(left.as_byte_array());
                engine.input(right.as_byte_array());
                TxMerkleNode::from_engine(engine)
            })
            .collect();
    }

    branch
}
