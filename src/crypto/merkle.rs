//! Merkle path folding
//!
//! A path is the list of sibling hashes from a leaf up to the root. The leaf
//! index decides, layer by layer, whether the running hash sits on the left
//! (even) or on the right (odd) of its sibling.

use super::hash::SHA256_SIZE;

pub type Hash32 = [u8; SHA256_SIZE];

fn hash_pair(left: &[u8], right: &[u8], hasher: fn(&[u8]) -> Hash32) -> Hash32 {
    let mut data = Vec::with_capacity(left.len() + right.len());
    data.extend_from_slice(left);
    data.extend_from_slice(right);
    hasher(&data)
}

/// Fold `subject` with its sibling `layers` into the root hash
pub fn fold_merkle_path(
    subject: &Hash32,
    index: u32,
    layers: &[Hash32],
    hasher: fn(&[u8]) -> Hash32,
) -> Hash32 {
    let mut cursor = *subject;
    let mut layer_index = index;

    for sibling in layers {
        cursor = if layer_index & 1 == 0 {
            hash_pair(&cursor, sibling, hasher)
        } else {
            hash_pair(sibling, &cursor, hasher)
        };
        layer_index >>= 1;
    }

    cursor
}

/// Calculate the root of a Bitcoin-style tree (odd levels duplicate their last hash)
pub fn calculate_merkle_root(leaves: &[Hash32], hasher: fn(&[u8]) -> Hash32) -> Option<Hash32> {
    let mut level: Vec<Hash32> = leaves.to_vec();
    if level.is_empty() {
        return None;
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], pair.get(1).unwrap_or(&pair[0]), hasher))
            .collect();
    }

    level.into_iter().next()
}

/// Collect the sibling layers proving `leaves[index]`
pub fn merkle_path_layers(
    leaves: &[Hash32],
    index: usize,
    hasher: fn(&[u8]) -> Hash32,
) -> Option<Vec<Hash32>> {
    if index >= leaves.len() {
        return None;
    }

    let mut layers = Vec::new();
    let mut level: Vec<Hash32> = leaves.to_vec();
    let mut position = index;

    while level.len() > 1 {
        let sibling = position ^ 1;
        layers.push(*level.get(sibling).unwrap_or(&level[position]));

        level = level
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], pair.get(1).unwrap_or(&pair[0]), hasher))
            .collect();
        position >>= 1;
    }

    Some(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::{double_sha256, sha256};

    #[test]
    fn test_merkle_root_two() {
        let leaves = [sha256(b"tx1"), sha256(b"tx2")];
        let root = calculate_merkle_root(&leaves, double_sha256).unwrap();
        assert_eq!(root, hash_pair(&leaves[0], &leaves[1], double_sha256));
    }

    #[test]
    fn test_path_folds_to_root() {
        let leaves = [sha256(b"tx1"), sha256(b"tx2"), sha256(b"tx3"), sha256(b"tx4"), sha256(b"tx5")];
        let root = calculate_merkle_root(&leaves, double_sha256).unwrap();

        for index in 0..leaves.len() {
            let layers = merkle_path_layers(&leaves, index, double_sha256).unwrap();
            assert_eq!(layers.len(), 3);
            assert_eq!(
                fold_merkle_path(&leaves[index], index as u32, &layers, double_sha256),
                root
            );
        }
    }

    #[test]
    fn test_wrong_index_misses_root() {
        let leaves = [sha256(b"tx1"), sha256(b"tx2"), sha256(b"tx3")];
        let root = calculate_merkle_root(&leaves, sha256).unwrap();
        let layers = merkle_path_layers(&leaves, 1, sha256).unwrap();
        assert_ne!(fold_merkle_path(&leaves[1], 0, &layers, sha256), root);
    }

    #[test]
    fn test_empty_tree() {
        assert!(calculate_merkle_root(&[], sha256).is_none());
        assert!(merkle_path_layers(&[], 0, sha256).is_none());
    }
}
