//! Data tree membership.
//!
//! The data tree itself (insertion, root history) lives outside this crate.
//! Transitions only check that a leaf hashes up to a caller-supplied root
//! along a caller-supplied authentication path.

use bitvec::{order::Lsb0, view::BitView as _};
use pasta_curves::Fp;

use super::hash::commit;
use crate::constants::{DATA_TREE_DEPTH, MERKLE_NODE_PERSONALIZATION};

const _: () = assert!(
    DATA_TREE_DEPTH == 32,
    "leaf indices are u32; one index bit per level"
);

/// Hash two sibling nodes into their parent.
#[must_use]
pub fn node_hash(left: Fp, right: Fp) -> Fp {
    commit(MERKLE_NODE_PERSONALIZATION, &[left, right])
}

/// Authentication path for one data tree leaf: the sibling at every level,
/// leaf level first.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MerklePath([Fp; DATA_TREE_DEPTH]);

impl From<[Fp; DATA_TREE_DEPTH]> for MerklePath {
    fn from(siblings: [Fp; DATA_TREE_DEPTH]) -> Self {
        Self(siblings)
    }
}

impl MerklePath {
    /// The siblings, leaf level first.
    #[must_use]
    pub const fn siblings(&self) -> &[Fp; DATA_TREE_DEPTH] {
        &self.0
    }

    /// Root obtained by hashing `leaf` at position `index` up this path.
    ///
    /// Bit `i` of `index` (least significant first) says whether the
    /// running node is the right child at level `i`.
    #[must_use]
    pub fn root(&self, leaf: Fp, index: u32) -> Fp {
        index
            .view_bits::<Lsb0>()
            .iter()
            .by_vals()
            .zip(self.0.iter())
            .fold(leaf, |node, (is_right, sibling)| {
                if is_right {
                    node_hash(*sibling, node)
                } else {
                    node_hash(node, *sibling)
                }
            })
    }
}

/// `check_merkle_membership(root, leaf, index, path)`.
#[must_use]
pub fn check_membership(root: Fp, leaf: Fp, index: u32, path: &MerklePath) -> bool {
    path.root(leaf, index) == root
}
