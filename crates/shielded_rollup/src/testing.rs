//! Fixtures: an in-memory data tree and builders for valid witnesses.
//!
//! Every builder returns a witness that evaluates successfully. Tests
//! break exactly one invariant on top of it.

use alloc::collections::BTreeMap;

use ff::Field as _;
use pasta_curves::Fp;
use rand::{CryptoRng, RngCore};

use crate::{
    bridge::BridgeCallData,
    circuit::{
        AccountMode, AccountWitness, ClaimWitness, InputCount, InputNote, JoinSplitWitness,
        OutputNote, Transfer,
    },
    constants::DATA_TREE_DEPTH,
    error::CircuitError,
    keys::{PrivateKey, Signature},
    note::{
        AccountNote, ClaimNote, DefiInteractionNote, Nullifier, PartialClaimNote,
        PartialValueNote, ValueNote,
    },
    primitives::{MerklePath, node_hash},
};

/// A sparse data tree: unset leaves are zero.
#[derive(Clone, Debug)]
pub struct SparseTree {
    leaves: BTreeMap<u64, Fp>,
    /// Root of an empty subtree at each height.
    empty: [Fp; DATA_TREE_DEPTH + 1],
}

impl Default for SparseTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseTree {
    /// An empty tree.
    #[must_use]
    pub fn new() -> Self {
        let mut empty = [Fp::ZERO; DATA_TREE_DEPTH + 1];
        let mut node = Fp::ZERO;
        for slot in &mut empty {
            *slot = node;
            node = node_hash(node, node);
        }
        Self {
            leaves: BTreeMap::new(),
            empty,
        }
    }

    /// Set the leaf at `index`.
    pub fn insert(&mut self, index: u32, leaf: Fp) {
        self.leaves.insert(u64::from(index), leaf);
    }

    /// Root of the whole tree.
    #[must_use]
    pub fn root(&self) -> Fp {
        self.node(DATA_TREE_DEPTH, 0)
    }

    /// Authentication path of the leaf at `index`.
    #[must_use]
    pub fn path(&self, index: u32) -> MerklePath {
        let position = u64::from(index);
        MerklePath::from(core::array::from_fn(|level| {
            self.node(level, (position >> level) ^ 1)
        }))
    }

    /// The node at `height` above the leaves, `index` from the left.
    fn node(&self, height: usize, index: u64) -> Fp {
        let first_leaf = index << height;
        let populated = self
            .leaves
            .range(first_leaf..(index + 1) << height)
            .next()
            .is_some();
        if !populated {
            return self.empty.get(height).copied().unwrap_or(Fp::ZERO);
        }
        match height.checked_sub(1) {
            None => self.leaves.get(&index).copied().unwrap_or(Fp::ZERO),
            Some(below) => node_hash(self.node(below, index * 2), self.node(below, index * 2 + 1)),
        }
    }
}

/// Private keys behind an [`account_witness`].
#[derive(Clone, Copy, Debug)]
pub struct AccountKeys {
    /// The account key.
    pub account: PrivateKey,
    /// A signing key registered for the account.
    pub signer: PrivateKey,
}

/// A valid account transition in `mode`.
///
/// Outside of creation, the signing key's account note sits at index 5.
pub fn account_witness(
    rng: &mut (impl RngCore + CryptoRng),
    mode: AccountMode,
) -> (AccountWitness, AccountKeys) {
    let keys = AccountKeys {
        account: PrivateKey::random(rng),
        signer: PrivateKey::random(rng),
    };
    let alias_hash = Fp::from(rng.next_u64());
    let account_public_key = keys.account.public_key();
    let new_account_public_key = match mode {
        AccountMode::Migrate => PrivateKey::random(rng).public_key(),
        AccountMode::Create | AccountMode::AddSigningKeys => account_public_key,
    };
    let new_signing_public_keys = [
        PrivateKey::random(rng).public_key(),
        PrivateKey::random(rng).public_key(),
    ];

    let mut tree = SparseTree::new();
    let (signing_public_key, signer) = match mode {
        AccountMode::Create => (account_public_key, keys.account),
        AccountMode::Migrate | AccountMode::AddSigningKeys => {
            let registered = AccountNote {
                alias_hash,
                account_public_key,
                signing_public_key: keys.signer.public_key(),
            };
            tree.insert(5, registered.commitment().into());
            (keys.signer.public_key(), keys.signer)
        },
    };

    let mut witness = AccountWitness {
        mode,
        alias_hash,
        account_public_key,
        new_account_public_key,
        new_signing_public_keys,
        signing_public_key,
        signature: Signature::from([0u8; 64]),
        data_tree_root: tree.root(),
        account_note_index: 5,
        account_note_path: tree.path(5),
    };
    witness.signature = signer.sign(rng, witness.signing_message());
    (witness, keys)
}

/// A valid join-split with its signing key and data tree.
///
/// Inputs sit at indices 0 and 1, the spender's account note at 2. Both
/// outputs go to one fresh recipient. Everything is in asset 0.
#[derive(Clone, Debug)]
pub struct JoinSplitFixture {
    /// The signed witness.
    pub witness: JoinSplitWitness,
    /// The key that signs the witness.
    pub signer: PrivateKey,
    /// Data tree holding the inputs and, when required, the account note.
    pub tree: SparseTree,
}

impl JoinSplitFixture {
    /// Build a signed join-split. `tx_fee` must balance the values for the
    /// witness to be accepted.
    pub fn new(
        rng: &mut (impl RngCore + CryptoRng),
        transfer: Transfer,
        num_inputs: InputCount,
        input_values: [u64; 2],
        output_values: [u64; 2],
        tx_fee: u64,
    ) -> Result<Self, CircuitError> {
        let account_private_key = PrivateKey::random(rng);
        let spender = account_private_key.public_key();
        let recipient = PrivateKey::random(rng).public_key();
        let asset_id = Fp::ZERO;

        let inputs = input_values.map(|value| InputNote {
            note: ValueNote {
                value: Fp::from(value),
                secret: Fp::random(&mut *rng),
                owner: spender,
                asset_id,
                account_required: false,
                creator_pk: Fp::ZERO,
                input_nullifier: Nullifier::from(Fp::random(&mut *rng)),
            },
            index: 0,
            path: MerklePath::default(),
        });
        let outputs = output_values.map(|value| OutputNote {
            value: Fp::from(value),
            secret: Fp::random(&mut *rng),
            owner: recipient,
            asset_id,
            account_required: false,
            creator: None,
            input_nullifier: Nullifier::default(),
        });

        let mut fixture = Self {
            witness: JoinSplitWitness {
                transfer,
                asset_id,
                num_inputs,
                inputs,
                outputs,
                account_private_key,
                account_required: false,
                alias_hash: Fp::from(rng.next_u64()),
                signing_public_key: spender,
                account_note_index: 2,
                account_note_path: MerklePath::default(),
                tx_fee: Fp::from(tx_fee),
                backward_link: None,
                allow_chain: None,
                signature: Signature::from([0u8; 64]),
                data_tree_root: Fp::ZERO,
            },
            signer: account_private_key,
            tree: SparseTree::new(),
        };
        fixture.refresh(rng)?;
        Ok(fixture)
    }

    /// Re-sign the witness as it stands.
    pub fn sign(&mut self, rng: &mut (impl RngCore + CryptoRng)) -> Result<(), CircuitError> {
        self.witness.signature = self.signer.sign(rng, self.witness.signing_message()?);
        Ok(())
    }

    /// Rebuild the tree from the current notes, rebind the outputs to the
    /// inputs' nullifiers, and re-sign.
    pub fn refresh(&mut self, rng: &mut (impl RngCore + CryptoRng)) -> Result<(), CircuitError> {
        let mut tree = SparseTree::new();
        for (index, input) in (0u32..).zip(self.witness.inputs.iter_mut()) {
            input.index = index;
            tree.insert(index, input.note.commitment().into());
        }
        if self.witness.account_required {
            let account_note = AccountNote {
                alias_hash: self.witness.alias_hash,
                account_public_key: self.witness.spender(),
                signing_public_key: self.witness.signing_public_key,
            };
            tree.insert(
                self.witness.account_note_index,
                account_note.commitment().into(),
            );
        }

        for input in &mut self.witness.inputs {
            input.path = tree.path(input.index);
        }
        self.witness.account_note_path = tree.path(self.witness.account_note_index);
        self.witness.data_tree_root = tree.root();

        let nullifiers = self.witness.nullifiers();
        for (output, nullifier) in self.witness.outputs.iter_mut().zip(nullifiers) {
            output.input_nullifier = nullifier;
        }
        self.tree = tree;
        self.sign(rng)
    }

    /// Switch to spending through a freshly registered signing key.
    pub fn require_account(
        &mut self,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<(), CircuitError> {
        let signer = PrivateKey::random(rng);
        self.witness.account_required = true;
        self.witness.signing_public_key = signer.public_key();
        for input in &mut self.witness.inputs {
            input.note.account_required = true;
        }
        self.signer = signer;
        self.refresh(rng)
    }
}

/// A valid claim against a one-asset bridge from asset 0 to asset 3.
///
/// The claim note sits at index 0, the interaction note at 1.
pub fn claim_witness(
    rng: &mut (impl RngCore + CryptoRng),
    deposit_value: u64,
    interaction_result: bool,
    output_value_a: u64,
) -> Result<ClaimWitness, CircuitError> {
    let bridge_call_data = BridgeCallData {
        bridge_address_id: 1,
        input_asset_id_a: 0,
        input_asset_id_b: None,
        output_asset_id_a: 3,
        output_asset_id_b: None,
        aux_data: 0,
    }
    .encode()?;
    let owner = PrivateKey::random(rng).public_key();
    let partial_value = PartialValueNote {
        secret: Fp::random(&mut *rng),
        owner,
        account_required: false,
        creator_pk: owner.x,
    };
    let interaction_nonce = Fp::from(u64::from(rng.next_u32()));

    let claim_note = ClaimNote {
        partial: PartialClaimNote {
            deposit_value: Fp::from(deposit_value),
            bridge_call_data,
            value_note_partial_commitment: partial_value.commitment(),
            input_nullifier: Nullifier::from(Fp::random(&mut *rng)),
        },
        defi_interaction_nonce: interaction_nonce,
    };
    let defi_note = DefiInteractionNote {
        bridge_call_data,
        interaction_nonce,
        total_input_value: Fp::from(deposit_value),
        total_output_value_a: Fp::from(output_value_a),
        total_output_value_b: Fp::ZERO,
        interaction_result,
    };

    let mut tree = SparseTree::new();
    tree.insert(0, claim_note.commitment().into());
    tree.insert(1, defi_note.commitment().into());
    Ok(ClaimWitness {
        claim_note,
        claim_note_index: 0,
        claim_note_path: tree.path(0),
        defi_note,
        defi_note_index: 1,
        defi_note_path: tree.path(1),
        output_value_a: Fp::from(output_value_a),
        data_root: tree.root(),
    })
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;
    use crate::primitives::check_membership;

    #[test]
    fn empty_root_is_empty_subtree() {
        let tree = SparseTree::new();
        let expected = (0..DATA_TREE_DEPTH).fold(Fp::ZERO, |node, _| node_hash(node, node));
        assert_eq!(tree.root(), expected);
    }

    /// Paths from the sparse tree verify for every inserted leaf, and
    /// agree with a root computed by hashing up the path.
    #[test]
    fn paths_verify() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut tree = SparseTree::new();
        let leaves: Vec<(u32, Fp)> = [0u32, 1, 7, 1 << 20, u32::MAX]
            .into_iter()
            .map(|index| (index, Fp::random(&mut rng)))
            .collect();
        for &(index, leaf) in &leaves {
            tree.insert(index, leaf);
        }
        let root = tree.root();
        for (index, leaf) in leaves {
            let path = tree.path(index);
            assert!(check_membership(root, leaf, index, &path));
            assert!(!check_membership(root, leaf + Fp::ONE, index, &path));
        }
    }
}
