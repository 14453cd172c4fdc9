//! Transition predicates.
//!
//! Each transition is a pure function from a private witness to the
//! [`PublicInputs`] it commits to, or the first violated constraint:
//!
//! - **[`account`]**: register an alias, migrate an account key or add
//!   signing keys.
//! - **[`join_split`]**: spend up to two value notes into up to two new
//!   ones, optionally crossing the pool boundary or entering a DeFi bridge.
//! - **[`claim`]**: settle a DeFi interaction into a value note.
//!
//! Evaluations share no state. Tree roots arrive as plain field elements,
//! and nullifier uniqueness is left to the rollup, so independent
//! witnesses can be evaluated on any number of threads.
//!
//! ## Logging
//!
//! Rejections are logged at `debug` with the violated constraint,
//! acceptances at `trace`. No subscriber is installed here.

pub mod account;
pub mod claim;
pub mod join_split;
mod public_inputs;

use pasta_curves::Fp;
use tracing::{debug, trace};

pub use account::{AccountMode, AccountWitness};
pub use claim::ClaimWitness;
pub use join_split::{InputCount, InputNote, JoinSplitWitness, OutputNote, OutputSlot, Transfer};
pub use public_inputs::{PUBLIC_INPUTS_BYTES, PublicInputs};

use crate::{
    constants::ProofId,
    error::{CircuitError, ensure},
};

/// Private inputs of any transition.
#[derive(Clone, Copy, Debug)]
pub enum Witness {
    /// An account transition.
    Account(AccountWitness),
    /// A join-split.
    JoinSplit(JoinSplitWitness),
    /// A DeFi claim.
    Claim(ClaimWitness),
}

impl Witness {
    /// The proof kind this witness proves.
    #[must_use]
    pub const fn proof_id(&self) -> ProofId {
        match *self {
            Self::Account(_) => ProofId::Account,
            Self::JoinSplit(join_split) => join_split.transfer.proof_id(),
            Self::Claim(_) => ProofId::DefiClaim,
        }
    }
}

/// Evaluate the transition tagged `proof_id`.
///
/// The tag arrives from the wire, so it is parsed here and must agree
/// with the kind of witness supplied.
pub fn evaluate(proof_id: Fp, witness: &Witness) -> Result<PublicInputs, CircuitError> {
    let tag = ProofId::try_from(proof_id)?;
    ensure(tag == witness.proof_id(), CircuitError::WrongProofId).inspect_err(|err| {
        debug!(proof_id = ?tag, %err, "transition rejected");
    })?;
    match *witness {
        Witness::Account(account) => account::evaluate(&account),
        Witness::JoinSplit(join_split) => join_split::evaluate(&join_split),
        Witness::Claim(claim) => claim::evaluate(&claim),
    }
}

/// Log the outcome of a transition.
fn finish(
    proof_id: ProofId,
    result: Result<PublicInputs, CircuitError>,
) -> Result<PublicInputs, CircuitError> {
    result
        .inspect(|_outputs| trace!(?proof_id, "transition accepted"))
        .inspect_err(|err| debug!(?proof_id, %err, "transition rejected"))
}

#[cfg(test)]
mod tests {
    use std::thread;

    use ff::Field as _;
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;
    use crate::{
        bridge::BridgeCallData,
        note::{ClaimNote, DefiInteractionNote, PartialClaimNote, ValueNote},
        testing::{JoinSplitFixture, SparseTree, account_witness, claim_witness},
    };

    const fn assert_send_sync<T: Send + Sync>() {}
    const _: () = assert_send_sync::<Witness>();
    const _: () = assert_send_sync::<PublicInputs>();

    fn witnesses(rng: &mut StdRng) -> Vec<Witness> {
        let (account, _keys) = account_witness(rng, AccountMode::Create);
        let send =
            JoinSplitFixture::new(rng, Transfer::Send, InputCount::Two, [5, 6], [7, 4], 0).unwrap();
        vec![
            Witness::Account(account),
            Witness::JoinSplit(send.witness),
            Witness::Claim(claim_witness(rng, 10, true, 12).unwrap()),
        ]
    }

    #[test]
    fn dispatch_checks_proof_id() {
        let mut rng = StdRng::seed_from_u64(0);
        for witness in witnesses(&mut rng) {
            evaluate(witness.proof_id().into(), &witness).unwrap();
            let other = if witness.proof_id() == ProofId::Account {
                ProofId::DefiClaim
            } else {
                ProofId::Account
            };
            assert_eq!(
                evaluate(other.into(), &witness),
                Err(CircuitError::WrongProofId)
            );
        }
        let any = witnesses(&mut rng).pop().unwrap();
        assert_eq!(
            evaluate(Fp::from(17u64), &any),
            Err(CircuitError::UnknownProofId)
        );
    }

    /// Independent witnesses evaluate identically on separate threads.
    #[test]
    fn parallel_evaluation() {
        let mut rng = StdRng::seed_from_u64(1);
        let batch: Vec<Witness> = (0..4).flat_map(|_| witnesses(&mut rng)).collect();
        let sequential: Vec<_> = batch
            .iter()
            .map(|witness| evaluate(witness.proof_id().into(), witness))
            .collect();

        let parallel: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|witness| scope.spawn(move || evaluate(witness.proof_id().into(), witness)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });
        assert_eq!(parallel, sequential);
        assert!(sequential.iter().all(Result::is_ok));
    }

    /// A DeFi deposit's partial claim, once the rollup completes it and
    /// publishes the interaction, settles into a note its owner can spend.
    #[test]
    fn deposit_then_claim() {
        let mut rng = StdRng::seed_from_u64(2);
        let bridge = BridgeCallData {
            bridge_address_id: 2,
            input_asset_id_a: 0,
            input_asset_id_b: None,
            output_asset_id_a: 5,
            output_asset_id_b: None,
            aux_data: 1,
        };
        let deposit_value = Fp::from(40u64);
        let transfer = Transfer::DefiDeposit {
            bridge_call_data: bridge,
            deposit_value,
        };
        let deposit =
            JoinSplitFixture::new(&mut rng, transfer, InputCount::One, [40, 0], [0, 0], 0)
                .unwrap();
        let deposited = evaluate(ProofId::DefiDeposit.into(), &Witness::JoinSplit(deposit.witness))
            .unwrap();

        let [nf1, _nf2] = deposit.witness.nullifiers();
        let [out1, _out2] = deposit.witness.outputs;
        let creator_pk = deposit.witness.spender().x;
        let partial = PartialClaimNote {
            deposit_value,
            bridge_call_data: bridge.encode().unwrap(),
            value_note_partial_commitment: out1.to_note(creator_pk).partial().commitment(),
            input_nullifier: nf1,
        };
        assert_eq!(deposited.commitments.first(), Some(&partial.commitment()));

        let nonce = Fp::from(64u64);
        let claim_note = ClaimNote {
            partial,
            defi_interaction_nonce: nonce,
        };
        assert_eq!(
            ClaimNote::complete(partial.commitment(), nonce),
            claim_note.commitment()
        );
        let defi_note = DefiInteractionNote {
            bridge_call_data: partial.bridge_call_data,
            interaction_nonce: nonce,
            total_input_value: deposit_value,
            total_output_value_a: Fp::from(38u64),
            total_output_value_b: Fp::ZERO,
            interaction_result: true,
        };
        let mut tree = SparseTree::new();
        tree.insert(10, claim_note.commitment().into());
        tree.insert(11, defi_note.commitment().into());
        let claim = ClaimWitness {
            claim_note,
            claim_note_index: 10,
            claim_note_path: tree.path(10),
            defi_note,
            defi_note_index: 11,
            defi_note_path: tree.path(11),
            output_value_a: Fp::from(38u64),
            data_root: tree.root(),
        };
        let claimed = evaluate(ProofId::DefiClaim.into(), &Witness::Claim(claim)).unwrap();

        let spendable = ValueNote {
            value: Fp::from(38u64),
            asset_id: Fp::from(5u64),
            input_nullifier: claim_note.nullifier(),
            ..out1.to_note(creator_pk)
        };
        assert_eq!(claimed.commitments.first(), Some(&spendable.commitment()));
    }
}
