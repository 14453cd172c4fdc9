//! Settlement of a DeFi interaction into a value note.
//!
//! A DeFi deposit leaves a claim note in the data tree. Once the rollup
//! has run the bridge interaction and published its
//! [`DefiInteractionNote`], anyone holding the claim can settle it: the
//! claim completes the depositor's partial value note with the realized
//! value and asset.
//!
//! | Outcome | Value | Asset |
//! | ------- | ----- | ----- |
//! | success | `output_value_a` | bridge output asset A |
//! | failure | deposit value | bridge input asset A |
//!
//! Only the first output is minted. Splitting the outcome across a second
//! output asset, and checking `output_value_a` against the interaction's
//! totals pro rata, are not constrained; the second commitment slot is
//! always zero.

use pasta_curves::Fp;

use super::{PublicInputs, finish};
use crate::{
    bridge::BridgeCallData,
    constants::{NOTE_VALUE_BIT_LENGTH, ProofId},
    error::{CircuitError, ensure},
    note::{ClaimNote, Commitment, DefiInteractionNote, ValueNote},
    primitives::{MerklePath, check_membership, range_check},
};

/// Private inputs of a claim.
#[derive(Clone, Copy, Debug)]
pub struct ClaimWitness {
    /// The claim being settled.
    pub claim_note: ClaimNote,
    /// Leaf position of the claim note.
    pub claim_note_index: u32,
    /// Authentication path of the claim note.
    pub claim_note_path: MerklePath,
    /// The published interaction the claim settles against.
    pub defi_note: DefiInteractionNote,
    /// Leaf position of the interaction note.
    pub defi_note_index: u32,
    /// Authentication path of the interaction note.
    pub defi_note_path: MerklePath,
    /// This claim's share of the interaction output, used on success.
    pub output_value_a: Fp,
    /// Data tree root both notes are checked against.
    pub data_root: Fp,
}

impl ClaimWitness {
    /// Realized value and asset of the minted note.
    pub fn outcome(&self) -> Result<(Fp, Fp), CircuitError> {
        let bridge = BridgeCallData::try_from(self.claim_note.partial.bridge_call_data)?;
        Ok(if self.defi_note.interaction_result {
            (
                self.output_value_a,
                Fp::from(u64::from(bridge.output_asset_id_a)),
            )
        } else {
            (
                self.claim_note.partial.deposit_value,
                Fp::from(u64::from(bridge.input_asset_id_a)),
            )
        })
    }
}

fn constrain(witness: &ClaimWitness) -> Result<PublicInputs, CircuitError> {
    let claim = witness.claim_note;
    let defi = witness.defi_note;

    range_check(
        &claim.partial.deposit_value,
        NOTE_VALUE_BIT_LENGTH,
        "deposit_value",
    )?;
    range_check(
        &witness.output_value_a,
        NOTE_VALUE_BIT_LENGTH,
        "output_value_a",
    )?;

    ensure(
        claim.partial.bridge_call_data == defi.bridge_call_data,
        CircuitError::Claim("bridge call data differs from the interaction's"),
    )?;
    ensure(
        claim.defi_interaction_nonce == defi.interaction_nonce,
        CircuitError::Claim("interaction nonce differs from the interaction's"),
    )?;
    let (value, asset_id) = witness.outcome()?;

    let claim_commitment = claim.commitment();
    ensure(
        check_membership(
            witness.data_root,
            claim_commitment.into(),
            witness.claim_note_index,
            &witness.claim_note_path,
        ),
        CircuitError::Membership("claim note"),
    )?;
    ensure(
        check_membership(
            witness.data_root,
            defi.commitment().into(),
            witness.defi_note_index,
            &witness.defi_note_path,
        ),
        CircuitError::Membership("defi interaction note"),
    )?;

    let claim_nullifier = claim.nullifier();
    let minted = ValueNote::complete(
        claim.partial.value_note_partial_commitment,
        value,
        asset_id,
        claim_nullifier,
    );

    Ok(PublicInputs {
        commitments: [minted, Commitment::default()],
        nullifiers: [claim_nullifier, defi.nullifier()],
        data_root: witness.data_root,
        bridge_call_data: claim.partial.bridge_call_data,
        defi_deposit_value: claim.partial.deposit_value,
        ..PublicInputs::empty(ProofId::DefiClaim)
    })
}

/// Evaluate a claim.
pub fn evaluate(witness: &ClaimWitness) -> Result<PublicInputs, CircuitError> {
    finish(ProofId::DefiClaim, constrain(witness))
}
