//! The public output vector shared by every transition.

use ff::{Field as _, PrimeField as _};
use pasta_curves::Fp;

use super::join_split::OutputSlot;
use crate::{
    constants::{NUM_PUBLIC_INPUTS, ProofId},
    error::CircuitError,
    note::{Commitment, Nullifier},
};

/// Size of [`PublicInputs::to_bytes`].
pub const PUBLIC_INPUTS_BYTES: usize = NUM_PUBLIC_INPUTS * 32;

/// The public outputs of an accepted transition.
///
/// On the wire this is a fixed vector of [`NUM_PUBLIC_INPUTS`] field
/// elements with absent values zero-filled:
///
/// | Slot | Join-split / account | Claim |
/// | ---- | -------------------- | ----- |
/// | 0 | `proof_id` | `proof_id` |
/// | 1, 2 | `commitments` | `commitments` |
/// | 3, 4 | `nullifiers` | `nullifiers` |
/// | 5 | `public_value` | 0 |
/// | 6 | `public_owner` | 0 |
/// | 7 | `asset_id` | 0 |
/// | 8 | `data_root` | `data_root` |
/// | 9 | `tx_fee` | 0 |
/// | 10 | `tx_fee_asset_id` | `bridge_call_data` |
/// | 11 | `bridge_call_data` | `defi_deposit_value` |
/// | 12 | `defi_deposit_value` | 0 |
/// | 13 | `defi_root` | 0 |
/// | 14 | `backward_link` | 0 |
/// | 15 | `allow_chain` | 0 |
///
/// Claims carry no fee, so their bridge fields sit one slot lower.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(into = "[[u8; 32]; 16]", try_from = "[[u8; 32]; 16]")
)]
pub struct PublicInputs {
    /// Which transition produced these outputs.
    pub proof_id: ProofId,
    /// New note commitments; zero for an unused slot.
    pub commitments: [Commitment; 2],
    /// Nullifiers of consumed notes or claimed identifiers.
    pub nullifiers: [Nullifier; 2],
    /// Value entering or leaving the shielded pool.
    pub public_value: Fp,
    /// Public address funding a deposit or receiving a withdrawal.
    pub public_owner: Fp,
    /// Asset of the public value; zero unless depositing or withdrawing.
    pub asset_id: Fp,
    /// Data tree root the transition's membership checks ran against, or
    /// zero when it checked none.
    pub data_root: Fp,
    /// Fee paid to the rollup provider.
    pub tx_fee: Fp,
    /// Asset the fee is paid in. Not carried by claims.
    pub tx_fee_asset_id: Fp,
    /// Encoded bridge call data of a DeFi deposit or claim.
    pub bridge_call_data: Fp,
    /// Value sent to, or claimed from, a DeFi bridge.
    pub defi_deposit_value: Fp,
    /// Filled in by the rollup, always zero here.
    pub defi_root: Fp,
    /// Output commitment of an earlier transaction spent here.
    pub backward_link: Option<Fp>,
    /// Output a later transaction may spend before it is in the tree.
    pub allow_chain: Option<OutputSlot>,
}

impl PublicInputs {
    /// All-zero outputs for `proof_id`.
    #[must_use]
    pub fn empty(proof_id: ProofId) -> Self {
        Self {
            proof_id,
            commitments: [Commitment::default(); 2],
            nullifiers: [Nullifier::default(); 2],
            public_value: Fp::ZERO,
            public_owner: Fp::ZERO,
            asset_id: Fp::ZERO,
            data_root: Fp::ZERO,
            tx_fee: Fp::ZERO,
            tx_fee_asset_id: Fp::ZERO,
            bridge_call_data: Fp::ZERO,
            defi_deposit_value: Fp::ZERO,
            defi_root: Fp::ZERO,
            backward_link: None,
            allow_chain: None,
        }
    }

    /// The wire vector.
    #[must_use]
    pub fn to_fields(&self) -> [Fp; NUM_PUBLIC_INPUTS] {
        let [c1, c2] = self.commitments;
        let [nf1, nf2] = self.nullifiers;
        let (slot_10, slot_11, slot_12) = match self.proof_id {
            ProofId::DefiClaim => (self.bridge_call_data, self.defi_deposit_value, Fp::ZERO),
            ProofId::Account
            | ProofId::Deposit
            | ProofId::Withdraw
            | ProofId::Send
            | ProofId::DefiDeposit => (
                self.tx_fee_asset_id,
                self.bridge_call_data,
                self.defi_deposit_value,
            ),
        };
        [
            self.proof_id.into(),
            c1.into(),
            c2.into(),
            nf1.into(),
            nf2.into(),
            self.public_value,
            self.public_owner,
            self.asset_id,
            self.data_root,
            self.tx_fee,
            slot_10,
            slot_11,
            slot_12,
            self.defi_root,
            self.backward_link.unwrap_or(Fp::ZERO),
            OutputSlot::wire(self.allow_chain),
        ]
    }

    /// Parse a wire vector.
    ///
    /// Zero `backward_link` and `allow_chain` slots become `None`.
    pub fn from_fields(fields: [Fp; NUM_PUBLIC_INPUTS]) -> Result<Self, CircuitError> {
        let [
            tag,
            c1,
            c2,
            nf1,
            nf2,
            public_value,
            public_owner,
            asset_id,
            data_root,
            tx_fee,
            slot_10,
            slot_11,
            slot_12,
            defi_root,
            backward_link,
            allow_chain,
        ] = fields;
        let proof_id = ProofId::try_from(tag)?;
        let (tx_fee_asset_id, bridge_call_data, defi_deposit_value) = match proof_id {
            ProofId::DefiClaim => {
                if !bool::from(slot_12.is_zero()) {
                    return Err(CircuitError::Encoding("claim slot 12 must be zero"));
                }
                (Fp::ZERO, slot_10, slot_11)
            },
            ProofId::Account
            | ProofId::Deposit
            | ProofId::Withdraw
            | ProofId::Send
            | ProofId::DefiDeposit => (slot_10, slot_11, slot_12),
        };

        Ok(Self {
            proof_id,
            commitments: [c1.into(), c2.into()],
            nullifiers: [nf1.into(), nf2.into()],
            public_value,
            public_owner,
            asset_id,
            data_root,
            tx_fee,
            tx_fee_asset_id,
            bridge_call_data,
            defi_deposit_value,
            defi_root,
            backward_link: (!bool::from(backward_link.is_zero())).then_some(backward_link),
            allow_chain: OutputSlot::from_wire(allow_chain)?,
        })
    }

    /// The wire vector as 32-byte little-endian encodings, slot 0 first.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; PUBLIC_INPUTS_BYTES] {
        let mut bytes = [0u8; PUBLIC_INPUTS_BYTES];
        for (chunk, fp) in bytes.chunks_exact_mut(32).zip(self.to_fields()) {
            chunk.copy_from_slice(&fp.to_repr());
        }
        bytes
    }
}

impl From<PublicInputs> for [[u8; 32]; NUM_PUBLIC_INPUTS] {
    fn from(inputs: PublicInputs) -> Self {
        inputs.to_fields().map(|fp| fp.to_repr())
    }
}

impl TryFrom<[[u8; 32]; NUM_PUBLIC_INPUTS]> for PublicInputs {
    type Error = CircuitError;

    fn try_from(slots: [[u8; 32]; NUM_PUBLIC_INPUTS]) -> Result<Self, Self::Error> {
        let mut fields = [Fp::ZERO; NUM_PUBLIC_INPUTS];
        for (field, bytes) in fields.iter_mut().zip(slots) {
            *field = Option::from(Fp::from_repr(bytes))
                .ok_or(CircuitError::Encoding("non-canonical field element"))?;
        }
        Self::from_fields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send() -> PublicInputs {
        PublicInputs {
            commitments: [Fp::from(1u64).into(), Fp::from(2u64).into()],
            nullifiers: [Fp::from(3u64).into(), Fp::from(4u64).into()],
            data_root: Fp::from(8u64),
            tx_fee: Fp::from(9u64),
            backward_link: Some(Fp::from(14u64)),
            allow_chain: Some(OutputSlot::Second),
            ..PublicInputs::empty(ProofId::Send)
        }
    }

    #[test]
    fn slot_order() {
        let fields = send().to_fields();
        let expected: [u64; NUM_PUBLIC_INPUTS] = [3, 1, 2, 3, 4, 0, 0, 0, 8, 9, 0, 0, 0, 0, 14, 2];
        assert_eq!(fields, expected.map(Fp::from));
        assert_eq!(PublicInputs::from_fields(fields).unwrap(), send());
    }

    /// Claims place bridge call data and deposit value in slots 10 and 11.
    #[test]
    fn claim_slots_shift() {
        let claim = PublicInputs {
            bridge_call_data: Fp::from(10u64),
            defi_deposit_value: Fp::from(11u64),
            ..PublicInputs::empty(ProofId::DefiClaim)
        };
        let fields = claim.to_fields();
        assert_eq!(fields.get(10), Some(&Fp::from(10u64)));
        assert_eq!(fields.get(11), Some(&Fp::from(11u64)));
        assert_eq!(fields.get(12), Some(&Fp::ZERO));
        assert_eq!(PublicInputs::from_fields(fields).unwrap(), claim);
    }

    #[test]
    fn bytes_are_concatenated_slots() {
        let inputs = send();
        let bytes = inputs.to_bytes();
        for (chunk, fp) in bytes.chunks_exact(32).zip(inputs.to_fields()) {
            assert_eq!(chunk, fp.to_repr().as_slice());
        }
        let slots: [[u8; 32]; NUM_PUBLIC_INPUTS] = inputs.into();
        assert_eq!(PublicInputs::try_from(slots).unwrap(), inputs);
    }

    #[test]
    fn malformed_wire_rejected() {
        let mut fields = send().to_fields();
        if let Some(chain) = fields.last_mut() {
            *chain = Fp::from(3u64);
        }
        assert!(PublicInputs::from_fields(fields).is_err());

        let mut unknown = send().to_fields();
        if let Some(proof_id) = unknown.first_mut() {
            *proof_id = Fp::from(9u64);
        }
        assert_eq!(
            PublicInputs::from_fields(unknown),
            Err(CircuitError::UnknownProofId)
        );
    }
}
