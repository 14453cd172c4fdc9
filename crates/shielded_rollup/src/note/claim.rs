use pasta_curves::Fp;

use super::{Commitment, Nullifier};
use crate::{
    constants::{
        CLAIM_NOTE_PARTIAL_PERSONALIZATION, CLAIM_NOTE_PERSONALIZATION,
        CLAIM_NULLIFIER_PERSONALIZATION, CLAIM_NULLIFIER_TAG,
    },
    primitives::Hasher,
};

/// A DeFi deposit's claim on the interaction outcome, before the rollup
/// assigns it an interaction nonce.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PartialClaimNote {
    /// Value sent to the bridge.
    pub deposit_value: Fp,
    /// Encoded bridge call data.
    pub bridge_call_data: Fp,
    /// Partial commitment of the value note the claim will mint.
    pub value_note_partial_commitment: Fp,
    /// Nullifier of the first input note of the deposit.
    pub input_nullifier: Nullifier,
}

impl PartialClaimNote {
    /// `Hash(deposit_value, bridge_call_data, value_note_partial_commitment,
    /// input_nullifier)`.
    #[must_use]
    pub fn commitment(&self) -> Commitment {
        Hasher::new(CLAIM_NOTE_PARTIAL_PERSONALIZATION)
            .field(self.deposit_value)
            .field(self.bridge_call_data)
            .field(self.value_note_partial_commitment)
            .field(self.input_nullifier.into())
            .finalize()
            .into()
    }
}

/// A partial claim completed with the nonce of the interaction it joined.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClaimNote {
    /// The deposit-time half.
    pub partial: PartialClaimNote,
    /// Nonce of the DeFi interaction this claim settles against.
    pub defi_interaction_nonce: Fp,
}

impl ClaimNote {
    /// The completed claim commitment, as it appears in the data tree.
    #[must_use]
    pub fn commitment(&self) -> Commitment {
        Self::complete(self.partial.commitment(), self.defi_interaction_nonce)
    }

    /// Complete a partial claim commitment with an interaction nonce, as
    /// the rollup does when it inserts the claim into the data tree.
    #[must_use]
    pub fn complete(partial_commitment: Commitment, defi_interaction_nonce: Fp) -> Commitment {
        Hasher::new(CLAIM_NOTE_PERSONALIZATION)
            .field(partial_commitment.into())
            .field(defi_interaction_nonce)
            .finalize()
            .into()
    }

    /// Claim notes are nullified under a fixed tag rather than a key:
    /// anyone may settle a claim, the minted note still goes to its owner.
    #[must_use]
    pub fn nullifier(&self) -> Nullifier {
        Hasher::new(CLAIM_NULLIFIER_PERSONALIZATION)
            .field(self.commitment().into())
            .field(Fp::from(CLAIM_NULLIFIER_TAG))
            .finalize()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim() -> ClaimNote {
        ClaimNote {
            partial: PartialClaimNote {
                deposit_value: Fp::from(50u64),
                bridge_call_data: Fp::from(7u64),
                value_note_partial_commitment: Fp::from(11u64),
                input_nullifier: Nullifier::from(Fp::from(13u64)),
            },
            defi_interaction_nonce: Fp::from(2u64),
        }
    }

    #[test]
    fn completion_matches_commitment() {
        let note = claim();
        assert_eq!(
            ClaimNote::complete(note.partial.commitment(), note.defi_interaction_nonce),
            note.commitment()
        );
    }

    /// The nonce separates otherwise identical claims, and so their
    /// nullifiers.
    #[test]
    fn nonce_separates_claims() {
        let note = claim();
        let later = ClaimNote {
            defi_interaction_nonce: Fp::from(3u64),
            ..note
        };
        assert_ne!(note.commitment(), later.commitment());
        assert_ne!(note.nullifier(), later.nullifier());
        assert_eq!(note.nullifier(), claim().nullifier());
    }

    #[test]
    fn partial_binds_deposit_value() {
        let note = claim().partial;
        let bigger = PartialClaimNote {
            deposit_value: Fp::from(51u64),
            ..note
        };
        assert_ne!(note.commitment(), bigger.commitment());
    }
}
