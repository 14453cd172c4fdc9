use pasta_curves::Fp;

use super::{Commitment, Nullifier};
use crate::{
    constants::{
        VALUE_NOTE_PARTIAL_PERSONALIZATION, VALUE_NOTE_PERSONALIZATION,
        VALUE_NULLIFIER_PERSONALIZATION,
    },
    keys::{PrivateKey, PublicKey},
    primitives::Hasher,
};

/// The owner half of a value note, committed before the value is known.
///
/// A DeFi deposit commits to this half only; the claim transition completes
/// it once the interaction outcome fixes the value and asset.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PartialValueNote {
    /// Blinding secret.
    pub secret: Fp,
    /// Owner's account key.
    pub owner: PublicKey,
    /// Whether spending requires a registered signing key.
    pub account_required: bool,
    /// x-coordinate of the creator's account key, or zero.
    pub creator_pk: Fp,
}

impl PartialValueNote {
    /// `Hash(secret, owner, account_required, creator_pk)`.
    #[must_use]
    pub fn commitment(&self) -> Fp {
        Hasher::new(VALUE_NOTE_PARTIAL_PERSONALIZATION)
            .field(self.secret)
            .point(self.owner)
            .flag(self.account_required)
            .field(self.creator_pk)
            .finalize()
    }
}

/// A spendable balance unit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ValueNote {
    /// Amount of `asset_id` held.
    pub value: Fp,
    /// Blinding secret.
    pub secret: Fp,
    /// Owner's account key.
    pub owner: PublicKey,
    /// Asset held.
    pub asset_id: Fp,
    /// Whether spending requires a registered signing key.
    pub account_required: bool,
    /// x-coordinate of the creator's account key, or zero.
    pub creator_pk: Fp,
    /// Nullifier of the input note this note was created in place of.
    pub input_nullifier: Nullifier,
}

impl ValueNote {
    /// The owner half of this note.
    #[must_use]
    pub const fn partial(&self) -> PartialValueNote {
        PartialValueNote {
            secret: self.secret,
            owner: self.owner,
            account_required: self.account_required,
            creator_pk: self.creator_pk,
        }
    }

    /// `Hash(partial, value, asset_id, input_nullifier)`.
    #[must_use]
    pub fn commitment(&self) -> Commitment {
        Self::complete(
            self.partial().commitment(),
            self.value,
            self.asset_id,
            self.input_nullifier,
        )
    }

    /// Complete a partial commitment into a full value note commitment.
    #[must_use]
    pub fn complete(
        partial_commitment: Fp,
        value: Fp,
        asset_id: Fp,
        input_nullifier: Nullifier,
    ) -> Commitment {
        Hasher::new(VALUE_NOTE_PERSONALIZATION)
            .field(partial_commitment)
            .field(value)
            .field(asset_id)
            .field(input_nullifier.into())
            .finalize()
            .into()
    }

    /// `Hash(commitment, account_key)`: the nullifier revealed when this
    /// note is spent by the holder of `account_key`.
    ///
    /// Spending the same note with the same key always yields the same
    /// nullifier.
    #[must_use]
    pub fn nullifier(&self, account_key: &PrivateKey) -> Nullifier {
        Hasher::new(VALUE_NULLIFIER_PERSONALIZATION)
            .field(self.commitment().into())
            .bytes(&account_key.to_bytes())
            .finalize()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use ff::Field as _;
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;

    fn note(rng: &mut StdRng) -> (PrivateKey, ValueNote) {
        let sk = PrivateKey::random(rng);
        let note = ValueNote {
            value: Fp::from(100u64),
            secret: Fp::random(&mut *rng),
            owner: sk.public_key(),
            asset_id: Fp::ZERO,
            account_required: false,
            creator_pk: Fp::ZERO,
            input_nullifier: Nullifier::from(Fp::from(3u64)),
        };
        (sk, note)
    }

    /// Completing a note's partial commitment yields its full commitment.
    #[test]
    fn partial_completion_matches_full() {
        let mut rng = StdRng::seed_from_u64(0);
        let (_sk, note) = note(&mut rng);
        assert_eq!(
            ValueNote::complete(
                note.partial().commitment(),
                note.value,
                note.asset_id,
                note.input_nullifier
            ),
            note.commitment()
        );
    }

    /// Two outputs differing only in `input_nullifier` have distinct
    /// commitments.
    #[test]
    fn input_nullifier_separates_outputs() {
        let mut rng = StdRng::seed_from_u64(1);
        let (_sk, note) = note(&mut rng);
        let twin = ValueNote {
            input_nullifier: Nullifier::from(Fp::from(4u64)),
            ..note
        };
        assert_ne!(note.commitment(), twin.commitment());
    }

    /// The same note and key always give the same nullifier; another key
    /// gives another.
    #[test]
    fn nullifier_is_deterministic_and_keyed() {
        let mut rng = StdRng::seed_from_u64(2);
        let (sk, note) = note(&mut rng);
        let other = PrivateKey::random(&mut rng);
        assert_eq!(note.nullifier(&sk), note.nullifier(&sk));
        assert_ne!(note.nullifier(&sk), note.nullifier(&other));
    }

    #[test]
    fn account_required_is_committed() {
        let mut rng = StdRng::seed_from_u64(3);
        let (_sk, note) = note(&mut rng);
        let required = ValueNote {
            account_required: true,
            ..note
        };
        assert_ne!(note.commitment(), required.commitment());
    }
}
