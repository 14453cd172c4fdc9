use pasta_curves::Fp;

use super::{Commitment, Nullifier};
use crate::{
    constants::{
        ACCOUNT_NOTE_PERSONALIZATION, ACCOUNT_NULLIFIER_PERSONALIZATION,
        ALIAS_NULLIFIER_PERSONALIZATION,
    },
    keys::PublicKey,
    primitives::Hasher,
};

/// Binds an alias and an account key to one authorized signing key.
///
/// An account with several signing keys has one account note per key, all
/// sharing `alias_hash` and `account_public_key`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AccountNote {
    /// Hash of the human-chosen alias.
    pub alias_hash: Fp,
    /// The account key.
    pub account_public_key: PublicKey,
    /// The signing key this note authorizes.
    pub signing_public_key: PublicKey,
}

impl AccountNote {
    /// `Hash(alias_hash, account_public_key, signing_public_key)`.
    #[must_use]
    pub fn commitment(&self) -> Commitment {
        Hasher::new(ACCOUNT_NOTE_PERSONALIZATION)
            .field(self.alias_hash)
            .point(self.account_public_key)
            .point(self.signing_public_key)
            .finalize()
            .into()
    }
}

/// Nullifier claiming an alias for the first time.
#[must_use]
pub fn alias_nullifier(alias_hash: Fp) -> Nullifier {
    Hasher::new(ALIAS_NULLIFIER_PERSONALIZATION)
        .field(alias_hash)
        .finalize()
        .into()
}

/// Nullifier claiming an account key for the first time.
#[must_use]
pub fn account_nullifier(account_public_key: PublicKey) -> Nullifier {
    Hasher::new(ACCOUNT_NULLIFIER_PERSONALIZATION)
        .point(account_public_key)
        .finalize()
        .into()
}
