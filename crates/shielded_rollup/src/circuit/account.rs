//! Account registration, migration and signing key addition.
//!
//! An account is an alias bound to an account key, plus any number of
//! signing keys each recorded as its own [`AccountNote`]. Every account
//! transition publishes two new account notes, one per new signing key.
//!
//! | Mode | Nullifiers | Signer | Account key |
//! | ---- | ---------- | ------ | ----------- |
//! | [`Create`](AccountMode::Create) | alias, account key | account key | unchanged |
//! | [`Migrate`](AccountMode::Migrate) | account key | existing signing key | may change |
//! | [`AddSigningKeys`](AccountMode::AddSigningKeys) | none | existing signing key | unchanged |

use pasta_curves::Fp;

use super::{PublicInputs, finish};
use crate::{
    constants::{ACCOUNT_SIGHASH_PERSONALIZATION, ALIAS_HASH_BIT_LENGTH, ProofId},
    error::{CircuitError, ensure},
    keys::{PublicKey, Signature},
    note::{AccountNote, Nullifier, account_nullifier, alias_nullifier},
    primitives::{Hasher, MerklePath, check_membership, range_check},
};

/// What an account transition does.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccountMode {
    /// Register a new alias and account key with their first signing keys.
    Create,
    /// Move an existing alias to a new account key.
    Migrate,
    /// Authorize further signing keys for an existing account.
    AddSigningKeys,
}

impl AccountMode {
    /// Parse the flag pair used on the wire; both set is a conflict.
    pub const fn from_flags(create: bool, migrate: bool) -> Result<Self, CircuitError> {
        match (create, migrate) {
            (true, true) => Err(CircuitError::ModeConflict),
            (true, false) => Ok(Self::Create),
            (false, true) => Ok(Self::Migrate),
            (false, false) => Ok(Self::AddSigningKeys),
        }
    }

    /// The `(create, migrate)` flag pair.
    #[must_use]
    pub const fn flags(self) -> (bool, bool) {
        match self {
            Self::Create => (true, false),
            Self::Migrate => (false, true),
            Self::AddSigningKeys => (false, false),
        }
    }
}

/// Private inputs of an account transition.
#[derive(Clone, Copy, Debug)]
pub struct AccountWitness {
    /// Which account transition this is.
    pub mode: AccountMode,
    /// Hash of the account's alias.
    pub alias_hash: Fp,
    /// The account key before this transition.
    pub account_public_key: PublicKey,
    /// The account key after this transition.
    pub new_account_public_key: PublicKey,
    /// Signing keys to register.
    pub new_signing_public_keys: [PublicKey; 2],
    /// Registered signing key authorizing this transition. Ignored when
    /// creating, where the account key signs.
    pub signing_public_key: PublicKey,
    /// Signature over [`AccountWitness::signing_message`].
    pub signature: Signature,
    /// Data tree root the account note is checked against.
    pub data_tree_root: Fp,
    /// Position of the signer's account note.
    pub account_note_index: u32,
    /// Authentication path of the signer's account note.
    pub account_note_path: MerklePath,
}

impl AccountWitness {
    /// The key that must have signed this transition.
    #[must_use]
    pub const fn signer(&self) -> PublicKey {
        match self.mode {
            AccountMode::Create => self.account_public_key,
            AccountMode::Migrate | AccountMode::AddSigningKeys => self.signing_public_key,
        }
    }

    /// Nullifiers this transition publishes, zero where the mode claims
    /// nothing.
    ///
    /// The second nullifies the *new* account key, so a migration claims
    /// its target key instead of repeating the nullifier of the key
    /// claimed at creation.
    #[must_use]
    pub fn nullifiers(&self) -> [Nullifier; 2] {
        let (create, migrate) = self.mode.flags();
        let alias = if create {
            alias_nullifier(self.alias_hash)
        } else {
            Nullifier::default()
        };
        let account = if create || migrate {
            account_nullifier(self.new_account_public_key)
        } else {
            Nullifier::default()
        };
        [alias, account]
    }

    /// The new account notes, one per new signing key.
    #[must_use]
    pub fn new_account_notes(&self) -> [AccountNote; 2] {
        self.new_signing_public_keys.map(|signing_public_key| AccountNote {
            alias_hash: self.alias_hash,
            account_public_key: self.new_account_public_key,
            signing_public_key,
        })
    }

    /// The message the signer signs.
    #[must_use]
    pub fn signing_message(&self) -> Fp {
        let [nk1, nk2] = self.new_signing_public_keys;
        let [nf1, nf2] = self.nullifiers();
        Hasher::new(ACCOUNT_SIGHASH_PERSONALIZATION)
            .field(self.alias_hash)
            .point(self.account_public_key)
            .point(self.new_account_public_key)
            .point(nk1)
            .point(nk2)
            .field(nf1.into())
            .field(nf2.into())
            .finalize()
    }
}

fn constrain(witness: &AccountWitness) -> Result<PublicInputs, CircuitError> {
    range_check(&witness.alias_hash, ALIAS_HASH_BIT_LENGTH, "alias_hash")?;

    ensure(
        witness.mode == AccountMode::Migrate
            || witness.account_public_key == witness.new_account_public_key,
        CircuitError::AccountKeyChanged,
    )?;

    // A new account is necessarily signed by the key it registers.
    let signer = witness.signer();
    ensure(
        witness.mode == AccountMode::Create || signer != witness.new_account_public_key,
        CircuitError::KeySeparation,
    )?;
    ensure(
        witness
            .new_signing_public_keys
            .iter()
            .all(|new_key| *new_key != signer),
        CircuitError::KeySeparation,
    )?;

    signer
        .verify(witness.signing_message(), &witness.signature)
        .map_err(|_invalid| CircuitError::Signature)?;

    let signer_note = AccountNote {
        alias_hash: witness.alias_hash,
        account_public_key: witness.account_public_key,
        signing_public_key: signer,
    };
    let registered = check_membership(
        witness.data_tree_root,
        signer_note.commitment().into(),
        witness.account_note_index,
        &witness.account_note_path,
    );
    match witness.mode {
        AccountMode::Create => ensure(!registered, CircuitError::NonMembership)?,
        AccountMode::Migrate | AccountMode::AddSigningKeys => {
            ensure(registered, CircuitError::Membership("account note"))?;
        },
    }

    let [note1, note2] = witness.new_account_notes();
    Ok(PublicInputs {
        commitments: [note1.commitment(), note2.commitment()],
        nullifiers: witness.nullifiers(),
        data_root: witness.data_tree_root,
        ..PublicInputs::empty(ProofId::Account)
    })
}

/// Evaluate an account transition.
pub fn evaluate(witness: &AccountWitness) -> Result<PublicInputs, CircuitError> {
    finish(ProofId::Account, constrain(witness))
}

#[cfg(test)]
mod tests {
    use ff::Field as _;
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;
    use crate::{
        keys::PrivateKey,
        testing::{SparseTree, account_witness},
    };

    /// Create: the account key signs for itself, both nullifiers are
    /// claimed and both new account notes are published.
    #[test]
    fn create_account() {
        let mut rng = StdRng::seed_from_u64(0);
        let (witness, _keys) = account_witness(&mut rng, AccountMode::Create);

        let outputs = evaluate(&witness).unwrap();
        assert_eq!(outputs.proof_id, ProofId::Account);
        assert_eq!(
            outputs.nullifiers,
            [
                alias_nullifier(witness.alias_hash),
                account_nullifier(witness.account_public_key)
            ]
        );
        let [note1, note2] = witness.new_account_notes();
        assert_eq!(outputs.commitments, [note1.commitment(), note2.commitment()]);
        assert_eq!(outputs.data_root, witness.data_tree_root);

        let fields = outputs.to_fields();
        assert_eq!(fields.first(), Some(&Fp::ZERO));
        assert!(fields.iter().skip(9).all(|fp| *fp == Fp::ZERO));
        assert_eq!(fields.get(5..8), Some([Fp::ZERO; 3].as_slice()));
    }

    #[test]
    fn mode_conflict() {
        assert_eq!(
            AccountMode::from_flags(true, true),
            Err(CircuitError::ModeConflict)
        );
        for mode in [AccountMode::Create, AccountMode::Migrate, AccountMode::AddSigningKeys] {
            let (create, migrate) = mode.flags();
            assert_eq!(AccountMode::from_flags(create, migrate), Ok(mode));
        }
    }

    #[test]
    fn add_signing_keys_claims_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let (witness, _keys) = account_witness(&mut rng, AccountMode::AddSigningKeys);
        let outputs = evaluate(&witness).unwrap();
        assert_eq!(outputs.nullifiers, [Nullifier::default(); 2]);
    }

    #[test]
    fn migrate_changes_account_key() {
        let mut rng = StdRng::seed_from_u64(2);
        let (witness, _keys) = account_witness(&mut rng, AccountMode::Migrate);
        assert_ne!(witness.account_public_key, witness.new_account_public_key);

        let outputs = evaluate(&witness).unwrap();
        assert_eq!(outputs.nullifiers.first(), Some(&Nullifier::default()));
        assert_eq!(
            outputs.nullifiers.get(1),
            Some(&account_nullifier(witness.new_account_public_key))
        );
        assert_ne!(
            outputs.nullifiers.get(1),
            Some(&account_nullifier(witness.account_public_key))
        );
    }

    /// Only a migration may change the account key.
    #[test]
    fn account_key_pinned_outside_migration() {
        let mut rng = StdRng::seed_from_u64(3);
        let (mut witness, keys) = account_witness(&mut rng, AccountMode::AddSigningKeys);
        witness.new_account_public_key = PrivateKey::random(&mut rng).public_key();
        witness.signature = keys.signer.sign(&mut rng, witness.signing_message());
        assert_eq!(evaluate(&witness), Err(CircuitError::AccountKeyChanged));
    }

    /// An account key signing as if it were a separate signing key is
    /// rejected.
    #[test]
    fn signer_must_not_be_account_key() {
        let mut rng = StdRng::seed_from_u64(4);
        let (mut witness, keys) = account_witness(&mut rng, AccountMode::AddSigningKeys);

        let mut tree = SparseTree::new();
        let self_note = AccountNote {
            alias_hash: witness.alias_hash,
            account_public_key: witness.account_public_key,
            signing_public_key: witness.account_public_key,
        };
        tree.insert(0, self_note.commitment().into());
        witness.signing_public_key = witness.account_public_key;
        witness.data_tree_root = tree.root();
        witness.account_note_index = 0;
        witness.account_note_path = tree.path(0);
        witness.signature = keys.account.sign(&mut rng, witness.signing_message());

        assert_eq!(evaluate(&witness), Err(CircuitError::KeySeparation));
    }

    #[test]
    fn signer_must_not_be_new_signing_key() {
        let mut rng = StdRng::seed_from_u64(5);
        let (mut witness, keys) = account_witness(&mut rng, AccountMode::Create);
        witness.new_signing_public_keys = [witness.account_public_key, witness.account_public_key];
        witness.signature = keys.account.sign(&mut rng, witness.signing_message());
        assert_eq!(evaluate(&witness), Err(CircuitError::KeySeparation));
    }

    #[test]
    fn forged_signature_rejected() {
        let mut rng = StdRng::seed_from_u64(6);
        let (mut witness, _keys) = account_witness(&mut rng, AccountMode::Create);
        witness.signature = PrivateKey::random(&mut rng).sign(&mut rng, witness.signing_message());
        assert_eq!(evaluate(&witness), Err(CircuitError::Signature));
    }

    /// Creating an account whose note is already in the tree is a replay.
    #[test]
    fn create_requires_absence() {
        let mut rng = StdRng::seed_from_u64(7);
        let (mut witness, _keys) = account_witness(&mut rng, AccountMode::Create);
        let existing = AccountNote {
            alias_hash: witness.alias_hash,
            account_public_key: witness.account_public_key,
            signing_public_key: witness.account_public_key,
        };
        let mut tree = SparseTree::new();
        tree.insert(3, existing.commitment().into());
        witness.data_tree_root = tree.root();
        witness.account_note_index = 3;
        witness.account_note_path = tree.path(3);
        assert_eq!(evaluate(&witness), Err(CircuitError::NonMembership));
    }

    #[test]
    fn unregistered_signer_rejected() {
        let mut rng = StdRng::seed_from_u64(8);
        let (mut witness, _keys) = account_witness(&mut rng, AccountMode::AddSigningKeys);
        witness.data_tree_root += Fp::ONE;
        assert_eq!(
            evaluate(&witness),
            Err(CircuitError::Membership("account note"))
        );
    }

    #[test]
    fn oversized_alias_rejected() {
        let mut rng = StdRng::seed_from_u64(9);
        let (mut witness, _keys) = account_witness(&mut rng, AccountMode::Create);
        witness.alias_hash = -Fp::ONE;
        assert_eq!(
            evaluate(&witness),
            Err(CircuitError::Range {
                what: "alias_hash",
                bits: ALIAS_HASH_BIT_LENGTH
            })
        );
    }
}
