//! Notes, note commitments and nullifiers.
//!
//! Every note is a plain record built fresh from witness data inside a
//! single transition evaluation. Its commitment is a pure function of its
//! fields, so two equal witnesses always produce byte-identical
//! commitments, which is what lets an external nullifier set detect
//! replays.
//!
//! | Note | Commits to | Nullified by |
//! | ---- | ---------- | ------------ |
//! | [`AccountNote`] | alias hash, account key, signing key | alias and account key nullifiers |
//! | [`ValueNote`] | partial commitment, value, asset, input nullifier | commitment + account private key |
//! | [`PartialClaimNote`] | deposit value, bridge, partial value commitment, input nullifier | n/a |
//! | [`ClaimNote`] | partial claim commitment, interaction nonce | commitment + fixed tag |
//! | [`DefiInteractionNote`] | bridge, nonce, input/output totals, result | commitment + fixed tag |

mod account;
mod claim;
mod defi;
mod value;

use ff::PrimeField as _;
use pasta_curves::Fp;

pub use account::{AccountNote, account_nullifier, alias_nullifier};
pub use claim::{ClaimNote, PartialClaimNote};
pub use defi::DefiInteractionNote;
pub use value::{PartialValueNote, ValueNote};

// =============================================================================
// Note commitment
// =============================================================================

/// A note commitment: published in place of the note's plaintext.
///
/// The zero commitment encodes an empty output slot on the wire.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "[u8; 32]", try_from = "[u8; 32]"))]
pub struct Commitment(Fp);

impl From<Fp> for Commitment {
    fn from(fp: Fp) -> Self {
        Self(fp)
    }
}

impl From<Commitment> for Fp {
    fn from(cm: Commitment) -> Self {
        cm.0
    }
}

impl From<Commitment> for [u8; 32] {
    fn from(cm: Commitment) -> Self {
        cm.0.to_repr()
    }
}

impl TryFrom<[u8; 32]> for Commitment {
    type Error = &'static str;

    fn try_from(bytes: [u8; 32]) -> Result<Self, Self::Error> {
        Option::from(Fp::from_repr(bytes))
            .map(Self)
            .ok_or("invalid field element")
    }
}

// =============================================================================
// Nullifier
// =============================================================================

/// A nullifier: published when a note is consumed.
///
/// Transitions only guarantee that nullifiers are derived correctly. Global
/// uniqueness is enforced by the rollup's nullifier tree.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "[u8; 32]", try_from = "[u8; 32]"))]
pub struct Nullifier(Fp);

impl From<Fp> for Nullifier {
    fn from(fp: Fp) -> Self {
        Self(fp)
    }
}

impl From<Nullifier> for Fp {
    fn from(nf: Nullifier) -> Self {
        nf.0
    }
}

impl From<Nullifier> for [u8; 32] {
    fn from(nf: Nullifier) -> Self {
        nf.0.to_repr()
    }
}

impl TryFrom<[u8; 32]> for Nullifier {
    type Error = &'static str;

    fn try_from(bytes: [u8; 32]) -> Result<Self, Self::Error> {
        Option::from(Fp::from_repr(bytes))
            .map(Self)
            .ok_or("invalid field element")
    }
}
