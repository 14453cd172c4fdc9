//! Fixed protocol constants: tree depths, bit widths, proof kinds and
//! hash personalizations.
//!
//! None of these are configurable. The downstream aggregator and the
//! on-chain verifier are built against exactly these values, so changing
//! any of them is a protocol fork.
//!
//! All BLAKE2b personalizations are exactly 16 bytes (the BLAKE2b
//! personal field width). Each commitment, nullifier and signing message
//! kind has its own personalization, so a value computed for one purpose
//! can never be replayed as another.

use pasta_curves::Fp;

use crate::error::CircuitError;

// =============================================================================
// Tree depths
// =============================================================================

/// Depth of the note data tree (value notes, account notes, claim notes,
/// interaction notes). Leaf indices are `u32`.
pub const DATA_TREE_DEPTH: usize = 32;

/// Depth of the nullifier tree maintained by the rollup.
pub const NULLIFIER_TREE_DEPTH: usize = 256;

/// Depth of the tree of historical data roots maintained by the rollup.
pub const ROOT_TREE_DEPTH: usize = 28;

// =============================================================================
// Bit widths
// =============================================================================

/// Maximum bit width of a note value.
///
/// Three values of this width still sum to less than the Pallas base field
/// modulus ($\approx 2^{254}$), so value sums never wrap.
pub const NOTE_VALUE_BIT_LENGTH: usize = 252;

/// Maximum bit width of a public deposit or withdrawal value.
pub const PUBLIC_VALUE_BIT_LENGTH: usize = NOTE_VALUE_BIT_LENGTH;

/// Maximum bit width of a DeFi deposit value.
pub const DEFI_DEPOSIT_VALUE_BIT_LENGTH: usize = NOTE_VALUE_BIT_LENGTH;

/// Maximum bit width of a transaction fee.
///
/// A fee computed as `total_in - total_out` that underflowed wraps to a
/// field element of at least $p - 3 \cdot 2^{252} > 2^{252}$, so this
/// range check doubles as the non-negativity proof.
pub const TX_FEE_BIT_LENGTH: usize = 252;

/// Maximum bit width of an asset id.
pub const ASSET_ID_BIT_LENGTH: usize = 30;

/// Maximum bit width of an alias hash.
pub const ALIAS_HASH_BIT_LENGTH: usize = 224;

/// Bit width of a data tree leaf index.
pub const DATA_TREE_INDEX_BIT_LENGTH: usize = DATA_TREE_DEPTH;

/// Bit width of the bridge address id inside bridge call data.
pub const BRIDGE_ADDRESS_ID_BIT_LENGTH: usize = 32;

/// Bit width of the bridge config flags inside bridge call data.
pub const BRIDGE_CONFIG_BIT_LENGTH: usize = 32;

/// Bit width of the bridge auxiliary data inside bridge call data.
pub const BRIDGE_AUX_DATA_BIT_LENGTH: usize = 64;

/// Total bit width of encoded bridge call data.
pub const BRIDGE_CALL_DATA_BIT_LENGTH: usize = BRIDGE_ADDRESS_ID_BIT_LENGTH
    + 4 * ASSET_ID_BIT_LENGTH
    + BRIDGE_CONFIG_BIT_LENGTH
    + BRIDGE_AUX_DATA_BIT_LENGTH;

/// Number of field elements in the public output vector of every
/// transition.
pub const NUM_PUBLIC_INPUTS: usize = 16;

// =============================================================================
// Proof kinds
// =============================================================================

/// The kind of transition a public output vector belongs to.
///
/// The numeric tag is slot 0 of the public output vector.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ProofId {
    /// Account registration, migration or signing key addition.
    Account,
    /// Join-split moving public value into the shielded pool.
    Deposit,
    /// Join-split moving shielded value out to a public owner.
    Withdraw,
    /// Join-split transfer inside the shielded pool.
    Send,
    /// Join-split depositing value into a DeFi bridge interaction.
    DefiDeposit,
    /// Settlement of a DeFi interaction into value notes.
    DefiClaim,
}

impl ProofId {
    /// The wire tag of this proof kind.
    #[must_use]
    pub const fn tag(self) -> u64 {
        match self {
            Self::Account => 0,
            Self::Deposit => 1,
            Self::Withdraw => 2,
            Self::Send => 3,
            Self::DefiDeposit => 4,
            Self::DefiClaim => 5,
        }
    }

    /// Every proof kind, in tag order.
    pub const ALL: [Self; 6] = [
        Self::Account,
        Self::Deposit,
        Self::Withdraw,
        Self::Send,
        Self::DefiDeposit,
        Self::DefiClaim,
    ];
}

impl From<ProofId> for Fp {
    fn from(id: ProofId) -> Self {
        Self::from(id.tag())
    }
}

impl TryFrom<Fp> for ProofId {
    type Error = CircuitError;

    fn try_from(fp: Fp) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|id| Fp::from(*id) == fp)
            .ok_or(CircuitError::UnknownProofId)
    }
}

// =============================================================================
// Hash personalizations
// =============================================================================

/// Account note commitment.
pub const ACCOUNT_NOTE_PERSONALIZATION: &[u8; 16] = b"Rollup_AcctNoteC";

/// Alias nullifier emitted when an alias is first registered.
pub const ALIAS_NULLIFIER_PERSONALIZATION: &[u8; 16] = b"Rollup_AliasNull";

/// Account key nullifier emitted when an account key is first registered.
pub const ACCOUNT_NULLIFIER_PERSONALIZATION: &[u8; 16] = b"Rollup_AcctKeyNf";

/// Partial value note commitment (owner half, without value or asset).
pub const VALUE_NOTE_PARTIAL_PERSONALIZATION: &[u8; 16] = b"Rollup_ValPartCm";

/// Completed value note commitment.
pub const VALUE_NOTE_PERSONALIZATION: &[u8; 16] = b"Rollup_ValNoteCm";

/// Value note nullifier.
pub const VALUE_NULLIFIER_PERSONALIZATION: &[u8; 16] = b"Rollup_ValNoteNf";

/// Partial claim note commitment, produced by a DeFi deposit.
pub const CLAIM_NOTE_PARTIAL_PERSONALIZATION: &[u8; 16] = b"Rollup_ClmPartCm";

/// Completed claim note commitment, after the rollup assigns an
/// interaction nonce.
pub const CLAIM_NOTE_PERSONALIZATION: &[u8; 16] = b"Rollup_ClmNoteCm";

/// Claim note nullifier.
pub const CLAIM_NULLIFIER_PERSONALIZATION: &[u8; 16] = b"Rollup_ClmNoteNf";

/// DeFi interaction note commitment.
pub const DEFI_NOTE_PERSONALIZATION: &[u8; 16] = b"Rollup_DefiNteCm";

/// DeFi interaction note nullifier.
pub const DEFI_NULLIFIER_PERSONALIZATION: &[u8; 16] = b"Rollup_DefiNteNf";

/// Data tree interior node.
pub const MERKLE_NODE_PERSONALIZATION: &[u8; 16] = b"Rollup_MerkleNde";

/// Account transition signing message.
pub const ACCOUNT_SIGHASH_PERSONALIZATION: &[u8; 16] = b"Rollup_AcctSigHs";

/// Join-split transition signing message.
pub const JOIN_SPLIT_SIGHASH_PERSONALIZATION: &[u8; 16] = b"Rollup_JnSpSigHs";

/// Domain tag mixed into every claim note nullifier.
pub const CLAIM_NULLIFIER_TAG: u64 = 0x636c_6169_6d00_0001;

/// Domain tag mixed into every DeFi interaction note nullifier.
pub const DEFI_NULLIFIER_TAG: u64 = 0x6465_6669_0000_0002;

/// Largest value representable in `bits` bits, as a field element.
///
/// Only meaningful for `bits < 254`.
#[cfg(any(test, feature = "test-dependencies"))]
#[must_use]
pub fn max_value(bits: usize) -> Fp {
    use ff::PrimeField as _;

    let mut repr = [0u8; 32];
    for (byte_index, byte) in repr.iter_mut().enumerate() {
        let low = byte_index * 8;
        if low + 8 <= bits {
            *byte = 0xff;
        } else if low < bits {
            *byte = (1u8 << (bits - low)) - 1;
        } else {
            break;
        }
    }
    Option::from(Fp::from_repr(repr)).unwrap_or(Fp::from(0))
}

#[cfg(test)]
mod tests {
    use ff::Field as _;

    use super::*;

    /// Every proof kind round-trips through its wire tag and tags are
    /// distinct.
    #[test]
    fn proof_id_tags_round_trip() {
        for id in ProofId::ALL {
            assert_eq!(ProofId::try_from(Fp::from(id)).unwrap(), id);
        }
        let tags: Vec<u64> = ProofId::ALL.iter().map(|id| id.tag()).collect();
        assert_eq!(tags, vec![0, 1, 2, 3, 4, 5]);
    }

    /// Tags outside the six known kinds are rejected.
    #[test]
    fn unknown_proof_id_rejected() {
        assert_eq!(
            ProofId::try_from(Fp::from(6u64)),
            Err(CircuitError::UnknownProofId)
        );
        assert_eq!(
            ProofId::try_from(-Fp::ONE),
            Err(CircuitError::UnknownProofId)
        );
    }

    /// Personalizations are pairwise distinct.
    #[test]
    fn personalizations_distinct() {
        let all = [
            ACCOUNT_NOTE_PERSONALIZATION,
            ALIAS_NULLIFIER_PERSONALIZATION,
            ACCOUNT_NULLIFIER_PERSONALIZATION,
            VALUE_NOTE_PARTIAL_PERSONALIZATION,
            VALUE_NOTE_PERSONALIZATION,
            VALUE_NULLIFIER_PERSONALIZATION,
            CLAIM_NOTE_PARTIAL_PERSONALIZATION,
            CLAIM_NOTE_PERSONALIZATION,
            CLAIM_NULLIFIER_PERSONALIZATION,
            DEFI_NOTE_PERSONALIZATION,
            DEFI_NULLIFIER_PERSONALIZATION,
            MERKLE_NODE_PERSONALIZATION,
            ACCOUNT_SIGHASH_PERSONALIZATION,
            JOIN_SPLIT_SIGHASH_PERSONALIZATION,
        ];
        for (i, left) in all.iter().enumerate() {
            for right in all.iter().skip(i + 1) {
                assert_ne!(left, right);
            }
        }
    }

    /// Bridge call data fits comfortably below the field modulus.
    #[test]
    fn bridge_call_data_width() {
        assert_eq!(BRIDGE_CALL_DATA_BIT_LENGTH, 248);
    }

    #[test]
    fn max_value_widths() {
        assert_eq!(max_value(30), Fp::from((1u64 << 30) - 1));
        assert_eq!(max_value(64), Fp::from(u64::MAX));
        assert_eq!(max_value(0), Fp::ZERO);
    }
}
