//! Constraint violation errors.

use thiserror::Error;

/// A witness failed to satisfy a transition predicate.
///
/// At the protocol level every variant means the same thing: the
/// transition is invalid and no public output exists for it. The variant
/// only names the first violated invariant, for tooling and tests.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum CircuitError {
    /// A numeric witness does not fit its protocol bit width.
    #[error("{what} does not fit in {bits} bits")]
    Range {
        /// The offending witness.
        what: &'static str,
        /// The permitted bit width.
        bits: usize,
    },

    /// Account `create` and `migrate` were both requested.
    #[error("create and migrate are mutually exclusive")]
    ModeConflict,

    /// A proof id tag outside the known proof kinds.
    #[error("unknown proof id")]
    UnknownProofId,

    /// A proof id that does not belong to the evaluated transition.
    #[error("proof id does not match transition")]
    WrongProofId,

    /// Public value or public owner gating violated.
    #[error("public value gating: {0}")]
    PublicValue(&'static str),

    /// An input note is not owned by the spending account key.
    #[error("input note not owned by spending key: {0}")]
    Ownership(&'static str),

    /// An input note's `account_required` flag differs from the
    /// transaction's.
    #[error("input note account_required flag mismatch")]
    AccountRequired,

    /// Notes of a single transaction disagree on asset id.
    #[error("asset id mismatch: {0}")]
    AssetMismatch(&'static str),

    /// A note slot that is not in use carries value.
    #[error("unused input note carries value")]
    UnusedInputValue,

    /// Inputs minus outputs does not fit the fee width. This covers
    /// outputs exceeding inputs, which wrap around the field modulus.
    #[error("implied transaction fee out of range")]
    FeeOutOfRange,

    /// Inputs minus outputs differ from the declared fee.
    #[error("value is not conserved")]
    Conservation,

    /// An output note declares a creator other than the spender.
    #[error("output note creator is not the spender")]
    Creator,

    /// Transaction chaining rules violated.
    #[error("chaining: {0}")]
    Chain(&'static str),

    /// A note required to be in the data tree is not.
    #[error("membership check failed: {0}")]
    Membership(&'static str),

    /// A note required to be absent from the data tree is present.
    #[error("account note already registered")]
    NonMembership,

    /// An output note is not bound to the nullifier of its paired input.
    #[error("output note input_nullifier mismatch")]
    InputNullifier,

    /// The signature does not verify against the expected signer.
    #[error("signature verification failed")]
    Signature,

    /// The signer coincides with a key it is registering.
    #[error("signer must differ from the keys being registered")]
    KeySeparation,

    /// The account key changed outside of a migration.
    #[error("account key may only change when migrating")]
    AccountKeyChanged,

    /// DeFi deposit rules violated.
    #[error("defi deposit: {0}")]
    DefiDeposit(&'static str),

    /// DeFi claim rules violated.
    #[error("defi claim: {0}")]
    Claim(&'static str),

    /// A public input vector that is not a valid wire encoding.
    #[error("malformed encoding: {0}")]
    Encoding(&'static str),

    /// Malformed bridge call data.
    #[error("bridge call data: {0}")]
    BridgeCallData(&'static str),
}

/// Reject with `err` unless `cond` holds.
pub(crate) const fn ensure(cond: bool, err: CircuitError) -> Result<(), CircuitError> {
    if cond { Ok(()) } else { Err(err) }
}
