//! The join-split transition: spend up to two value notes, create up to
//! two.
//!
//! ## Value flow
//!
//! $$\text{public\_in} + v^{in}_1 + v^{in}_2 = \text{public\_out} + v^{out}_1 + v^{out}_2 + \text{tx\_fee}$$
//!
//! where `public_in` is nonzero only for a [`Transfer::Deposit`] and
//! `public_out` only for a [`Transfer::Withdraw`]. A
//! [`Transfer::DefiDeposit`] replaces $v^{out}_1$ with the deposit value
//! and publishes a partial claim in place of the first output note. When
//! its second input holds the bridge's second input asset, that input is
//! sent to the bridge whole and drops out of the equation.
//!
//! The fee is proven to fit [`TX_FEE_BIT_LENGTH`] bits. Every value is at
//! most [`NOTE_VALUE_BIT_LENGTH`] bits, so an underflowed difference wraps
//! to far above that bound.
//!
//! ## Chaining
//!
//! A transaction may spend an output of an earlier one before that output
//! reaches the data tree. The earlier transaction marks the output with
//! `allow_chain`; the later one names it with `backward_link`, and the
//! linked input skips its membership check.

use ff::Field as _;
use pasta_curves::Fp;

use super::{PublicInputs, finish};
use crate::{
    bridge::BridgeCallData,
    constants::{
        ALIAS_HASH_BIT_LENGTH, ASSET_ID_BIT_LENGTH, DEFI_DEPOSIT_VALUE_BIT_LENGTH,
        JOIN_SPLIT_SIGHASH_PERSONALIZATION, NOTE_VALUE_BIT_LENGTH, PUBLIC_VALUE_BIT_LENGTH,
        ProofId, TX_FEE_BIT_LENGTH,
    },
    error::{CircuitError, ensure},
    keys::{PrivateKey, PublicKey, Signature},
    note::{AccountNote, Commitment, Nullifier, PartialClaimNote, ValueNote},
    primitives::{Hasher, MerklePath, check_membership, fits_in_bits, range_check},
};

// =============================================================================
// Transaction kinds
// =============================================================================

/// What a join-split does with value crossing the pool boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transfer {
    /// Move `public_value` from `public_owner` into the pool.
    Deposit {
        /// Value entering the pool.
        public_value: Fp,
        /// Public address funding the deposit.
        public_owner: Fp,
    },
    /// Move `public_value` out of the pool to `public_owner`.
    Withdraw {
        /// Value leaving the pool.
        public_value: Fp,
        /// Public address receiving the withdrawal.
        public_owner: Fp,
    },
    /// Transfer inside the pool.
    Send,
    /// Send `deposit_value` to a DeFi bridge.
    DefiDeposit {
        /// The bridge interaction joined.
        bridge_call_data: BridgeCallData,
        /// Value of the join-split asset sent to the bridge.
        deposit_value: Fp,
    },
}

impl Transfer {
    /// Build a transfer from the flat wire fields, checking that fields
    /// belonging to other kinds are zero.
    pub fn from_wire(
        proof_id: ProofId,
        public_value: Fp,
        public_owner: Fp,
        bridge_call_data: Fp,
        deposit_value: Fp,
    ) -> Result<Self, CircuitError> {
        let no_public = public_value.is_zero_vartime() && public_owner.is_zero_vartime();
        let no_bridge = bridge_call_data.is_zero_vartime() && deposit_value.is_zero_vartime();
        let bridge_unused = || {
            ensure(
                no_bridge,
                CircuitError::DefiDeposit("bridge fields set outside a defi deposit"),
            )
        };
        let public_unused = || {
            ensure(
                no_public,
                CircuitError::PublicValue("public fields set on a private transfer"),
            )
        };

        let transfer = match proof_id {
            ProofId::Deposit => {
                bridge_unused()?;
                Self::Deposit {
                    public_value,
                    public_owner,
                }
            },
            ProofId::Withdraw => {
                bridge_unused()?;
                Self::Withdraw {
                    public_value,
                    public_owner,
                }
            },
            ProofId::Send => {
                bridge_unused()?;
                public_unused()?;
                Self::Send
            },
            ProofId::DefiDeposit => {
                public_unused()?;
                Self::DefiDeposit {
                    bridge_call_data: BridgeCallData::try_from(bridge_call_data)?,
                    deposit_value,
                }
            },
            ProofId::Account | ProofId::DefiClaim => return Err(CircuitError::WrongProofId),
        };
        transfer.check_public_values()?;
        Ok(transfer)
    }

    /// The proof kind tag.
    #[must_use]
    pub const fn proof_id(&self) -> ProofId {
        match *self {
            Self::Deposit { .. } => ProofId::Deposit,
            Self::Withdraw { .. } => ProofId::Withdraw,
            Self::Send => ProofId::Send,
            Self::DefiDeposit { .. } => ProofId::DefiDeposit,
        }
    }

    /// Public value crossing the pool boundary, in either direction.
    #[must_use]
    pub fn public_value(&self) -> Fp {
        match *self {
            Self::Deposit { public_value, .. } | Self::Withdraw { public_value, .. } => {
                public_value
            },
            Self::Send | Self::DefiDeposit { .. } => Fp::ZERO,
        }
    }

    /// Public address on the other side of the pool boundary.
    #[must_use]
    pub fn public_owner(&self) -> Fp {
        match *self {
            Self::Deposit { public_owner, .. } | Self::Withdraw { public_owner, .. } => {
                public_owner
            },
            Self::Send | Self::DefiDeposit { .. } => Fp::ZERO,
        }
    }

    fn public_input(&self) -> Fp {
        match *self {
            Self::Deposit { public_value, .. } => public_value,
            Self::Withdraw { .. } | Self::Send | Self::DefiDeposit { .. } => Fp::ZERO,
        }
    }

    fn public_output(&self) -> Fp {
        match *self {
            Self::Withdraw { public_value, .. } => public_value,
            Self::Deposit { .. } | Self::Send | Self::DefiDeposit { .. } => Fp::ZERO,
        }
    }

    /// Deposits and withdrawals must name both a value and an owner.
    fn check_public_values(&self) -> Result<(), CircuitError> {
        match *self {
            Self::Deposit {
                public_value,
                public_owner,
            }
            | Self::Withdraw {
                public_value,
                public_owner,
            } => ensure(
                !public_value.is_zero_vartime() && !public_owner.is_zero_vartime(),
                CircuitError::PublicValue("public value and owner must be nonzero"),
            ),
            Self::Send | Self::DefiDeposit { .. } => Ok(()),
        }
    }
}

/// One of the two output note slots.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OutputSlot {
    /// Output note 1, wire value 1.
    First,
    /// Output note 2, wire value 2.
    Second,
}

impl OutputSlot {
    /// Wire encoding of an optional slot; `None` is zero.
    #[must_use]
    pub fn wire(slot: Option<Self>) -> Fp {
        match slot {
            None => Fp::ZERO,
            Some(Self::First) => Fp::ONE,
            Some(Self::Second) => Fp::from(2u64),
        }
    }

    /// Parse the wire encoding.
    pub fn from_wire(fp: Fp) -> Result<Option<Self>, CircuitError> {
        [None, Some(Self::First), Some(Self::Second)]
            .into_iter()
            .find(|slot| Self::wire(*slot) == fp)
            .ok_or(CircuitError::Chain("allow_chain must be 0, 1 or 2"))
    }
}

/// How many of the two input note slots hold real notes.
///
/// Unused slots still carry a note, with zero value, so that both output
/// notes can be bound to a distinct input nullifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputCount {
    /// Only dummy inputs; value enters through a deposit.
    Zero,
    /// Input note 1 is real.
    One,
    /// Both input notes are real.
    Two,
}

impl InputCount {
    /// Whether each input slot is in use.
    #[must_use]
    pub const fn in_use(self) -> [bool; 2] {
        match self {
            Self::Zero => [false, false],
            Self::One => [true, false],
            Self::Two => [true, true],
        }
    }
}

// =============================================================================
// Witness
// =============================================================================

/// A note being spent, with its place in the data tree.
#[derive(Clone, Copy, Debug)]
pub struct InputNote {
    /// The note itself.
    pub note: ValueNote,
    /// Leaf position in the data tree.
    pub index: u32,
    /// Authentication path from the leaf to the data tree root.
    pub path: MerklePath,
}

/// A note being created.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OutputNote {
    /// Value created; zero for an unused slot.
    pub value: Fp,
    /// Blinding secret of the commitment.
    pub secret: Fp,
    /// Recipient account key.
    pub owner: PublicKey,
    /// Must be the transaction's asset.
    pub asset_id: Fp,
    /// Whether the recipient must spend it with a registered signing key.
    pub account_required: bool,
    /// Declared creator; must be the spender when present. Either way the
    /// note commits to the spender's account key.
    pub creator: Option<Fp>,
    /// Must equal the nullifier of the input in the same slot.
    pub input_nullifier: Nullifier,
}

impl OutputNote {
    /// The value note this output becomes, created by `creator_pk`.
    #[must_use]
    pub const fn to_note(&self, creator_pk: Fp) -> ValueNote {
        ValueNote {
            value: self.value,
            secret: self.secret,
            owner: self.owner,
            asset_id: self.asset_id,
            account_required: self.account_required,
            creator_pk,
            input_nullifier: self.input_nullifier,
        }
    }
}

/// Private inputs of a join-split.
#[derive(Clone, Copy, Debug)]
pub struct JoinSplitWitness {
    /// Transaction kind and its public fields.
    pub transfer: Transfer,
    /// Asset every note of the transaction holds, except a DeFi deposit's
    /// second input.
    pub asset_id: Fp,
    /// How many of `inputs` are real notes.
    pub num_inputs: InputCount,
    /// Notes being spent. Unused slots hold value zero.
    pub inputs: [InputNote; 2],
    /// Notes being created. A DeFi deposit replaces the first with its
    /// partial claim.
    pub outputs: [OutputNote; 2],
    /// Owner of the input notes; also keys their nullifiers.
    pub account_private_key: PrivateKey,
    /// Whether spending requires a registered signing key.
    pub account_required: bool,
    /// Alias of the spending account, for the account note lookup.
    pub alias_hash: Fp,
    /// Registered signing key; signs when `account_required`.
    pub signing_public_key: PublicKey,
    /// Leaf position of the signing key's account note.
    pub account_note_index: u32,
    /// Authentication path of the signing key's account note.
    pub account_note_path: MerklePath,
    /// Declared fee.
    pub tx_fee: Fp,
    /// Commitment of an earlier transaction's output spent here.
    pub backward_link: Option<Fp>,
    /// Output that a later transaction may spend before it is in the tree.
    pub allow_chain: Option<OutputSlot>,
    /// Signature over [`JoinSplitWitness::signing_message`].
    pub signature: Signature,
    /// Data tree root the membership checks run against.
    pub data_tree_root: Fp,
}

impl JoinSplitWitness {
    /// The spending account key.
    #[must_use]
    pub fn spender(&self) -> PublicKey {
        self.account_private_key.public_key()
    }

    /// The key that must sign.
    #[must_use]
    pub fn signer(&self) -> PublicKey {
        if self.account_required {
            self.signing_public_key
        } else {
            self.spender()
        }
    }

    /// Nullifiers of both input notes, used or not.
    #[must_use]
    pub fn nullifiers(&self) -> [Nullifier; 2] {
        self.inputs
            .map(|input| input.note.nullifier(&self.account_private_key))
    }

    /// Commitments published for the two output slots.
    ///
    /// A DeFi deposit publishes a partial claim in the first slot, holding
    /// the first output note's partial commitment until the claim sets its
    /// value.
    pub fn commitments(&self) -> Result<[Commitment; 2], CircuitError> {
        let creator_pk = self.spender().x;
        let [out1, out2] = self.outputs.map(|output| output.to_note(creator_pk));
        let [nf1, _nf2] = self.nullifiers();
        let first = match self.transfer {
            Transfer::DefiDeposit {
                bridge_call_data,
                deposit_value,
            } => PartialClaimNote {
                deposit_value,
                bridge_call_data: bridge_call_data.encode()?,
                value_note_partial_commitment: out1.partial().commitment(),
                input_nullifier: nf1,
            }
            .commitment(),
            Transfer::Deposit { .. } | Transfer::Withdraw { .. } | Transfer::Send => {
                out1.commitment()
            },
        };
        Ok([first, out2.commitment()])
    }

    /// The message the signer signs.
    pub fn signing_message(&self) -> Result<Fp, CircuitError> {
        Ok(self.message(self.commitments()?, self.nullifiers()))
    }

    fn message(&self, commitments: [Commitment; 2], nullifiers: [Nullifier; 2]) -> Fp {
        let [c1, c2] = commitments;
        let [nf1, nf2] = nullifiers;
        Hasher::new(JOIN_SPLIT_SIGHASH_PERSONALIZATION)
            .field(self.transfer.public_value())
            .field(self.transfer.public_owner())
            .field(c1.into())
            .field(c2.into())
            .field(nf1.into())
            .field(nf2.into())
            .field(self.backward_link.unwrap_or(Fp::ZERO))
            .field(OutputSlot::wire(self.allow_chain))
            .finalize()
    }

    fn bridge(&self) -> Option<(BridgeCallData, Fp)> {
        match self.transfer {
            Transfer::DefiDeposit {
                bridge_call_data,
                deposit_value,
            } => Some((bridge_call_data, deposit_value)),
            Transfer::Deposit { .. } | Transfer::Withdraw { .. } | Transfer::Send => None,
        }
    }

    /// Whether input note 2 holds the bridge's second input asset.
    fn second_asset(&self) -> bool {
        let [_in1, in2] = self.inputs;
        self.bridge().is_some() && in2.note.asset_id != self.asset_id
    }
}

// =============================================================================
// Constraints
// =============================================================================

fn asset(id: u32) -> Fp {
    Fp::from(u64::from(id))
}

fn check_ranges(witness: &JoinSplitWitness) -> Result<(), CircuitError> {
    let [in1, in2] = witness.inputs;
    let [out1, out2] = witness.outputs;
    range_check(&witness.asset_id, ASSET_ID_BIT_LENGTH, "asset_id")?;
    range_check(&witness.alias_hash, ALIAS_HASH_BIT_LENGTH, "alias_hash")?;
    range_check(&witness.tx_fee, TX_FEE_BIT_LENGTH, "tx_fee")?;
    range_check(&in1.note.value, NOTE_VALUE_BIT_LENGTH, "input note 1 value")?;
    range_check(&in2.note.value, NOTE_VALUE_BIT_LENGTH, "input note 2 value")?;
    range_check(&in2.note.asset_id, ASSET_ID_BIT_LENGTH, "input note 2 asset_id")?;
    range_check(&out1.value, NOTE_VALUE_BIT_LENGTH, "output note 1 value")?;
    range_check(&out2.value, NOTE_VALUE_BIT_LENGTH, "output note 2 value")?;
    range_check(
        &witness.transfer.public_value(),
        PUBLIC_VALUE_BIT_LENGTH,
        "public_value",
    )?;
    if let Some((_bridge, deposit_value)) = witness.bridge() {
        range_check(
            &deposit_value,
            DEFI_DEPOSIT_VALUE_BIT_LENGTH,
            "defi_deposit_value",
        )?;
    }
    Ok(())
}

fn check_inputs(witness: &JoinSplitWitness, spender: PublicKey) -> Result<(), CircuitError> {
    let slots = ["input note 1", "input note 2"];
    for ((input, used), what) in witness
        .inputs
        .iter()
        .zip(witness.num_inputs.in_use())
        .zip(slots)
    {
        ensure(input.note.owner == spender, CircuitError::Ownership(what))?;
        ensure(
            input.note.account_required == witness.account_required,
            CircuitError::AccountRequired,
        )?;
        ensure(
            used || input.note.value.is_zero_vartime(),
            CircuitError::UnusedInputValue,
        )?;
    }
    Ok(())
}

fn check_assets(witness: &JoinSplitWitness) -> Result<(), CircuitError> {
    let [in1, in2] = witness.inputs;
    let [out1, out2] = witness.outputs;
    ensure(
        in1.note.asset_id == witness.asset_id,
        CircuitError::AssetMismatch("input note 1"),
    )?;
    ensure(
        out2.asset_id == witness.asset_id,
        CircuitError::AssetMismatch("output note 2"),
    )?;

    let Some((bridge, deposit_value)) = witness.bridge() else {
        ensure(
            in2.note.asset_id == witness.asset_id,
            CircuitError::AssetMismatch("input note 2"),
        )?;
        return ensure(
            out1.asset_id == witness.asset_id,
            CircuitError::AssetMismatch("output note 1"),
        );
    };

    ensure(
        !deposit_value.is_zero_vartime(),
        CircuitError::DefiDeposit("deposit value is zero"),
    )?;
    ensure(
        witness.num_inputs != InputCount::Zero,
        CircuitError::DefiDeposit("no input notes in use"),
    )?;
    ensure(
        out1.value.is_zero_vartime(),
        CircuitError::DefiDeposit("output note 1 carries value"),
    )?;
    ensure(
        asset(bridge.input_asset_id_a) == witness.asset_id,
        CircuitError::DefiDeposit("bridge input asset differs from asset_id"),
    )?;

    let second_asset = witness.second_asset();
    ensure(
        bridge.input_asset_id_b.map(asset) == second_asset.then_some(in2.note.asset_id),
        CircuitError::DefiDeposit("bridge second input asset differs from input note 2"),
    )?;
    if second_asset {
        ensure(
            witness.num_inputs == InputCount::Two,
            CircuitError::DefiDeposit("second input asset without a second input"),
        )?;
        ensure(
            in2.note.value == deposit_value,
            CircuitError::DefiDeposit("input note 2 value differs from deposit value"),
        )?;
    }
    Ok(())
}

/// The implied fee, proven non-negative and equal to the declared one.
fn check_conservation(witness: &JoinSplitWitness) -> Result<(), CircuitError> {
    let [in1, in2] = witness.inputs;
    let [out1, out2] = witness.outputs;
    let second_input = if witness.second_asset() {
        Fp::ZERO
    } else {
        in2.note.value
    };
    let first_output = witness
        .bridge()
        .map_or(out1.value, |(_bridge, deposit_value)| deposit_value);

    let total_in = witness.transfer.public_input() + in1.note.value + second_input;
    let total_out = witness.transfer.public_output() + first_output + out2.value;
    let fee = total_in - total_out;
    ensure(fits_in_bits(&fee, TX_FEE_BIT_LENGTH), CircuitError::FeeOutOfRange)?;
    ensure(fee == witness.tx_fee, CircuitError::Conservation)
}

fn check_outputs(
    witness: &JoinSplitWitness,
    spender: PublicKey,
    nullifiers: [Nullifier; 2],
) -> Result<(), CircuitError> {
    for (output, nullifier) in witness.outputs.iter().zip(nullifiers) {
        ensure(
            output.creator.is_none_or(|creator| creator == spender.x),
            CircuitError::Creator,
        )?;
        ensure(
            output.input_nullifier == nullifier,
            CircuitError::InputNullifier,
        )?;
    }
    Ok(())
}

/// Returns the input slot spent through `backward_link`, if any.
fn check_chaining(
    witness: &JoinSplitWitness,
    input_commitments: [Commitment; 2],
) -> Result<Option<usize>, CircuitError> {
    let [in1, _in2] = witness.inputs;
    let [out1, out2] = witness.outputs;

    if let Some(slot) = witness.allow_chain {
        ensure(
            witness.bridge().is_none(),
            CircuitError::Chain("defi deposits cannot be chained"),
        )?;
        let chained = match slot {
            OutputSlot::First => out1,
            OutputSlot::Second => out2,
        };
        ensure(
            chained.owner == in1.note.owner,
            CircuitError::Chain("chained output not owned by the spender"),
        )?;
    }

    witness
        .backward_link
        .map(|link| {
            input_commitments
                .iter()
                .zip(witness.num_inputs.in_use())
                .position(|(commitment, used)| used && Fp::from(*commitment) == link)
                .ok_or(CircuitError::Chain("backward link matches no input note"))
        })
        .transpose()
}

/// Returns whether any check ran against the data tree root.
fn check_membership_proofs(
    witness: &JoinSplitWitness,
    spender: PublicKey,
    input_commitments: [Commitment; 2],
    propagated: Option<usize>,
) -> Result<bool, CircuitError> {
    let root = witness.data_tree_root;
    let mut used_root = false;
    let slots = ["input note 1", "input note 2"];
    for (slot, (((input, commitment), used), what)) in witness
        .inputs
        .iter()
        .zip(input_commitments)
        .zip(witness.num_inputs.in_use())
        .zip(slots)
        .enumerate()
    {
        if used && propagated != Some(slot) {
            ensure(
                check_membership(root, commitment.into(), input.index, &input.path),
                CircuitError::Membership(what),
            )?;
            used_root = true;
        }
    }

    if witness.account_required {
        let account_note = AccountNote {
            alias_hash: witness.alias_hash,
            account_public_key: spender,
            signing_public_key: witness.signing_public_key,
        };
        ensure(
            check_membership(
                root,
                account_note.commitment().into(),
                witness.account_note_index,
                &witness.account_note_path,
            ),
            CircuitError::Membership("account note"),
        )?;
        used_root = true;
    }
    Ok(used_root)
}

fn constrain(witness: &JoinSplitWitness) -> Result<PublicInputs, CircuitError> {
    check_ranges(witness)?;
    witness.transfer.check_public_values()?;

    let spender = witness.spender();
    check_inputs(witness, spender)?;
    check_assets(witness)?;
    check_conservation(witness)?;

    let nullifiers = witness.nullifiers();
    check_outputs(witness, spender, nullifiers)?;

    let input_commitments = witness.inputs.map(|input| input.note.commitment());
    let propagated = check_chaining(witness, input_commitments)?;
    let used_root = check_membership_proofs(witness, spender, input_commitments, propagated)?;

    let commitments = witness.commitments()?;
    witness
        .signer()
        .verify(witness.message(commitments, nullifiers), &witness.signature)
        .map_err(|_invalid| CircuitError::Signature)?;

    let (bridge_call_data, defi_deposit_value) = match witness.bridge() {
        Some((bridge, deposit_value)) => (bridge.encode()?, deposit_value),
        None => (Fp::ZERO, Fp::ZERO),
    };
    let public_asset_id = match witness.transfer {
        Transfer::Deposit { .. } | Transfer::Withdraw { .. } => witness.asset_id,
        Transfer::Send | Transfer::DefiDeposit { .. } => Fp::ZERO,
    };

    Ok(PublicInputs {
        proof_id: witness.transfer.proof_id(),
        commitments,
        nullifiers,
        public_value: witness.transfer.public_value(),
        public_owner: witness.transfer.public_owner(),
        asset_id: public_asset_id,
        data_root: if used_root {
            witness.data_tree_root
        } else {
            Fp::ZERO
        },
        tx_fee: witness.tx_fee,
        tx_fee_asset_id: witness.asset_id,
        bridge_call_data,
        defi_deposit_value,
        defi_root: Fp::ZERO,
        backward_link: witness.backward_link,
        allow_chain: witness.allow_chain,
    })
}

/// Evaluate a join-split.
pub fn evaluate(witness: &JoinSplitWitness) -> Result<PublicInputs, CircuitError> {
    finish(witness.transfer.proof_id(), constrain(witness))
}
