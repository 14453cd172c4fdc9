use pasta_curves::Fp;

use super::{Commitment, Nullifier};
use crate::{
    constants::{DEFI_NOTE_PERSONALIZATION, DEFI_NULLIFIER_PERSONALIZATION, DEFI_NULLIFIER_TAG},
    primitives::Hasher,
};

/// The realized outcome of one DeFi bridge interaction, published by the
/// rollup after the bridge call returns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DefiInteractionNote {
    /// Encoded bridge call data of the interaction.
    pub bridge_call_data: Fp,
    /// Nonce assigned to the interaction.
    pub interaction_nonce: Fp,
    /// Sum of all deposits into the interaction.
    pub total_input_value: Fp,
    /// Total returned in output asset A.
    pub total_output_value_a: Fp,
    /// Total returned in output asset B.
    pub total_output_value_b: Fp,
    /// Whether the bridge call succeeded.
    pub interaction_result: bool,
}

impl DefiInteractionNote {
    /// Commitment to the interaction outcome.
    #[must_use]
    pub fn commitment(&self) -> Commitment {
        Hasher::new(DEFI_NOTE_PERSONALIZATION)
            .field(self.bridge_call_data)
            .field(self.interaction_nonce)
            .field(self.total_input_value)
            .field(self.total_output_value_a)
            .field(self.total_output_value_b)
            .flag(self.interaction_result)
            .finalize()
            .into()
    }

    /// Revealed by a claim against this interaction. The tag is fixed, so
    /// every claim against one interaction reveals the same value.
    #[must_use]
    pub fn nullifier(&self) -> Nullifier {
        Hasher::new(DEFI_NULLIFIER_PERSONALIZATION)
            .field(self.commitment().into())
            .field(Fp::from(DEFI_NULLIFIER_TAG))
            .finalize()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_flag_is_committed() {
        let success = DefiInteractionNote {
            bridge_call_data: Fp::from(7u64),
            interaction_nonce: Fp::from(2u64),
            total_input_value: Fp::from(100u64),
            total_output_value_a: Fp::from(90u64),
            total_output_value_b: Fp::from(0u64),
            interaction_result: true,
        };
        let failure = DefiInteractionNote {
            interaction_result: false,
            ..success
        };
        assert_ne!(success.commitment(), failure.commitment());
        assert_ne!(success.nullifier(), failure.nullifier());
        assert_eq!(success.nullifier(), DefiInteractionNote { ..success }.nullifier());
    }
}
