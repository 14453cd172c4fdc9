//! Bridge call data: which DeFi bridge a deposit goes to, and which assets
//! flow in and out of it.
//!
//! ## Encoding
//!
//! Bridge call data travels as one field element, bit-packed least
//! significant bit first:
//!
//! | Bits      | Field              | Width |
//! | --------- | ------------------ | ----- |
//! | 0..32     | bridge address id  | 32    |
//! | 32..62    | input asset A      | 30    |
//! | 62..92    | input asset B      | 30    |
//! | 92..122   | output asset A     | 30    |
//! | 122..152  | output asset B     | 30    |
//! | 152..184  | config flags       | 32    |
//! | 184..248  | aux data           | 64    |
//!
//! Config flag bit 0 marks a second input asset in use, bit 1 a second
//! output asset. An unused asset slot must be zero, and unknown config bits
//! must be clear, so every valid bridge call data has exactly one encoding.

use bitvec::{
    array::BitArray, field::BitField as _, order::Lsb0, slice::BitSlice, view::BitView as _,
};
use ff::PrimeField as _;
use pasta_curves::Fp;

use crate::{
    constants::{
        ASSET_ID_BIT_LENGTH, BRIDGE_ADDRESS_ID_BIT_LENGTH, BRIDGE_AUX_DATA_BIT_LENGTH,
        BRIDGE_CALL_DATA_BIT_LENGTH, BRIDGE_CONFIG_BIT_LENGTH,
    },
    error::CircuitError,
};

const ADDRESS_OFFSET: usize = 0;
const INPUT_A_OFFSET: usize = ADDRESS_OFFSET + BRIDGE_ADDRESS_ID_BIT_LENGTH;
const INPUT_B_OFFSET: usize = INPUT_A_OFFSET + ASSET_ID_BIT_LENGTH;
const OUTPUT_A_OFFSET: usize = INPUT_B_OFFSET + ASSET_ID_BIT_LENGTH;
const OUTPUT_B_OFFSET: usize = OUTPUT_A_OFFSET + ASSET_ID_BIT_LENGTH;
const CONFIG_OFFSET: usize = OUTPUT_B_OFFSET + ASSET_ID_BIT_LENGTH;
const AUX_OFFSET: usize = CONFIG_OFFSET + BRIDGE_CONFIG_BIT_LENGTH;

const _: () = assert!(
    AUX_OFFSET + BRIDGE_AUX_DATA_BIT_LENGTH == BRIDGE_CALL_DATA_BIT_LENGTH,
    "bridge call data layout must cover exactly its declared width"
);

const SECOND_INPUT_IN_USE: u64 = 1;
const SECOND_OUTPUT_IN_USE: u64 = 1 << 1;

/// Decoded bridge call data.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct BridgeCallData {
    /// Rollup-assigned id of the bridge contract.
    pub bridge_address_id: u32,
    /// Asset deposited from the first input note.
    pub input_asset_id_a: u32,
    /// Asset deposited from the second input note, when the bridge takes two.
    pub input_asset_id_b: Option<u32>,
    /// Asset the bridge returns.
    pub output_asset_id_a: u32,
    /// Second asset the bridge returns, if any.
    pub output_asset_id_b: Option<u32>,
    /// Opaque bridge-specific data.
    pub aux_data: u64,
}

fn store(bits: &mut BitSlice<u8, Lsb0>, offset: usize, width: usize, value: u64) {
    if let Some(slot) = bits.get_mut(offset..offset + width) {
        slot.store_le(value);
    }
}

fn load(bits: &BitSlice<u8, Lsb0>, offset: usize, width: usize) -> u64 {
    bits.get(offset..offset + width)
        .map_or(0, |slot| slot.load_le::<u64>())
}

fn asset(id: u32) -> Result<u64, CircuitError> {
    let wide = u64::from(id);
    if wide >> ASSET_ID_BIT_LENGTH == 0 {
        Ok(wide)
    } else {
        Err(CircuitError::BridgeCallData("asset id exceeds 30 bits"))
    }
}

fn narrow(value: u64) -> Result<u32, CircuitError> {
    u32::try_from(value).map_err(|_overflow| CircuitError::BridgeCallData("field overflow"))
}

impl BridgeCallData {
    /// Pack into a single field element.
    pub fn encode(&self) -> Result<Fp, CircuitError> {
        let mut bits = BitArray::<[u8; 32], Lsb0>::ZERO;
        let mut config = 0u64;
        store(
            &mut bits,
            ADDRESS_OFFSET,
            BRIDGE_ADDRESS_ID_BIT_LENGTH,
            u64::from(self.bridge_address_id),
        );
        store(&mut bits, INPUT_A_OFFSET, ASSET_ID_BIT_LENGTH, asset(self.input_asset_id_a)?);
        if let Some(id) = self.input_asset_id_b {
            store(&mut bits, INPUT_B_OFFSET, ASSET_ID_BIT_LENGTH, asset(id)?);
            config |= SECOND_INPUT_IN_USE;
        }
        store(&mut bits, OUTPUT_A_OFFSET, ASSET_ID_BIT_LENGTH, asset(self.output_asset_id_a)?);
        if let Some(id) = self.output_asset_id_b {
            store(&mut bits, OUTPUT_B_OFFSET, ASSET_ID_BIT_LENGTH, asset(id)?);
            config |= SECOND_OUTPUT_IN_USE;
        }
        store(&mut bits, CONFIG_OFFSET, BRIDGE_CONFIG_BIT_LENGTH, config);
        store(&mut bits, AUX_OFFSET, BRIDGE_AUX_DATA_BIT_LENGTH, self.aux_data);

        Option::from(Fp::from_repr(bits.into_inner()))
            .ok_or(CircuitError::BridgeCallData("non-canonical encoding"))
    }

    /// Number of input assets the bridge consumes.
    #[cfg(any(test, feature = "test-dependencies"))]
    #[must_use]
    pub const fn num_input_assets(&self) -> usize {
        if self.input_asset_id_b.is_some() { 2 } else { 1 }
    }
}

impl TryFrom<Fp> for BridgeCallData {
    type Error = CircuitError;

    fn try_from(fp: Fp) -> Result<Self, Self::Error> {
        let repr = fp.to_repr();
        let bits = repr.view_bits::<Lsb0>();
        if bits
            .get(BRIDGE_CALL_DATA_BIT_LENGTH..)
            .is_some_and(|high| high.any())
        {
            return Err(CircuitError::BridgeCallData("exceeds 248 bits"));
        }

        let config = load(bits, CONFIG_OFFSET, BRIDGE_CONFIG_BIT_LENGTH);
        if config & !(SECOND_INPUT_IN_USE | SECOND_OUTPUT_IN_USE) != 0 {
            return Err(CircuitError::BridgeCallData("unknown config bits"));
        }
        let optional = |offset: usize, in_use: bool| -> Result<Option<u32>, CircuitError> {
            let id = load(bits, offset, ASSET_ID_BIT_LENGTH);
            match (in_use, id) {
                (true, _) => narrow(id).map(Some),
                (false, 0) => Ok(None),
                (false, _) => Err(CircuitError::BridgeCallData("unused asset slot is nonzero")),
            }
        };

        Ok(Self {
            bridge_address_id: narrow(load(bits, ADDRESS_OFFSET, BRIDGE_ADDRESS_ID_BIT_LENGTH))?,
            input_asset_id_a: narrow(load(bits, INPUT_A_OFFSET, ASSET_ID_BIT_LENGTH))?,
            input_asset_id_b: optional(INPUT_B_OFFSET, config & SECOND_INPUT_IN_USE != 0)?,
            output_asset_id_a: narrow(load(bits, OUTPUT_A_OFFSET, ASSET_ID_BIT_LENGTH))?,
            output_asset_id_b: optional(OUTPUT_B_OFFSET, config & SECOND_OUTPUT_IN_USE != 0)?,
            aux_data: load(bits, AUX_OFFSET, BRIDGE_AUX_DATA_BIT_LENGTH),
        })
    }
}

#[cfg(test)]
mod tests {
    use ff::Field as _;
    use proptest::prelude::*;

    use super::*;

    fn uniswap() -> BridgeCallData {
        BridgeCallData {
            bridge_address_id: 7,
            input_asset_id_a: 1,
            input_asset_id_b: None,
            output_asset_id_a: 2,
            output_asset_id_b: None,
            aux_data: 0xdead_beef,
        }
    }

    /// The address id occupies the low 32 bits verbatim.
    #[test]
    fn address_id_is_low_bits() {
        let only_address = BridgeCallData {
            bridge_address_id: 0x1234_5678,
            ..BridgeCallData::default()
        };
        assert_eq!(only_address.encode().unwrap(), Fp::from(0x1234_5678u64));
    }

    #[test]
    fn decodes_what_it_encodes() {
        let bridge = BridgeCallData {
            input_asset_id_b: Some(3),
            output_asset_id_b: Some((1 << 30) - 1),
            ..uniswap()
        };
        assert_eq!(BridgeCallData::try_from(bridge.encode().unwrap()).unwrap(), bridge);
    }

    #[test]
    fn oversized_asset_rejected() {
        let bridge = BridgeCallData {
            output_asset_id_a: 1 << 30,
            ..uniswap()
        };
        assert!(bridge.encode().is_err());
    }

    /// A set asset-B slot without its config bit is not a valid encoding.
    #[test]
    fn unused_slot_must_be_zero() {
        let encoded = uniswap().encode().unwrap();
        let stray = encoded + Fp::from(1u64 << INPUT_B_OFFSET);
        assert_eq!(
            BridgeCallData::try_from(stray),
            Err(CircuitError::BridgeCallData("unused asset slot is nonzero"))
        );
    }

    /// Anything at or above bit 248 is rejected.
    #[test]
    fn wide_values_rejected() {
        assert!(BridgeCallData::try_from(-Fp::ONE).is_err());
    }

    proptest! {
        #[test]
        fn packing_is_injective(
            address in any::<u32>(),
            a in 0u32..(1 << 30),
            b in proptest::option::of(0u32..(1 << 30)),
            out in 0u32..(1 << 30),
            aux in any::<u64>(),
        ) {
            let bridge = BridgeCallData {
                bridge_address_id: address,
                input_asset_id_a: a,
                input_asset_id_b: b,
                output_asset_id_a: out,
                output_asset_id_b: None,
                aux_data: aux,
            };
            let encoded = bridge.encode().unwrap();
            prop_assert_eq!(BridgeCallData::try_from(encoded).unwrap(), bridge);
            prop_assert_eq!(bridge.num_input_assets(), if b.is_some() { 2 } else { 1 });
        }
    }
}
