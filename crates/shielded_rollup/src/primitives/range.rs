use bitvec::{order::Lsb0, view::BitView as _};
use ff::PrimeField as _;
use pasta_curves::Fp;

use crate::error::CircuitError;

/// Whether the canonical integer representative of `fp` is below
/// $2^{\text{bits}}$.
#[must_use]
pub fn fits_in_bits(fp: &Fp, bits: usize) -> bool {
    let repr = fp.to_repr();
    repr.view_bits::<Lsb0>()
        .get(bits..)
        .is_none_or(|high| high.not_any())
}

/// Range check a numeric witness, naming it in the rejection.
pub fn range_check(fp: &Fp, bits: usize, what: &'static str) -> Result<(), CircuitError> {
    if fits_in_bits(fp, bits) {
        Ok(())
    } else {
        Err(CircuitError::Range { what, bits })
    }
}
